//! Feed-forward network built from scalar graph nodes
//!
//! A [`Neuron`] maps N scalar inputs to one scalar output, a [`Layer`] runs
//! several neurons over the same inputs, and an [`Mlp`] chains layers. Weight
//! initialisation draws from the random number generator the caller passes
//! in.

use std::iter;

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::autograd::{add, mul, power, relu, sub, Node};
use crate::error::{Error, Result};

pub struct Neuron {
    weights: Vec<Node>,
    bias: Node,
    nonlinear: bool,
}

impl Neuron {
    /// Weights uniform in [-1, 1), bias zero.
    pub fn new<R: Rng + ?Sized>(nin: usize, nonlinear: bool, rng: &mut R) -> Self {
        let uniform = Uniform::new(-1.0, 1.0);
        let weights = (0..nin).map(|_| Node::scalar(uniform.sample(rng))).collect();
        Neuron {
            weights,
            bias: Node::scalar(0.0),
            nonlinear,
        }
    }

    pub fn from_weights(weights: &[f64], bias: f64, nonlinear: bool) -> Self {
        Neuron {
            weights: weights.iter().map(|&w| Node::scalar(w)).collect(),
            bias: Node::scalar(bias),
            nonlinear,
        }
    }

    pub fn nin(&self) -> usize {
        self.weights.len()
    }

    /// `bias + sum(x_i * w_i)`, passed through ReLU when nonlinear.
    pub fn forward(&self, inputs: &[Node]) -> Result<Node> {
        if inputs.len() != self.weights.len() {
            return Err(Error::ShapeMismatch {
                op: "neuron",
                lhs: vec![self.weights.len()],
                rhs: vec![inputs.len()],
            });
        }
        let mut activation = self.bias.clone();
        for (x, w) in inputs.iter().zip(&self.weights) {
            activation = add(&activation, &mul(x, w)?)?;
        }
        Ok(if self.nonlinear {
            relu(&activation)
        } else {
            activation
        })
    }

    /// Weights followed by the bias.
    pub fn parameters(&self) -> Vec<&Node> {
        self.weights.iter().chain(iter::once(&self.bias)).collect()
    }

    fn parameters_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.weights.iter_mut().chain(iter::once(&mut self.bias))
    }
}

pub struct Layer {
    neurons: Vec<Neuron>,
}

impl Layer {
    pub fn new<R: Rng + ?Sized>(nin: usize, nout: usize, nonlinear: bool, rng: &mut R) -> Self {
        Layer {
            neurons: (0..nout).map(|_| Neuron::new(nin, nonlinear, rng)).collect(),
        }
    }

    pub fn from_neurons(neurons: Vec<Neuron>) -> Self {
        Layer { neurons }
    }

    pub fn nout(&self) -> usize {
        self.neurons.len()
    }

    pub fn forward(&self, inputs: &[Node]) -> Result<Vec<Node>> {
        self.neurons.iter().map(|n| n.forward(inputs)).collect()
    }

    pub fn parameters(&self) -> Vec<&Node> {
        self.neurons.iter().flat_map(Neuron::parameters).collect()
    }

    fn parameters_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.neurons.iter_mut().flat_map(Neuron::parameters_mut)
    }
}

/// Multilayer perceptron: ReLU on every layer but the last.
pub struct Mlp {
    layers: Vec<Layer>,
}

impl Mlp {
    /// `sizes` lists the input width followed by each layer's width.
    pub fn new<R: Rng + ?Sized>(sizes: &[usize], rng: &mut R) -> Result<Self> {
        if sizes.len() < 2 {
            return Err(Error::InvalidConfig(format!(
                "an MLP needs an input size and at least one layer, got {sizes:?}"
            )));
        }
        let last = sizes.len() - 2;
        let layers = sizes
            .windows(2)
            .enumerate()
            .map(|(i, pair)| Layer::new(pair[0], pair[1], i != last, rng))
            .collect();
        Ok(Mlp { layers })
    }

    pub fn seeded(sizes: &[usize], seed: u64) -> Result<Self> {
        Self::new(sizes, &mut StdRng::seed_from_u64(seed))
    }

    pub fn from_layers(layers: Vec<Layer>) -> Self {
        Mlp { layers }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn forward(&self, inputs: &[Node]) -> Result<Vec<Node>> {
        let mut activations = inputs.to_vec();
        for layer in &self.layers {
            activations = layer.forward(&activations)?;
        }
        Ok(activations)
    }

    /// Forward plain numbers and read the outputs back as numbers.
    pub fn predict(&self, inputs: &[f64]) -> Result<Vec<f64>> {
        let inputs: Vec<Node> = inputs.iter().map(|&x| Node::scalar(x)).collect();
        self.forward(&inputs)?
            .iter()
            .map(|out| out.value().element())
            .collect()
    }

    pub fn parameters(&self) -> Vec<&Node> {
        self.layers.iter().flat_map(Layer::parameters).collect()
    }

    pub fn zero_grad(&self) {
        for p in self.parameters() {
            p.zero_grad();
        }
    }

    /// Gradient-descent update: every parameter becomes a fresh leaf holding
    /// `value - learning_rate * grad`. Graphs built before the step keep the
    /// old parameter nodes unchanged.
    pub fn step(&mut self, learning_rate: f64) -> Result<()> {
        for p in self.layers.iter_mut().flat_map(Layer::parameters_mut) {
            let updated = p.value().checked_sub(&p.grad().mul_scalar(learning_rate))?;
            *p = Node::leaf(updated);
        }
        Ok(())
    }
}

/// Sum of squared errors, `sum((t_i - p_i)^2)`.
pub fn mse_loss(targets: &[Node], predictions: &[Node]) -> Result<Node> {
    if targets.len() != predictions.len() {
        return Err(Error::ShapeMismatch {
            op: "mse_loss",
            lhs: vec![targets.len()],
            rhs: vec![predictions.len()],
        });
    }
    let mut loss = Node::scalar(0.0);
    for (t, p) in targets.iter().zip(predictions) {
        loss = add(&loss, &power(&sub(t, p)?, 2.0))?;
    }
    Ok(loss)
}
