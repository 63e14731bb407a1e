//! Gradient-descent training loop for [`Mlp`]

use serde::{Deserialize, Serialize};

use crate::autograd::Node;
use crate::config::TrainConfig;
use crate::error::{Error, Result};
use crate::nn::{mse_loss, Mlp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainReport {
    /// Parameter updates performed.
    pub epochs: usize,
    pub final_loss: f64,
    pub converged: bool,
}

pub struct Trainer {
    config: TrainConfig,
}

impl Trainer {
    pub fn new(config: TrainConfig) -> Result<Self> {
        config.validate()?;
        Ok(Trainer { config })
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// A fresh network shaped by `config.layers`, seeded when a seed is set.
    pub fn build_model(&self) -> Result<Mlp> {
        match self.config.seed {
            Some(seed) => Mlp::seeded(&self.config.layers, seed),
            None => Mlp::new(&self.config.layers, &mut rand::thread_rng()),
        }
    }

    /// Fit `mlp` so its first output matches `targets` on `inputs`.
    ///
    /// Each epoch forwards every sample, stops if the summed squared error is
    /// below the threshold, and otherwise zeroes gradients, runs backward and
    /// takes one gradient step.
    pub fn fit(&self, mlp: &mut Mlp, inputs: &[Vec<f64>], targets: &[f64]) -> Result<TrainReport> {
        if inputs.len() != targets.len() {
            return Err(Error::ShapeMismatch {
                op: "fit",
                lhs: vec![inputs.len()],
                rhs: vec![targets.len()],
            });
        }
        let targets: Vec<Node> = targets.iter().map(|&t| Node::scalar(t)).collect();
        // max_epochs >= 1, so this is always overwritten by a computed loss
        let mut final_loss = f64::INFINITY;

        for epoch in 0..self.config.max_epochs {
            let predictions = inputs
                .iter()
                .map(|x| first_output(mlp, x))
                .collect::<Result<Vec<Node>>>()?;
            let loss = mse_loss(&targets, &predictions)?;
            final_loss = loss.value().element()?;

            if *loss.value() < self.config.loss_threshold {
                log::info!("converged after {epoch} epochs, loss {final_loss:.6e}");
                return Ok(TrainReport {
                    epochs: epoch,
                    final_loss,
                    converged: true,
                });
            }
            if epoch % self.config.log_every == 0 {
                log::info!("epoch {epoch}: loss {final_loss:.6}");
            }

            mlp.zero_grad();
            loss.backward()?;
            mlp.step(self.config.learning_rate)?;
        }

        log::warn!(
            "stopped after {} epochs without reaching loss {} (last {final_loss:.6})",
            self.config.max_epochs,
            self.config.loss_threshold
        );
        Ok(TrainReport {
            epochs: self.config.max_epochs,
            final_loss,
            converged: false,
        })
    }
}

fn first_output(mlp: &Mlp, sample: &[f64]) -> Result<Node> {
    let xs: Vec<Node> = sample.iter().map(|&v| Node::scalar(v)).collect();
    mlp.forward(&xs)?
        .into_iter()
        .next()
        .ok_or(Error::ShapeMismatch {
            op: "fit",
            lhs: vec![1],
            rhs: vec![0],
        })
}
