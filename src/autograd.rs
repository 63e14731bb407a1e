//! Differentiable graph nodes
//!
//! A [`Node`] holds an eagerly computed value, a gradient accumulator of the
//! same shape, and the [`Op`] that produced it. Nodes are shared through
//! reference counting because one operand may feed several expressions; the
//! graph is immutable once built except for the gradients, which only the
//! backward pass and explicit zeroing touch.

use std::cell::RefCell;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::rc::Rc;
use std::str::FromStr;

use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::tensor::Tensor;

/// Tag naming the operation that produced a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    None,
    Add,
    Mul,
    Power,
    Relu,
    MatMul,
    Sum,
}

impl OpKind {
    pub fn symbol(self) -> &'static str {
        match self {
            OpKind::None => "null",
            OpKind::Add => "+",
            OpKind::Mul => "*",
            OpKind::Power => "pow",
            OpKind::Relu => "RELU",
            OpKind::MatMul => "MatMul",
            OpKind::Sum => "Sum",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for OpKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "null" => Ok(OpKind::None),
            "+" => Ok(OpKind::Add),
            "*" => Ok(OpKind::Mul),
            "pow" => Ok(OpKind::Power),
            "RELU" => Ok(OpKind::Relu),
            "MatMul" => Ok(OpKind::MatMul),
            "Sum" => Ok(OpKind::Sum),
            other => Err(Error::UnknownOperation(other.to_string())),
        }
    }
}

/// How a node was produced, carrying exactly the operands each rule needs.
#[derive(Debug, Clone)]
pub enum Op {
    Leaf,
    Add(Node, Node),
    Mul(Node, Node),
    Power(Node, f64),
    Relu(Node),
    MatMul(Node, Node),
    Sum(Node),
}

impl Op {
    pub fn kind(&self) -> OpKind {
        match self {
            Op::Leaf => OpKind::None,
            Op::Add(..) => OpKind::Add,
            Op::Mul(..) => OpKind::Mul,
            Op::Power(..) => OpKind::Power,
            Op::Relu(_) => OpKind::Relu,
            Op::MatMul(..) => OpKind::MatMul,
            Op::Sum(_) => OpKind::Sum,
        }
    }

    /// Operands in recorded order (0, 1 or 2 of them).
    pub fn operands(&self) -> Vec<&Node> {
        match self {
            Op::Leaf => vec![],
            Op::Add(a, b) | Op::Mul(a, b) | Op::MatMul(a, b) => vec![a, b],
            Op::Power(a, _) | Op::Relu(a) | Op::Sum(a) => vec![a],
        }
    }
}

struct Inner {
    value: Tensor,
    grad: RefCell<Tensor>,
    op: Op,
}

// Operands are released with an explicit stack; the derived drop would recurse
// once per node along a chain.
impl Drop for Inner {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        take_operands(&mut self.op, &mut pending);
        while let Some(node) = pending.pop() {
            if let Ok(mut inner) = Rc::try_unwrap(node.0) {
                take_operands(&mut inner.op, &mut pending);
            }
        }
    }
}

fn take_operands(op: &mut Op, pending: &mut Vec<Node>) {
    match std::mem::replace(op, Op::Leaf) {
        Op::Leaf => {}
        Op::Add(a, b) | Op::Mul(a, b) | Op::MatMul(a, b) => pending.extend([a, b]),
        Op::Power(a, _) | Op::Relu(a) | Op::Sum(a) => pending.push(a),
    }
}

/// Identity of a node, stable for as long as the node is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Shared handle to a point in the computation graph.
///
/// Cloning a `Node` clones the handle, not the node: both handles see the
/// same gradient.
#[derive(Clone)]
pub struct Node(Rc<Inner>);

impl Node {
    fn from_op(value: Tensor, op: Op) -> Self {
        let grad = Tensor::zeros(value.shape());
        Node(Rc::new(Inner {
            value,
            grad: RefCell::new(grad),
            op,
        }))
    }

    /// An input or parameter: no operands, zero gradient.
    pub fn leaf(value: Tensor) -> Self {
        Self::from_op(value, Op::Leaf)
    }

    pub fn scalar(value: f64) -> Self {
        Self::leaf(Tensor::single(value))
    }

    pub fn id(&self) -> NodeId {
        NodeId(Rc::as_ptr(&self.0) as usize)
    }

    pub fn value(&self) -> &Tensor {
        &self.0.value
    }

    pub fn shape(&self) -> &[usize] {
        self.0.value.shape()
    }

    /// Snapshot of the accumulated gradient.
    pub fn grad(&self) -> Tensor {
        self.0.grad.borrow().clone()
    }

    pub fn set_grad(&self, grad: Tensor) -> Result<()> {
        if grad.shape() != self.shape() {
            return Err(Error::ShapeMismatch {
                op: "set_grad",
                lhs: self.shape().to_vec(),
                rhs: grad.shape().to_vec(),
            });
        }
        *self.0.grad.borrow_mut() = grad;
        Ok(())
    }

    pub fn zero_grad(&self) {
        *self.0.grad.borrow_mut() = Tensor::zeros(self.shape());
    }

    pub(crate) fn accumulate_grad(&self, contribution: &Tensor) -> Result<()> {
        let mut grad = self.0.grad.borrow_mut();
        *grad = grad.checked_add(contribution)?;
        Ok(())
    }

    pub fn op(&self) -> &Op {
        &self.0.op
    }

    pub fn kind(&self) -> OpKind {
        self.0.op.kind()
    }

    pub fn operands(&self) -> Vec<&Node> {
        self.0.op.operands()
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.0.op, Op::Leaf)
    }

    /// Run the backward pass with this node as the root.
    pub fn backward(&self) -> Result<()> {
        Engine::backward(self)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("value", &self.0.value)
            .field("grad", &*self.0.grad.borrow())
            .field("op", &self.kind())
            .finish()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.value, f)
    }
}

pub fn add(a: &Node, b: &Node) -> Result<Node> {
    let value = a.value().checked_add(b.value())?;
    Ok(Node::from_op(value, Op::Add(a.clone(), b.clone())))
}

pub fn mul(a: &Node, b: &Node) -> Result<Node> {
    let value = a.value().checked_mul(b.value())?;
    Ok(Node::from_op(value, Op::Mul(a.clone(), b.clone())))
}

pub fn power(a: &Node, exponent: f64) -> Node {
    Node::from_op(a.value().power(exponent), Op::Power(a.clone(), exponent))
}

pub fn relu(a: &Node) -> Node {
    Node::from_op(a.value().relu(), Op::Relu(a.clone()))
}

pub fn matmul(a: &Node, b: &Node) -> Result<Node> {
    let value = a.value().matmul(b.value())?;
    Ok(Node::from_op(value, Op::MatMul(a.clone(), b.clone())))
}

pub fn sum(a: &Node) -> Node {
    Node::from_op(a.value().sum(), Op::Sum(a.clone()))
}

/// `a * (-1)`, with the constant shaped like `a`.
pub fn neg(a: &Node) -> Node {
    let minus_one = Node::leaf(Tensor::fill(a.shape(), -1.0));
    Node::from_op(a.value().mul_scalar(-1.0), Op::Mul(a.clone(), minus_one))
}

pub fn sub(a: &Node, b: &Node) -> Result<Node> {
    add(a, &neg(b))
}

pub fn div(a: &Node, b: &Node) -> Result<Node> {
    mul(a, &power(b, -1.0))
}

macro_rules! node_binary_op {
    ($trait:ident, $method:ident, $func:ident) => {
        impl $trait<&Node> for &Node {
            type Output = Node;

            fn $method(self, rhs: &Node) -> Node {
                $func(self, rhs).unwrap_or_else(|e| panic!("{e}"))
            }
        }

        impl $trait for Node {
            type Output = Node;

            fn $method(self, rhs: Node) -> Node {
                $func(&self, &rhs).unwrap_or_else(|e| panic!("{e}"))
            }
        }
    };
}

node_binary_op!(Add, add, add);
node_binary_op!(Sub, sub, sub);
node_binary_op!(Mul, mul, mul);
node_binary_op!(Div, div, div);

impl Neg for &Node {
    type Output = Node;

    fn neg(self) -> Node {
        neg(self)
    }
}

impl Neg for Node {
    type Output = Node;

    fn neg(self) -> Node {
        neg(&self)
    }
}
