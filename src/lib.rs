//! # tensorgrad
//!
//! Reverse-mode automatic differentiation over dense `f64` tensors, with a
//! small multilayer perceptron on top.
//!
//! - [`Tensor`]: N-dimensional array with element-wise, matrix and reduction ops
//! - [`Node`]: graph node wrapping a tensor value, its gradient and the [`Op`] that produced it
//! - [`Engine`]: topological backward pass accumulating gradients through the DAG
//! - [`nn`]: `Neuron` / `Layer` / `Mlp`, trained by [`train::Trainer`]
//!
//! ```rust
//! use tensorgrad::Node;
//!
//! let a = Node::scalar(2.0);
//! let b = Node::scalar(-3.0);
//! let c = &(&a * &b) + &a;
//! c.backward().unwrap();
//! assert_eq!(a.grad().element().unwrap(), -2.0);
//! ```

pub mod autograd;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph_task;
pub mod nn;
pub mod operation;
pub mod tensor;
pub mod train;
pub mod tree;

pub use autograd::{add, div, matmul, mul, neg, power, relu, sub, sum, Node, NodeId, Op, OpKind};
pub use config::TrainConfig;
pub use engine::Engine;
pub use error::{Error, Result};
pub use graph_task::{collect_parameters, topological_order, zero_grad_recursive, GraphTask};
pub use tensor::Tensor;
pub use tree::render_tree;
