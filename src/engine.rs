use crate::autograd::{Node, Op};
use crate::error::Result;
use crate::graph_task::GraphTask;
use crate::tensor::Tensor;

/// Reverse-mode gradient propagation.
pub struct Engine;

impl Engine {
    /// Compute gradients for `root` and everything reachable from it.
    ///
    /// The root gradient is reset to all ones of the root's shape first,
    /// whatever the caller stored there. Every other gradient is accumulated
    /// into, never overwritten, so repeated calls add up until the caller
    /// zeroes them.
    pub fn backward(root: &Node) -> Result<()> {
        let graph_task = GraphTask::new(root);
        root.set_grad(Tensor::ones(root.shape()))?;
        log::debug!(
            "backward over {} nodes from root of shape {:?}",
            graph_task.len(),
            root.shape()
        );

        for node in graph_task.order().iter().rev() {
            Self::evaluate_function(node)?;
        }
        Ok(())
    }

    /// Apply the local rule of `node`, pushing its gradient into its operands.
    fn evaluate_function(node: &Node) -> Result<()> {
        let grad = node.grad();
        log::trace!("applying {} rule", node.kind());

        match node.op() {
            Op::Leaf => {}
            Op::Add(a, b) => {
                a.accumulate_grad(&grad)?;
                b.accumulate_grad(&grad)?;
            }
            Op::Mul(a, b) => {
                a.accumulate_grad(&b.value().checked_mul(&grad)?)?;
                b.accumulate_grad(&a.value().checked_mul(&grad)?)?;
            }
            Op::Power(a, exponent) => {
                let local = a.value().power(exponent - 1.0).mul_scalar(*exponent);
                a.accumulate_grad(&local.checked_mul(&grad)?)?;
            }
            Op::Relu(a) => {
                // gate on the output, which is positive exactly where the input was
                let mask = node.value().apply(|x, _| if x > 0.0 { 1.0 } else { 0.0 });
                a.accumulate_grad(&grad.checked_mul(&mask)?)?;
            }
            Op::MatMul(a, b) => {
                a.accumulate_grad(&grad.matmul(&b.value().transpose()?)?)?;
                b.accumulate_grad(&a.value().transpose()?.matmul(&grad)?)?;
            }
            Op::Sum(a) => {
                let upstream = grad.element()?;
                a.accumulate_grad(&Tensor::fill(a.shape(), upstream))?;
            }
        }
        Ok(())
    }
}
