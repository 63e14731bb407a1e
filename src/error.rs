//! Error types for tensor and graph operations

use thiserror::Error;

/// Everything that can go wrong while building or differentiating a graph.
///
/// All of these are precondition failures detected at the point of misuse.
/// Nothing here is retried: the computation is deterministic, so a failing
/// call fails the same way every time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Operands of an element-wise or matrix operation do not line up.
    #[error("shape mismatch in {op}: {lhs:?} vs {rhs:?}")]
    ShapeMismatch {
        op: &'static str,
        lhs: Vec<usize>,
        rhs: Vec<usize>,
    },

    /// Shape mismatch at construction: the flat data length disagrees with
    /// the product of the requested shape (`from_data`, `reshape`). Kept
    /// apart from [`Error::ShapeMismatch`] because there is only one shape
    /// to report.
    #[error("element count mismatch: shape {shape:?} requires {expected} elements, got {got}")]
    ElementCount {
        shape: Vec<usize>,
        expected: usize,
        got: usize,
    },

    #[error("{op} does not support tensors of rank {rank}")]
    RankUnsupported { op: &'static str, rank: usize },

    #[error("not a scalar: tensor has shape {shape:?}")]
    NotScalar { shape: Vec<usize> },

    #[error("index {index:?} out of range for shape {shape:?}")]
    IndexOutOfRange { index: Vec<usize>, shape: Vec<usize> },

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
