//! Dense N-dimensional tensor of `f64`
//!
//! Storage is an ndarray `ArrayD` that is always kept in standard
//! (row-major, contiguous) layout, so the flat element order, the shape and
//! the strides returned by [`Tensor::strides`] agree at all times.

use std::cmp::Ordering;
use std::fmt;

use ndarray::{ArrayD, ArrayView2, Ix2, IxDyn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Row-major strides for `shape`: `stride[last] = 1`,
/// `stride[i] = stride[i + 1] * shape[i + 1]`.
pub fn row_major_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// A value-type N-dimensional array.
///
/// `==` between tensors is exact (same shape, same elements). Comparisons
/// against a plain `f64` and [`Tensor::compare_sum`] look at the sum of all
/// elements instead, which is only meaningful for single-element tensors
/// such as losses and scalar predictions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    pub(crate) data: ArrayD<f64>,
}

impl Tensor {
    pub(crate) fn from_array(data: ArrayD<f64>) -> Self {
        if data.is_standard_layout() {
            Tensor { data }
        } else {
            Tensor {
                data: data.as_standard_layout().into_owned(),
            }
        }
    }

    /// Build a tensor from flat row-major data.
    ///
    /// Fails with [`Error::ElementCount`] when `data.len()` is not the
    /// product of `shape`.
    pub fn from_data(data: Vec<f64>, shape: &[usize]) -> Result<Self> {
        let expected: usize = shape.iter().product();
        let got = data.len();
        if got != expected {
            return Err(Error::ElementCount {
                shape: shape.to_vec(),
                expected,
                got,
            });
        }
        ArrayD::from_shape_vec(IxDyn(shape), data)
            .map(Self::from_array)
            .map_err(|_| Error::ElementCount {
                shape: shape.to_vec(),
                expected,
                got,
            })
    }

    /// Rank-1 tensor over `data`.
    pub fn vector(data: Vec<f64>) -> Self {
        Self::from_array(ndarray::Array1::from(data).into_dyn())
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self::from_array(ArrayD::zeros(IxDyn(shape)))
    }

    pub fn ones(shape: &[usize]) -> Self {
        Self::from_array(ArrayD::ones(IxDyn(shape)))
    }

    pub fn fill(shape: &[usize], value: f64) -> Self {
        Self::from_array(ArrayD::from_elem(IxDyn(shape), value))
    }

    /// Single-element tensor of shape `[1]`.
    pub fn single(value: f64) -> Self {
        Self::fill(&[1], value)
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Row-major strides, always derived from the current shape.
    pub fn strides(&self) -> Vec<usize> {
        row_major_strides(self.shape())
    }

    pub fn rank(&self) -> usize {
        self.data.ndim()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Elements in row-major order.
    pub fn to_vec(&self) -> Vec<f64> {
        self.data.iter().copied().collect()
    }

    /// Same elements under a new shape with the same element count.
    pub fn reshape(&self, shape: &[usize]) -> Result<Tensor> {
        Tensor::from_data(self.to_vec(), shape)
    }

    /// Index with a prefix of coordinates.
    ///
    /// A full index yields a single-element tensor; a partial index yields the
    /// sub-tensor spanned by the remaining axes. The offset is computed from
    /// the strides, and every coordinate is bounds-checked.
    pub fn index(&self, indices: &[usize]) -> Result<Tensor> {
        let shape = self.shape();
        let out_of_range = indices.len() > shape.len()
            || indices.iter().zip(shape).any(|(&i, &dim)| i >= dim);
        if out_of_range {
            return Err(Error::IndexOutOfRange {
                index: indices.to_vec(),
                shape: shape.to_vec(),
            });
        }

        let offset: usize = indices
            .iter()
            .zip(self.strides())
            .map(|(i, stride)| i * stride)
            .sum();
        let rest = &shape[indices.len()..];
        let count: usize = rest.iter().product();
        let data: Vec<f64> = self.data.iter().skip(offset).take(count).copied().collect();

        if indices.len() == shape.len() {
            Tensor::from_data(data, &[1])
        } else {
            Tensor::from_data(data, rest)
        }
    }

    /// The only element of a single-element tensor.
    pub fn element(&self) -> Result<f64> {
        let not_scalar = || Error::NotScalar {
            shape: self.shape().to_vec(),
        };
        if self.len() != 1 {
            return Err(not_scalar());
        }
        self.data.iter().next().copied().ok_or_else(not_scalar)
    }

    /// Replace each element by `f(value, flat_index)`.
    pub fn apply<F>(&self, f: F) -> Tensor
    where
        F: Fn(f64, usize) -> f64,
    {
        let mut data = self.data.clone();
        for (i, x) in data.iter_mut().enumerate() {
            *x = f(*x, i);
        }
        Tensor::from_array(data)
    }

    /// Sum of all elements as a single-element tensor.
    pub fn sum(&self) -> Tensor {
        Tensor::single(self.data.sum())
    }

    pub fn relu(&self) -> Tensor {
        Tensor::from_array(self.data.mapv(|x| if x > 0.0 { x } else { 0.0 }))
    }

    pub fn power(&self, exponent: f64) -> Tensor {
        Tensor::from_array(self.data.mapv(|x| x.powf(exponent)))
    }

    fn as_matrix(&self, op: &'static str) -> Result<ArrayView2<'_, f64>> {
        self.data
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|_| Error::RankUnsupported {
                op,
                rank: self.rank(),
            })
    }

    /// Swap the two axes of a rank-2 tensor.
    pub fn transpose(&self) -> Result<Tensor> {
        let matrix = self.as_matrix("transpose")?;
        Ok(Tensor::from_array(
            matrix.t().as_standard_layout().into_owned().into_dyn(),
        ))
    }

    /// Matrix product of two rank-2 tensors, `[m, k] x [k, n] -> [m, n]`.
    pub fn matmul(&self, other: &Tensor) -> Result<Tensor> {
        let lhs = self.as_matrix("matmul")?;
        let rhs = other.as_matrix("matmul")?;
        if lhs.ncols() != rhs.nrows() {
            return Err(Error::ShapeMismatch {
                op: "matmul",
                lhs: self.shape().to_vec(),
                rhs: other.shape().to_vec(),
            });
        }
        Ok(Tensor::from_array(lhs.dot(&rhs).into_dyn()))
    }

    /// Order two tensors by the sum of their elements.
    ///
    /// This is not an element-wise or lexicographic comparison.
    pub fn compare_sum(&self, other: &Tensor) -> Option<Ordering> {
        self.data.sum().partial_cmp(&other.data.sum())
    }

    /// Text form: one bracketed row for rank 0 and 1, one bracketed row per
    /// line for rank 2. Higher ranks are rejected.
    pub fn render(&self) -> Result<String> {
        fn row<'a>(values: impl Iterator<Item = &'a f64>) -> String {
            let cells: Vec<String> = values.map(|v| v.to_string()).collect();
            format!("[{}]", cells.join(" "))
        }

        match self.rank() {
            0 | 1 => Ok(row(self.data.iter())),
            2 => {
                let matrix = self.as_matrix("render")?;
                let rows: Vec<String> = matrix.outer_iter().map(|r| row(r.iter())).collect();
                Ok(rows.join("\n"))
            }
            rank => Err(Error::RankUnsupported {
                op: "render",
                rank,
            }),
        }
    }
}

/// Fails (and so panics inside `to_string`) for tensors of rank > 2.
impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.render().map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl PartialEq<f64> for Tensor {
    fn eq(&self, other: &f64) -> bool {
        self.data.sum() == *other
    }
}

impl PartialOrd<f64> for Tensor {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        self.data.sum().partial_cmp(other)
    }
}
