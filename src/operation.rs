use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::error::{Error, Result};
use crate::tensor::Tensor;

impl Tensor {
    fn zip_with<F>(&self, other: &Tensor, op: &'static str, f: F) -> Result<Tensor>
    where
        F: Fn(f64, f64) -> f64,
    {
        if self.shape() != other.shape() {
            return Err(Error::ShapeMismatch {
                op,
                lhs: self.shape().to_vec(),
                rhs: other.shape().to_vec(),
            });
        }
        let mut data = self.data.clone();
        data.zip_mut_with(&other.data, |a, &b| *a = f(*a, b));
        Ok(Tensor::from_array(data))
    }

    /// Element-wise sum; shapes must be identical.
    pub fn checked_add(&self, other: &Tensor) -> Result<Tensor> {
        self.zip_with(other, "add", |a, b| a + b)
    }

    pub fn checked_sub(&self, other: &Tensor) -> Result<Tensor> {
        self.zip_with(other, "sub", |a, b| a - b)
    }

    /// Element-wise (Hadamard) product; shapes must be identical.
    pub fn checked_mul(&self, other: &Tensor) -> Result<Tensor> {
        self.zip_with(other, "mul", |a, b| a * b)
    }

    pub fn checked_div(&self, other: &Tensor) -> Result<Tensor> {
        self.zip_with(other, "div", |a, b| a / b)
    }

    pub fn add_scalar(&self, rhs: f64) -> Tensor {
        Tensor::from_array(self.data.mapv(|x| x + rhs))
    }

    pub fn sub_scalar(&self, rhs: f64) -> Tensor {
        Tensor::from_array(self.data.mapv(|x| x - rhs))
    }

    pub fn mul_scalar(&self, rhs: f64) -> Tensor {
        Tensor::from_array(self.data.mapv(|x| x * rhs))
    }

    pub fn div_scalar(&self, rhs: f64) -> Tensor {
        Tensor::from_array(self.data.mapv(|x| x / rhs))
    }
}

// Operators panic on mismatched shapes; use the `checked_*` methods to get
// the error instead.
macro_rules! tensor_binary_op {
    ($trait:ident, $method:ident, $checked:ident, $scalar:ident) => {
        impl $trait<&Tensor> for &Tensor {
            type Output = Tensor;

            fn $method(self, rhs: &Tensor) -> Tensor {
                self.$checked(rhs).unwrap_or_else(|e| panic!("{e}"))
            }
        }

        impl $trait for Tensor {
            type Output = Tensor;

            fn $method(self, rhs: Tensor) -> Tensor {
                (&self).$method(&rhs)
            }
        }

        impl $trait<f64> for &Tensor {
            type Output = Tensor;

            fn $method(self, rhs: f64) -> Tensor {
                self.$scalar(rhs)
            }
        }

        impl $trait<f64> for Tensor {
            type Output = Tensor;

            fn $method(self, rhs: f64) -> Tensor {
                self.$scalar(rhs)
            }
        }
    };
}

tensor_binary_op!(Add, add, checked_add, add_scalar);
tensor_binary_op!(Sub, sub, checked_sub, sub_scalar);
tensor_binary_op!(Mul, mul, checked_mul, mul_scalar);
tensor_binary_op!(Div, div, checked_div, div_scalar);

impl Neg for &Tensor {
    type Output = Tensor;

    fn neg(self) -> Tensor {
        self.mul_scalar(-1.0)
    }
}

impl Neg for Tensor {
    type Output = Tensor;

    fn neg(self) -> Tensor {
        self.mul_scalar(-1.0)
    }
}
