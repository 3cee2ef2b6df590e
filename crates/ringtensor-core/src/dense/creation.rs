//! Constructors for dense tensors.

use super::types::DenseTensor;
use crate::error::{CoreError, CoreResult};
use crate::scalar::Semiring;
use crate::shape::Shape;

impl<T: Clone> DenseTensor<T> {
    /// Tensor with every entry set to `value`.
    pub fn full(dims: &[usize], value: T) -> CoreResult<Self> {
        let shape = Shape::new(dims);
        let len = shape.total_entries()?;
        Ok(Self::from_parts_unchecked(shape, vec![value; len]))
    }

    /// Matrix built from equally long rows.
    ///
    /// ```
    /// use ringtensor_core::DenseTensor;
    ///
    /// let m = DenseTensor::from_rows(&[vec![1, 2], vec![3, 4]]).unwrap();
    /// assert_eq!(m.dims(), &[2, 2]);
    /// assert_eq!(m[&[1, 0]], 3);
    /// ```
    pub fn from_rows(rows: &[Vec<T>]) -> CoreResult<Self> {
        let ncols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * ncols);
        for row in rows {
            if row.len() != ncols {
                return Err(CoreError::LengthMismatch {
                    expected: ncols,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Self::from_vec(data, &[rows.len(), ncols])
    }
}

impl<T: Semiring> DenseTensor<T> {
    /// Tensor filled with the additive identity.
    pub fn zeros(dims: &[usize]) -> CoreResult<Self> {
        Self::full(dims, T::zero())
    }

    /// Tensor filled with the multiplicative identity.
    pub fn ones(dims: &[usize]) -> CoreResult<Self> {
        Self::full(dims, T::one())
    }

    /// `n x n` identity matrix.
    pub fn identity(n: usize) -> CoreResult<Self> {
        let mut eye = Self::zeros(&[n, n])?;
        for i in 0..n {
            eye.data[i * n + i] = T::one();
        }
        Ok(eye)
    }
}
