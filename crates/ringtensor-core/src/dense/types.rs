//! The [`DenseTensor`] container.

use crate::error::{CoreError, CoreResult};
use crate::shape::Shape;
use std::ops::{Index, IndexMut};

/// Dense N-dimensional tensor over an arbitrary element type.
///
/// Entries are stored contiguously in row-major order; `data.len()` always
/// equals `shape.total_entries()`. Rank-2 tensors are used as matrices and
/// rank-1 tensors as vectors by the kernels.
///
/// # Examples
///
/// ```
/// use ringtensor_core::DenseTensor;
///
/// let t = DenseTensor::from_vec(vec![1, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
/// assert_eq!(t.dims(), &[2, 3]);
/// assert_eq!(t[&[1, 0]], 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DenseTensor<T> {
    pub(crate) shape: Shape,
    pub(crate) data: Vec<T>,
}

impl<T> DenseTensor<T> {
    /// Create a tensor from row-major data.
    ///
    /// Fails when `data.len()` differs from the number of entries of `dims`
    /// or when that number overflows.
    pub fn from_vec(data: Vec<T>, dims: &[usize]) -> CoreResult<Self> {
        Self::from_parts(Shape::new(dims), data)
    }

    pub fn from_parts(shape: Shape, data: Vec<T>) -> CoreResult<Self> {
        let expected = shape.total_entries()?;
        if data.len() != expected {
            return Err(CoreError::LengthMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Wraps a buffer produced by a kernel that already honours `shape`.
    pub(crate) fn from_parts_unchecked(shape: Shape, data: Vec<T>) -> Self {
        debug_assert_eq!(shape.total_entries().ok(), Some(data.len()));
        Self { shape, data }
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    /// Number of stored entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn into_parts(self) -> (Shape, Vec<T>) {
        (self.shape, self.data)
    }

    pub fn is_matrix(&self) -> bool {
        self.rank() == 2
    }

    pub fn is_vector(&self) -> bool {
        self.rank() == 1
    }

    pub fn is_square(&self) -> bool {
        self.is_matrix() && self.dims()[0] == self.dims()[1]
    }

    /// Rows of a matrix; the length of a vector.
    pub fn nrows(&self) -> usize {
        self.dims().first().copied().unwrap_or(1)
    }

    /// Columns of a matrix; 1 for a vector.
    pub fn ncols(&self) -> usize {
        if self.rank() >= 2 {
            self.dims()[1]
        } else {
            1
        }
    }

    pub(crate) fn ensure_matrix(&self, op: &'static str) -> CoreResult<()> {
        if self.is_matrix() {
            Ok(())
        } else {
            Err(CoreError::InvalidShape(format!(
                "{op} requires a matrix, got shape {}",
                self.shape
            )))
        }
    }

    pub(crate) fn ensure_same_shape<U>(
        &self,
        op: &'static str,
        other: &DenseTensor<U>,
    ) -> CoreResult<()> {
        if self.shape != other.shape {
            return Err(CoreError::shape_mismatch(op, self.dims(), other.dims()));
        }
        Ok(())
    }
}

impl<T> Index<&[usize]> for DenseTensor<T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if `index` is out of bounds; use `get` for a checked lookup.
    fn index(&self, index: &[usize]) -> &T {
        match self.shape.flat_index(index) {
            Ok(flat) => &self.data[flat],
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T> IndexMut<&[usize]> for DenseTensor<T> {
    fn index_mut(&mut self, index: &[usize]) -> &mut T {
        match self.shape.flat_index(index) {
            Ok(flat) => &mut self.data[flat],
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T, const N: usize> Index<&[usize; N]> for DenseTensor<T> {
    type Output = T;

    fn index(&self, index: &[usize; N]) -> &T {
        &self[index.as_slice()]
    }
}

impl<T, const N: usize> IndexMut<&[usize; N]> for DenseTensor<T> {
    fn index_mut(&mut self, index: &[usize; N]) -> &mut T {
        &mut self[index.as_slice()]
    }
}
