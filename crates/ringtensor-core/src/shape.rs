//! Tensor shapes with precomputed row-major strides.
//!
//! A [`Shape`] is immutable once built. The last axis varies fastest:
//! `strides[rank - 1] == 1` and `strides[i] == dims[i + 1] * strides[i + 1]`.
//!
//! ```
//! use ringtensor_core::Shape;
//!
//! let shape = Shape::new(&[2, 3, 4]);
//! assert_eq!(shape.strides(), &[12, 4, 1]);
//! assert_eq!(shape.flat_index(&[1, 2, 3]).unwrap(), 23);
//! assert_eq!(shape.nd_index(23).unwrap().as_slice(), &[1, 2, 3]);
//! ```

use crate::error::{CoreError, CoreResult};
use smallvec::SmallVec;
use std::fmt;

/// Inline storage for dims, strides and multi-indices.
pub type Dims = SmallVec<[usize; 6]>;

/// Dimensions of a tensor together with their row-major strides.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shape {
    dims: Dims,
    strides: Dims,
}

impl Shape {
    pub fn new(dims: &[usize]) -> Self {
        let dims: Dims = dims.iter().copied().collect();
        let strides = row_major_strides(&dims);
        Self { dims, strides }
    }

    /// Shape of a matrix with `rows` rows and `cols` columns.
    pub fn matrix(rows: usize, cols: usize) -> Self {
        Self::new(&[rows, cols])
    }

    pub fn vector(len: usize) -> Self {
        Self::new(&[len])
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Extent of `axis`.
    ///
    /// # Panics
    ///
    /// Panics if `axis >= rank`.
    #[inline]
    pub fn dim(&self, axis: usize) -> usize {
        self.dims[axis]
    }

    /// Number of entries, rejecting counts that overflow `usize` or exceed
    /// the largest possible allocation.
    pub fn total_entries(&self) -> CoreResult<usize> {
        let mut total: usize = 1;
        for &d in &self.dims {
            total = total.checked_mul(d).ok_or_else(|| self.overflow())?;
        }
        if total > isize::MAX as usize {
            return Err(self.overflow());
        }
        Ok(total)
    }

    /// Approximate entry count that never overflows. Used for sparsity ratios.
    pub fn total_entries_f64(&self) -> f64 {
        self.dims.iter().map(|&d| d as f64).product()
    }

    /// Row-major offset of a multi-index, bounds checked.
    pub fn flat_index(&self, index: &[usize]) -> CoreResult<usize> {
        self.check_index(index)?;
        Ok(self.flat_index_unchecked(index))
    }

    /// Row-major offset of a multi-index without validation.
    #[inline]
    pub fn flat_index_unchecked(&self, index: &[usize]) -> usize {
        index
            .iter()
            .zip(self.strides.iter())
            .map(|(&i, &s)| i * s)
            .sum()
    }

    /// Inverse of [`flat_index`](Self::flat_index).
    pub fn nd_index(&self, flat: usize) -> CoreResult<Dims> {
        let total = self.total_entries()?;
        if flat >= total {
            return Err(CoreError::out_of_bounds(&[flat], &[total]));
        }
        Ok(self.nd_index_unchecked(flat))
    }

    #[inline]
    pub fn nd_index_unchecked(&self, flat: usize) -> Dims {
        self.dims
            .iter()
            .zip(self.strides.iter())
            .map(|(&d, &s)| (flat / s) % d)
            .collect()
    }

    /// Ensures `index` has the right rank and every coordinate is in range.
    pub fn check_index(&self, index: &[usize]) -> CoreResult<()> {
        let in_bounds = index.len() == self.rank()
            && index.iter().zip(self.dims.iter()).all(|(&i, &d)| i < d);
        if in_bounds {
            Ok(())
        } else {
            Err(CoreError::out_of_bounds(index, &self.dims))
        }
    }

    /// Shape with `axis1` and `axis2` exchanged.
    pub fn swap_axes(&self, axis1: usize, axis2: usize) -> CoreResult<Shape> {
        let rank = self.rank();
        if axis1 >= rank || axis2 >= rank {
            return Err(CoreError::InvalidAxes(format!(
                "cannot swap axes {axis1} and {axis2} of a rank {rank} shape"
            )));
        }
        let mut dims = self.dims.clone();
        dims.swap(axis1, axis2);
        Ok(Shape::new(&dims))
    }

    /// Shape whose axis `i` is axis `axes[i]` of `self`.
    pub fn permute_axes(&self, axes: &[usize]) -> CoreResult<Shape> {
        validate_permutation(axes, self.rank())?;
        let dims: Dims = axes.iter().map(|&a| self.dims[a]).collect();
        Ok(Shape::new(&dims))
    }

    /// Fails unless `other` holds exactly as many entries as `self`.
    pub fn ensure_same_total(&self, other: &Shape) -> CoreResult<()> {
        if self.total_entries()? != other.total_entries()? {
            return Err(CoreError::shape_mismatch(
                "reshape",
                &self.dims,
                &other.dims,
            ));
        }
        Ok(())
    }

    fn overflow(&self) -> CoreError {
        CoreError::Overflow {
            shape: self.dims.to_vec(),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, ")")
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape::new(dims)
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Shape::new(&dims)
    }
}

/// Row-major strides for `dims`.
pub fn row_major_strides(dims: &[usize]) -> Dims {
    let mut strides: Dims = SmallVec::from_elem(0, dims.len());
    let mut acc = 1usize;
    for i in (0..dims.len()).rev() {
        strides[i] = acc;
        acc = acc.wrapping_mul(dims[i]);
    }
    strides
}

/// Checks that `axes` is a permutation of `0..rank`.
pub fn validate_permutation(axes: &[usize], rank: usize) -> CoreResult<()> {
    if axes.len() != rank {
        return Err(CoreError::InvalidAxes(format!(
            "permutation has {} axes, expected {rank}",
            axes.len()
        )));
    }
    let mut seen = vec![false; rank];
    for &a in axes {
        if a >= rank || seen[a] {
            return Err(CoreError::InvalidAxes(format!(
                "{axes:?} is not a permutation of 0..{rank}"
            )));
        }
        seen[a] = true;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strides() {
        assert_eq!(Shape::new(&[2, 3, 4]).strides(), &[12, 4, 1]);
        assert_eq!(Shape::new(&[5]).strides(), &[1]);
        assert!(Shape::new(&[]).strides().is_empty());
    }

    #[test]
    fn test_total_entries() {
        assert_eq!(Shape::new(&[2, 3, 4]).total_entries().unwrap(), 24);
        assert_eq!(Shape::new(&[]).total_entries().unwrap(), 1);
        assert_eq!(Shape::new(&[3, 0]).total_entries().unwrap(), 0);
    }

    #[test]
    fn test_total_entries_overflow() {
        let shape = Shape::new(&[usize::MAX, 2]);
        assert!(matches!(
            shape.total_entries(),
            Err(CoreError::Overflow { .. })
        ));

        let big = Shape::new(&[1 << 40, 1 << 40]);
        assert!(big.total_entries().is_err());
        assert!(big.total_entries_f64() > 1e24);
    }

    #[test]
    fn test_flat_and_nd_index_roundtrip() {
        let shape = Shape::new(&[3, 4, 5]);
        for flat in 0..60 {
            let nd = shape.nd_index(flat).unwrap();
            assert_eq!(shape.flat_index(&nd).unwrap(), flat);
        }
    }

    #[test]
    fn test_flat_index_bounds() {
        let shape = Shape::new(&[2, 3]);
        assert!(shape.flat_index(&[1, 3]).is_err());
        assert!(shape.flat_index(&[1]).is_err());
        assert!(shape.nd_index(6).is_err());
    }

    #[test]
    fn test_swap_and_permute() {
        let shape = Shape::new(&[2, 3, 4]);
        assert_eq!(shape.swap_axes(0, 2).unwrap().dims(), &[4, 3, 2]);
        assert_eq!(shape.permute_axes(&[1, 2, 0]).unwrap().dims(), &[3, 4, 2]);
        assert!(shape.permute_axes(&[0, 0, 1]).is_err());
        assert!(shape.permute_axes(&[0, 1]).is_err());
        assert!(shape.swap_axes(0, 3).is_err());
    }

    #[test]
    fn test_ensure_same_total() {
        let a = Shape::new(&[2, 6]);
        assert!(a.ensure_same_total(&Shape::new(&[3, 4])).is_ok());
        assert!(a.ensure_same_total(&Shape::new(&[5, 2])).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Shape::new(&[2, 3]).to_string(), "(2, 3)");
    }
}
