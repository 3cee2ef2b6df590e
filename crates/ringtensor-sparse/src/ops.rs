//! Unified view over the sparse containers.
//!
//! [`SparseStorage`] gives every format the same bookkeeping API (entry
//! counts, sparsity, densification), and the helpers below hold the shape
//! checks shared by the container methods.
//!
//! # Examples
//!
//! ```
//! use ringtensor_sparse::{CooMatrix, SparseStorage};
//!
//! let m = CooMatrix::new(vec![0, 1], vec![1, 0], vec![2.0, 3.0], 2, 4).unwrap();
//! assert_eq!(m.nnz(), 2);
//! assert_eq!(m.density(), 0.25);
//! assert_eq!(m.sparsity(), 0.75);
//! ```

use ringtensor_core::{DenseTensor, Semiring, Shape};

use crate::error::{SparseError, SparseResult};

/// Bookkeeping shared by all sparse formats.
pub trait SparseStorage {
    type Elem: Semiring;

    fn dims(&self) -> &[usize];

    /// Number of stored entries, explicit zeros included.
    fn nnz(&self) -> usize;

    /// Dense copy of the container.
    fn to_dense(&self) -> SparseResult<DenseTensor<Self::Elem>>;

    fn rank(&self) -> usize {
        self.dims().len()
    }

    /// Fraction of absent entries, `1 - nnz / total`. A shape with no
    /// entries counts as fully sparse.
    fn sparsity(&self) -> f64 {
        1.0 - self.density()
    }

    /// Fraction of stored entries, `nnz / total`.
    fn density(&self) -> f64 {
        let total: f64 = self.dims().iter().map(|&d| d as f64).product();
        if total == 0.0 {
            0.0
        } else {
            self.nnz() as f64 / total
        }
    }

    fn is_empty(&self) -> bool {
        self.nnz() == 0
    }
}

/// Fails with a shape mismatch naming `op` unless both shapes are equal.
pub fn check_same_shape(op: &'static str, a: &Shape, b: &Shape) -> SparseResult<()> {
    if a != b {
        return Err(SparseError::shape_mismatch(op, a.dims(), b.dims()));
    }
    Ok(())
}

/// Fails unless `a` (`m x k`) and `b` (`k x n`) can be multiplied.
pub fn check_matmul_compatible(op: &'static str, a: &Shape, b: &Shape) -> SparseResult<()> {
    if a.rank() != 2 || b.rank() != 2 || a.dim(1) != b.dim(0) {
        return Err(SparseError::shape_mismatch(op, a.dims(), b.dims()));
    }
    Ok(())
}
