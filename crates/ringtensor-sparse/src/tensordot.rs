//! Tensor contraction for coordinate tensors.
//!
//! Uses the same [`ContractionPlan`] as the dense path. Each stored entry is
//! mapped straight to its position in the matricized operand (free axes
//! linearized into the row, contracted axes into the column for the left
//! operand, the other way round for the right), the two coordinate matrices
//! are multiplied with [`coo_matmul`](crate::coo_matmul::coo_matmul), and the
//! dense product is reshaped to `free_a dims ++ free_b dims`.
//!
//! ```
//! use ringtensor_sparse::CooTensor;
//!
//! let a = CooTensor::new(vec![vec![0, 1], vec![1, 0]], vec![2, 3], &[2, 2]).unwrap();
//! let b = CooTensor::new(vec![vec![1, 0]], vec![5], &[2, 2]).unwrap();
//!
//! // Contract axis 1 of a with axis 0 of b: an ordinary matrix product.
//! let c = a.tensor_dot(&b, &[1], &[0]).unwrap();
//! assert_eq!(c.data(), &[10, 0, 0, 0]);
//! ```

use ringtensor_core::{ComputeConfig, CoreError, DenseTensor, Semiring, Shape};
use ringtensor_kernels::ContractionPlan;
use tracing::debug;

use crate::coo::CooTensor;
use crate::coo_matmul::{coo_matmul, coo_matmul_concurrent};
use crate::error::SparseResult;
use crate::merge::MatrixEntries;

/// Row-major offset of `index` permuted by `perm` within the permuted dims.
fn permuted_offset(index: &[usize], dims: &[usize], perm: &[usize]) -> Result<usize, CoreError> {
    perm.iter()
        .try_fold(0usize, |acc, &axis| {
            acc.checked_mul(dims[axis])?.checked_add(index[axis])
        })
        .ok_or_else(|| CoreError::Overflow {
            shape: dims.to_vec(),
        })
}

/// Matricized coordinates of one operand: `(rows, cols)` per entry.
fn matricize(
    indices: &[Vec<usize>],
    dims: &[usize],
    perm: &[usize],
    ncols: usize,
) -> Result<(Vec<usize>, Vec<usize>), CoreError> {
    let mut rows = Vec::with_capacity(indices.len());
    let mut cols = Vec::with_capacity(indices.len());
    for idx in indices {
        let flat = permuted_offset(idx, dims, perm)?;
        rows.push(flat / ncols);
        cols.push(flat % ncols);
    }
    Ok((rows, cols))
}

impl<T: Semiring> CooTensor<T> {
    /// Contracts `a_axes` of `self` with `b_axes` of `other` into a dense
    /// tensor. A full contraction yields shape `[1]`.
    pub fn tensor_dot(
        &self,
        other: &Self,
        a_axes: &[usize],
        b_axes: &[usize],
    ) -> SparseResult<DenseTensor<T>> {
        self.tensor_dot_with(other, a_axes, b_axes, &ComputeConfig::default())
    }

    pub fn tensor_dot_with(
        &self,
        other: &Self,
        a_axes: &[usize],
        b_axes: &[usize],
        cfg: &ComputeConfig,
    ) -> SparseResult<DenseTensor<T>> {
        let plan = ContractionPlan::new(self.dims(), other.dims(), a_axes, b_axes)?;
        self.shape().total_entries()?;
        other.shape().total_entries()?;
        let out_shape = Shape::new(&plan.output_dims());
        let total = out_shape.total_entries()?;

        if total == 0 || plan.contracted_len == 0 {
            return Ok(DenseTensor::zeros(out_shape.dims())?);
        }

        let (a_rows, a_cols) =
            matricize(self.indices(), self.dims(), &plan.a_perm, plan.contracted_len)?;
        let (b_rows, b_cols) =
            matricize(other.indices(), other.dims(), &plan.b_perm, plan.free_b_len)?;
        let a = MatrixEntries {
            values: self.values(),
            rows: &a_rows,
            cols: &a_cols,
        };
        let b = MatrixEntries {
            values: other.values(),
            rows: &b_rows,
            cols: &b_cols,
        };

        let concurrent = self.nnz() > cfg.sparse_concurrent_threshold;
        debug!(
            concurrent,
            lhs = %self.shape(),
            rhs = %other.shape(),
            rows = plan.free_a_len,
            inner = plan.contracted_len,
            cols = plan.free_b_len,
            "coo tensor_dot"
        );
        let data = if concurrent {
            coo_matmul_concurrent(a, b, plan.free_a_len, plan.free_b_len)
        } else {
            coo_matmul(a, b, plan.free_a_len, plan.free_b_len)
        };
        Ok(DenseTensor::from_parts(out_shape, data)?)
    }
}
