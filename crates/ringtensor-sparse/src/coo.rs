//! COO (Coordinate) sparse tensors of any rank.
//!
//! A [`CooTensor`] stores one index tuple per entry next to its value:
//!
//! - `indices`: `Vec<Vec<usize>>`, each inner vec one coordinate
//!   \[i₀, i₁, ..., iₙ₋₁\]
//! - `values`: `Vec<T>`, co-indexed with `indices`
//! - `shape`: the dense extents
//!
//! Entries are kept in row-major (lexicographic) order. Construction checks
//! lengths and bounds but not order; every operation on sorted operands
//! returns sorted results, and [`sort_indices`](CooTensor::sort_indices)
//! restores order after manual edits. Explicit zeros are legal entries.
//!
//! # Examples
//!
//! ```
//! use ringtensor_sparse::{CooTensor, SparseStorage};
//!
//! let a = CooTensor::new(vec![vec![0, 0], vec![1, 1]], vec![2, 3], &[3, 3]).unwrap();
//! let b = CooTensor::new(vec![vec![0, 0], vec![2, 2]], vec![5, 7], &[3, 3]).unwrap();
//!
//! let c = a.add(&b).unwrap();
//! assert_eq!(c.indices(), &[vec![0, 0], vec![1, 1], vec![2, 2]]);
//! assert_eq!(c.values(), &[7, 3, 7]);
//! assert_eq!(c.nnz(), 3);
//! ```

use ringtensor_core::{DenseTensor, Ring, Semiring, Shape};
use thiserror::Error;
use tracing::trace;

use crate::convert::{accumulate_to_dense, nonzero_entries, relinearize, scatter_to_dense};
use crate::coo_matrix::CooMatrix;
use crate::error::SparseResult;
use crate::merge::{coo_tensor_add, coo_tensor_elem_mult, coo_tensor_sub, intersection_steps};
use crate::ops::{check_same_shape, SparseStorage};
use crate::search::{binary_search_coo, cmp_index, decode_insertion_point, is_sorted_lex};
use crate::sort::{apply_permutation, sorted_permutation};

/// Malformed coordinate storage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CooError {
    #[error("Rank mismatch: index has {index_len} coordinates but shape has rank {rank}")]
    RankMismatch { index_len: usize, rank: usize },

    #[error("Length mismatch: {indices} indices but {values} values")]
    LengthMismatch { indices: usize, values: usize },

    #[error("Index out of bounds: index {index:?} exceeds shape {shape:?}")]
    IndexOutOfBounds {
        index: Vec<usize>,
        shape: Vec<usize>,
    },

    #[error("Invalid shape: {0}")]
    InvalidShape(String),
}

/// Sparse tensor in coordinate form.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CooTensor<T> {
    /// Coordinates of the stored entries, row-major sorted.
    indices: Vec<Vec<usize>>,

    /// Values at the corresponding coordinates.
    values: Vec<T>,

    shape: Shape,
}

fn check_entry(index: &[usize], shape: &Shape) -> Result<(), CooError> {
    if index.len() != shape.rank() {
        return Err(CooError::RankMismatch {
            index_len: index.len(),
            rank: shape.rank(),
        });
    }
    if index.iter().zip(shape.dims()).any(|(&i, &d)| i >= d) {
        return Err(CooError::IndexOutOfBounds {
            index: index.to_vec(),
            shape: shape.dims().to_vec(),
        });
    }
    Ok(())
}

impl<T: Clone> CooTensor<T> {
    /// Creates a tensor from co-indexed coordinates and values.
    ///
    /// # Errors
    ///
    /// - `indices` and `values` differ in length
    /// - `dims` is empty (rank 0)
    /// - an index has the wrong rank or lies outside `dims`
    pub fn new(indices: Vec<Vec<usize>>, values: Vec<T>, dims: &[usize]) -> Result<Self, CooError> {
        if indices.len() != values.len() {
            return Err(CooError::LengthMismatch {
                indices: indices.len(),
                values: values.len(),
            });
        }
        if dims.is_empty() {
            return Err(CooError::InvalidShape("Shape cannot be empty".to_string()));
        }
        let shape = Shape::new(dims);
        for idx in &indices {
            check_entry(idx, &shape)?;
        }
        Ok(Self {
            indices,
            values,
            shape,
        })
    }

    /// Tensor with no stored entries.
    pub fn zeros(dims: &[usize]) -> Result<Self, CooError> {
        Self::new(Vec::new(), Vec::new(), dims)
    }

    pub(crate) fn from_parts_unchecked(indices: Vec<Vec<usize>>, values: Vec<T>, shape: Shape) -> Self {
        Self {
            indices,
            values,
            shape,
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn indices(&self) -> &[Vec<usize>] {
        &self.indices
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    pub fn into_parts(self) -> (Vec<Vec<usize>>, Vec<T>, Shape) {
        (self.indices, self.values, self.shape)
    }

    /// Appends an entry without keeping order. Call
    /// [`sort_indices`](Self::sort_indices) before merging.
    pub fn push(&mut self, index: Vec<usize>, value: T) -> Result<(), CooError> {
        check_entry(&index, &self.shape)?;
        self.indices.push(index);
        self.values.push(value);
        Ok(())
    }

    pub fn is_sorted(&self) -> bool {
        is_sorted_lex(&self.indices)
    }

    /// Sorts entries into row-major order. Stable, so duplicates keep their
    /// insertion order.
    pub fn sort_indices(&mut self) {
        let perm = sorted_permutation(self.nnz(), |i, j| {
            cmp_index(&self.indices[i], &self.indices[j])
        });
        self.indices = apply_permutation(&self.indices, &perm);
        self.values = apply_permutation(&self.values, &perm);
    }

    /// Same entries viewed with dims `dims`; the entry count must match.
    /// Row-major order survives re-linearization.
    pub fn reshape(&self, dims: &[usize]) -> SparseResult<Self> {
        if dims.is_empty() {
            return Err(CooError::InvalidShape("Shape cannot be empty".to_string()).into());
        }
        let new_shape = Shape::new(dims);
        self.shape.ensure_same_total(&new_shape)?;
        let indices = self
            .indices
            .iter()
            .map(|idx| relinearize(idx, &self.shape, &new_shape))
            .collect();
        Ok(Self::from_parts_unchecked(indices, self.values.clone(), new_shape))
    }

    /// Rank-1 view of the entries.
    pub fn flatten(&self) -> SparseResult<Self> {
        let total = self.shape.total_entries()?;
        self.reshape(&[total])
    }

    /// Tensor whose axis `i` is axis `axes[i]` of `self`, re-sorted.
    pub fn permute(&self, axes: &[usize]) -> SparseResult<Self> {
        let shape = self.shape.permute_axes(axes)?;
        let indices = self
            .indices
            .iter()
            .map(|idx| axes.iter().map(|&a| idx[a]).collect())
            .collect();
        let mut out = Self::from_parts_unchecked(indices, self.values.clone(), shape);
        out.sort_indices();
        Ok(out)
    }

    /// Rank-2 tensor as a coordinate matrix.
    pub fn to_matrix(&self) -> SparseResult<CooMatrix<T>> {
        if self.rank() != 2 {
            return Err(CooError::InvalidShape(format!(
                "to_matrix requires rank 2, got shape {}",
                self.shape
            ))
            .into());
        }
        let rows = self.indices.iter().map(|idx| idx[0]).collect();
        let cols = self.indices.iter().map(|idx| idx[1]).collect();
        Ok(CooMatrix::from_parts_unchecked(
            rows,
            cols,
            self.values.clone(),
            self.shape.clone(),
        ))
    }

    fn check_index(&self, index: &[usize]) -> SparseResult<()> {
        self.shape.check_index(index)?;
        Ok(())
    }

    fn flat_entries(&self) -> impl Iterator<Item = (usize, &T)> {
        self.indices
            .iter()
            .map(|idx| self.shape.flat_index_unchecked(idx))
            .zip(&self.values)
    }
}

impl<T: Semiring> CooTensor<T> {
    /// Value at `index`, zero when no entry is stored.
    pub fn get(&self, index: &[usize]) -> SparseResult<T> {
        self.check_index(index)?;
        let found = binary_search_coo(&self.indices, index);
        Ok(if found >= 0 {
            self.values[found as usize].clone()
        } else {
            T::zero()
        })
    }

    /// Overwrites the entry at `index`, inserting it in order when absent.
    pub fn set(&mut self, index: &[usize], value: T) -> SparseResult<()> {
        self.check_index(index)?;
        let found = binary_search_coo(&self.indices, index);
        if found >= 0 {
            self.values[found as usize] = value;
        } else {
            let at = decode_insertion_point(found);
            self.indices.insert(at, index.to_vec());
            self.values.insert(at, value);
        }
        Ok(())
    }

    /// Sorts and sums entries sharing a coordinate.
    pub fn coalesce(&mut self) {
        self.sort_indices();
        let mut indices: Vec<Vec<usize>> = Vec::with_capacity(self.nnz());
        let mut values: Vec<T> = Vec::with_capacity(self.nnz());
        for (idx, v) in self.indices.drain(..).zip(self.values.drain(..)) {
            match (indices.last(), values.last_mut()) {
                (Some(last), Some(acc)) if *last == idx => acc.add_assign(&v),
                _ => {
                    indices.push(idx);
                    values.push(v);
                }
            }
        }
        self.indices = indices;
        self.values = values;
    }

    /// Removes explicitly stored zeros.
    pub fn drop_zeros(&mut self) {
        let indices = std::mem::take(&mut self.indices);
        let values = std::mem::take(&mut self.values);
        (self.indices, self.values) = indices
            .into_iter()
            .zip(values)
            .filter(|(_, v)| !v.is_zero())
            .unzip();
    }

    /// Dense copy. Duplicate coordinates resolve to the last stored value.
    pub fn to_dense(&self) -> SparseResult<DenseTensor<T>> {
        let data = scatter_to_dense(&self.shape, self.flat_entries())?;
        Ok(DenseTensor::from_parts(self.shape.clone(), data)?)
    }

    /// Every non-zero entry of `dense`, in row-major order. `sparsity_hint`
    /// only pre-sizes the buffers.
    pub fn from_dense(dense: &DenseTensor<T>, sparsity_hint: f64) -> SparseResult<Self> {
        if dense.rank() == 0 {
            return Err(CooError::InvalidShape("Shape cannot be empty".to_string()).into());
        }
        let (offsets, values) = nonzero_entries(dense.data(), sparsity_hint);
        let shape = dense.shape().clone();
        let indices = offsets
            .into_iter()
            .map(|flat| shape.nd_index_unchecked(flat).to_vec())
            .collect();
        Ok(Self::from_parts_unchecked(indices, values, shape))
    }

    pub fn add(&self, other: &Self) -> SparseResult<Self> {
        check_same_shape("add", &self.shape, &other.shape)?;
        let (values, indices) =
            coo_tensor_add(&self.values, &self.indices, &other.values, &other.indices);
        trace!(lhs = self.nnz(), rhs = other.nnz(), out = values.len(), "coo add");
        Ok(Self::from_parts_unchecked(indices, values, self.shape.clone()))
    }

    pub fn elem_mult(&self, other: &Self) -> SparseResult<Self> {
        check_same_shape("elem_mult", &self.shape, &other.shape)?;
        let (values, indices) =
            coo_tensor_elem_mult(&self.values, &self.indices, &other.values, &other.indices);
        Ok(Self::from_parts_unchecked(indices, values, self.shape.clone()))
    }

    /// Sum of `self[i] * other[i]` over coordinates stored in both.
    pub fn tensor_inner(&self, other: &Self) -> SparseResult<T> {
        check_same_shape("tensor_inner", &self.shape, &other.shape)?;
        let mut acc = T::zero();
        for (i, j) in intersection_steps(self.nnz(), other.nnz(), |i, j| {
            cmp_index(&self.indices[i], &other.indices[j])
        }) {
            acc.fma_assign(&self.values[i], &other.values[j]);
        }
        Ok(acc)
    }

    /// Dense `self + b` at every coordinate.
    pub fn add_scalar(&self, b: &T) -> SparseResult<DenseTensor<T>> {
        let data = accumulate_to_dense(&self.shape, b.clone(), self.flat_entries())?;
        Ok(DenseTensor::from_parts(self.shape.clone(), data)?)
    }

    /// Scales stored values; the sparsity pattern is unchanged.
    pub fn mult_scalar(&self, b: &T) -> Self {
        Self::from_parts_unchecked(
            self.indices.clone(),
            self.values.iter().map(|v| v.mult(b)).collect(),
            self.shape.clone(),
        )
    }
}

impl<T: Ring> CooTensor<T> {
    pub fn sub(&self, other: &Self) -> SparseResult<Self> {
        check_same_shape("sub", &self.shape, &other.shape)?;
        let (values, indices) =
            coo_tensor_sub(&self.values, &self.indices, &other.values, &other.indices);
        Ok(Self::from_parts_unchecked(indices, values, self.shape.clone()))
    }

    /// Dense `self - b`.
    pub fn sub_scalar(&self, b: &T) -> SparseResult<DenseTensor<T>> {
        self.add_scalar(&b.add_inv())
    }

    /// Dense `b - self`.
    pub fn scalar_sub(&self, b: &T) -> SparseResult<DenseTensor<T>> {
        let negated: Vec<T> = self.values.iter().map(Ring::add_inv).collect();
        let entries = self
            .indices
            .iter()
            .map(|idx| self.shape.flat_index_unchecked(idx))
            .zip(&negated);
        let data = accumulate_to_dense(&self.shape, b.clone(), entries)?;
        Ok(DenseTensor::from_parts(self.shape.clone(), data)?)
    }

    pub fn conj(&self) -> Self {
        Self::from_parts_unchecked(
            self.indices.clone(),
            self.values.iter().map(Ring::conj).collect(),
            self.shape.clone(),
        )
    }
}

impl<T: Semiring> SparseStorage for CooTensor<T> {
    type Elem = T;

    fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    fn nnz(&self) -> usize {
        self.values.len()
    }

    fn to_dense(&self) -> SparseResult<DenseTensor<T>> {
        CooTensor::to_dense(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SparseError;
    use ringtensor_core::CoreError;

    fn scenario() -> (CooTensor<i32>, CooTensor<i32>) {
        (
            CooTensor::new(vec![vec![0, 0], vec![1, 1]], vec![2, 3], &[3, 3]).unwrap(),
            CooTensor::new(vec![vec![0, 0], vec![2, 2]], vec![5, 7], &[3, 3]).unwrap(),
        )
    }

    #[test]
    fn test_new_validation_order() {
        let err = CooTensor::new(vec![vec![0, 0]], vec![1.0, 2.0], &[2, 2]).unwrap_err();
        assert!(matches!(err, CooError::LengthMismatch { .. }));

        let err = CooTensor::<f64>::new(vec![], vec![], &[]).unwrap_err();
        assert!(matches!(err, CooError::InvalidShape(_)));

        let err = CooTensor::new(vec![vec![0]], vec![1.0], &[2, 2]).unwrap_err();
        assert!(matches!(err, CooError::RankMismatch { index_len: 1, rank: 2 }));

        let err = CooTensor::new(vec![vec![0, 2]], vec![1.0], &[2, 2]).unwrap_err();
        assert!(matches!(err, CooError::IndexOutOfBounds { .. }));
    }

    #[test]
    fn test_zero_extent_shape_is_allowed() {
        let t = CooTensor::<f32>::zeros(&[0, 4]).unwrap();
        assert_eq!(t.nnz(), 0);
        assert_eq!(t.to_dense().unwrap().len(), 0);
        assert_eq!(t.sparsity(), 1.0);
    }

    #[test]
    fn test_add_scenario() {
        let (a, b) = scenario();
        let c = a.add(&b).unwrap();
        assert_eq!(c.indices(), &[vec![0, 0], vec![1, 1], vec![2, 2]]);
        assert_eq!(c.values(), &[7, 3, 7]);
        assert!(c.is_sorted());
    }

    #[test]
    fn test_sub_and_elem_mult() {
        let (a, b) = scenario();
        let d = a.sub(&b).unwrap();
        assert_eq!(d.values(), &[-3, 3, -7]);
        let p = a.elem_mult(&b).unwrap();
        assert_eq!(p.indices(), &[vec![0, 0]]);
        assert_eq!(p.values(), &[10]);
        assert_eq!(a.tensor_inner(&b).unwrap(), 10);
    }

    #[test]
    fn test_shape_mismatch_reports_op() {
        let (a, _) = scenario();
        let other = CooTensor::<i32>::zeros(&[3, 4]).unwrap();
        match a.add(&other) {
            Err(SparseError::Core(CoreError::ShapeMismatch { op, .. })) => assert_eq!(op, "add"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_zero_nnz_is_additive_identity() {
        let (a, _) = scenario();
        let zero = CooTensor::zeros(&[3, 3]).unwrap();
        assert_eq!(a.add(&zero).unwrap(), a);
        assert_eq!(zero.add(&a).unwrap(), a);
    }

    #[test]
    fn test_get_set_insertion() {
        let (mut a, _) = scenario();
        assert_eq!(a.get(&[1, 1]).unwrap(), 3);
        assert_eq!(a.get(&[2, 0]).unwrap(), 0);
        a.set(&[0, 2], 9).unwrap();
        a.set(&[1, 1], 4).unwrap();
        assert_eq!(a.indices(), &[vec![0, 0], vec![0, 2], vec![1, 1]]);
        assert_eq!(a.values(), &[2, 9, 4]);
        assert!(a.set(&[3, 0], 1).is_err());
        assert!(a.get(&[0]).is_err());
    }

    #[test]
    fn test_sort_is_idempotent_and_clone_isolated() {
        let mut t = CooTensor::new(
            vec![vec![1, 0, 2], vec![0, 1, 1], vec![0, 1, 0]],
            vec![1.0, 2.0, 3.0],
            &[2, 2, 3],
        )
        .unwrap();
        let snapshot = t.clone();
        t.sort_indices();
        let once = t.clone();
        t.sort_indices();
        assert_eq!(t, once);
        assert_eq!(t.values(), &[3.0, 2.0, 1.0]);
        assert!(!snapshot.is_sorted());
        assert_eq!(snapshot.values(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_cancellation_keeps_explicit_zero() {
        let a = CooTensor::new(vec![vec![1]], vec![2.5], &[4]).unwrap();
        let b = CooTensor::new(vec![vec![1]], vec![-2.5], &[4]).unwrap();
        let c = a.add(&b).unwrap();
        assert_eq!(c.nnz(), 1);
        assert_eq!(c.values(), &[0.0]);

        let mut pruned = c.clone();
        pruned.drop_zeros();
        assert_eq!(pruned.nnz(), 0);
    }

    #[test]
    fn test_coalesce_sums_duplicates() {
        let mut t = CooTensor::new(vec![vec![2], vec![0], vec![2]], vec![1, 1, 5], &[3]).unwrap();
        assert_eq!(t.to_dense().unwrap().data(), &[1, 0, 5]);
        t.coalesce();
        assert_eq!(t.indices(), &[vec![0], vec![2]]);
        assert_eq!(t.values(), &[1, 6]);
    }

    #[test]
    fn test_dense_round_trip() {
        let dense = DenseTensor::from_vec(vec![0, 1, 0, 0, 0, 2, 3, 0], &[2, 2, 2]).unwrap();
        for hint in [0.0, 0.6, 1.0] {
            let coo = CooTensor::from_dense(&dense, hint).unwrap();
            assert_eq!(coo.nnz(), 3);
            assert!(coo.is_sorted());
            assert_eq!(coo.to_dense().unwrap(), dense);
        }
    }

    #[test]
    fn test_reshape_flatten_permute() {
        let t = CooTensor::new(vec![vec![0, 2], vec![1, 1]], vec![1, 2], &[2, 3]).unwrap();
        let r = t.reshape(&[3, 2]).unwrap();
        assert_eq!(r.indices(), &[vec![1, 0], vec![2, 0]]);
        assert_eq!(r.to_dense().unwrap().data(), t.to_dense().unwrap().data());
        assert!(t.reshape(&[4, 2]).is_err());

        let f = t.flatten().unwrap();
        assert_eq!(f.indices(), &[vec![2], vec![4]]);

        let p = t.permute(&[1, 0]).unwrap();
        assert_eq!(p.dims(), &[3, 2]);
        assert_eq!(p.indices(), &[vec![1, 1], vec![2, 0]]);
        assert!(t.permute(&[0, 0]).is_err());
    }

    #[test]
    fn test_scalar_broadcast_densifies() {
        let t = CooTensor::new(vec![vec![0, 1]], vec![4], &[2, 2]).unwrap();
        assert_eq!(t.add_scalar(&1).unwrap().data(), &[1, 5, 1, 1]);
        assert_eq!(t.sub_scalar(&1).unwrap().data(), &[-1, 3, -1, -1]);
        assert_eq!(t.scalar_sub(&1).unwrap().data(), &[1, -3, 1, 1]);
        assert_eq!(t.mult_scalar(&3).values(), &[12]);

        let huge = CooTensor::<i32>::zeros(&[usize::MAX, 2]).unwrap();
        match huge.add_scalar(&1) {
            Err(SparseError::Core(CoreError::Overflow { .. })) => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_to_matrix() {
        let t = CooTensor::new(vec![vec![0, 2], vec![1, 1]], vec![1, 2], &[2, 3]).unwrap();
        let m = t.to_matrix().unwrap();
        assert_eq!(m.row_indices(), &[0, 1]);
        assert_eq!(m.col_indices(), &[2, 1]);
        assert!(t.flatten().unwrap().to_matrix().is_err());
    }
}
