//! Sparse matrices in coordinate form.
//!
//! [`CooMatrix`] keeps rows and columns in separate arrays, sorted row-major.
//! It is the construction-friendly matrix format: entries can be inserted in
//! place, rows and columns relabelled, and the result compressed with
//! [`to_csr`](CooMatrix::to_csr) for fast row access.
//!
//! # Examples
//!
//! ```
//! use ringtensor_sparse::CooMatrix;
//!
//! let a = CooMatrix::new(vec![0, 1], vec![0, 1], vec![1.0, 2.0], 2, 2).unwrap();
//! let b = CooMatrix::new(vec![0, 1], vec![0, 1], vec![3.0, 4.0], 2, 2).unwrap();
//!
//! let c = a.matmul(&b).unwrap();
//! assert_eq!(c.data(), &[3.0, 0.0, 0.0, 8.0]);
//! ```

use ringtensor_core::{ComputeConfig, CoreError, DenseTensor, Ring, Semiring, Shape};
use std::ops::Range;
use tracing::debug;

use crate::convert::{accumulate_to_dense, nonzero_entries, row_pointers_from_rows, scatter_to_dense};
use crate::coo::{CooError, CooTensor};
use crate::coo_matmul::{coo_matmul, coo_matmul_concurrent, coo_matvec, coo_matvec_concurrent};
use crate::coo_vector::CooVector;
use crate::csr::CsrMatrix;
use crate::error::{SparseError, SparseResult};
use crate::merge::{coo_matrix_add, coo_matrix_elem_mult, coo_matrix_sub, MatrixEntries};
use crate::ops::{check_matmul_compatible, check_same_shape, SparseStorage};
use crate::search::{binary_search_matrix, decode_insertion_point, is_sorted_matrix, row_range};
use crate::sort::{apply_permutation, is_identity, sorted_permutation};

/// Coordinate sparse matrix.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CooMatrix<T> {
    row_indices: Vec<usize>,
    col_indices: Vec<usize>,
    values: Vec<T>,
    shape: Shape,
}

impl<T: Clone> CooMatrix<T> {
    /// Validates lengths and bounds; order is not checked.
    pub fn new(
        row_indices: Vec<usize>,
        col_indices: Vec<usize>,
        values: Vec<T>,
        nrows: usize,
        ncols: usize,
    ) -> Result<Self, CooError> {
        if row_indices.len() != values.len() || col_indices.len() != values.len() {
            return Err(CooError::LengthMismatch {
                indices: row_indices.len().min(col_indices.len()),
                values: values.len(),
            });
        }
        for (&r, &c) in row_indices.iter().zip(&col_indices) {
            if r >= nrows || c >= ncols {
                return Err(CooError::IndexOutOfBounds {
                    index: vec![r, c],
                    shape: vec![nrows, ncols],
                });
            }
        }
        Ok(Self {
            row_indices,
            col_indices,
            values,
            shape: Shape::matrix(nrows, ncols),
        })
    }

    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self::from_parts_unchecked(Vec::new(), Vec::new(), Vec::new(), Shape::matrix(nrows, ncols))
    }

    pub(crate) fn from_parts_unchecked(
        row_indices: Vec<usize>,
        col_indices: Vec<usize>,
        values: Vec<T>,
        shape: Shape,
    ) -> Self {
        Self {
            row_indices,
            col_indices,
            values,
            shape,
        }
    }

    pub fn nrows(&self) -> usize {
        self.shape.dim(0)
    }

    pub fn ncols(&self) -> usize {
        self.shape.dim(1)
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn row_indices(&self) -> &[usize] {
        &self.row_indices
    }

    pub fn col_indices(&self) -> &[usize] {
        &self.col_indices
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    pub fn into_parts(self) -> (Vec<usize>, Vec<usize>, Vec<T>) {
        (self.row_indices, self.col_indices, self.values)
    }

    pub fn is_sorted(&self) -> bool {
        is_sorted_matrix(&self.row_indices, &self.col_indices)
    }

    pub fn sort_indices(&mut self) {
        let perm = sorted_permutation(self.nnz(), |i, j| {
            (self.row_indices[i], self.col_indices[i]).cmp(&(self.row_indices[j], self.col_indices[j]))
        });
        if is_identity(&perm) {
            return;
        }
        self.row_indices = apply_permutation(&self.row_indices, &perm);
        self.col_indices = apply_permutation(&self.col_indices, &perm);
        self.values = apply_permutation(&self.values, &perm);
    }

    pub(crate) fn entries(&self) -> MatrixEntries<'_, T> {
        MatrixEntries {
            values: &self.values,
            rows: &self.row_indices,
            cols: &self.col_indices,
        }
    }

    /// Rank-2 coordinate tensor with the same entries.
    pub fn to_tensor(&self) -> CooTensor<T> {
        let indices = self
            .row_indices
            .iter()
            .zip(&self.col_indices)
            .map(|(&r, &c)| vec![r, c])
            .collect();
        CooTensor::from_parts_unchecked(indices, self.values.clone(), self.shape.clone())
    }

    /// Compressed-row copy. Rows are counted and prefix-summed into the row
    /// pointers; column indices and values are copied in entry order, so an
    /// unsorted matrix is sorted first.
    pub fn to_csr(&self) -> CsrMatrix<T> {
        if !self.is_sorted() {
            let mut sorted = self.clone();
            sorted.sort_indices();
            return sorted.to_csr();
        }
        let row_pointers = row_pointers_from_rows(self.nrows(), &self.row_indices);
        CsrMatrix::from_parts_unchecked(
            row_pointers,
            self.col_indices.clone(),
            self.values.clone(),
            self.shape.clone(),
        )
    }

    pub fn from_csr(csr: &CsrMatrix<T>) -> Self {
        csr.to_coo()
    }

    /// Transpose, re-sorted.
    pub fn transpose(&self) -> Self {
        let mut out = Self::from_parts_unchecked(
            self.col_indices.clone(),
            self.row_indices.clone(),
            self.values.clone(),
            Shape::matrix(self.ncols(), self.nrows()),
        );
        out.sort_indices();
        out
    }

    /// Exchanges rows `i` and `j` in place.
    pub fn swap_rows(&mut self, i: usize, j: usize) -> SparseResult<()> {
        if i >= self.nrows() || j >= self.nrows() {
            return Err(SparseError::out_of_bounds(&[i.max(j)], &[self.nrows()]));
        }
        relabel(&mut self.row_indices, i, j);
        self.sort_indices();
        Ok(())
    }

    /// Exchanges columns `i` and `j` in place.
    pub fn swap_cols(&mut self, i: usize, j: usize) -> SparseResult<()> {
        if i >= self.ncols() || j >= self.ncols() {
            return Err(SparseError::out_of_bounds(&[i.max(j)], &[self.ncols()]));
        }
        relabel(&mut self.col_indices, i, j);
        self.sort_indices();
        Ok(())
    }

    /// Entries of the window `rows x cols`, re-based to its top-left corner.
    pub fn get_slice(&self, rows: Range<usize>, cols: Range<usize>) -> SparseResult<Self> {
        check_window(&self.shape, &rows, &cols)?;
        let (start, _) = row_range(&self.row_indices, rows.start);
        let end = start + self.row_indices[start..].partition_point(|&r| r < rows.end);

        let mut out = Self::zeros(rows.len(), cols.len());
        for pos in start..end {
            let c = self.col_indices[pos];
            if cols.contains(&c) {
                out.row_indices.push(self.row_indices[pos] - rows.start);
                out.col_indices.push(c - cols.start);
                out.values.push(self.values[pos].clone());
            }
        }
        Ok(out)
    }

    /// Row `i` as a sparse vector of length `ncols`.
    pub fn row(&self, i: usize) -> SparseResult<CooVector<T>> {
        if i >= self.nrows() {
            return Err(SparseError::out_of_bounds(&[i], &[self.nrows()]));
        }
        let (start, end) = row_range(&self.row_indices, i);
        Ok(CooVector::from_parts_unchecked(
            self.col_indices[start..end].to_vec(),
            self.values[start..end].to_vec(),
            self.ncols(),
        ))
    }
}

/// Swaps the labels `i` and `j` wherever they occur.
fn relabel(labels: &mut [usize], i: usize, j: usize) {
    if i == j {
        return;
    }
    for l in labels.iter_mut() {
        if *l == i {
            *l = j;
        } else if *l == j {
            *l = i;
        }
    }
}

pub(crate) fn check_window(shape: &Shape, rows: &Range<usize>, cols: &Range<usize>) -> SparseResult<()> {
    if rows.start > rows.end
        || cols.start > cols.end
        || rows.end > shape.dim(0)
        || cols.end > shape.dim(1)
    {
        return Err(SparseError::out_of_bounds(&[rows.end, cols.end], shape.dims()));
    }
    Ok(())
}

impl<T: Semiring> CooMatrix<T> {
    /// Value at `(row, col)`, zero when absent.
    pub fn get(&self, row: usize, col: usize) -> SparseResult<T> {
        self.shape.check_index(&[row, col])?;
        let found = binary_search_matrix(&self.row_indices, &self.col_indices, row, col);
        Ok(if found >= 0 {
            self.values[found as usize].clone()
        } else {
            T::zero()
        })
    }

    /// Overwrites `(row, col)`, inserting in order when absent.
    pub fn set(&mut self, row: usize, col: usize, value: T) -> SparseResult<()> {
        self.shape.check_index(&[row, col])?;
        let found = binary_search_matrix(&self.row_indices, &self.col_indices, row, col);
        if found >= 0 {
            self.values[found as usize] = value;
        } else {
            let at = decode_insertion_point(found);
            self.row_indices.insert(at, row);
            self.col_indices.insert(at, col);
            self.values.insert(at, value);
        }
        Ok(())
    }

    /// Sorts and sums entries sharing a position.
    pub fn coalesce(&mut self) {
        self.sort_indices();
        let mut out = Self::zeros(self.nrows(), self.ncols());
        for ((&r, &c), v) in self.row_indices.iter().zip(&self.col_indices).zip(&self.values) {
            let n = out.values.len();
            if n > 0 && out.row_indices[n - 1] == r && out.col_indices[n - 1] == c {
                out.values[n - 1].add_assign(v);
            } else {
                out.row_indices.push(r);
                out.col_indices.push(c);
                out.values.push(v.clone());
            }
        }
        *self = out;
    }

    pub fn drop_zeros(&mut self) {
        let mut out = Self::zeros(self.nrows(), self.ncols());
        for ((&r, &c), v) in self.row_indices.iter().zip(&self.col_indices).zip(&self.values) {
            if !v.is_zero() {
                out.row_indices.push(r);
                out.col_indices.push(c);
                out.values.push(v.clone());
            }
        }
        *self = out;
    }

    fn flat_entries(&self) -> impl Iterator<Item = (usize, &T)> {
        let ncols = self.ncols();
        self.row_indices
            .iter()
            .zip(&self.col_indices)
            .map(move |(&r, &c)| r * ncols + c)
            .zip(&self.values)
    }

    pub fn to_dense(&self) -> SparseResult<DenseTensor<T>> {
        let data = scatter_to_dense(&self.shape, self.flat_entries())?;
        Ok(DenseTensor::from_parts(self.shape.clone(), data)?)
    }

    pub fn from_dense(dense: &DenseTensor<T>, sparsity_hint: f64) -> SparseResult<Self> {
        if !dense.is_matrix() {
            return Err(CoreError::InvalidShape(format!(
                "from_dense requires a matrix, got shape {}",
                dense.shape()
            ))
            .into());
        }
        let ncols = dense.ncols();
        let (offsets, values) = nonzero_entries(dense.data(), sparsity_hint);
        let (rows, cols) = if ncols == 0 {
            (Vec::new(), Vec::new())
        } else {
            offsets.iter().map(|&f| (f / ncols, f % ncols)).unzip()
        };
        Ok(Self::from_parts_unchecked(rows, cols, values, dense.shape().clone()))
    }

    /// Sum of the stored diagonal entries of a square matrix.
    pub fn trace(&self) -> SparseResult<T> {
        if self.nrows() != self.ncols() {
            return Err(CoreError::InvalidShape(format!(
                "trace requires a square matrix, got shape {}",
                self.shape
            ))
            .into());
        }
        let mut acc = T::zero();
        for ((&r, &c), v) in self.row_indices.iter().zip(&self.col_indices).zip(&self.values) {
            if r == c {
                acc.add_assign(v);
            }
        }
        Ok(acc)
    }

    pub fn add(&self, other: &Self) -> SparseResult<Self> {
        check_same_shape("add", &self.shape, &other.shape)?;
        let (values, rows, cols) = coo_matrix_add(self.entries(), other.entries());
        Ok(Self::from_parts_unchecked(rows, cols, values, self.shape.clone()))
    }

    pub fn elem_mult(&self, other: &Self) -> SparseResult<Self> {
        check_same_shape("elem_mult", &self.shape, &other.shape)?;
        let (values, rows, cols) = coo_matrix_elem_mult(self.entries(), other.entries());
        Ok(Self::from_parts_unchecked(rows, cols, values, self.shape.clone()))
    }

    pub fn add_scalar(&self, b: &T) -> SparseResult<DenseTensor<T>> {
        let data = accumulate_to_dense(&self.shape, b.clone(), self.flat_entries())?;
        Ok(DenseTensor::from_parts(self.shape.clone(), data)?)
    }

    pub fn mult_scalar(&self, b: &T) -> Self {
        Self::from_parts_unchecked(
            self.row_indices.clone(),
            self.col_indices.clone(),
            self.values.iter().map(|v| v.mult(b)).collect(),
            self.shape.clone(),
        )
    }

    /// Dense `self x other` with the default configuration.
    pub fn matmul(&self, other: &Self) -> SparseResult<DenseTensor<T>> {
        self.matmul_with(other, &ComputeConfig::default())
    }

    /// Dense `self x other`; concurrent when the left operand stores more
    /// than `sparse_concurrent_threshold` entries.
    pub fn matmul_with(&self, other: &Self, cfg: &ComputeConfig) -> SparseResult<DenseTensor<T>> {
        check_matmul_compatible("matmul", &self.shape, &other.shape)?;
        let out_shape = Shape::matrix(self.nrows(), other.ncols());
        out_shape.total_entries()?;
        let concurrent = self.nnz() > cfg.sparse_concurrent_threshold;
        debug!(
            concurrent,
            lhs = %self.shape,
            rhs = %other.shape,
            lhs_nnz = self.nnz(),
            rhs_nnz = other.nnz(),
            "coo matmul"
        );
        let data = if concurrent {
            coo_matmul_concurrent(self.entries(), other.entries(), self.nrows(), other.ncols())
        } else {
            coo_matmul(self.entries(), other.entries(), self.nrows(), other.ncols())
        };
        Ok(DenseTensor::from_parts(out_shape, data)?)
    }

    /// Dense `self x x` for a sparse vector with sorted indices.
    pub fn matvec(&self, x: &CooVector<T>) -> SparseResult<DenseTensor<T>> {
        self.matvec_with(x, &ComputeConfig::default())
    }

    pub fn matvec_with(&self, x: &CooVector<T>, cfg: &ComputeConfig) -> SparseResult<DenseTensor<T>> {
        if x.len() != self.ncols() {
            return Err(SparseError::shape_mismatch(
                "matvec",
                self.shape.dims(),
                x.shape().dims(),
            ));
        }
        let concurrent = self.nnz() > cfg.sparse_concurrent_threshold;
        debug!(concurrent, lhs = %self.shape, nnz = self.nnz(), x_nnz = x.indices().len(), "coo matvec");
        let data = if concurrent {
            coo_matvec_concurrent(self.entries(), x.values(), x.indices(), self.nrows())
        } else {
            coo_matvec(self.entries(), x.values(), x.indices(), self.nrows())
        };
        Ok(DenseTensor::from_parts(Shape::vector(self.nrows()), data)?)
    }
}

impl<T: Ring> CooMatrix<T> {
    pub fn sub(&self, other: &Self) -> SparseResult<Self> {
        check_same_shape("sub", &self.shape, &other.shape)?;
        let (values, rows, cols) = coo_matrix_sub(self.entries(), other.entries());
        Ok(Self::from_parts_unchecked(rows, cols, values, self.shape.clone()))
    }

    pub fn sub_scalar(&self, b: &T) -> SparseResult<DenseTensor<T>> {
        self.add_scalar(&b.add_inv())
    }

    pub fn conj(&self) -> Self {
        Self::from_parts_unchecked(
            self.row_indices.clone(),
            self.col_indices.clone(),
            self.values.iter().map(Ring::conj).collect(),
            self.shape.clone(),
        )
    }

    /// Conjugate transpose.
    pub fn conj_transpose(&self) -> Self {
        self.conj().transpose()
    }
}

impl<T: Semiring> SparseStorage for CooMatrix<T> {
    type Elem = T;

    fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    fn nnz(&self) -> usize {
        self.values.len()
    }

    fn to_dense(&self) -> SparseResult<DenseTensor<T>> {
        CooMatrix::to_dense(self)
    }
}
