//! CSR (Compressed Sparse Row) matrices.
//!
//! # Format
//!
//! For an `m x n` matrix with `nnz` stored entries:
//! - `row_pointers`: `m + 1` monotone offsets; row `i` occupies
//!   `row_pointers[i]..row_pointers[i + 1]` and the last offset is `nnz`
//! - `col_indices`: column of each entry, sorted within a row
//! - `values`: co-indexed with `col_indices`
//!
//! Row access is O(1) and a row scan is O(nnz in row), which makes CSR the
//! format for products. Element-wise operations merge the operands row by
//! row; see [`crate::csr_ops`].
//!
//! # Examples
//!
//! ```
//! use ringtensor_sparse::CsrMatrix;
//!
//! // [[1, 0],
//! //  [0, 2]]
//! let a = CsrMatrix::new(vec![0, 1, 2], vec![0, 1], vec![1.0, 2.0], 2, 2).unwrap();
//! let b = CsrMatrix::new(vec![0, 1, 2], vec![0, 1], vec![3.0, 4.0], 2, 2).unwrap();
//!
//! let c = a.matmul(&b).unwrap();
//! assert_eq!(c.data(), &[3.0, 0.0, 0.0, 8.0]);
//! ```

use ringtensor_core::concurrency::band_rows;
use ringtensor_core::{ComputeConfig, CoreError, DenseTensor, Ring, Semiring, Shape};
use std::ops::Range;
use thiserror::Error;
use tracing::debug;

use crate::convert::{
    accumulate_to_dense, nonzero_entries, row_pointers_from_rows, rows_from_row_pointers,
    scatter_to_dense, transpose_csr,
};
use crate::coo_matrix::{check_window, CooMatrix};
use crate::csr_ops::{
    csr_add, csr_elem_mult, csr_matmul, csr_matmul_concurrent, csr_mult_to_sparse,
    csr_mult_transpose, csr_mult_transpose_concurrent, csr_spmm, csr_spmv, csr_sub, CsrArrays,
    CsrParts,
};
use crate::error::{SparseError, SparseResult};
use crate::ops::{check_matmul_compatible, check_same_shape, SparseStorage};
use crate::search::{binary_search_range, decode_insertion_point};
use crate::sort::{apply_permutation, sorted_permutation};

/// Malformed CSR storage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CsrError {
    #[error("Invalid row pointers: length {len} for {nrows} rows, expected {expected}")]
    InvalidRowPointers {
        len: usize,
        nrows: usize,
        expected: usize,
    },

    #[error("First row pointer is {first}, expected 0")]
    NonZeroFirstPointer { first: usize },

    #[error("Length mismatch: {col_indices} column indices but {values} values")]
    LengthMismatch { col_indices: usize, values: usize },

    #[error("Row pointers not sorted at index {idx}: {curr} > {next}")]
    RowPointersNotSorted { idx: usize, curr: usize, next: usize },

    #[error("Last row pointer is {last} but {nnz} entries are stored")]
    LastPointerMismatch { last: usize, nnz: usize },

    #[error("Column index {col_idx} out of bounds for {ncols} columns")]
    ColIndexOutOfBounds { col_idx: usize, ncols: usize },
}

/// Compressed sparse row matrix.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CsrMatrix<T> {
    row_pointers: Vec<usize>,
    col_indices: Vec<usize>,
    values: Vec<T>,
    shape: Shape,
}

impl<T: Clone> CsrMatrix<T> {
    /// Creates a CSR matrix from raw arrays.
    ///
    /// # Errors
    ///
    /// Checked in this order:
    /// - `row_pointers.len() != nrows + 1`
    /// - `row_pointers[0] != 0`
    /// - `col_indices` and `values` differ in length
    /// - `row_pointers` decreases somewhere
    /// - the last row pointer differs from the entry count
    /// - a column index is `>= ncols`
    pub fn new(
        row_pointers: Vec<usize>,
        col_indices: Vec<usize>,
        values: Vec<T>,
        nrows: usize,
        ncols: usize,
    ) -> Result<Self, CsrError> {
        if row_pointers.len() != nrows + 1 {
            return Err(CsrError::InvalidRowPointers {
                len: row_pointers.len(),
                nrows,
                expected: nrows + 1,
            });
        }
        if row_pointers[0] != 0 {
            return Err(CsrError::NonZeroFirstPointer {
                first: row_pointers[0],
            });
        }
        if col_indices.len() != values.len() {
            return Err(CsrError::LengthMismatch {
                col_indices: col_indices.len(),
                values: values.len(),
            });
        }
        for (idx, w) in row_pointers.windows(2).enumerate() {
            if w[0] > w[1] {
                return Err(CsrError::RowPointersNotSorted {
                    idx,
                    curr: w[0],
                    next: w[1],
                });
            }
        }
        if row_pointers[nrows] != values.len() {
            return Err(CsrError::LastPointerMismatch {
                last: row_pointers[nrows],
                nnz: values.len(),
            });
        }
        if let Some(&col_idx) = col_indices.iter().find(|&&c| c >= ncols) {
            return Err(CsrError::ColIndexOutOfBounds { col_idx, ncols });
        }
        Ok(Self::from_parts_unchecked(
            row_pointers,
            col_indices,
            values,
            Shape::matrix(nrows, ncols),
        ))
    }

    /// Matrix with no stored entries.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self::from_parts_unchecked(vec![0; nrows + 1], Vec::new(), Vec::new(), Shape::matrix(nrows, ncols))
    }

    pub(crate) fn from_parts_unchecked(
        row_pointers: Vec<usize>,
        col_indices: Vec<usize>,
        values: Vec<T>,
        shape: Shape,
    ) -> Self {
        Self {
            row_pointers,
            col_indices,
            values,
            shape,
        }
    }

    fn from_arrays(arrays: CsrArrays<T>, shape: Shape) -> Self {
        let (row_pointers, col_indices, values) = arrays;
        Self::from_parts_unchecked(row_pointers, col_indices, values, shape)
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn nrows(&self) -> usize {
        self.shape.dim(0)
    }

    pub fn ncols(&self) -> usize {
        self.shape.dim(1)
    }

    pub fn row_pointers(&self) -> &[usize] {
        &self.row_pointers
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
        (self.row_pointers, self.col_indices, self.values)
    }

    /// Column indices and values of row `i`, or `None` if out of range.
    pub fn row(&self, i: usize) -> Option<(&[usize], &[T])> {
        if i >= self.nrows() {
            return None;
        }
        Some(self.parts().row(i))
    }

    pub(crate) fn parts(&self) -> CsrParts<'_, T> {
        CsrParts {
            row_pointers: &self.row_pointers,
            col_indices: &self.col_indices,
            values: &self.values,
        }
    }

    /// `true` when every row is column-sorted.
    pub fn is_sorted(&self) -> bool {
        self.row_pointers
            .windows(2)
            .all(|w| self.col_indices[w[0]..w[1]].windows(2).all(|c| c[0] <= c[1]))
    }

    /// Sorts column indices within each row.
    pub fn sort_indices(&mut self) {
        let rows = rows_from_row_pointers(&self.row_pointers);
        let perm = sorted_permutation(self.nnz(), |i, j| {
            (rows[i], self.col_indices[i]).cmp(&(rows[j], self.col_indices[j]))
        });
        self.col_indices = apply_permutation(&self.col_indices, &perm);
        self.values = apply_permutation(&self.values, &perm);
    }

    /// Coordinate copy with the same (row-major) entry order.
    pub fn to_coo(&self) -> CooMatrix<T> {
        CooMatrix::from_parts_unchecked(
            rows_from_row_pointers(&self.row_pointers),
            self.col_indices.clone(),
            self.values.clone(),
            self.shape.clone(),
        )
    }

    pub fn from_coo(coo: &CooMatrix<T>) -> Self {
        coo.to_csr()
    }

    /// Transpose by counting entries per column, prefix-summing and
    /// scattering. O(nnz + ncols).
    pub fn transpose(&self) -> Self {
        Self::from_arrays(
            transpose_csr(self.ncols(), &self.row_pointers, &self.col_indices, &self.values),
            Shape::matrix(self.ncols(), self.nrows()),
        )
    }

    /// Exchanges rows `i` and `j`; the arrays are rebuilt.
    pub fn swap_rows(&mut self, i: usize, j: usize) -> SparseResult<()> {
        if i >= self.nrows() || j >= self.nrows() {
            return Err(SparseError::out_of_bounds(&[i.max(j)], &[self.nrows()]));
        }
        if i == j {
            return Ok(());
        }
        let order: Vec<usize> = (0..self.nrows())
            .map(|r| if r == i { j } else if r == j { i } else { r })
            .collect();
        let mut row_pointers = Vec::with_capacity(self.row_pointers.len());
        let mut col_indices = Vec::with_capacity(self.nnz());
        let mut values = Vec::with_capacity(self.nnz());
        row_pointers.push(0);
        for &src in &order {
            let (cols, vals) = self.parts().row(src);
            col_indices.extend_from_slice(cols);
            values.extend_from_slice(vals);
            row_pointers.push(col_indices.len());
        }
        self.row_pointers = row_pointers;
        self.col_indices = col_indices;
        self.values = values;
        Ok(())
    }

    /// Exchanges columns `i` and `j`; rows are re-sorted afterwards.
    pub fn swap_cols(&mut self, i: usize, j: usize) -> SparseResult<()> {
        if i >= self.ncols() || j >= self.ncols() {
            return Err(SparseError::out_of_bounds(&[i.max(j)], &[self.ncols()]));
        }
        if i == j {
            return Ok(());
        }
        for c in self.col_indices.iter_mut() {
            if *c == i {
                *c = j;
            } else if *c == j {
                *c = i;
            }
        }
        self.sort_indices();
        Ok(())
    }

    /// Entries of the window `rows x cols`, re-based to its corner.
    pub fn get_slice(&self, rows: Range<usize>, cols: Range<usize>) -> SparseResult<Self> {
        check_window(&self.shape, &rows, &cols)?;
        let mut row_pointers = Vec::with_capacity(rows.len() + 1);
        let mut col_indices = Vec::new();
        let mut values = Vec::new();
        row_pointers.push(0);
        for r in rows.clone() {
            let (row_cols, row_vals) = self.parts().row(r);
            let lo = row_cols.partition_point(|&c| c < cols.start);
            let hi = row_cols.partition_point(|&c| c < cols.end);
            col_indices.extend(row_cols[lo..hi].iter().map(|&c| c - cols.start));
            values.extend_from_slice(&row_vals[lo..hi]);
            row_pointers.push(col_indices.len());
        }
        Ok(Self::from_parts_unchecked(
            row_pointers,
            col_indices,
            values,
            Shape::matrix(rows.len(), cols.len()),
        ))
    }

    fn check_position(&self, row: usize, col: usize) -> SparseResult<()> {
        self.shape.check_index(&[row, col])?;
        Ok(())
    }

    fn search(&self, row: usize, col: usize) -> isize {
        binary_search_range(
            &self.col_indices,
            self.row_pointers[row],
            self.row_pointers[row + 1],
            col,
        )
    }
}

impl<T: Semiring> CsrMatrix<T> {
    /// Value at `(row, col)`, zero when absent.
    pub fn get(&self, row: usize, col: usize) -> SparseResult<T> {
        self.check_position(row, col)?;
        let found = self.search(row, col);
        Ok(if found >= 0 {
            self.values[found as usize].clone()
        } else {
            T::zero()
        })
    }

    /// Overwrites `(row, col)`. A missing entry is inserted in column order
    /// and every later row pointer shifts by one.
    pub fn set(&mut self, row: usize, col: usize, value: T) -> SparseResult<()> {
        self.check_position(row, col)?;
        let found = self.search(row, col);
        if found >= 0 {
            self.values[found as usize] = value;
            return Ok(());
        }
        let at = decode_insertion_point(found);
        self.col_indices.insert(at, col);
        self.values.insert(at, value);
        for p in &mut self.row_pointers[row + 1..] {
            *p += 1;
        }
        Ok(())
    }

    /// Sorts rows and sums entries sharing a column.
    pub fn coalesce(&mut self) {
        self.sort_indices();
        let nrows = self.nrows();
        let mut rows = Vec::with_capacity(self.nnz());
        let mut col_indices: Vec<usize> = Vec::with_capacity(self.nnz());
        let mut values: Vec<T> = Vec::with_capacity(self.nnz());
        for r in 0..nrows {
            let (cols, vals) = self.parts().row(r);
            let row_start = values.len();
            for (&c, v) in cols.iter().zip(vals) {
                if values.len() > row_start && col_indices.last() == Some(&c) {
                    if let Some(acc) = values.last_mut() {
                        acc.add_assign(v);
                    }
                } else {
                    rows.push(r);
                    col_indices.push(c);
                    values.push(v.clone());
                }
            }
        }
        self.row_pointers = row_pointers_from_rows(nrows, &rows);
        self.col_indices = col_indices;
        self.values = values;
    }

    pub fn drop_zeros(&mut self) {
        let rows = rows_from_row_pointers(&self.row_pointers);
        let keep: Vec<usize> = (0..self.nnz()).filter(|&p| !self.values[p].is_zero()).collect();
        let kept_rows: Vec<usize> = keep.iter().map(|&p| rows[p]).collect();
        self.row_pointers = row_pointers_from_rows(self.nrows(), &kept_rows);
        self.col_indices = apply_permutation(&self.col_indices, &keep);
        self.values = apply_permutation(&self.values, &keep);
    }

    fn flat_entries(&self) -> impl Iterator<Item = (usize, &T)> {
        let ncols = self.ncols();
        self.row_pointers
            .windows(2)
            .enumerate()
            .flat_map(move |(r, w)| (w[0]..w[1]).map(move |p| (r, p)))
            .map(move |(r, p)| r * ncols + self.col_indices[p])
            .zip(&self.values)
    }

    /// Dense copy, scattered row by row.
    pub fn to_dense(&self) -> SparseResult<DenseTensor<T>> {
        let data = scatter_to_dense(&self.shape, self.flat_entries())?;
        Ok(DenseTensor::from_parts(self.shape.clone(), data)?)
    }

    /// Every non-zero entry of a dense matrix.
    pub fn from_dense(dense: &DenseTensor<T>, sparsity_hint: f64) -> SparseResult<Self> {
        Ok(CooMatrix::from_dense(dense, sparsity_hint)?.to_csr())
    }

    /// Sum of the diagonal of a square matrix.
    pub fn trace(&self) -> SparseResult<T> {
        if self.nrows() != self.ncols() {
            return Err(CoreError::InvalidShape(format!(
                "trace requires a square matrix, got shape {}",
                self.shape
            ))
            .into());
        }
        let mut acc = T::zero();
        for i in 0..self.nrows() {
            let found = self.search(i, i);
            if found >= 0 {
                acc.add_assign(&self.values[found as usize]);
            }
        }
        Ok(acc)
    }

    pub fn add(&self, other: &Self) -> SparseResult<Self> {
        check_same_shape("add", &self.shape, &other.shape)?;
        Ok(Self::from_arrays(csr_add(self.parts(), other.parts()), self.shape.clone()))
    }

    pub fn elem_mult(&self, other: &Self) -> SparseResult<Self> {
        check_same_shape("elem_mult", &self.shape, &other.shape)?;
        Ok(Self::from_arrays(
            csr_elem_mult(self.parts(), other.parts()),
            self.shape.clone(),
        ))
    }

    /// Element-wise division is not defined on sparse storage: every absent
    /// entry of `other` would be a division by zero.
    pub fn div(&self, _other: &Self) -> SparseResult<Self> {
        Err(SparseError::unsupported::<Self>("div"))
    }

    pub fn add_scalar(&self, b: &T) -> SparseResult<DenseTensor<T>> {
        let data = accumulate_to_dense(&self.shape, b.clone(), self.flat_entries())?;
        Ok(DenseTensor::from_parts(self.shape.clone(), data)?)
    }

    pub fn mult_scalar(&self, b: &T) -> Self {
        Self::from_parts_unchecked(
            self.row_pointers.clone(),
            self.col_indices.clone(),
            self.values.iter().map(|v| v.mult(b)).collect(),
            self.shape.clone(),
        )
    }

    fn use_concurrent(&self, cfg: &ComputeConfig) -> bool {
        self.nrows() > 1 && self.nnz() > cfg.sparse_concurrent_threshold
    }

    /// Dense `self x other` with the default configuration.
    pub fn matmul(&self, other: &Self) -> SparseResult<DenseTensor<T>> {
        self.matmul_with(other, &ComputeConfig::default())
    }

    /// Dense `self x other`. Above `sparse_concurrent_threshold` stored
    /// entries, output rows are split into bands across the worker pool.
    pub fn matmul_with(&self, other: &Self, cfg: &ComputeConfig) -> SparseResult<DenseTensor<T>> {
        check_matmul_compatible("matmul", &self.shape, &other.shape)?;
        let out_shape = Shape::matrix(self.nrows(), other.ncols());
        out_shape.total_entries()?;
        let concurrent = self.use_concurrent(cfg);
        debug!(
            concurrent,
            lhs = %self.shape,
            rhs = %other.shape,
            lhs_nnz = self.nnz(),
            rhs_nnz = other.nnz(),
            "csr matmul"
        );
        let data = if concurrent {
            csr_matmul_concurrent(self.parts(), other.parts(), other.ncols(), band_rows(self.nrows()))
        } else {
            csr_matmul(self.parts(), other.parts(), other.ncols())
        };
        Ok(DenseTensor::from_parts(out_shape, data)?)
    }

    /// Sparse `self x other`. Products that cancel stay as explicit zeros.
    pub fn mult_to_sparse(&self, other: &Self) -> SparseResult<Self> {
        check_matmul_compatible("mult_to_sparse", &self.shape, &other.shape)?;
        Ok(Self::from_arrays(
            csr_mult_to_sparse(self.parts(), other.parts(), other.ncols()),
            Shape::matrix(self.nrows(), other.ncols()),
        ))
    }

    /// Dense `self x other^T`; both operands need the same column count.
    pub fn mult_transpose(&self, other: &Self) -> SparseResult<DenseTensor<T>> {
        self.mult_transpose_with(other, &ComputeConfig::default())
    }

    pub fn mult_transpose_with(&self, other: &Self, cfg: &ComputeConfig) -> SparseResult<DenseTensor<T>> {
        if self.ncols() != other.ncols() {
            return Err(SparseError::shape_mismatch(
                "mult_transpose",
                self.shape.dims(),
                other.shape.dims(),
            ));
        }
        let out_shape = Shape::matrix(self.nrows(), other.nrows());
        out_shape.total_entries()?;
        let concurrent = self.use_concurrent(cfg);
        debug!(concurrent, lhs = %self.shape, rhs = %other.shape, "csr mult_transpose");
        let data = if concurrent {
            csr_mult_transpose_concurrent(self.parts(), other.parts(), band_rows(self.nrows()))
        } else {
            csr_mult_transpose(self.parts(), other.parts())
        };
        Ok(DenseTensor::from_parts(out_shape, data)?)
    }

    /// `self x b` for a dense matrix `b`.
    pub fn matmul_dense(&self, b: &DenseTensor<T>) -> SparseResult<DenseTensor<T>> {
        if !b.is_matrix() || b.nrows() != self.ncols() {
            return Err(SparseError::shape_mismatch("matmul_dense", self.shape.dims(), b.dims()));
        }
        let out_shape = Shape::matrix(self.nrows(), b.ncols());
        out_shape.total_entries()?;
        let data = csr_spmm(self.parts(), b.data(), b.ncols());
        Ok(DenseTensor::from_parts(out_shape, data)?)
    }

    /// `self x x` for a dense vector `x`.
    pub fn matvec_dense(&self, x: &DenseTensor<T>) -> SparseResult<DenseTensor<T>> {
        if !x.is_vector() || x.len() != self.ncols() {
            return Err(SparseError::shape_mismatch("matvec_dense", self.shape.dims(), x.dims()));
        }
        let data = csr_spmv(self.parts(), x.data());
        Ok(DenseTensor::from_parts(Shape::vector(self.nrows()), data)?)
    }
}

impl<T: Ring> CsrMatrix<T> {
    pub fn sub(&self, other: &Self) -> SparseResult<Self> {
        check_same_shape("sub", &self.shape, &other.shape)?;
        Ok(Self::from_arrays(csr_sub(self.parts(), other.parts()), self.shape.clone()))
    }

    pub fn sub_scalar(&self, b: &T) -> SparseResult<DenseTensor<T>> {
        self.add_scalar(&b.add_inv())
    }

    pub fn conj(&self) -> Self {
        Self::from_parts_unchecked(
            self.row_pointers.clone(),
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

impl<T: Semiring> SparseStorage for CsrMatrix<T> {
    type Elem = T;

    fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    fn nnz(&self) -> usize {
        self.values.len()
    }

    fn to_dense(&self) -> SparseResult<DenseTensor<T>> {
        CsrMatrix::to_dense(self)
    }
}
