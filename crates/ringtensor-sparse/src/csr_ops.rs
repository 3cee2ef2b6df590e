//! Kernels over raw CSR arrays.
//!
//! Every function trusts its inputs: row pointers are monotone, column
//! indices are in range and sorted within each row, and operand dimensions
//! agree. [`CsrMatrix`](crate::CsrMatrix) validates before calling in.
//!
//! Element-wise operations walk both operands row by row with the two-pointer
//! merge from [`crate::merge`], recording each row's output length and
//! prefix-summing the lengths into the new row pointers at the end.
//!
//! Products into a dense result write each output row from exactly one
//! worker, so the concurrent variants need no locking.

use ringtensor_core::concurrency::for_each_row_band;
use ringtensor_core::{Ring, Semiring};

use crate::merge::{intersection_steps, merge_keys, merge_values, union_steps};

/// Borrowed CSR arrays of one operand.
#[derive(Debug)]
pub struct CsrParts<'a, T> {
    pub row_pointers: &'a [usize],
    pub col_indices: &'a [usize],
    pub values: &'a [T],
}

impl<T> Clone for CsrParts<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CsrParts<'_, T> {}

impl<'a, T> CsrParts<'a, T> {
    #[inline]
    pub fn row(&self, i: usize) -> (&'a [usize], &'a [T]) {
        let (start, end) = (self.row_pointers[i], self.row_pointers[i + 1]);
        (&self.col_indices[start..end], &self.values[start..end])
    }

    pub fn nrows(&self) -> usize {
        self.row_pointers.len().saturating_sub(1)
    }
}

/// Owned CSR arrays: `(row_pointers, col_indices, values)`.
pub type CsrArrays<T> = (Vec<usize>, Vec<usize>, Vec<T>);

fn prefix_sum(counts: &mut [usize]) {
    for i in 1..counts.len() {
        counts[i] += counts[i - 1];
    }
}

/// Row-synchronized union merge. `combine` joins entries present in both
/// operands; `right_only` maps entries present only on the right.
pub fn csr_bin_op<T, B, R>(a: CsrParts<'_, T>, b: CsrParts<'_, T>, combine: B, right_only: R) -> CsrArrays<T>
where
    T: Clone,
    B: Fn(&T, &T) -> T,
    R: Fn(&T) -> T,
{
    let nrows = a.nrows();
    let mut row_pointers = vec![0usize; nrows + 1];
    let mut col_indices = Vec::with_capacity(a.values.len() + b.values.len());
    let mut values = Vec::with_capacity(a.values.len() + b.values.len());

    for i in 0..nrows {
        let (a_cols, a_vals) = a.row(i);
        let (b_cols, b_vals) = b.row(i);
        let steps = union_steps(a_cols.len(), b_cols.len(), |p, q| a_cols[p].cmp(&b_cols[q]));
        row_pointers[i + 1] = steps.len();
        col_indices.extend(merge_keys(&steps, a_cols, b_cols));
        values.extend(merge_values(&steps, a_vals, b_vals, &combine, &right_only));
    }
    prefix_sum(&mut row_pointers);
    (row_pointers, col_indices, values)
}

pub fn csr_add<T: Semiring>(a: CsrParts<'_, T>, b: CsrParts<'_, T>) -> CsrArrays<T> {
    csr_bin_op(a, b, Semiring::add, T::clone)
}

pub fn csr_sub<T: Ring>(a: CsrParts<'_, T>, b: CsrParts<'_, T>) -> CsrArrays<T> {
    csr_bin_op(a, b, Ring::sub, Ring::add_inv)
}

/// Element-wise product: entries only where both rows share a column.
pub fn csr_elem_mult<T: Semiring>(a: CsrParts<'_, T>, b: CsrParts<'_, T>) -> CsrArrays<T> {
    let nrows = a.nrows();
    let mut row_pointers = vec![0usize; nrows + 1];
    let mut col_indices = Vec::new();
    let mut values = Vec::new();

    for i in 0..nrows {
        let (a_cols, a_vals) = a.row(i);
        let (b_cols, b_vals) = b.row(i);
        let pairs = intersection_steps(a_cols.len(), b_cols.len(), |p, q| a_cols[p].cmp(&b_cols[q]));
        row_pointers[i + 1] = pairs.len();
        for (p, q) in pairs {
            col_indices.push(a_cols[p]);
            values.push(a_vals[p].mult(&b_vals[q]));
        }
    }
    prefix_sum(&mut row_pointers);
    (row_pointers, col_indices, values)
}

/// Rows `first_row..` of `A x B` into `band` (`ncols` entries per row).
fn matmul_rows<T: Semiring>(
    a: CsrParts<'_, T>,
    b: CsrParts<'_, T>,
    ncols: usize,
    first_row: usize,
    band: &mut [T],
) {
    for (offset, out_row) in band.chunks_mut(ncols).enumerate() {
        let (a_cols, a_vals) = a.row(first_row + offset);
        for (&k, a_ik) in a_cols.iter().zip(a_vals) {
            let (b_cols, b_vals) = b.row(k);
            for (&j, b_kj) in b_cols.iter().zip(b_vals) {
                out_row[j].fma_assign(a_ik, b_kj);
            }
        }
    }
}

/// `A x B` as a dense row-major buffer with `ncols` columns.
pub fn csr_matmul<T: Semiring>(a: CsrParts<'_, T>, b: CsrParts<'_, T>, ncols: usize) -> Vec<T> {
    let mut out = vec![T::zero(); a.nrows() * ncols];
    if ncols > 0 {
        matmul_rows(a, b, ncols, 0, &mut out);
    }
    out
}

/// Concurrent [`csr_matmul`]: output rows are split into bands of
/// `band_rows` rows, one worker per band.
pub fn csr_matmul_concurrent<T: Semiring>(
    a: CsrParts<'_, T>,
    b: CsrParts<'_, T>,
    ncols: usize,
    band_rows: usize,
) -> Vec<T> {
    let mut out = vec![T::zero(); a.nrows() * ncols];
    for_each_row_band(&mut out, ncols, band_rows, |first_row, band| {
        matmul_rows(a, b, ncols, first_row, band)
    });
    out
}

/// `A x B` kept sparse. Each output row is gathered in a dense accumulator
/// of width `ncols` and emitted in column order; products that cancel to
/// zero are kept as explicit entries.
pub fn csr_mult_to_sparse<T: Semiring>(a: CsrParts<'_, T>, b: CsrParts<'_, T>, ncols: usize) -> CsrArrays<T> {
    let nrows = a.nrows();
    let mut row_pointers = vec![0usize; nrows + 1];
    let mut col_indices = Vec::new();
    let mut values = Vec::new();

    let mut acc = vec![T::zero(); ncols];
    let mut touched = vec![false; ncols];
    let mut row_cols: Vec<usize> = Vec::new();

    for i in 0..nrows {
        let (a_cols, a_vals) = a.row(i);
        for (&k, a_ik) in a_cols.iter().zip(a_vals) {
            let (b_cols, b_vals) = b.row(k);
            for (&j, b_kj) in b_cols.iter().zip(b_vals) {
                if !touched[j] {
                    touched[j] = true;
                    row_cols.push(j);
                }
                acc[j].fma_assign(a_ik, b_kj);
            }
        }
        row_cols.sort_unstable();
        row_pointers[i + 1] = row_cols.len();
        for &j in &row_cols {
            col_indices.push(j);
            values.push(std::mem::replace(&mut acc[j], T::zero()));
            touched[j] = false;
        }
        row_cols.clear();
    }
    prefix_sum(&mut row_pointers);
    (row_pointers, col_indices, values)
}

fn mult_transpose_rows<T: Semiring>(
    a: CsrParts<'_, T>,
    b: CsrParts<'_, T>,
    ncols: usize,
    first_row: usize,
    band: &mut [T],
) {
    for (offset, out_row) in band.chunks_mut(ncols).enumerate() {
        let (a_cols, a_vals) = a.row(first_row + offset);
        for (j, out) in out_row.iter_mut().enumerate() {
            let (b_cols, b_vals) = b.row(j);
            for (p, q) in intersection_steps(a_cols.len(), b_cols.len(), |p, q| a_cols[p].cmp(&b_cols[q])) {
                out.fma_assign(&a_vals[p], &b_vals[q]);
            }
        }
    }
}

/// `A x B^T` as a dense buffer: entry `(i, j)` is the sparse dot product of
/// row `i` of `A` with row `j` of `B`.
pub fn csr_mult_transpose<T: Semiring>(a: CsrParts<'_, T>, b: CsrParts<'_, T>) -> Vec<T> {
    let ncols = b.nrows();
    let mut out = vec![T::zero(); a.nrows() * ncols];
    if ncols > 0 {
        mult_transpose_rows(a, b, ncols, 0, &mut out);
    }
    out
}

pub fn csr_mult_transpose_concurrent<T: Semiring>(
    a: CsrParts<'_, T>,
    b: CsrParts<'_, T>,
    band_rows: usize,
) -> Vec<T> {
    let ncols = b.nrows();
    let mut out = vec![T::zero(); a.nrows() * ncols];
    for_each_row_band(&mut out, ncols, band_rows, |first_row, band| {
        mult_transpose_rows(a, b, ncols, first_row, band)
    });
    out
}

/// `A x B` for a dense row-major `B` with `b_cols` columns.
pub fn csr_spmm<T: Semiring>(a: CsrParts<'_, T>, b: &[T], b_cols: usize) -> Vec<T> {
    let mut out = vec![T::zero(); a.nrows() * b_cols];
    if b_cols == 0 {
        return out;
    }
    for (i, out_row) in out.chunks_mut(b_cols).enumerate() {
        let (a_cols, a_vals) = a.row(i);
        for (&k, a_ik) in a_cols.iter().zip(a_vals) {
            let b_row = &b[k * b_cols..(k + 1) * b_cols];
            for (o, b_kj) in out_row.iter_mut().zip(b_row) {
                o.fma_assign(a_ik, b_kj);
            }
        }
    }
    out
}

/// `A x x` for a dense vector `x`.
pub fn csr_spmv<T: Semiring>(a: CsrParts<'_, T>, x: &[T]) -> Vec<T> {
    (0..a.nrows())
        .map(|i| {
            let (cols, vals) = a.row(i);
            let mut acc = T::zero();
            for (&k, v) in cols.iter().zip(vals) {
                acc.fma_assign(v, &x[k]);
            }
            acc
        })
        .collect()
}
