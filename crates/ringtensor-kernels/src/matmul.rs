//! Dense matrix-matrix multiplication kernels.
//!
//! Operands are row-major slices paired with their [`Shape`]. None of the
//! kernels validate shapes; callers (see [`crate::dispatch`]) must ensure both
//! shapes are rank 2 and `a_shape[1] == b_shape[0]`.
//!
//! Each kernel is written once as a *band* kernel that fills a contiguous
//! range of output rows. The sequential variant runs one band over the whole
//! output; the concurrent variant hands disjoint bands to the worker pool, so
//! every output row is written by exactly one worker and no locking is
//! needed.
//!
//! For exact element types every kernel returns bit-identical results. For
//! floating point types the summation order differs between the i-j-k and
//! i-k-j families, so results agree only up to rounding.

use ringtensor_core::concurrency::{band_rows, for_each_row_band};
use ringtensor_core::{Semiring, Shape};

/// Problem sizes `(rows of A, cols of A, cols of B)`.
#[inline]
fn dims(a_shape: &Shape, b_shape: &Shape) -> (usize, usize, usize) {
    (a_shape.dim(0), a_shape.dim(1), b_shape.dim(1))
}

/// i-j-k over output rows `first_row..first_row + band.len() / cols2`.
fn standard_band<T: Semiring>(
    a: &[T],
    b: &[T],
    cols1: usize,
    cols2: usize,
    first_row: usize,
    band: &mut [T],
) {
    for (local, out_row) in band.chunks_mut(cols2).enumerate() {
        let a_row = &a[(first_row + local) * cols1..(first_row + local + 1) * cols1];
        for (j, out) in out_row.iter_mut().enumerate() {
            let mut sum = T::zero();
            for (k, a_ik) in a_row.iter().enumerate() {
                sum.fma_assign(a_ik, &b[k * cols2 + j]);
            }
            *out = sum;
        }
    }
}

/// i-k-j: streams one row of `b` per entry of `a`.
fn reordered_band<T: Semiring>(
    a: &[T],
    b: &[T],
    cols1: usize,
    cols2: usize,
    first_row: usize,
    band: &mut [T],
) {
    for (local, out_row) in band.chunks_mut(cols2).enumerate() {
        let a_row = &a[(first_row + local) * cols1..(first_row + local + 1) * cols1];
        for (k, a_ik) in a_row.iter().enumerate() {
            let b_row = &b[k * cols2..(k + 1) * cols2];
            for (out, b_kj) in out_row.iter_mut().zip(b_row) {
                out.fma_assign(a_ik, b_kj);
            }
        }
    }
}

fn blocked_band<T: Semiring>(
    a: &[T],
    b: &[T],
    cols1: usize,
    cols2: usize,
    block: usize,
    first_row: usize,
    band: &mut [T],
) {
    let rows = band.len() / cols2;
    for ii in (0..rows).step_by(block) {
        let i_end = (ii + block).min(rows);
        for jj in (0..cols2).step_by(block) {
            let j_end = (jj + block).min(cols2);
            for kk in (0..cols1).step_by(block) {
                let k_end = (kk + block).min(cols1);
                for i in ii..i_end {
                    let a_row = (first_row + i) * cols1;
                    for j in jj..j_end {
                        let out = &mut band[i * cols2 + j];
                        for k in kk..k_end {
                            out.fma_assign(&a[a_row + k], &b[k * cols2 + j]);
                        }
                    }
                }
            }
        }
    }
}

fn blocked_reordered_band<T: Semiring>(
    a: &[T],
    b: &[T],
    cols1: usize,
    cols2: usize,
    block: usize,
    first_row: usize,
    band: &mut [T],
) {
    let rows = band.len() / cols2;
    for ii in (0..rows).step_by(block) {
        let i_end = (ii + block).min(rows);
        for kk in (0..cols1).step_by(block) {
            let k_end = (kk + block).min(cols1);
            for jj in (0..cols2).step_by(block) {
                let j_end = (jj + block).min(cols2);
                for i in ii..i_end {
                    let a_row = (first_row + i) * cols1;
                    let out_row = &mut band[i * cols2 + jj..i * cols2 + j_end];
                    for k in kk..k_end {
                        let a_ik = &a[a_row + k];
                        let b_row = &b[k * cols2 + jj..k * cols2 + j_end];
                        for (out, b_kj) in out_row.iter_mut().zip(b_row) {
                            out.fma_assign(a_ik, b_kj);
                        }
                    }
                }
            }
        }
    }
}

fn zeroed<T: Semiring>(rows: usize, cols: usize) -> Vec<T> {
    vec![T::zero(); rows * cols]
}

/// Textbook i-j-k product.
pub fn standard<T: Semiring>(a: &[T], a_shape: &Shape, b: &[T], b_shape: &Shape) -> Vec<T> {
    let (rows1, cols1, cols2) = dims(a_shape, b_shape);
    let mut dest = zeroed(rows1, cols2);
    if cols2 > 0 {
        standard_band(a, b, cols1, cols2, 0, &mut dest);
    }
    dest
}

/// i-k-j product; unit stride over `b` and the output in the inner loop.
pub fn reordered<T: Semiring>(a: &[T], a_shape: &Shape, b: &[T], b_shape: &Shape) -> Vec<T> {
    let (rows1, cols1, cols2) = dims(a_shape, b_shape);
    let mut dest = zeroed(rows1, cols2);
    if cols2 > 0 {
        reordered_band(a, b, cols1, cols2, 0, &mut dest);
    }
    dest
}

/// Tiled i-j-k product with square `block x block` tiles.
pub fn blocked<T: Semiring>(
    a: &[T],
    a_shape: &Shape,
    b: &[T],
    b_shape: &Shape,
    block: usize,
) -> Vec<T> {
    let (rows1, cols1, cols2) = dims(a_shape, b_shape);
    let mut dest = zeroed(rows1, cols2);
    if cols2 > 0 {
        blocked_band(a, b, cols1, cols2, block.max(1), 0, &mut dest);
    }
    dest
}

/// Tiled i-k-j product.
pub fn blocked_reordered<T: Semiring>(
    a: &[T],
    a_shape: &Shape,
    b: &[T],
    b_shape: &Shape,
    block: usize,
) -> Vec<T> {
    let (rows1, cols1, cols2) = dims(a_shape, b_shape);
    let mut dest = zeroed(rows1, cols2);
    if cols2 > 0 {
        blocked_reordered_band(a, b, cols1, cols2, block.max(1), 0, &mut dest);
    }
    dest
}

pub fn concurrent_standard<T: Semiring>(
    a: &[T],
    a_shape: &Shape,
    b: &[T],
    b_shape: &Shape,
) -> Vec<T> {
    let (rows1, cols1, cols2) = dims(a_shape, b_shape);
    let mut dest = zeroed(rows1, cols2);
    for_each_row_band(&mut dest, cols2, band_rows(rows1), |first_row, band| {
        standard_band(a, b, cols1, cols2, first_row, band)
    });
    dest
}

pub fn concurrent_reordered<T: Semiring>(
    a: &[T],
    a_shape: &Shape,
    b: &[T],
    b_shape: &Shape,
) -> Vec<T> {
    let (rows1, cols1, cols2) = dims(a_shape, b_shape);
    let mut dest = zeroed(rows1, cols2);
    for_each_row_band(&mut dest, cols2, band_rows(rows1), |first_row, band| {
        reordered_band(a, b, cols1, cols2, first_row, band)
    });
    dest
}

pub fn concurrent_blocked<T: Semiring>(
    a: &[T],
    a_shape: &Shape,
    b: &[T],
    b_shape: &Shape,
    block: usize,
) -> Vec<T> {
    let (rows1, cols1, cols2) = dims(a_shape, b_shape);
    let block = block.max(1);
    let mut dest = zeroed(rows1, cols2);
    // bands are whole multiples of the tile height
    let band = band_rows(rows1).div_ceil(block) * block;
    for_each_row_band(&mut dest, cols2, band, |first_row, out| {
        blocked_band(a, b, cols1, cols2, block, first_row, out)
    });
    dest
}

pub fn concurrent_blocked_reordered<T: Semiring>(
    a: &[T],
    a_shape: &Shape,
    b: &[T],
    b_shape: &Shape,
    block: usize,
) -> Vec<T> {
    let (rows1, cols1, cols2) = dims(a_shape, b_shape);
    let block = block.max(1);
    let mut dest = zeroed(rows1, cols2);
    let band = band_rows(rows1).div_ceil(block) * block;
    for_each_row_band(&mut dest, cols2, band, |first_row, out| {
        blocked_reordered_band(a, b, cols1, cols2, block, first_row, out)
    });
    dest
}
