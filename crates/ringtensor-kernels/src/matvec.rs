//! Dense matrix-vector kernels.
//!
//! `a` is an `m x n` row-major matrix and `x` a length `n` vector; the result
//! has length `m`. Shapes are not validated here.

use ringtensor_core::concurrency::{band_rows, for_each_row_band};
use ringtensor_core::{Semiring, Shape};

fn standard_rows<T: Semiring>(a: &[T], x: &[T], cols: usize, first_row: usize, out: &mut [T]) {
    for (local, y) in out.iter_mut().enumerate() {
        let row = &a[(first_row + local) * cols..(first_row + local + 1) * cols];
        let mut sum = T::zero();
        for (a_ij, x_j) in row.iter().zip(x) {
            sum.fma_assign(a_ij, x_j);
        }
        *y = sum;
    }
}

fn blocked_rows<T: Semiring>(
    a: &[T],
    x: &[T],
    cols: usize,
    block: usize,
    first_row: usize,
    out: &mut [T],
) {
    let rows = out.len();
    for ii in (0..rows).step_by(block) {
        let i_end = (ii + block).min(rows);
        for jj in (0..cols).step_by(block) {
            let j_end = (jj + block).min(cols);
            for (i, y) in out.iter_mut().enumerate().take(i_end).skip(ii) {
                let row = (first_row + i) * cols;
                for j in jj..j_end {
                    y.fma_assign(&a[row + j], &x[j]);
                }
            }
        }
    }
}

pub fn standard_vector<T: Semiring>(a: &[T], a_shape: &Shape, x: &[T]) -> Vec<T> {
    let (rows, cols) = (a_shape.dim(0), a_shape.dim(1));
    let mut dest = vec![T::zero(); rows];
    standard_rows(a, x, cols, 0, &mut dest);
    dest
}

/// Tiles both the rows of `a` and the entries of `x`.
pub fn blocked_vector<T: Semiring>(a: &[T], a_shape: &Shape, x: &[T], block: usize) -> Vec<T> {
    let (rows, cols) = (a_shape.dim(0), a_shape.dim(1));
    let mut dest = vec![T::zero(); rows];
    blocked_rows(a, x, cols, block.max(1), 0, &mut dest);
    dest
}

pub fn concurrent_standard_vector<T: Semiring>(a: &[T], a_shape: &Shape, x: &[T]) -> Vec<T> {
    let (rows, cols) = (a_shape.dim(0), a_shape.dim(1));
    let mut dest = vec![T::zero(); rows];
    for_each_row_band(&mut dest, 1, band_rows(rows), |first_row, out| {
        standard_rows(a, x, cols, first_row, out)
    });
    dest
}

pub fn concurrent_blocked_vector<T: Semiring>(
    a: &[T],
    a_shape: &Shape,
    x: &[T],
    block: usize,
) -> Vec<T> {
    let (rows, cols) = (a_shape.dim(0), a_shape.dim(1));
    let block = block.max(1);
    let mut dest = vec![T::zero(); rows];
    let band = band_rows(rows).div_ceil(block) * block;
    for_each_row_band(&mut dest, 1, band, |first_row, out| {
        blocked_rows(a, x, cols, block, first_row, out)
    });
    dest
}
