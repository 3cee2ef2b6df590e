//! `A * B^T` kernels.
//!
//! `a` is `m x k` and `b` is `n x k`, both row-major; the result is `m x n`.
//! Both operands are read along rows, so no transpose is ever materialized.
//! Shapes are not validated here.

use ringtensor_core::concurrency::{band_rows, for_each_row_band};
use ringtensor_core::{Semiring, Shape};

fn transpose_band<T: Semiring>(
    a: &[T],
    b: &[T],
    inner: usize,
    rows2: usize,
    first_row: usize,
    band: &mut [T],
) {
    for (local, out_row) in band.chunks_mut(rows2).enumerate() {
        let a_row = &a[(first_row + local) * inner..(first_row + local + 1) * inner];
        for (j, out) in out_row.iter_mut().enumerate() {
            let b_row = &b[j * inner..(j + 1) * inner];
            let mut sum = T::zero();
            for (x, y) in a_row.iter().zip(b_row) {
                sum.fma_assign(x, y);
            }
            *out = sum;
        }
    }
}

fn transpose_blocked_band<T: Semiring>(
    a: &[T],
    b: &[T],
    inner: usize,
    rows2: usize,
    block: usize,
    first_row: usize,
    band: &mut [T],
) {
    let rows = band.len() / rows2;
    for ii in (0..rows).step_by(block) {
        let i_end = (ii + block).min(rows);
        for jj in (0..rows2).step_by(block) {
            let j_end = (jj + block).min(rows2);
            for kk in (0..inner).step_by(block) {
                let k_end = (kk + block).min(inner);
                for i in ii..i_end {
                    let a_row = &a[(first_row + i) * inner + kk..(first_row + i) * inner + k_end];
                    for j in jj..j_end {
                        let b_row = &b[j * inner + kk..j * inner + k_end];
                        let out = &mut band[i * rows2 + j];
                        for (x, y) in a_row.iter().zip(b_row) {
                            out.fma_assign(x, y);
                        }
                    }
                }
            }
        }
    }
}

fn output_dims(a_shape: &Shape, b_shape: &Shape) -> (usize, usize, usize) {
    (a_shape.dim(0), a_shape.dim(1), b_shape.dim(0))
}

pub fn mult_transpose<T: Semiring>(a: &[T], a_shape: &Shape, b: &[T], b_shape: &Shape) -> Vec<T> {
    let (rows1, inner, rows2) = output_dims(a_shape, b_shape);
    let mut dest = vec![T::zero(); rows1 * rows2];
    if rows2 > 0 {
        transpose_band(a, b, inner, rows2, 0, &mut dest);
    }
    dest
}

pub fn mult_transpose_blocked<T: Semiring>(
    a: &[T],
    a_shape: &Shape,
    b: &[T],
    b_shape: &Shape,
    block: usize,
) -> Vec<T> {
    let (rows1, inner, rows2) = output_dims(a_shape, b_shape);
    let mut dest = vec![T::zero(); rows1 * rows2];
    if rows2 > 0 {
        transpose_blocked_band(a, b, inner, rows2, block.max(1), 0, &mut dest);
    }
    dest
}

pub fn mult_transpose_concurrent<T: Semiring>(
    a: &[T],
    a_shape: &Shape,
    b: &[T],
    b_shape: &Shape,
) -> Vec<T> {
    let (rows1, inner, rows2) = output_dims(a_shape, b_shape);
    let mut dest = vec![T::zero(); rows1 * rows2];
    for_each_row_band(&mut dest, rows2, band_rows(rows1), |first_row, band| {
        transpose_band(a, b, inner, rows2, first_row, band)
    });
    dest
}

pub fn mult_transpose_blocked_concurrent<T: Semiring>(
    a: &[T],
    a_shape: &Shape,
    b: &[T],
    b_shape: &Shape,
    block: usize,
) -> Vec<T> {
    let (rows1, inner, rows2) = output_dims(a_shape, b_shape);
    let block = block.max(1);
    let mut dest = vec![T::zero(); rows1 * rows2];
    let band = band_rows(rows1).div_ceil(block) * block;
    for_each_row_band(&mut dest, rows2, band, |first_row, out| {
        transpose_blocked_band(a, b, inner, rows2, block, first_row, out)
    });
    dest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_explicit_transpose() {
        // a: 2x3, b: 4x3
        let a: Vec<i32> = (1..=6).collect();
        let b: Vec<i32> = (0..12).map(|v| v % 5 - 2).collect();
        let (sa, sb) = (Shape::matrix(2, 3), Shape::matrix(4, 3));

        let mut expected = vec![0; 8];
        for i in 0..2 {
            for j in 0..4 {
                for k in 0..3 {
                    expected[i * 4 + j] += a[i * 3 + k] * b[j * 3 + k];
                }
            }
        }

        assert_eq!(mult_transpose(&a, &sa, &b, &sb), expected);
        assert_eq!(mult_transpose_concurrent(&a, &sa, &b, &sb), expected);
        for block in [1, 2, 3, 8] {
            assert_eq!(mult_transpose_blocked(&a, &sa, &b, &sb, block), expected);
            assert_eq!(
                mult_transpose_blocked_concurrent(&a, &sa, &b, &sb, block),
                expected
            );
        }
    }

    #[test]
    fn test_gram_matrix_is_symmetric() {
        let a: Vec<f64> = (0..20).map(|v| v as f64 * 0.5).collect();
        let s = Shape::matrix(4, 5);
        let g = mult_transpose(&a, &s, &a, &s);
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(g[i * 4 + j], g[j * 4 + i]);
            }
        }
    }
}
