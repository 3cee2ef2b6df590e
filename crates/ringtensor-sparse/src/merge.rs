//! Two-pointer merges over sorted sparse index streams.
//!
//! Both operands must be sorted in row-major order (not re-checked). A merge
//! walks the two streams once, O(nnz_a + nnz_b):
//!
//! - equal indices: combine the values and advance both sides
//! - left index smaller: emit the left entry unchanged
//! - right index smaller: emit the right entry (negated for subtraction)
//!
//! Element-wise products emit only on equal indices. The output stays sorted
//! and entries that happen to combine to zero are kept as explicit zeros.
//!
//! The low-level [`union_steps`] / [`intersection_steps`] functions are
//! independent of how indices are stored; the typed wrappers below cover the
//! tuple-list (tensor), row/column (matrix) and flat (vector) layouts.

use ringtensor_core::{Ring, Semiring};
use std::cmp::Ordering;

use crate::search::cmp_index;

/// Origin of one entry of a merged stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Both(usize, usize),
    Left(usize),
    Right(usize),
}

/// Merge plan for the union of two sorted streams of lengths `a_len` and
/// `b_len`; `cmp(i, j)` compares entry `i` of the left with entry `j` of the
/// right stream.
pub fn union_steps<F>(a_len: usize, b_len: usize, mut cmp: F) -> Vec<Step>
where
    F: FnMut(usize, usize) -> Ordering,
{
    let mut steps = Vec::with_capacity(a_len + b_len);
    let (mut i, mut j) = (0, 0);
    while i < a_len && j < b_len {
        match cmp(i, j) {
            Ordering::Equal => {
                steps.push(Step::Both(i, j));
                i += 1;
                j += 1;
            }
            Ordering::Less => {
                steps.push(Step::Left(i));
                i += 1;
            }
            Ordering::Greater => {
                steps.push(Step::Right(j));
                j += 1;
            }
        }
    }
    steps.extend((i..a_len).map(Step::Left));
    steps.extend((j..b_len).map(Step::Right));
    steps
}

/// Pairs of positions with equal indices in two sorted streams.
pub fn intersection_steps<F>(a_len: usize, b_len: usize, mut cmp: F) -> Vec<(usize, usize)>
where
    F: FnMut(usize, usize) -> Ordering,
{
    let mut pairs = Vec::with_capacity(a_len.min(b_len));
    let (mut i, mut j) = (0, 0);
    while i < a_len && j < b_len {
        match cmp(i, j) {
            Ordering::Equal => {
                pairs.push((i, j));
                i += 1;
                j += 1;
            }
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
        }
    }
    pairs
}

/// Values of a union merge.
pub fn merge_values<T, B, R>(steps: &[Step], a: &[T], b: &[T], both: B, right_only: R) -> Vec<T>
where
    T: Clone,
    B: Fn(&T, &T) -> T,
    R: Fn(&T) -> T,
{
    steps
        .iter()
        .map(|step| match *step {
            Step::Both(i, j) => both(&a[i], &b[j]),
            Step::Left(i) => a[i].clone(),
            Step::Right(j) => right_only(&b[j]),
        })
        .collect()
}

/// Keys of a union merge, taken from whichever side contributed the entry.
pub fn merge_keys<K: Clone>(steps: &[Step], a: &[K], b: &[K]) -> Vec<K> {
    steps
        .iter()
        .map(|step| match *step {
            Step::Both(i, _) | Step::Left(i) => a[i].clone(),
            Step::Right(j) => b[j].clone(),
        })
        .collect()
}

fn tensor_union<T, B, R>(
    a_vals: &[T],
    a_idx: &[Vec<usize>],
    b_vals: &[T],
    b_idx: &[Vec<usize>],
    both: B,
    right_only: R,
) -> (Vec<T>, Vec<Vec<usize>>)
where
    T: Clone,
    B: Fn(&T, &T) -> T,
    R: Fn(&T) -> T,
{
    let steps = union_steps(a_vals.len(), b_vals.len(), |i, j| cmp_index(&a_idx[i], &b_idx[j]));
    (
        merge_values(&steps, a_vals, b_vals, both, right_only),
        merge_keys(&steps, a_idx, b_idx),
    )
}

/// `a + b` for sparse tensors stored as index-tuple lists.
pub fn coo_tensor_add<T: Semiring>(
    a_vals: &[T],
    a_idx: &[Vec<usize>],
    b_vals: &[T],
    b_idx: &[Vec<usize>],
) -> (Vec<T>, Vec<Vec<usize>>) {
    tensor_union(a_vals, a_idx, b_vals, b_idx, Semiring::add, T::clone)
}

/// `a - b` for sparse tensors stored as index-tuple lists.
pub fn coo_tensor_sub<T: Ring>(
    a_vals: &[T],
    a_idx: &[Vec<usize>],
    b_vals: &[T],
    b_idx: &[Vec<usize>],
) -> (Vec<T>, Vec<Vec<usize>>) {
    tensor_union(a_vals, a_idx, b_vals, b_idx, Ring::sub, Ring::add_inv)
}

/// Element-wise product for sparse tensors stored as index-tuple lists.
pub fn coo_tensor_elem_mult<T: Semiring>(
    a_vals: &[T],
    a_idx: &[Vec<usize>],
    b_vals: &[T],
    b_idx: &[Vec<usize>],
) -> (Vec<T>, Vec<Vec<usize>>) {
    let pairs = intersection_steps(a_vals.len(), b_vals.len(), |i, j| {
        cmp_index(&a_idx[i], &b_idx[j])
    });
    let vals = pairs.iter().map(|&(i, j)| a_vals[i].mult(&b_vals[j])).collect();
    let idx = pairs.iter().map(|&(i, _)| a_idx[i].clone()).collect();
    (vals, idx)
}

/// Row/column arrays of one matrix operand.
#[derive(Debug)]
pub struct MatrixEntries<'a, T> {
    pub values: &'a [T],
    pub rows: &'a [usize],
    pub cols: &'a [usize],
}

impl<T> Clone for MatrixEntries<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MatrixEntries<'_, T> {}

impl<'a, T> MatrixEntries<'a, T> {
    #[inline]
    fn key(&self, i: usize) -> (usize, usize) {
        (self.rows[i], self.cols[i])
    }
}

/// Merged matrix entries: `(values, rows, cols)`.
pub type MatrixMerge<T> = (Vec<T>, Vec<usize>, Vec<usize>);

fn matrix_union<T, B, R>(
    a: MatrixEntries<'_, T>,
    b: MatrixEntries<'_, T>,
    both: B,
    right_only: R,
) -> MatrixMerge<T>
where
    T: Clone,
    B: Fn(&T, &T) -> T,
    R: Fn(&T) -> T,
{
    let steps = union_steps(a.values.len(), b.values.len(), |i, j| a.key(i).cmp(&b.key(j)));
    (
        merge_values(&steps, a.values, b.values, both, right_only),
        merge_keys(&steps, a.rows, b.rows),
        merge_keys(&steps, a.cols, b.cols),
    )
}

pub fn coo_matrix_add<T: Semiring>(
    a: MatrixEntries<'_, T>,
    b: MatrixEntries<'_, T>,
) -> MatrixMerge<T> {
    matrix_union(a, b, Semiring::add, T::clone)
}

pub fn coo_matrix_sub<T: Ring>(a: MatrixEntries<'_, T>, b: MatrixEntries<'_, T>) -> MatrixMerge<T> {
    matrix_union(a, b, Ring::sub, Ring::add_inv)
}

pub fn coo_matrix_elem_mult<T: Semiring>(
    a: MatrixEntries<'_, T>,
    b: MatrixEntries<'_, T>,
) -> MatrixMerge<T> {
    let pairs = intersection_steps(a.values.len(), b.values.len(), |i, j| {
        a.key(i).cmp(&b.key(j))
    });
    let mut vals = Vec::with_capacity(pairs.len());
    let mut rows = Vec::with_capacity(pairs.len());
    let mut cols = Vec::with_capacity(pairs.len());
    for (i, j) in pairs {
        vals.push(a.values[i].mult(&b.values[j]));
        rows.push(a.rows[i]);
        cols.push(a.cols[i]);
    }
    (vals, rows, cols)
}

fn vector_union<T, B, R>(
    a_vals: &[T],
    a_idx: &[usize],
    b_vals: &[T],
    b_idx: &[usize],
    both: B,
    right_only: R,
) -> (Vec<T>, Vec<usize>)
where
    T: Clone,
    B: Fn(&T, &T) -> T,
    R: Fn(&T) -> T,
{
    let steps = union_steps(a_vals.len(), b_vals.len(), |i, j| a_idx[i].cmp(&b_idx[j]));
    (
        merge_values(&steps, a_vals, b_vals, both, right_only),
        merge_keys(&steps, a_idx, b_idx),
    )
}

pub fn coo_vector_add<T: Semiring>(
    a_vals: &[T],
    a_idx: &[usize],
    b_vals: &[T],
    b_idx: &[usize],
) -> (Vec<T>, Vec<usize>) {
    vector_union(a_vals, a_idx, b_vals, b_idx, Semiring::add, T::clone)
}

pub fn coo_vector_sub<T: Ring>(
    a_vals: &[T],
    a_idx: &[usize],
    b_vals: &[T],
    b_idx: &[usize],
) -> (Vec<T>, Vec<usize>) {
    vector_union(a_vals, a_idx, b_vals, b_idx, Ring::sub, Ring::add_inv)
}

pub fn coo_vector_elem_mult<T: Semiring>(
    a_vals: &[T],
    a_idx: &[usize],
    b_vals: &[T],
    b_idx: &[usize],
) -> (Vec<T>, Vec<usize>) {
    let pairs = intersection_steps(a_vals.len(), b_vals.len(), |i, j| a_idx[i].cmp(&b_idx[j]));
    let vals = pairs.iter().map(|&(i, j)| a_vals[i].mult(&b_vals[j])).collect();
    let idx = pairs.iter().map(|&(i, _)| a_idx[i]).collect();
    (vals, idx)
}

/// Inner product of two sparse vectors: sum over the shared support.
pub fn coo_vector_inner<T: Semiring>(
    a_vals: &[T],
    a_idx: &[usize],
    b_vals: &[T],
    b_idx: &[usize],
) -> T {
    let mut acc = T::zero();
    for (i, j) in intersection_steps(a_vals.len(), b_vals.len(), |i, j| a_idx[i].cmp(&b_idx[j])) {
        acc.fma_assign(&a_vals[i], &b_vals[j]);
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_and_intersection_steps() {
        let a = [1, 3, 5];
        let b = [2, 3, 6, 7];
        let steps = union_steps(a.len(), b.len(), |i, j| a[i].cmp(&b[j]));
        assert_eq!(
            steps,
            vec![
                Step::Left(0),
                Step::Right(0),
                Step::Both(1, 1),
                Step::Left(2),
                Step::Right(2),
                Step::Right(3),
            ]
        );
        assert_eq!(intersection_steps(a.len(), b.len(), |i, j| a[i].cmp(&b[j])), vec![(1, 1)]);
    }

    #[test]
    fn test_tensor_add_union_of_supports() {
        let a_idx = vec![vec![0, 0], vec![1, 1]];
        let b_idx = vec![vec![0, 0], vec![2, 2]];
        let (vals, idx) = coo_tensor_add(&[2, 3], &a_idx, &[5, 7], &b_idx);
        assert_eq!(vals, vec![7, 3, 7]);
        assert_eq!(idx, vec![vec![0, 0], vec![1, 1], vec![2, 2]]);
    }

    #[test]
    fn test_tensor_sub_negates_right_only() {
        let a_idx = vec![vec![0, 1, 0]];
        let b_idx = vec![vec![0, 0, 1], vec![0, 1, 0]];
        let (vals, idx) = coo_tensor_sub(&[4.0], &a_idx, &[2.0, 4.0], &b_idx);
        assert_eq!(vals, vec![-2.0, 0.0]);
        assert_eq!(idx, b_idx);
    }

    #[test]
    fn test_cancellation_keeps_explicit_zero() {
        let (vals, idx) = coo_vector_add(&[3, 1], &[2, 4], &[-3], &[2]);
        assert_eq!(vals, vec![0, 1]);
        assert_eq!(idx, vec![2, 4]);
    }

    #[test]
    fn test_matrix_merges() {
        let a = MatrixEntries {
            values: &[1, 2, 3],
            rows: &[0, 0, 2],
            cols: &[0, 2, 1],
        };
        let b = MatrixEntries {
            values: &[10, 20],
            rows: &[0, 1],
            cols: &[2, 0],
        };
        let (vals, rows, cols) = coo_matrix_add(a, b);
        assert_eq!(vals, vec![1, 12, 20, 3]);
        assert_eq!(rows, vec![0, 0, 1, 2]);
        assert_eq!(cols, vec![0, 2, 0, 1]);

        let (vals, rows, cols) = coo_matrix_sub(a, b);
        assert_eq!(vals, vec![1, -18, -20, 3]);
        assert_eq!((rows.len(), cols.len()), (4, 4));

        let (vals, rows, cols) = coo_matrix_elem_mult(a, b);
        assert_eq!((vals, rows, cols), (vec![20], vec![0], vec![2]));
    }

    #[test]
    fn test_elem_mult_disjoint_is_empty() {
        let (vals, idx) = coo_tensor_elem_mult(&[1.0], &[vec![0]], &[2.0], &[vec![1]]);
        assert!(vals.is_empty());
        assert!(idx.is_empty());
    }

    #[test]
    fn test_vector_ops() {
        let (vals, idx) = coo_vector_sub(&[5, 5], &[0, 3], &[1, 2], &[3, 9]);
        assert_eq!(vals, vec![5, 4, -2]);
        assert_eq!(idx, vec![0, 3, 9]);

        let (vals, idx) = coo_vector_elem_mult(&[5, 5], &[0, 3], &[1, 2], &[3, 9]);
        assert_eq!((vals, idx), (vec![5], vec![3]));

        assert_eq!(coo_vector_inner(&[2, 3, 4], &[0, 1, 5], &[10, 100], &[1, 5]), 430);
    }
}
