//! Permutation sorting shared by every sparse container.
//!
//! Co-indexed arrays are sorted by computing one permutation of positions and
//! applying it to each array, so values always travel with their indices.
//! With the `parallel` feature, permutations longer than
//! [`PAR_SORT_THRESHOLD`] are sorted on the worker pool.

use std::cmp::Ordering;

#[cfg(feature = "parallel")]
use scirs2_core::parallel_ops::*;

/// Length above which the permutation is sorted concurrently.
pub const PAR_SORT_THRESHOLD: usize = 16_384;

/// Positions `0..len` in the order given by `cmp`. The sort is stable, so
/// duplicate indices keep their insertion order.
pub fn sorted_permutation<F>(len: usize, cmp: F) -> Vec<usize>
where
    F: Fn(usize, usize) -> Ordering + Sync,
{
    let mut perm: Vec<usize> = (0..len).collect();

    #[cfg(feature = "parallel")]
    if len > PAR_SORT_THRESHOLD {
        perm.par_sort_by(|&i, &j| cmp(i, j));
        return perm;
    }

    perm.sort_by(|&i, &j| cmp(i, j));
    perm
}

/// `true` when `perm` leaves every position in place.
pub fn is_identity(perm: &[usize]) -> bool {
    perm.iter().enumerate().all(|(i, &p)| i == p)
}

/// Reorders `data` so that `data[k]` becomes the old `data[perm[k]]`.
pub fn apply_permutation<T: Clone>(data: &[T], perm: &[usize]) -> Vec<T> {
    perm.iter().map(|&p| data[p].clone()).collect()
}
