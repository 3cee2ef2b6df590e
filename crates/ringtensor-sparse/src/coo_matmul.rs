//! Sparse x sparse products on the coordinate layout, dense results.
//!
//! `coo_matmul` indexes the right operand by row (the contracted dimension)
//! once, then streams the left operand: every entry `(r, k, v)` meets every
//! right entry of row `k`. Work is proportional to the number of matching
//! pairs rather than to the dense size.
//!
//! The concurrent variants split the left operand's entry range across the
//! worker pool. `coo_matmul_concurrent` accumulates into a shared
//! [`DashMap`] keyed by flat output position and scatters it into the dense
//! buffer afterwards; `coo_matvec_concurrent` guards its output with a
//! [`parking_lot::Mutex`]. Both accumulate in a nondeterministic order, so
//! floating-point results may differ from the sequential kernels in the last
//! bits. Integer results are exact.

use dashmap::DashMap;
use parking_lot::Mutex;
use ringtensor_core::concurrency::{map_ranges, worker_count};
use ringtensor_core::Semiring;
use std::collections::HashMap;

use crate::merge::MatrixEntries;
use crate::search::binary_search_range;

/// Positions of the entries of each row of `b`.
fn row_map(b: &MatrixEntries<'_, impl Sized>) -> HashMap<usize, Vec<usize>> {
    let mut map: HashMap<usize, Vec<usize>> = HashMap::new();
    for (pos, &row) in b.rows.iter().enumerate() {
        map.entry(row).or_default().push(pos);
    }
    map
}

fn chunk_len(nnz: usize) -> usize {
    nnz.div_ceil(worker_count()).max(1)
}

/// `A x B` as a dense row-major `out_rows x out_cols` buffer, where
/// `out_rows` is the row count of `A` and `out_cols` the column count of `B`.
/// Entry order of either operand is irrelevant.
pub fn coo_matmul<T: Semiring>(
    a: MatrixEntries<'_, T>,
    b: MatrixEntries<'_, T>,
    out_rows: usize,
    out_cols: usize,
) -> Vec<T> {
    let mut out = vec![T::zero(); out_rows * out_cols];
    let rows_of_b = row_map(&b);
    for ((&r, &k), v) in a.rows.iter().zip(a.cols).zip(a.values) {
        if let Some(positions) = rows_of_b.get(&k) {
            for &p in positions {
                out[r * out_cols + b.cols[p]].fma_assign(v, &b.values[p]);
            }
        }
    }
    out
}

/// Concurrent [`coo_matmul`]: workers share one concurrent accumulator
/// keyed by flat output position.
pub fn coo_matmul_concurrent<T: Semiring>(
    a: MatrixEntries<'_, T>,
    b: MatrixEntries<'_, T>,
    out_rows: usize,
    out_cols: usize,
) -> Vec<T> {
    let rows_of_b = row_map(&b);
    let acc: DashMap<usize, T> = DashMap::new();

    map_ranges(a.values.len(), chunk_len(a.values.len()), |start, end| {
        for pos in start..end {
            let (r, k) = (a.rows[pos], a.cols[pos]);
            let Some(positions) = rows_of_b.get(&k) else {
                continue;
            };
            for &p in positions {
                let product = a.values[pos].mult(&b.values[p]);
                acc.entry(r * out_cols + b.cols[p])
                    .or_insert_with(T::zero)
                    .add_assign(&product);
            }
        }
    });

    let mut out = vec![T::zero(); out_rows * out_cols];
    for (flat, value) in acc {
        out[flat] = value;
    }
    out
}

/// `A x x` for a coordinate matrix and a sparse vector with sorted indices,
/// as a dense vector of length `out_rows`.
pub fn coo_matvec<T: Semiring>(
    a: MatrixEntries<'_, T>,
    x_values: &[T],
    x_indices: &[usize],
    out_rows: usize,
) -> Vec<T> {
    let mut out = vec![T::zero(); out_rows];
    for ((&r, &c), v) in a.rows.iter().zip(a.cols).zip(a.values) {
        let found = binary_search_range(x_indices, 0, x_indices.len(), c);
        if found >= 0 {
            out[r].fma_assign(v, &x_values[found as usize]);
        }
    }
    out
}

/// Concurrent [`coo_matvec`]; each addition takes the output lock.
pub fn coo_matvec_concurrent<T: Semiring>(
    a: MatrixEntries<'_, T>,
    x_values: &[T],
    x_indices: &[usize],
    out_rows: usize,
) -> Vec<T> {
    let out = Mutex::new(vec![T::zero(); out_rows]);
    map_ranges(a.values.len(), chunk_len(a.values.len()), |start, end| {
        for pos in start..end {
            let found = binary_search_range(x_indices, 0, x_indices.len(), a.cols[pos]);
            if found >= 0 {
                let product = a.values[pos].mult(&x_values[found as usize]);
                out.lock()[a.rows[pos]].add_assign(&product);
            }
        }
    });
    out.into_inner()
}
