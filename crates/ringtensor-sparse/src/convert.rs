//! Layout conversion kernels over raw storage arrays.
//!
//! The container methods (`to_csr`, `to_dense`, `from_dense`, `reshape`, ...)
//! validate their operands and delegate the index arithmetic to the
//! functions here.
//!
//! # Complexity
//!
//! | conversion | time |
//! |---|---|
//! | COO -> CSR (sorted input) | O(nnz + nrows) |
//! | CSR -> COO | O(nnz) |
//! | sparse -> dense | O(nnz + total entries) |
//! | dense -> sparse | O(total entries) |
//! | CSR transpose | O(nnz + ncols) |

use ringtensor_core::{CoreResult, Semiring, Shape};
use tracing::trace;

/// Compressed row pointers for row-sorted `rows`: counts entries per row and
/// prefix-sums them into `nrows + 1` offsets.
pub fn row_pointers_from_rows(nrows: usize, rows: &[usize]) -> Vec<usize> {
    let mut row_pointers = vec![0usize; nrows + 1];
    for &r in rows {
        row_pointers[r + 1] += 1;
    }
    for i in 0..nrows {
        row_pointers[i + 1] += row_pointers[i];
    }
    row_pointers
}

/// Expands compressed row pointers back to one row index per entry.
pub fn rows_from_row_pointers(row_pointers: &[usize]) -> Vec<usize> {
    let nnz = row_pointers.last().copied().unwrap_or(0);
    let mut rows = Vec::with_capacity(nnz);
    for (row, w) in row_pointers.windows(2).enumerate() {
        rows.extend(std::iter::repeat(row).take(w[1] - w[0]));
    }
    rows
}

/// Zero-filled buffer of `shape.total_entries()` with `entries` scattered at
/// their flat offsets. Later entries overwrite earlier ones at the same
/// offset.
pub fn scatter_to_dense<'a, T, I>(shape: &Shape, entries: I) -> CoreResult<Vec<T>>
where
    T: Semiring,
    I: IntoIterator<Item = (usize, &'a T)>,
{
    let total = shape.total_entries()?;
    let mut data = vec![T::zero(); total];
    let mut written = 0usize;
    for (flat, value) in entries {
        data[flat] = value.clone();
        written += 1;
    }
    trace!(shape = %shape, total, written, "scattered sparse entries into dense buffer");
    Ok(data)
}

/// Buffer of `total` copies of `fill` with `entries` accumulated on top;
/// the densifying half of scalar broadcast on sparse containers.
pub fn accumulate_to_dense<'a, T, I>(shape: &Shape, fill: T, entries: I) -> CoreResult<Vec<T>>
where
    T: Semiring,
    I: IntoIterator<Item = (usize, &'a T)>,
{
    let total = shape.total_entries()?;
    let mut data = vec![fill; total];
    for (flat, value) in entries {
        data[flat].add_assign(value);
    }
    Ok(data)
}

/// Flat offsets and values of every non-zero entry of a row-major buffer.
/// `sparsity_hint` (clamped to `[0, 1]`) only sizes the initial allocation.
pub fn nonzero_entries<T: Semiring>(data: &[T], sparsity_hint: f64) -> (Vec<usize>, Vec<T>) {
    let hint = if sparsity_hint.is_finite() {
        sparsity_hint.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let capacity = ((1.0 - hint) * data.len() as f64).ceil() as usize;
    let mut offsets = Vec::with_capacity(capacity);
    let mut values = Vec::with_capacity(capacity);
    for (flat, v) in data.iter().enumerate() {
        if !v.is_zero() {
            offsets.push(flat);
            values.push(v.clone());
        }
    }
    trace!(total = data.len(), nnz = values.len(), capacity, "collected non-zero entries");
    (offsets, values)
}

/// Index tuple of `flat` in `old` re-expressed in `new`, both row-major.
pub fn relinearize(index: &[usize], old: &Shape, new: &Shape) -> Vec<usize> {
    let flat = old.flat_index_unchecked(index);
    new.nd_index_unchecked(flat).to_vec()
}

/// CSR arrays of the transpose: counts entries per column, prefix-sums them
/// into the new row pointers and scatters each entry into its slot. Output
/// rows come out column-sorted when the input rows are.
pub fn transpose_csr<T: Clone>(
    ncols: usize,
    row_pointers: &[usize],
    col_indices: &[usize],
    values: &[T],
) -> (Vec<usize>, Vec<usize>, Vec<T>) {
    let t_row_pointers = row_pointers_from_rows(ncols, col_indices);
    let mut next = t_row_pointers.clone();
    let nnz = values.len();
    let mut slots: Vec<Option<(usize, T)>> = vec![None; nnz];

    for (row, w) in row_pointers.windows(2).enumerate() {
        for pos in w[0]..w[1] {
            let col = col_indices[pos];
            let dest = next[col];
            next[col] += 1;
            slots[dest] = Some((row, values[pos].clone()));
        }
    }

    let mut t_cols = Vec::with_capacity(nnz);
    let mut t_values = Vec::with_capacity(nnz);
    for (row, value) in slots.into_iter().flatten() {
        t_cols.push(row);
        t_values.push(value);
    }
    (t_row_pointers, t_cols, t_values)
}
