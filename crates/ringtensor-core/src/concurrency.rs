//! Fan-out / fan-in helpers over the shared worker pool.
//!
//! Every concurrent kernel in ringtensor is expressed with these helpers:
//! the output buffer is split into disjoint contiguous bands, each band is
//! written by exactly one worker, and the call returns once all bands are
//! done. Without the `parallel` feature the same closures run sequentially
//! and produce identical results.
//!
//! A panic inside a worker propagates to the caller through the join.

#[cfg(feature = "parallel")]
use scirs2_core::parallel_ops::*;

/// Number of workers available to the pool (at least 1).
pub fn worker_count() -> usize {
    #[cfg(feature = "parallel")]
    {
        current_num_threads().max(1)
    }
    #[cfg(not(feature = "parallel"))]
    {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

/// Rows per band so that `rows` are spread evenly over the workers.
pub fn band_rows(rows: usize) -> usize {
    let workers = worker_count();
    rows.div_ceil(workers).max(1)
}

/// Splits `dest` (row-major, `row_len` entries per row) into bands of
/// `band_rows` rows and calls `f(first_row, band)` for each band.
pub fn for_each_row_band<T, F>(dest: &mut [T], row_len: usize, band_rows: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    if row_len == 0 || dest.is_empty() {
        return;
    }
    let band_rows = band_rows.max(1);
    let chunk = row_len * band_rows;

    #[cfg(feature = "parallel")]
    dest.par_chunks_mut(chunk)
        .enumerate()
        .for_each(|(band, slice)| f(band * band_rows, slice));

    #[cfg(not(feature = "parallel"))]
    dest.chunks_mut(chunk)
        .enumerate()
        .for_each(|(band, slice)| f(band * band_rows, slice));
}

/// Runs `f(start, end)` over consecutive ranges of `0..len` of size `chunk`
/// and returns the results in range order.
pub fn map_ranges<R, F>(len: usize, chunk: usize, f: F) -> Vec<R>
where
    R: Send,
    F: Fn(usize, usize) -> R + Send + Sync,
{
    let chunk = chunk.max(1);
    let starts: Vec<usize> = (0..len).step_by(chunk).collect();

    #[cfg(feature = "parallel")]
    let out = starts
        .into_par_iter()
        .map(|s| f(s, (s + chunk).min(len)))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let out = starts
        .into_iter()
        .map(|s| f(s, (s + chunk).min(len)))
        .collect();

    out
}

/// Element-wise `f(a[i], b[i])` computed across the pool.
pub fn zip_map<A, B, R, F>(a: &[A], b: &[B], f: F) -> Vec<R>
where
    A: Sync,
    B: Sync,
    R: Send,
    F: Fn(&A, &B) -> R + Send + Sync,
{
    #[cfg(feature = "parallel")]
    let out = a
        .par_iter()
        .zip(b.par_iter())
        .map(|(x, y)| f(x, y))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let out = a.iter().zip(b.iter()).map(|(x, y)| f(x, y)).collect();

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_rows_covers_all() {
        let rows = 17;
        let band = band_rows(rows);
        assert!(band >= 1);
        assert!(band * worker_count() >= rows);
    }

    #[test]
    fn test_for_each_row_band_writes_every_row_once() {
        let (rows, cols) = (9, 4);
        let mut dest = vec![0usize; rows * cols];
        for_each_row_band(&mut dest, cols, 2, |first_row, band| {
            for (r, row) in band.chunks_mut(cols).enumerate() {
                for v in row.iter_mut() {
                    *v += first_row + r + 1;
                }
            }
        });
        for r in 0..rows {
            assert!(dest[r * cols..(r + 1) * cols].iter().all(|&v| v == r + 1));
        }
    }

    #[test]
    fn test_for_each_row_band_empty() {
        let mut dest: Vec<u8> = Vec::new();
        for_each_row_band(&mut dest, 3, 1, |_, _| panic!("no bands expected"));
    }

    #[test]
    fn test_map_ranges_in_order() {
        let parts = map_ranges(10, 3, |s, e| (s, e));
        assert_eq!(parts, vec![(0, 3), (3, 6), (6, 9), (9, 10)]);
        assert!(map_ranges(0, 4, |s, e| (s, e)).is_empty());
    }

    #[test]
    fn test_zip_map() {
        let out = zip_map(&[1, 2, 3], &[4, 5, 6], |a, b| a * b);
        assert_eq!(out, vec![4, 10, 18]);
    }
}
