//! Binary search over sorted sparse index arrays.
//!
//! All searches return the same signed encoding: a non-negative value is the
//! position of the target, a negative value `r` means the target is absent
//! and would be inserted at `-(r + 1)` to keep the array sorted.
//!
//! Index tuples are ordered lexicographically with the earliest axis most
//! significant (row-major order). Inputs are assumed sorted; nothing here
//! checks it.
//!
//! ```
//! use ringtensor_sparse::search::{binary_search_coo, decode_insertion_point};
//!
//! let indices = vec![vec![0, 1], vec![1, 2], vec![2, 0]];
//! assert_eq!(binary_search_coo(&indices, &[1, 2]), 1);
//!
//! let missing = binary_search_coo(&indices, &[1, 1]);
//! assert!(missing < 0);
//! assert_eq!(decode_insertion_point(missing), 1);
//! ```

use std::cmp::Ordering;

/// Lexicographic comparison of two index tuples of equal rank.
#[inline]
pub fn cmp_index(a: &[usize], b: &[usize]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match x.cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

#[inline]
fn encode(result: Result<usize, usize>) -> isize {
    match result {
        Ok(pos) => pos as isize,
        Err(ins) => -(ins as isize) - 1,
    }
}

/// Insertion point encoded in a negative search result.
///
/// # Panics
///
/// Panics in debug builds if `result` is non-negative.
#[inline]
pub fn decode_insertion_point(result: isize) -> usize {
    debug_assert!(result < 0, "result {result} encodes a hit, not an insertion point");
    (-(result + 1)) as usize
}

/// Searches a sorted list of index tuples for `target`.
pub fn binary_search_coo(indices: &[Vec<usize>], target: &[usize]) -> isize {
    encode(indices.binary_search_by(|probe| cmp_index(probe, target)))
}

/// Searches parallel row/column arrays sorted in row-major order.
pub fn binary_search_matrix(rows: &[usize], cols: &[usize], row: usize, col: usize) -> isize {
    let (mut lo, mut hi) = (0usize, rows.len());
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        match (rows[mid], cols[mid]).cmp(&(row, col)) {
            Ordering::Less => lo = mid + 1,
            Ordering::Greater => hi = mid,
            Ordering::Equal => return mid as isize,
        }
    }
    -(lo as isize) - 1
}

/// Searches `values[lo..hi]` (sorted) for `target`. Positions in the result
/// are absolute, not relative to `lo`.
pub fn binary_search_range(values: &[usize], lo: usize, hi: usize, target: usize) -> isize {
    match values[lo..hi].binary_search(&target) {
        Ok(pos) => (lo + pos) as isize,
        Err(ins) => -((lo + ins) as isize) - 1,
    }
}

/// Half-open range of entries belonging to `row` in a row-sorted array.
pub fn row_range(rows: &[usize], row: usize) -> (usize, usize) {
    let start = rows.partition_point(|&r| r < row);
    let end = start + rows[start..].partition_point(|&r| r <= row);
    (start, end)
}

/// `true` when the index tuples are in non-decreasing row-major order.
pub fn is_sorted_lex(indices: &[Vec<usize>]) -> bool {
    indices
        .windows(2)
        .all(|w| cmp_index(&w[0], &w[1]) != Ordering::Greater)
}

/// `true` when parallel row/column arrays are in non-decreasing row-major order.
pub fn is_sorted_matrix(rows: &[usize], cols: &[usize]) -> bool {
    (1..rows.len()).all(|i| (rows[i - 1], cols[i - 1]) <= (rows[i], cols[i]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmp_index() {
        assert_eq!(cmp_index(&[0, 5], &[1, 0]), Ordering::Less);
        assert_eq!(cmp_index(&[1, 2], &[1, 1]), Ordering::Greater);
        assert_eq!(cmp_index(&[2, 2, 2], &[2, 2, 2]), Ordering::Equal);
    }

    #[test]
    fn test_coo_search_hits_and_misses() {
        let indices = vec![vec![0, 1], vec![1, 2], vec![2, 0]];
        assert_eq!(binary_search_coo(&indices, &[1, 2]), 1);
        assert_eq!(binary_search_coo(&indices, &[0, 1]), 0);
        assert_eq!(binary_search_coo(&indices, &[2, 0]), 2);

        assert_eq!(binary_search_coo(&indices, &[1, 1]), -2);
        assert_eq!(decode_insertion_point(binary_search_coo(&indices, &[0, 0])), 0);
        assert_eq!(decode_insertion_point(binary_search_coo(&indices, &[3, 0])), 3);
    }

    #[test]
    fn test_empty_arrays() {
        assert_eq!(binary_search_coo(&[], &[0, 0]), -1);
        assert_eq!(binary_search_matrix(&[], &[], 4, 4), -1);
        assert_eq!(row_range(&[], 0), (0, 0));
    }

    #[test]
    fn test_matrix_search() {
        let rows = [0, 0, 1, 3, 3];
        let cols = [1, 4, 0, 2, 3];
        assert_eq!(binary_search_matrix(&rows, &cols, 3, 2), 3);
        assert_eq!(binary_search_matrix(&rows, &cols, 0, 4), 1);
        let miss = binary_search_matrix(&rows, &cols, 2, 0);
        assert_eq!(decode_insertion_point(miss), 3);
    }

    #[test]
    fn test_range_search_is_absolute() {
        let cols = [0, 3, 1, 2, 5, 0];
        assert_eq!(binary_search_range(&cols, 2, 5, 2), 3);
        assert_eq!(decode_insertion_point(binary_search_range(&cols, 2, 5, 4)), 4);
        assert_eq!(decode_insertion_point(binary_search_range(&cols, 2, 2, 4)), 2);
    }

    #[test]
    fn test_row_range() {
        let rows = [0, 0, 2, 2, 2, 5];
        assert_eq!(row_range(&rows, 0), (0, 2));
        assert_eq!(row_range(&rows, 1), (2, 2));
        assert_eq!(row_range(&rows, 2), (2, 5));
        assert_eq!(row_range(&rows, 6), (6, 6));
    }

    #[test]
    fn test_sortedness_checks() {
        assert!(is_sorted_lex(&[vec![0, 1], vec![0, 1], vec![1, 0]]));
        assert!(!is_sorted_lex(&[vec![1, 0], vec![0, 5]]));
        assert!(is_sorted_matrix(&[0, 0, 1], &[2, 3, 0]));
        assert!(!is_sorted_matrix(&[0, 0], &[3, 2]));
    }
}
