//! Endpoint resolution for compressed-row graphs

use crate::dtype::Index;

/// Source row owning edge `e`, given `row_ptrs` of length `N + 1`.
///
/// Upper-bound search for the first pointer greater than `e`, then one step
/// back. Empty rows share a pointer value with their successor, so the
/// search lands past them and they are never reported. The slot found is
/// never 0 because `row_ptrs[0] == 0 <= e`.
///
/// `row_ptrs` must be non-decreasing, start at 0, and `e` must be below the
/// last pointer.
#[inline]
pub fn binary_search_src<I: Index>(row_ptrs: &[I], e: usize) -> usize {
    debug_assert!(!row_ptrs.is_empty());
    let mut lo = 0;
    let mut hi = row_ptrs.len() - 1;
    while lo < hi {
        let mid = (lo + hi) >> 1;
        if row_ptrs[mid].as_usize() <= e {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    hi - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_skips_empty_row() {
        let row_ptrs = [0i64, 2, 2, 5];
        let srcs: Vec<usize> = (0..5).map(|e| binary_search_src(&row_ptrs, e)).collect();
        assert_eq!(srcs, vec![0, 0, 2, 2, 2]);
    }

    #[test]
    fn test_search_leading_and_trailing_empty_rows() {
        let row_ptrs = [0i32, 0, 0, 3, 3];
        for e in 0..3 {
            assert_eq!(binary_search_src(&row_ptrs, e), 2);
        }
    }

    #[test]
    fn test_search_edge_at_row_start() {
        // every e equal to a row start must map to that row, not the one before
        let row_ptrs = [0i64, 3, 3, 3, 4, 7];
        assert_eq!(binary_search_src(&row_ptrs, 0), 0);
        assert_eq!(binary_search_src(&row_ptrs, 3), 3);
        assert_eq!(binary_search_src(&row_ptrs, 4), 4);
        assert_eq!(binary_search_src(&row_ptrs, 6), 4);
    }

    #[test]
    fn test_search_one_edge_per_row() {
        let row_ptrs: Vec<i32> = (0..=100).collect();
        for e in 0..100 {
            assert_eq!(binary_search_src(&row_ptrs, e), e);
        }
    }
}
