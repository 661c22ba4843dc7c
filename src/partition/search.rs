//! Binary searches locating partition boundaries on the merge path
//!
//! The merge path interleaves two sorted lists: list A holds the row
//! end-offsets (`row_ptr[1..]`) and list B is the identity sequence of nonzero
//! indices `0..nnz`. Walking the path in order is exactly the row-by-row
//! traversal of a CSR matrix, so any point on it is a `(row, nonzero)` pair.

use super::MergeCoordinate;

/// Finds where diagonal `diagonal` intersects the merge path.
///
/// Returns the unique `(x, y)` with `x + y == diagonal`, `x <= num_rows` and
/// `y <= num_nonzeros` such that every row end-offset before `x` is `<=` the
/// nonzero index it is merged against. `diagonal` must lie in
/// `0..=num_rows + num_nonzeros`.
pub fn merge_path_search(
    diagonal: usize,
    row_end_offsets: &[usize],
    num_nonzeros: usize,
) -> MergeCoordinate {
    let num_rows = row_end_offsets.len();
    debug_assert!(diagonal <= num_rows + num_nonzeros, "diagonal past end of merge path");

    let mut x_min = diagonal.saturating_sub(num_nonzeros);
    let mut x_max = diagonal.min(num_rows);

    while x_min < x_max {
        let pivot = (x_min + x_max) >> 1;
        // pivot < x_max <= diagonal, so the B index below never underflows
        if row_end_offsets[pivot] <= diagonal - pivot - 1 {
            x_min = pivot + 1; // contract range up A (down B)
        } else {
            x_max = pivot; // contract range down A (up B)
        }
    }

    MergeCoordinate {
        row: x_min,
        nonzero: diagonal - x_min,
    }
}

/// Finds the row that owns nonzero boundary `nonzero`.
///
/// Returns the first row `x` whose end-offset is `>= nonzero`, i.e. the row
/// that contains nonzero `nonzero - 1` (or row 0 for `nonzero == 0`). A row
/// is a valid index for every `nonzero < num_nonzeros`; boundaries at the very
/// end are resolved by the planner.
pub fn row_path_search(nonzero: usize, row_end_offsets: &[usize]) -> usize {
    let mut x_min = 0;
    let mut x_max = row_end_offsets.len();

    while x_min < x_max {
        let pivot = (x_min + x_max) >> 1;
        if row_end_offsets[pivot] < nonzero {
            x_min = pivot + 1;
        } else {
            x_max = pivot;
        }
    }

    x_min
}
