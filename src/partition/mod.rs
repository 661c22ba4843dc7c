//! Work partitioning for the load-balanced SpMM kernels
//!
//! A kernel invocation with `T` threads is split into `T` half-open intervals
//! `[start, end)` on the merge path from `(0, 0)` to `(num_rows, nnz)`. The
//! intervals are contiguous and non-overlapping, and together they cover the
//! path exactly once. Two strategies place the boundaries:
//!
//! - **Merge path**: the `num_rows + nnz` merge items are split evenly and each
//!   boundary is located with [`merge_path_search`].
//! - **Nonzero split**: only the `nnz` nonzeros are split evenly and each
//!   boundary row is derived with [`row_path_search`].

pub mod search;

use std::fmt;
use std::ops::Range;

use tracing::debug;

pub use search::{merge_path_search, row_path_search};

/// A point `(row, nonzero)` on the merge path: rows `[0, row)` have been fully
/// consumed and nonzeros `[0, nonzero)` have been accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MergeCoordinate {
    pub row: usize,
    pub nonzero: usize,
}

impl MergeCoordinate {
    /// Number of merge items consumed to reach this point
    pub fn diagonal(&self) -> usize {
        self.row + self.nonzero
    }
}

/// How thread boundaries are placed on the merge path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartitionStrategy {
    /// Even split of rows + nonzeros, boundaries by diagonal search
    MergePath,
    /// Even split of nonzeros only, boundary rows by row search
    NonzeroSplit,
}

impl fmt::Display for PartitionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionStrategy::MergePath => write!(f, "merge-path"),
            PartitionStrategy::NonzeroSplit => write!(f, "nonzero-split"),
        }
    }
}

/// The slice of the merge path assigned to one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadWork {
    pub thread: usize,
    pub start: MergeCoordinate,
    pub end: MergeCoordinate,
}

impl ThreadWork {
    /// Rows whose end boundary this worker reaches, and therefore writes
    pub fn rows(&self) -> Range<usize> {
        self.start.row..self.end.row
    }

    /// Nonzeros this worker accumulates
    pub fn nonzeros(&self) -> Range<usize> {
        self.start.nonzero..self.end.nonzero
    }

    /// Merge items (row boundaries plus nonzeros) in the interval
    pub fn merge_items(&self) -> usize {
        self.end.diagonal() - self.start.diagonal()
    }
}

/// Items each thread is assigned under `strategy` (rounded up)
pub fn items_per_thread(
    strategy: PartitionStrategy,
    num_rows: usize,
    num_nonzeros: usize,
    threads: usize,
) -> usize {
    let total = match strategy {
        PartitionStrategy::MergePath => num_rows + num_nonzeros,
        PartitionStrategy::NonzeroSplit => num_nonzeros,
    };
    if threads == 0 {
        return total;
    }
    (total + threads - 1) / threads
}

/// Computes the `threads` work intervals for a matrix with the given row end-offsets.
///
/// The first interval starts at `(0, 0)`, each interval starts where the
/// previous one ended, and the last one ends at `(num_rows, nnz)`. Intervals
/// may be empty when there are more threads than items.
pub fn plan_partition(
    strategy: PartitionStrategy,
    row_end_offsets: &[usize],
    threads: usize,
) -> Vec<ThreadWork> {
    let num_rows = row_end_offsets.len();
    let num_nonzeros = row_end_offsets.last().copied().unwrap_or(0);
    let per_thread = items_per_thread(strategy, num_rows, num_nonzeros, threads);

    let boundary = |t: usize| -> MergeCoordinate {
        match strategy {
            PartitionStrategy::MergePath => {
                let total = num_rows + num_nonzeros;
                merge_path_search((per_thread * t).min(total), row_end_offsets, num_nonzeros)
            }
            PartitionStrategy::NonzeroSplit => {
                let nonzero = (per_thread * t).min(num_nonzeros);
                if t > 0 && nonzero == num_nonzeros {
                    // Close the path so trailing empty rows are still written
                    MergeCoordinate {
                        row: num_rows,
                        nonzero,
                    }
                } else {
                    MergeCoordinate {
                        row: row_path_search(nonzero, row_end_offsets),
                        nonzero,
                    }
                }
            }
        }
    };

    let boundaries: Vec<MergeCoordinate> = (0..=threads).map(boundary).collect();
    let plan: Vec<ThreadWork> = boundaries
        .windows(2)
        .enumerate()
        .map(|(thread, pair)| ThreadWork {
            thread,
            start: pair[0],
            end: pair[1],
        })
        .collect();

    debug!(
        %strategy,
        threads,
        num_rows,
        num_nonzeros,
        per_thread,
        "planned partition"
    );
    plan
}
