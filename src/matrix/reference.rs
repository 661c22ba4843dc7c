//! Serial reference kernels and tolerance-based verification
//!
//! This provides the ground truth every parallel strategy is validated against.

use tracing::warn;

use crate::constants::MAX_LOGGED_MISMATCHES;
use crate::error::{Result, SpmmError};
use crate::matrix::dense::{DenseBlock, Layout};
use crate::matrix::SparseMatrixCSR;
use crate::scalar::Scalar;

/// Single-vector reference: `y[row] = beta * y_in[row] + alpha * sum(values[k] * x[col_idx[k]])`
pub fn reference_spmv<T: Scalar>(
    a: &SparseMatrixCSR<T>,
    x: &[T],
    y_in: &[T],
    alpha: T,
    beta: T,
) -> Result<Vec<T>> {
    if x.len() != a.n_cols {
        return Err(SpmmError::DimensionMismatch {
            what: "reference input vector",
            expected: a.n_cols,
            got: x.len(),
        });
    }
    if y_in.len() != a.n_rows {
        return Err(SpmmError::DimensionMismatch {
            what: "reference y_in vector",
            expected: a.n_rows,
            got: y_in.len(),
        });
    }

    let y = (0..a.n_rows)
        .map(|row| {
            let mut partial = beta * y_in[row];
            for (col, &val) in a.row_iter(row) {
                partial += alpha * val * x[col];
            }
            partial
        })
        .collect();
    Ok(y)
}

/// Serial multi-vector row loop, accumulating each row in increasing nonzero order.
///
/// The output is row-major; a single-threaded balanced kernel reproduces it bit for bit.
pub fn reference_spmm<T: Scalar>(a: &SparseMatrixCSR<T>, x: &DenseBlock<T>) -> Result<DenseBlock<T>> {
    if x.n_rows() != a.n_cols {
        return Err(SpmmError::DimensionMismatch {
            what: "input block rows",
            expected: a.n_cols,
            got: x.n_rows(),
        });
    }

    let n_vectors = x.n_vectors();
    let mut y = DenseBlock::zeros(a.n_rows, n_vectors, Layout::RowMajor);
    let mut partial = vec![T::zero(); n_vectors];

    for row in 0..a.n_rows {
        partial.iter_mut().for_each(|p| *p = T::zero());
        for (col, &val) in a.row_iter(row) {
            for (v, p) in partial.iter_mut().enumerate() {
                *p += val * x.get(col, v);
            }
        }
        for (v, &p) in partial.iter().enumerate() {
            y.set(row, v, p);
        }
    }
    Ok(y)
}

/// A single row whose parallel result disagreed with the reference
#[derive(Debug, Clone, PartialEq)]
pub struct RowMismatch {
    pub row: usize,
    pub expected: f64,
    pub actual: f64,
}

/// Outcome of comparing a kernel's output with the reference
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    /// Rows compared
    pub rows_checked: usize,
    /// Absolute tolerance used
    pub tolerance: f64,
    /// Every row outside tolerance (non-finite values always count)
    pub mismatches: Vec<RowMismatch>,
}

impl Verification {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Compares vector 0 of `y` against `reference` row by row.
///
/// A row present on only one side, or an output with no vectors, counts as a
/// mismatch with `NaN` standing in for the missing value.
/// Never fails: a mismatch is reported through the returned value and logged.
pub fn verify_first_vector<T: Scalar>(
    reference: &[T],
    y: &DenseBlock<T>,
    tolerance: f64,
) -> Verification {
    let rows = reference.len().max(y.n_rows());
    if reference.len() != y.n_rows() {
        warn!(
            reference_rows = reference.len(),
            output_rows = y.n_rows(),
            "reference and output row counts differ"
        );
    }

    let mut mismatches = Vec::new();
    for row in 0..rows {
        let expected = reference
            .get(row)
            .and_then(|value| value.to_f64())
            .unwrap_or(f64::NAN);
        let actual = if row < y.n_rows() && y.n_vectors() > 0 {
            y.get(row, 0).to_f64().unwrap_or(f64::NAN)
        } else {
            f64::NAN
        };
        // NaN compares false, so it lands here too
        if !((expected - actual).abs() <= tolerance) {
            mismatches.push(RowMismatch {
                row,
                expected,
                actual,
            });
        }
    }

    for m in mismatches.iter().take(MAX_LOGGED_MISMATCHES) {
        warn!(row = m.row, expected = m.expected, actual = m.actual, "verification mismatch");
    }
    if mismatches.len() > MAX_LOGGED_MISMATCHES {
        warn!(
            remaining = mismatches.len() - MAX_LOGGED_MISMATCHES,
            "further mismatched rows not shown"
        );
    }

    Verification {
        rows_checked: rows,
        tolerance,
        mismatches,
    }
}
