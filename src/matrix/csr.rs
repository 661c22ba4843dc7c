//! Compressed Sparse Row (CSR) matrix format implementation

use std::fmt;
use std::ops::Range;

use crate::constants::{MAX_DISPLAY_ELEMENTS_PER_ROW, MAX_DISPLAY_ROWS};
use crate::error::{Result, SpmmError};
use crate::scalar::Scalar;

/// A sparse matrix in Compressed Sparse Row (CSR) format
///
/// The CSR format stores a sparse matrix using three arrays:
/// - row_ptr: Array of size n_rows + 1 containing indices into col_idx and values arrays
/// - col_idx: Array of size nnz containing column indices of non-zero elements
/// - values: Array of size nnz containing the non-zero values
///
/// Every kernel borrows the matrix immutably; the nonzero span
/// `row_ptr[r]..row_ptr[r + 1]` belongs to row `r` alone.
#[derive(Clone)]
pub struct SparseMatrixCSR<T> {
    /// Number of rows in the matrix
    pub n_rows: usize,

    /// Number of columns in the matrix
    pub n_cols: usize,

    /// Row pointers (size: n_rows + 1)
    /// row_ptr[i] is the index in col_idx and values where row i starts
    /// row_ptr[n_rows] is equal to nnz
    pub row_ptr: Vec<usize>,

    /// Column indices (size: nnz)
    pub col_idx: Vec<usize>,

    /// Non-zero values (size: nnz)
    pub values: Vec<T>,
}

impl<T: Scalar> SparseMatrixCSR<T> {
    /// Creates a new CSR matrix with the given dimensions and data
    ///
    /// # Panics
    ///
    /// Panics if the input arrays are inconsistent; see [`SparseMatrixCSR::try_new`]
    /// for the non-panicking form and the full list of checks.
    pub fn new(
        n_rows: usize,
        n_cols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Self {
        match Self::try_new(n_rows, n_cols, row_ptr, col_idx, values) {
            Ok(matrix) => matrix,
            Err(err) => panic!("{}", err),
        }
    }

    /// Creates a new CSR matrix, validating every structural invariant once
    ///
    /// Checks that:
    /// - row_ptr.len() is n_rows + 1 and row_ptr[0] is 0
    /// - row_ptr is non-decreasing
    /// - col_idx.len() equals values.len() equals row_ptr[n_rows]
    /// - every column index is below n_cols
    pub fn try_new(
        n_rows: usize,
        n_cols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self> {
        if row_ptr.len() != n_rows + 1 {
            return Err(SpmmError::invalid_matrix(
                "row_ptr.len() must be n_rows + 1",
            ));
        }
        if row_ptr[0] != 0 {
            return Err(SpmmError::invalid_matrix("row_ptr[0] must be 0"));
        }
        if let Some(row) = row_ptr.windows(2).position(|w| w[0] > w[1]) {
            return Err(SpmmError::invalid_matrix(format!(
                "row_ptr must be non-decreasing (row {} starts after it ends)",
                row
            )));
        }
        if col_idx.len() != values.len() {
            return Err(SpmmError::invalid_matrix(
                "col_idx.len() must equal values.len()",
            ));
        }
        if row_ptr[n_rows] != col_idx.len() {
            return Err(SpmmError::invalid_matrix(
                "row_ptr[n_rows] must equal col_idx.len()",
            ));
        }
        if let Some(&col) = col_idx.iter().find(|&&col| col >= n_cols) {
            return Err(SpmmError::invalid_matrix(format!(
                "Column index {} out of bounds (n_cols = {})",
                col, n_cols
            )));
        }

        Ok(Self {
            n_rows,
            n_cols,
            row_ptr,
            col_idx,
            values,
        })
    }

    /// Builds a matrix from `(row, col, value)` triplets.
    ///
    /// Entries are sorted by row then column, and duplicates are summed.
    pub fn from_triplets(
        n_rows: usize,
        n_cols: usize,
        mut triplets: Vec<(usize, usize, T)>,
    ) -> Result<Self> {
        if let Some(&(row, col, _)) = triplets
            .iter()
            .find(|&&(row, col, _)| row >= n_rows || col >= n_cols)
        {
            return Err(SpmmError::invalid_matrix(format!(
                "Entry ({}, {}) outside a {} x {} matrix",
                row, col, n_rows, n_cols
            )));
        }

        triplets.sort_unstable_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut counts = vec![0usize; n_rows];
        let mut col_idx = Vec::with_capacity(triplets.len());
        let mut values: Vec<T> = Vec::with_capacity(triplets.len());
        let mut last: Option<(usize, usize)> = None;

        for (row, col, val) in triplets {
            if last == Some((row, col)) {
                if let Some(v) = values.last_mut() {
                    *v += val;
                }
                continue;
            }
            counts[row] += 1;
            col_idx.push(col);
            values.push(val);
            last = Some((row, col));
        }

        let mut row_ptr = Vec::with_capacity(n_rows + 1);
        row_ptr.push(0);
        let mut running = 0;
        for count in counts {
            running += count;
            row_ptr.push(running);
        }

        Self::try_new(n_rows, n_cols, row_ptr, col_idx, values)
    }

    /// Returns the number of non-zero elements in the matrix
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Row end-offsets, i.e. `row_ptr[1..]` (merge list A of the merge path)
    pub fn row_end_offsets(&self) -> &[usize] {
        &self.row_ptr[1..]
    }

    /// Number of nonzeros stored in row i
    pub fn row_len(&self, i: usize) -> usize {
        self.row_ptr[i + 1] - self.row_ptr[i]
    }

    /// Returns an iterator over the non-zero elements in row i
    ///
    /// Each item is a tuple (col_idx, value) representing a non-zero element
    pub fn row_iter(&self, i: usize) -> impl Iterator<Item = (usize, &T)> {
        assert!(i < self.n_rows, "Row index out of bounds");

        let start = self.row_ptr[i];
        let end = self.row_ptr[i + 1];

        self.col_idx[start..end]
            .iter()
            .zip(&self.values[start..end])
            .map(|(&col, val)| (col, val))
    }

    /// Creates an identity matrix of the given size
    pub fn identity(n: usize) -> Self {
        Self {
            n_rows: n,
            n_cols: n,
            row_ptr: (0..=n).collect(),
            col_idx: (0..n).collect(),
            values: vec![T::one(); n],
        }
    }

    /// Row-length statistics for reporting
    pub fn stats(&self) -> MatrixStats {
        MatrixStats::from_row_ptr(self.n_rows, self.n_cols, &self.row_ptr)
    }
}

/// Summary of the row-length distribution of a CSR matrix
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixStats {
    pub n_rows: usize,
    pub n_cols: usize,
    pub nnz: usize,
    pub min_row_len: usize,
    pub max_row_len: usize,
    pub mean_row_len: f64,
    pub row_len_std_dev: f64,
    pub empty_rows: usize,
    /// `histogram[0]` counts empty rows, `histogram[k]` rows with length in `[2^(k-1), 2^k)`
    pub histogram: Vec<usize>,
}

impl MatrixStats {
    fn from_row_ptr(n_rows: usize, n_cols: usize, row_ptr: &[usize]) -> Self {
        let nnz = row_ptr[n_rows];
        let lengths = || row_ptr.windows(2).map(|w| w[1] - w[0]);

        let mean = if n_rows == 0 {
            0.0
        } else {
            nnz as f64 / n_rows as f64
        };
        let variance = if n_rows == 0 {
            0.0
        } else {
            lengths()
                .map(|len| {
                    let d = len as f64 - mean;
                    d * d
                })
                .sum::<f64>()
                / n_rows as f64
        };

        let mut histogram = Vec::new();
        for len in lengths() {
            let bucket = (usize::BITS - len.leading_zeros()) as usize;
            if histogram.len() <= bucket {
                histogram.resize(bucket + 1, 0);
            }
            histogram[bucket] += 1;
        }

        Self {
            n_rows,
            n_cols,
            nnz,
            min_row_len: lengths().min().unwrap_or(0),
            max_row_len: lengths().max().unwrap_or(0),
            mean_row_len: mean,
            row_len_std_dev: variance.sqrt(),
            empty_rows: lengths().filter(|&len| len == 0).count(),
            histogram,
        }
    }

    /// Non-empty histogram buckets as `(row lengths, row count)`
    pub fn histogram_buckets(&self) -> impl Iterator<Item = (Range<usize>, usize)> + '_ {
        self.histogram
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(bucket, &count)| {
                let lo = if bucket == 0 { 0 } else { 1usize << (bucket - 1) };
                let hi = 1usize.checked_shl(bucket as u32).unwrap_or(usize::MAX);
                (lo..hi, count)
            })
    }
}

impl fmt::Display for MatrixStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x {}, {} nnz, row length min {} max {} mean {:.2} (std dev {:.2}), {} empty rows",
            self.n_rows,
            self.n_cols,
            self.nnz,
            self.min_row_len,
            self.max_row_len,
            self.mean_row_len,
            self.row_len_std_dev,
            self.empty_rows
        )
    }
}

impl<T: fmt::Debug> fmt::Debug for SparseMatrixCSR<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SparseMatrixCSR {{")?;
        writeln!(f, "  dimensions: {} × {}", self.n_rows, self.n_cols)?;
        writeln!(f, "  nnz: {}", self.values.len())?;

        let max_rows_to_print = MAX_DISPLAY_ROWS.min(self.n_rows);

        if max_rows_to_print > 0 {
            writeln!(f, "  content sample:")?;

            for i in 0..max_rows_to_print {
                write!(f, "    row {}: ", i)?;
                let start = self.row_ptr[i];
                let end = self.row_ptr[i + 1];

                if start == end {
                    writeln!(f, "(empty)")?;
                } else {
                    let max_elements = MAX_DISPLAY_ELEMENTS_PER_ROW.min(end - start);

                    for j in start..(start + max_elements) {
                        write!(f, "({}, {:?}) ", self.col_idx[j], self.values[j])?;
                    }

                    if end - start > max_elements {
                        write!(f, "... ({} more)", end - start - max_elements)?;
                    }

                    writeln!(f)?;
                }
            }

            if self.n_rows > max_rows_to_print {
                writeln!(f, "    ... ({} more rows)", self.n_rows - max_rows_to_print)?;
            }
        }

        write!(f, "}}")
    }
}
