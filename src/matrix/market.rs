//! Matrix Market coordinate-format reader

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use num_traits::NumCast;
use tracing::debug;

use crate::error::{Result, SpmmError};
use crate::matrix::SparseMatrixCSR;
use crate::scalar::Scalar;

/// Header information taken from the `%%MatrixMarket` banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Banner {
    pattern: bool,
    symmetric: bool,
}

impl Banner {
    fn parse(line: &str) -> Self {
        let lower = line.to_ascii_lowercase();
        let fields: Vec<&str> = lower.split_whitespace().collect();
        Self {
            pattern: fields.contains(&"pattern"),
            symmetric: fields
                .iter()
                .any(|f| matches!(*f, "symmetric" | "skew-symmetric" | "hermitian")),
        }
    }
}

/// Reads a matrix in Matrix Market coordinate format.
///
/// Indices are 1-based in the file. Pattern matrices get unit values and
/// symmetric matrices are expanded by mirroring off-diagonal entries.
pub fn read_matrix_market<T: Scalar, P: AsRef<Path>>(path: P) -> Result<SparseMatrixCSR<T>> {
    let file = File::open(path.as_ref())?;
    parse_matrix_market(BufReader::new(file))
}

/// Parses Matrix Market content from any buffered reader
pub fn parse_matrix_market<T: Scalar, R: BufRead>(reader: R) -> Result<SparseMatrixCSR<T>> {
    let mut banner = Banner::default();
    let mut header: Option<(usize, usize, usize)> = None;
    let mut triplets: Vec<(usize, usize, T)> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let trimmed = line.trim();

        if trimmed.starts_with("%%MatrixMarket") {
            banner = Banner::parse(trimmed);
            continue;
        }
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }

        let parts: Vec<&str> = trimmed.split_whitespace().collect();

        let Some((n_rows, n_cols, _)) = header else {
            // Parse header: rows cols nnz
            if parts.len() != 3 {
                return Err(parse_error(line_no, "invalid Matrix Market size line"));
            }
            let n_rows = parse_usize(parts[0], line_no, "number of rows")?;
            let n_cols = parse_usize(parts[1], line_no, "number of columns")?;
            let nnz = parse_usize(parts[2], line_no, "number of non-zeros")?;
            let capacity = if banner.symmetric { nnz * 2 } else { nnz };
            triplets.reserve(capacity);
            header = Some((n_rows, n_cols, nnz));
            continue;
        };

        if parts.len() < 2 {
            return Err(parse_error(line_no, "entry needs row and column"));
        }

        let row = parse_index(parts[0], line_no, "row index", n_rows)?;
        let col = parse_index(parts[1], line_no, "column index", n_cols)?;

        let val: T = if banner.pattern || parts.len() < 3 {
            T::one()
        } else {
            let raw: f64 = parts[2]
                .parse()
                .map_err(|_| parse_error(line_no, "invalid value"))?;
            <T as NumCast>::from(raw).ok_or_else(|| parse_error(line_no, "value not representable"))?
        };

        triplets.push((row, col, val));
        if banner.symmetric && row != col {
            triplets.push((col, row, val));
        }
    }

    let (n_rows, n_cols, declared_nnz) =
        header.ok_or_else(|| parse_error(0, "missing Matrix Market size line"))?;
    debug!(
        n_rows,
        n_cols,
        declared_nnz,
        stored = triplets.len(),
        symmetric = banner.symmetric,
        pattern = banner.pattern,
        "parsed Matrix Market file"
    );

    SparseMatrixCSR::from_triplets(n_rows, n_cols, triplets)
}

fn parse_error(line: usize, reason: &str) -> SpmmError {
    SpmmError::Parse {
        line,
        reason: reason.to_string(),
    }
}

fn parse_usize(field: &str, line: usize, what: &str) -> Result<usize> {
    field
        .parse::<usize>()
        .map_err(|_| parse_error(line, &format!("invalid {}", what)))
}

/// Converts a 1-based index to 0-based, checking it against `bound`
fn parse_index(field: &str, line: usize, what: &str, bound: usize) -> Result<usize> {
    let one_based = parse_usize(field, line, what)?;
    if one_based == 0 || one_based > bound {
        return Err(parse_error(line, &format!("{} {} out of range", what, one_based)));
    }
    Ok(one_based - 1)
}
