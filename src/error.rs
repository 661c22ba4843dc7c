//! Error types for mergespmm

use thiserror::Error;

/// Result type alias using the crate's error
pub type Result<T> = std::result::Result<T, SpmmError>;

/// Errors raised before any parallel work starts, or while loading matrices
#[derive(Error, Debug)]
pub enum SpmmError {
    /// CSR structure violates its invariants
    #[error("Invalid CSR matrix: {reason}")]
    InvalidMatrix {
        /// What was wrong
        reason: String,
    },

    /// Operand shapes do not line up
    #[error("Dimension mismatch for {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Which quantity disagreed
        what: &'static str,
        /// Expected size
        expected: usize,
        /// Actual size
        got: usize,
    },

    /// Thread count is zero or exceeds the configured cap
    #[error("Invalid thread count {requested} (must be in 1..={max})")]
    InvalidThreadCount {
        /// Requested worker count
        requested: usize,
        /// Configured maximum
        max: usize,
    },

    /// A dense buffer could not be viewed with the requested shape
    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// The worker pool could not be built
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(String),

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed Matrix Market content
    #[error("Parse error at line {line}: {reason}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What failed to parse
        reason: String,
    },

    /// Misconfigured generator or driver argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl SpmmError {
    pub(crate) fn invalid_matrix(reason: impl Into<String>) -> Self {
        SpmmError::InvalidMatrix {
            reason: reason.into(),
        }
    }
}
