//! # mergespmm: load-balanced sparse matrix × dense block multiplication
//!
//! Multiplies a CSR sparse matrix by a block of dense vectors (SpMM) on a
//! multicore CPU and benchmarks the alternatives against each other.
//!
//! ## Overview
//!
//! Four strategies are available through [`SpmmEngine`]:
//!
//! - **Row parallel**: one parallel task per output row
//! - **Merge path**: threads split the merged sequence of row boundaries and
//!   nonzeros evenly, so one very long row cannot stall a single thread
//! - **Nonzero split**: threads split the nonzeros evenly
//! - **Library**: the `sprs` sparse × dense product, as a baseline
//!
//! The load-balanced strategies let a row straddle several threads. Each
//! thread hands back the partial sums of the row it stopped in (its carry-out)
//! and a serial fix-up pass adds them into the output.
//!
//! ## Usage
//!
//! ```
//! use mergespmm::{DenseBlock, KernelConfig, Layout, SparseMatrixCSR, SpmmEngine, Strategy};
//!
//! let a = SparseMatrixCSR::<f64>::new(
//!     4, 4,
//!     vec![0, 2, 2, 4, 6],
//!     vec![0, 1, 0, 2, 1, 3],
//!     vec![1.0, 1.0, 2.0, 1.0, 3.0, 1.0],
//! );
//! let x = DenseBlock::filled(4, 2, Layout::RowMajor, 1.0);
//!
//! let engine = SpmmEngine::new(KernelConfig::with_threads(3)).unwrap();
//! let y = engine.multiply(Strategy::MergePath, &a, &x, Layout::ColumnMajor).unwrap();
//! assert_eq!(y.column(1), vec![2.0, 0.0, 3.0, 4.0]);
//! ```

pub mod bench;
pub mod constants;
pub mod error;
pub mod kernel;
pub mod matrix;
pub mod partition;
pub mod scalar;

// Re-export primary components
pub use bench::{run_benchmark, timing_iterations, BenchConfig, BenchReport, PerfReport};
pub use error::{Result, SpmmError};
pub use kernel::{KernelConfig, PreparedKernel, SpmmEngine, Strategy};
pub use matrix::{
    reference_spmm, reference_spmv, verify_first_vector, DenseBlock, Layout, MatrixStats,
    SparseMatrixCSR, Verification,
};
pub use partition::{plan_partition, MergeCoordinate, PartitionStrategy, ThreadWork};
pub use scalar::Scalar;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
