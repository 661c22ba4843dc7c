//! # Parallel SpMM kernels
//!
//! [`SpmmEngine`] owns a rayon thread pool sized once from [`KernelConfig`]
//! and runs one of four [`Strategy`] values:
//!
//! - **RowParallel**: naive parallel loop over output rows
//! - **MergePath**: merge-path partition with carry-out fix-up
//! - **NonzeroSplit**: nonzero-split partition with carry-out fix-up
//! - **Library**: `sprs` product, used as the library baseline
//!
//! Kernels always read a row-major input and write a row-major output. When a
//! dense block is declared column-major, the layout adapter stages it through
//! scratch buffers held by [`PreparedKernel`].

pub mod balanced;
pub mod config;
pub mod library;
mod row_parallel;

use std::fmt;
use std::str::FromStr;

use rayon::{ThreadPool, ThreadPoolBuilder};
use sprs::CsMat;
use tracing::info;

pub use balanced::{apply_carry_outs, consume_interval, CarryOut};
pub use config::KernelConfig;
pub use library::to_sprs_csr;

use crate::error::{Result, SpmmError};
use crate::matrix::{transpose_into, DenseBlock, Layout, SparseMatrixCSR};
use crate::partition::PartitionStrategy;
use crate::scalar::Scalar;

/// Which SpMM implementation to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    RowParallel,
    MergePath,
    NonzeroSplit,
    Library,
}

impl Strategy {
    /// Every strategy, in benchmark order
    pub const ALL: [Strategy; 4] = [
        Strategy::RowParallel,
        Strategy::MergePath,
        Strategy::NonzeroSplit,
        Strategy::Library,
    ];

    /// Partition scheme used by the load-balanced strategies
    pub fn partition(&self) -> Option<PartitionStrategy> {
        match self {
            Strategy::MergePath => Some(PartitionStrategy::MergePath),
            Strategy::NonzeroSplit => Some(PartitionStrategy::NonzeroSplit),
            Strategy::RowParallel | Strategy::Library => None,
        }
    }

    /// Human-readable name used in reports
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::RowParallel => "Simple CsrMM",
            Strategy::MergePath => "Merge CsrMM",
            Strategy::NonzeroSplit => "Nonzero splitting CsrMM",
            Strategy::Library => "Library CsrMM",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::RowParallel => "row-parallel",
            Strategy::MergePath => "merge-path",
            Strategy::NonzeroSplit => "nonzero-split",
            Strategy::Library => "library",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Strategy {
    type Err = SpmmError;

    fn from_str(s: &str) -> Result<Self> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.to_string() == s)
            .ok_or_else(|| SpmmError::InvalidArgument(format!("unknown strategy '{}'", s)))
    }
}

/// Thread pool plus configuration shared by every kernel run
pub struct SpmmEngine {
    config: KernelConfig,
    pool: ThreadPool,
}

impl SpmmEngine {
    /// Validates the thread count and builds the worker pool.
    ///
    /// Zero threads, or more than `config.max_threads`, is rejected here so no
    /// kernel ever starts with an unusable configuration.
    pub fn new(config: KernelConfig) -> Result<Self> {
        if config.n_threads == 0 || config.n_threads > config.max_threads {
            return Err(SpmmError::InvalidThreadCount {
                requested: config.n_threads,
                max: config.max_threads,
            });
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(config.n_threads)
            .thread_name(|i| format!("spmm-worker-{}", i))
            .build()
            .map_err(|e| SpmmError::ThreadPool(e.to_string()))?;

        info!(
            threads = config.n_threads,
            procs = num_cpus::get(),
            "SpMM engine ready"
        );
        Ok(Self { config, pool })
    }

    /// Number of worker threads
    pub fn threads(&self) -> usize {
        self.config.n_threads
    }

    /// Performs any per-matrix setup `strategy` needs.
    ///
    /// Only the library baseline does real work here (conversion to `sprs`).
    pub fn prepare<'a, T: Scalar>(
        &'a self,
        strategy: Strategy,
        matrix: &'a SparseMatrixCSR<T>,
    ) -> PreparedKernel<'a, T> {
        let plan = match (strategy, strategy.partition()) {
            (_, Some(partition)) => Plan::Balanced(partition),
            (Strategy::Library, None) => Plan::Library(to_sprs_csr(matrix)),
            (_, None) => Plan::RowParallel,
        };
        PreparedKernel {
            engine: self,
            matrix,
            plan,
            staged_input: Vec::new(),
            staged_output: Vec::new(),
        }
    }

    /// Computes `A * x` into a new block stored in `output_layout`
    pub fn multiply<T: Scalar>(
        &self,
        strategy: Strategy,
        matrix: &SparseMatrixCSR<T>,
        x: &DenseBlock<T>,
        output_layout: Layout,
    ) -> Result<DenseBlock<T>> {
        let mut y = DenseBlock::zeros(matrix.n_rows, x.n_vectors(), output_layout);
        self.prepare(strategy, matrix).run(x, &mut y)?;
        Ok(y)
    }
}

enum Plan<T> {
    RowParallel,
    Balanced(PartitionStrategy),
    Library(CsMat<T>),
}

/// A strategy bound to one matrix, with reusable layout staging buffers
pub struct PreparedKernel<'a, T> {
    engine: &'a SpmmEngine,
    matrix: &'a SparseMatrixCSR<T>,
    plan: Plan<T>,
    staged_input: Vec<T>,
    staged_output: Vec<T>,
}

impl<'a, T: Scalar> PreparedKernel<'a, T> {
    /// Computes `y = A * x` (alpha = 1, beta = 0), overwriting every entry of `y`.
    ///
    /// `x` must be `num_cols × k` and `y` `num_rows × k`, each in any layout.
    pub fn run(&mut self, x: &DenseBlock<T>, y: &mut DenseBlock<T>) -> Result<()> {
        let a = self.matrix;
        check_dim("input block rows", a.n_cols, x.n_rows())?;
        check_dim("output block rows", a.n_rows, y.n_rows())?;
        check_dim("output block vectors", x.n_vectors(), y.n_vectors())?;

        let n_vectors = x.n_vectors();
        if n_vectors == 0 {
            return Ok(());
        }

        let input: &[T] = match x.layout() {
            Layout::RowMajor => x.as_slice(),
            Layout::ColumnMajor => {
                self.staged_input.resize(a.n_cols * n_vectors, T::zero());
                transpose_into(
                    x.as_slice(),
                    Layout::ColumnMajor,
                    &mut self.staged_input,
                    Layout::RowMajor,
                    a.n_cols,
                    n_vectors,
                )?;
                &self.staged_input
            }
        };

        match y.layout() {
            Layout::RowMajor => {
                execute(&self.engine.pool, &self.plan, a, input, y.as_mut_slice(), n_vectors)?;
            }
            Layout::ColumnMajor => {
                self.staged_output.resize(a.n_rows * n_vectors, T::zero());
                execute(&self.engine.pool, &self.plan, a, input, &mut self.staged_output, n_vectors)?;
                transpose_into(
                    &self.staged_output,
                    Layout::RowMajor,
                    y.as_mut_slice(),
                    Layout::ColumnMajor,
                    a.n_rows,
                    n_vectors,
                )?;
            }
        }
        Ok(())
    }
}

fn execute<T: Scalar>(
    pool: &ThreadPool,
    plan: &Plan<T>,
    a: &SparseMatrixCSR<T>,
    x: &[T],
    y: &mut [T],
    n_vectors: usize,
) -> Result<()> {
    match plan {
        Plan::RowParallel => row_parallel::spmm_row_parallel(pool, a, x, y, n_vectors),
        Plan::Balanced(partition) => balanced::spmm_balanced(pool, *partition, a, x, y, n_vectors),
        Plan::Library(csmat) => library::spmm_library(pool, csmat, x, y, n_vectors)?,
    }
    Ok(())
}

fn check_dim(what: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(SpmmError::DimensionMismatch {
            what,
            expected,
            got,
        });
    }
    Ok(())
}
