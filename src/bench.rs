//! Benchmark driver
//!
//! Runs each requested [`Strategy`] against one matrix: setup, verification
//! against the serial reference, cache warming, then a timed loop. The caller
//! decides how to print the resulting [`PerfReport`]s.

use std::fmt;
use std::mem::size_of;
use std::time::Instant;

use num_traits::NumCast;
use tracing::{debug, info, warn};

use crate::constants::{
    DEFAULT_NUM_VECTORS, DEFAULT_VERIFY_TOLERANCE, INPUT_FILL_VALUE, MAX_TIMING_ITERATIONS,
    MIN_TIMING_ITERATIONS, TARGET_TIMED_PRODUCTS, Y_IN_FILL_VALUE,
};
use crate::error::{Result, SpmmError};
use crate::kernel::{SpmmEngine, Strategy};
use crate::matrix::{
    reference_spmv, verify_first_vector, DenseBlock, Layout, MatrixStats, SparseMatrixCSR,
    Verification,
};
use crate::scalar::Scalar;

/// Parameters of one benchmark run
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    /// Width of the dense input block
    pub num_vectors: usize,
    /// Timed iterations; derived from the matrix size when `None`
    pub iterations: Option<usize>,
    /// Scale applied to `A * x` by the reference
    pub alpha: f64,
    /// Scale applied to `y_in` by the reference
    pub beta: f64,
    pub input_layout: Layout,
    pub output_layout: Layout,
    /// Absolute verification tolerance
    pub tolerance: f64,
    /// Strategies to run, in order
    pub strategies: Vec<Strategy>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            num_vectors: DEFAULT_NUM_VECTORS,
            iterations: None,
            alpha: 1.0,
            beta: 0.0,
            input_layout: Layout::RowMajor,
            output_layout: Layout::RowMajor,
            tolerance: DEFAULT_VERIFY_TOLERANCE,
            strategies: Strategy::ALL.to_vec(),
        }
    }
}

impl BenchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_vectors == 0 {
            return Err(SpmmError::InvalidArgument(
                "number of vectors must be positive".into(),
            ));
        }
        if self.iterations == Some(0) {
            return Err(SpmmError::InvalidArgument(
                "timing iterations must be positive".into(),
            ));
        }
        if !(self.tolerance >= 0.0) {
            return Err(SpmmError::InvalidArgument(format!(
                "invalid verification tolerance {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Iterations needed to push roughly 16 Gi nonzero-vector products through,
/// clamped to `[10, 1000]`.
pub fn timing_iterations(num_nonzeros: usize, num_vectors: usize) -> usize {
    let work = (num_nonzeros as u64).saturating_mul(num_vectors as u64);
    if work == 0 {
        return MAX_TIMING_ITERATIONS;
    }
    let wanted = (TARGET_TIMED_PRODUCTS / work).min(MAX_TIMING_ITERATIONS as u64) as usize;
    wanted.max(MIN_TIMING_ITERATIONS)
}

/// Timing and verification outcome of one strategy
#[derive(Debug, Clone)]
pub struct PerfReport {
    pub strategy: Strategy,
    /// `fp32` or `fp64`
    pub precision: &'static str,
    pub setup_ms: f64,
    pub avg_ms: f64,
    pub gflops: f64,
    pub effective_bandwidth_gbs: f64,
    pub verification: Verification,
}

impl PerfReport {
    /// Derives throughput figures from an average run time.
    ///
    /// Bytes moved per run count each nonzero's value, column index and one
    /// input value, plus each output row's offset and values.
    pub fn new<T: Scalar>(
        strategy: Strategy,
        setup_ms: f64,
        avg_ms: f64,
        matrix: &SparseMatrixCSR<T>,
        num_vectors: usize,
        verification: Verification,
    ) -> Self {
        let nnz = matrix.nnz() as f64;
        let rows = matrix.n_rows as f64;
        let vectors = num_vectors as f64;
        let value_bytes = size_of::<T>() as f64;
        let offset_bytes = size_of::<usize>() as f64;

        let total_bytes =
            nnz * (2.0 * value_bytes + offset_bytes) + rows * vectors * (offset_bytes + value_bytes);

        Self {
            strategy,
            precision: T::NAME,
            setup_ms,
            avg_ms,
            gflops: 2.0 * nnz * vectors / avg_ms / 1.0e6,
            effective_bandwidth_gbs: total_bytes / avg_ms / 1.0e6,
            verification,
        }
    }

    /// Comma-separated fields for quiet output
    pub fn csv_fields(&self) -> String {
        format!(
            "{:.5}, {:.5}, {:.6}, {:.3}, ",
            self.setup_ms, self.avg_ms, self.gflops, self.effective_bandwidth_gbs
        )
    }
}

impl fmt::Display for PerfReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.4} setup ms, {:.4} avg ms, {:.5} gflops, {:.3} effective GB/s",
            self.precision, self.setup_ms, self.avg_ms, self.gflops, self.effective_bandwidth_gbs
        )
    }
}

/// Everything measured for one matrix
#[derive(Debug, Clone)]
pub struct BenchReport {
    pub stats: MatrixStats,
    pub iterations: usize,
    pub results: Vec<PerfReport>,
}

fn cast<T: Scalar>(value: f64, what: &str) -> Result<T> {
    <T as NumCast>::from(value)
        .ok_or_else(|| SpmmError::InvalidArgument(format!("{} {} not representable", what, value)))
}

/// Benchmarks every strategy in `config` on `matrix`.
///
/// A verification failure is recorded in the report and logged; it never aborts the run.
pub fn run_benchmark<T: Scalar>(
    engine: &SpmmEngine,
    matrix: &SparseMatrixCSR<T>,
    config: &BenchConfig,
) -> Result<BenchReport> {
    config.validate()?;

    let stats = matrix.stats();
    info!("{}", stats);
    debug!(histogram = ?stats.histogram, "row length histogram (log2 buckets)");

    let num_vectors = config.num_vectors;
    let iterations = config
        .iterations
        .unwrap_or_else(|| timing_iterations(matrix.nnz(), num_vectors));
    info!(
        iterations,
        num_vectors,
        threads = engine.threads(),
        input_layout = %config.input_layout,
        output_layout = %config.output_layout,
        "starting benchmark"
    );

    let alpha: T = cast(config.alpha, "alpha")?;
    let beta: T = cast(config.beta, "beta")?;
    if config.alpha != 1.0 || config.beta != 0.0 {
        warn!(
            alpha = config.alpha,
            beta = config.beta,
            "kernels compute alpha = 1, beta = 0; verification uses the requested scaling"
        );
    }

    let fill: T = cast(INPUT_FILL_VALUE, "input fill")?;
    let x = DenseBlock::filled(matrix.n_cols, num_vectors, config.input_layout, fill);
    let y_in = vec![cast::<T>(Y_IN_FILL_VALUE, "y_in fill")?; matrix.n_rows];
    let reference = reference_spmv(matrix, &x.column(0), &y_in, alpha, beta)?;

    let mut y = DenseBlock::zeros(matrix.n_rows, num_vectors, config.output_layout);
    let mut results = Vec::with_capacity(config.strategies.len());

    for &strategy in &config.strategies {
        info!(strategy = strategy.label(), "benchmarking");

        let setup_start = Instant::now();
        let mut kernel = engine.prepare(strategy, matrix);
        let setup_ms = setup_start.elapsed().as_secs_f64() * 1e3;

        // Stale values must not pass verification
        y.fill(T::nan());
        kernel.run(&x, &mut y)?;
        let verification = verify_first_vector(&reference, &y, config.tolerance);
        if verification.passed() {
            info!(strategy = %strategy, "PASS");
        } else {
            warn!(
                strategy = %strategy,
                mismatches = verification.mismatches.len(),
                "FAIL"
            );
        }

        for _ in 0..iterations {
            kernel.run(&x, &mut y)?;
        }

        let timed_start = Instant::now();
        for _ in 0..iterations {
            kernel.run(&x, &mut y)?;
        }
        let avg_ms = timed_start.elapsed().as_secs_f64() * 1e3 / iterations as f64;
        debug!(strategy = %strategy, setup_ms, avg_ms, "timed");

        results.push(PerfReport::new(
            strategy,
            setup_ms,
            avg_ms,
            matrix,
            num_vectors,
            verification,
        ));
    }

    Ok(BenchReport {
        stats,
        iterations,
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::KernelConfig;
    use crate::matrix::generators;

    #[test]
    fn test_timing_iterations_clamped() {
        assert_eq!(timing_iterations(1, 1), MAX_TIMING_ITERATIONS);
        assert_eq!(timing_iterations(1 << 30, 32), MIN_TIMING_ITERATIONS);
        // 16 Gi / (2^24 * 32) = 32
        assert_eq!(timing_iterations(1 << 24, 32), 32);
        assert_eq!(timing_iterations(0, 32), MAX_TIMING_ITERATIONS);
    }

    #[test]
    fn test_perf_report_formulas() {
        let a = SparseMatrixCSR::<f64>::identity(4);
        let v = Verification {
            rows_checked: 4,
            tolerance: 1e-6,
            mismatches: Vec::new(),
        };
        let report = PerfReport::new(Strategy::MergePath, 0.5, 2.0, &a, 8, v);

        assert_eq!(report.precision, "fp64");
        assert!((report.gflops - 2.0 * 4.0 * 8.0 / 2.0 / 1e6).abs() < 1e-15);
        let bytes = 4.0 * (16.0 + 8.0) + 4.0 * 8.0 * (8.0 + 8.0);
        assert!((report.effective_bandwidth_gbs - bytes / 2.0 / 1e6).abs() < 1e-15);
        assert!(report.to_string().starts_with("fp64: 0.5000 setup ms, 2.0000 avg ms"));
    }

    #[test]
    fn test_config_validation() {
        assert!(BenchConfig::default().validate().is_ok());
        let bad = BenchConfig {
            num_vectors: 0,
            ..BenchConfig::default()
        };
        assert!(bad.validate().is_err());
        let bad = BenchConfig {
            iterations: Some(0),
            ..BenchConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_benchmark_all_strategies_pass() {
        let engine = SpmmEngine::new(KernelConfig::with_threads(3)).unwrap();
        let a = generators::wheel::<f64>(20).unwrap();
        let config = BenchConfig {
            num_vectors: 4,
            iterations: Some(2),
            input_layout: Layout::ColumnMajor,
            ..BenchConfig::default()
        };

        let report = run_benchmark(&engine, &a, &config).unwrap();
        assert_eq!(report.iterations, 2);
        assert_eq!(report.results.len(), 4);
        for result in &report.results {
            assert!(result.verification.passed(), "{} failed", result.strategy);
        }
    }

    #[test]
    fn test_benchmark_with_beta_reports_failure() {
        let engine = SpmmEngine::new(KernelConfig::with_threads(2)).unwrap();
        let a = generators::grid2d::<f32>(4, false).unwrap();
        let config = BenchConfig {
            num_vectors: 2,
            iterations: Some(1),
            beta: 1.0,
            strategies: vec![Strategy::MergePath],
            ..BenchConfig::default()
        };

        let report = run_benchmark(&engine, &a, &config).unwrap();
        assert!(!report.results[0].verification.passed());
    }
}
