//! SpMM strategy benchmark
//!
//! Loads or generates one sparse matrix, multiplies it by a block of dense
//! vectors with every strategy, verifies each result against the serial
//! reference and reports setup time, average run time, GFLOP/s and effective
//! bandwidth.
//!
//! # Usage
//!
//! ```bash
//! # Matrix Market file, 8 threads, single precision
//! mergespmm --mtx matrix.mtx --threads 8 --fp32
//!
//! # 1000 x 1000 lattice, column-major input, CSV output
//! mergespmm --grid2d 1000 --input-layout col --quiet
//!
//! # Wheel graph with one heavy hub row
//! mergespmm --wheel 1000000 --num-vectors 16 -i 50
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use mergespmm::constants::{DEFAULT_NUM_VECTORS, DENSE_TARGET_NNZ};
use mergespmm::matrix::{generators, read_matrix_market};
use mergespmm::{
    run_benchmark, BenchConfig, KernelConfig, Layout, Scalar, SparseMatrixCSR, SpmmEngine,
};

/// Dense block storage order on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LayoutArg {
    /// Row-major
    Row,
    /// Column-major
    Col,
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Row => Layout::RowMajor,
            LayoutArg::Col => Layout::ColumnMajor,
        }
    }
}

/// Benchmark load-balanced sparse matrix × dense block multiplication
#[derive(Parser, Debug)]
#[command(name = "mergespmm")]
#[command(about = "Compare row-parallel, merge-path, nonzero-split and library SpMM")]
#[command(version)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["mtx", "grid2d", "grid3d", "wheel", "dense"])
))]
struct Args {
    /// Matrix Market file to load
    #[arg(long)]
    mtx: Option<PathBuf>,

    /// Generate a WIDTH x WIDTH 5-point lattice
    #[arg(long, value_name = "WIDTH")]
    grid2d: Option<usize>,

    /// Generate a WIDTH^3 7-point lattice
    #[arg(long, value_name = "WIDTH")]
    grid3d: Option<usize>,

    /// Generate a wheel graph with SPOKES rim vertices
    #[arg(long, value_name = "SPOKES")]
    wheel: Option<usize>,

    /// Generate a dense matrix with COLS columns (and 2^24 / COLS rows)
    #[arg(long, value_name = "COLS")]
    dense: Option<usize>,

    /// Worker threads (defaults to the number of CPUs)
    #[arg(long)]
    threads: Option<usize>,

    /// Timed iterations (derived from the matrix size if omitted)
    #[arg(short, long)]
    iterations: Option<usize>,

    /// Use single precision instead of double
    #[arg(long)]
    fp32: bool,

    /// Scale applied to A * x by the reference
    #[arg(long, default_value_t = 1.0)]
    alpha: f64,

    /// Scale applied to y_in by the reference
    #[arg(long, default_value_t = 0.0)]
    beta: f64,

    /// Number of dense vectors in the block
    #[arg(long, default_value_t = DEFAULT_NUM_VECTORS)]
    num_vectors: usize,

    /// Storage order of the input block
    #[arg(long, value_enum, default_value_t = LayoutArg::Row)]
    input_layout: LayoutArg,

    /// Storage order of the output block
    #[arg(long, value_enum, default_value_t = LayoutArg::Row)]
    output_layout: LayoutArg,

    /// Print one CSV line and only warnings
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Debug logging and a sample of the matrix
    #[arg(short, long)]
    verbose: bool,
}

enum Loaded<T> {
    Matrix { name: String, matrix: SparseMatrixCSR<T> },
    Trivial,
}

fn load_matrix<T: Scalar>(args: &Args) -> Result<Loaded<T>> {
    if let Some(path) = &args.mtx {
        let matrix = read_matrix_market::<T, _>(path)
            .with_context(|| format!("Failed to read Matrix Market file {}", path.display()))?;
        if matrix.n_rows == 1 || matrix.n_cols == 1 || matrix.nnz() == 1 {
            return Ok(Loaded::Trivial);
        }
        return Ok(Loaded::Matrix {
            name: path.display().to_string(),
            matrix,
        });
    }

    let (name, matrix) = if let Some(width) = args.grid2d {
        (format!("grid2d_{}", width), generators::grid2d(width, false)?)
    } else if let Some(width) = args.grid3d {
        (format!("grid3d_{}", width), generators::grid3d(width, false)?)
    } else if let Some(spokes) = args.wheel {
        (format!("wheel_{}", spokes), generators::wheel(spokes)?)
    } else if let Some(cols) = args.dense {
        if cols == 0 || cols > DENSE_TARGET_NNZ {
            bail!("--dense must be between 1 and {}", DENSE_TARGET_NNZ);
        }
        let rows = DENSE_TARGET_NNZ / cols;
        (format!("dense_{}_x_{}", rows, cols), generators::dense(rows, cols)?)
    } else {
        bail!("No matrix source specified");
    };
    Ok(Loaded::Matrix { name, matrix })
}

fn run<T: Scalar>(args: &Args) -> Result<()> {
    let (name, matrix) = match load_matrix::<T>(args)? {
        Loaded::Matrix { name, matrix } => (name, matrix),
        Loaded::Trivial => {
            if !args.quiet {
                println!("Trivial dataset");
            }
            return Ok(());
        }
    };

    let kernel_config = match args.threads {
        Some(n) => KernelConfig::with_threads(n),
        None => KernelConfig::default(),
    };
    let engine = SpmmEngine::new(kernel_config).context("Failed to start SpMM engine")?;

    let config = BenchConfig {
        num_vectors: args.num_vectors,
        iterations: args.iterations,
        alpha: args.alpha,
        beta: args.beta,
        input_layout: args.input_layout.into(),
        output_layout: args.output_layout.into(),
        ..BenchConfig::default()
    };

    tracing::info!("Matrix: {}", name);
    let report = run_benchmark(&engine, &matrix, &config)
        .with_context(|| format!("Benchmark failed on {}", name))?;

    if args.quiet {
        let fields: String = report
            .results
            .iter()
            .map(|result| result.csv_fields())
            .collect();
        println!("{}, {}", name, fields.trim_end_matches(&[',', ' '][..]));
    } else {
        println!("{}", name);
        println!("  {}", report.stats);
        println!("  row length histogram:");
        for (lengths, count) in report.stats.histogram_buckets() {
            println!("    [{}, {}): {}", lengths.start, lengths.end, count);
        }
        if args.verbose {
            println!("{:?}", matrix);
        }
        println!("  {} timing iterations, {} threads", report.iterations, engine.threads());
        for result in &report.results {
            let status = if result.verification.passed() { "PASS" } else { "FAIL" };
            println!("{}: {}", result.strategy.label(), status);
            println!("  {}", result);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.quiet {
        "warn"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    if args.fp32 {
        run::<f32>(&args)
    } else {
        run::<f64>(&args)
    }
}
