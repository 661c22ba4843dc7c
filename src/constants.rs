//! Centralized constants for the mergespmm kernels and benchmark driver
//!
//! All new constants should be added here rather than scattered throughout the code.

// ============================================================================
// THREADING
// ============================================================================

/// Default upper bound on worker threads accepted by the engine
pub const DEFAULT_MAX_THREADS: usize = 256;

// ============================================================================
// DENSE BLOCKS
// ============================================================================

/// Byte alignment of dense block storage
pub const DENSE_BLOCK_ALIGNMENT: usize = 64;

/// Default number of right-hand-side vectors
pub const DEFAULT_NUM_VECTORS: usize = 32;

// ============================================================================
// VERIFICATION
// ============================================================================

/// Absolute tolerance when comparing a kernel against the serial reference
pub const DEFAULT_VERIFY_TOLERANCE: f64 = 1e-6;

/// Number of mismatched rows reported through the log before summarizing
pub const MAX_LOGGED_MISMATCHES: usize = 10;

// ============================================================================
// BENCHMARK DRIVER
// ============================================================================

/// Total nonzero-vector products a timed run aims to push through (16 Gi)
pub const TARGET_TIMED_PRODUCTS: u64 = 16 << 30;

/// Lower bound on timing iterations
pub const MIN_TIMING_ITERATIONS: usize = 10;

/// Upper bound on timing iterations
pub const MAX_TIMING_ITERATIONS: usize = 1000;

/// Value every input vector component is initialized to
pub const INPUT_FILL_VALUE: f64 = 10.0;

/// Value the `y_in` vector of the reference kernel is initialized to
pub const Y_IN_FILL_VALUE: f64 = 1.0;

/// Nonzeros targeted by the dense generator (`rows = DENSE_TARGET_NNZ / cols`)
pub const DENSE_TARGET_NNZ: usize = 1 << 24;

// ============================================================================
// DISPLAY AND DEBUG CONSTANTS
// ============================================================================

/// Maximum number of rows to display in debug output
pub const MAX_DISPLAY_ROWS: usize = 5;

/// Maximum number of elements per row to display in debug output
pub const MAX_DISPLAY_ELEMENTS_PER_ROW: usize = 5;
