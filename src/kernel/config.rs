//! Configuration for the SpMM engine

use crate::constants::DEFAULT_MAX_THREADS;

/// Threading parameters, fixed for the lifetime of an engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelConfig {
    /// Number of worker threads (and of partition intervals)
    pub n_threads: usize,
    /// Largest thread count the engine accepts
    pub max_threads: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            n_threads: num_cpus::get().min(DEFAULT_MAX_THREADS), // Use all available cores
            max_threads: DEFAULT_MAX_THREADS,
        }
    }
}

impl KernelConfig {
    /// Default configuration with an explicit worker count
    pub fn with_threads(n_threads: usize) -> Self {
        Self {
            n_threads,
            ..Self::default()
        }
    }
}
