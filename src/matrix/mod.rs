//! Matrix data structures, matrix sources and the serial reference

pub mod csr;
pub mod dense;
pub mod generators;
pub mod market;
pub mod reference;

pub use csr::{MatrixStats, SparseMatrixCSR};
pub use dense::{transpose_into, DenseBlock, Layout};
pub use market::{parse_matrix_market, read_matrix_market};
pub use reference::{reference_spmm, reference_spmv, verify_first_vector, RowMismatch, Verification};
