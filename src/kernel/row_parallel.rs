//! Naive row-parallel SpMM: one output row per parallel task

use rayon::prelude::*;
use rayon::ThreadPool;

use super::balanced::accumulate;
use crate::matrix::SparseMatrixCSR;
use crate::scalar::Scalar;

/// `y = A * x` with rows distributed by rayon; no load balancing across nonzeros.
///
/// Same row-major conventions as the balanced kernel.
pub(crate) fn spmm_row_parallel<T: Scalar>(
    pool: &ThreadPool,
    a: &SparseMatrixCSR<T>,
    x: &[T],
    y: &mut [T],
    n_vectors: usize,
) {
    pool.install(|| {
        y.par_chunks_mut(n_vectors)
            .enumerate()
            .for_each(|(row, out_row)| {
                out_row.fill(T::zero());
                accumulate(a, x, a.row_ptr[row]..a.row_ptr[row + 1], out_row);
            });
    });
}
