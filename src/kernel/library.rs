//! Library baseline backed by `sprs`

use ndarray::{ArrayView2, ArrayViewMut2};
use rayon::ThreadPool;
use sprs::CsMat;

use crate::error::Result;
use crate::matrix::SparseMatrixCSR;
use crate::scalar::Scalar;

/// Converts our CSR matrix to sprs `CsMat` format.
///
/// sprs requires strictly increasing column indices per row, so each row is
/// sorted and duplicate columns are summed.
pub fn to_sprs_csr<T: Scalar>(matrix: &SparseMatrixCSR<T>) -> CsMat<T> {
    let mut indptr = Vec::with_capacity(matrix.n_rows + 1);
    let mut indices = Vec::with_capacity(matrix.nnz());
    let mut data = Vec::with_capacity(matrix.nnz());
    indptr.push(0);

    let mut row_entries: Vec<(usize, T)> = Vec::new();
    for row in 0..matrix.n_rows {
        row_entries.clear();
        row_entries.extend(matrix.row_iter(row).map(|(col, &val)| (col, val)));
        row_entries.sort_by_key(|&(col, _)| col);

        for &(col, val) in &row_entries {
            if indices.len() > indptr[row] && indices.last() == Some(&col) {
                if let Some(last) = data.last_mut() {
                    *last += val;
                }
            } else {
                indices.push(col);
                data.push(val);
            }
        }
        indptr.push(indices.len());
    }

    CsMat::new((matrix.n_rows, matrix.n_cols), indptr, indices, data)
}

/// `y = A * x` through sprs; `x` and `y` are row-major
pub(crate) fn spmm_library<T: Scalar>(
    pool: &ThreadPool,
    a: &CsMat<T>,
    x: &[T],
    y: &mut [T],
    n_vectors: usize,
) -> Result<()> {
    let x_view = ArrayView2::from_shape((a.cols(), n_vectors), x)?;
    let product = pool.install(|| T::library_multiply(a, &x_view));

    match product.as_slice() {
        Some(dense) => y.copy_from_slice(dense),
        None => ArrayViewMut2::from_shape((a.rows(), n_vectors), y)?.assign(&product),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_sprs_sorts_and_merges() {
        let matrix = SparseMatrixCSR::new(
            2,
            3,
            vec![0, 3, 4],
            vec![2, 0, 2, 1],
            vec![1.0f64, 2.0, 3.0, 4.0],
        );
        let csmat = to_sprs_csr(&matrix);

        assert_eq!(csmat.indptr().as_slice().unwrap(), &[0, 2, 3]);
        assert_eq!(csmat.indices(), &[0, 2, 1]);
        assert_eq!(csmat.data(), &[2.0, 4.0, 4.0]);
    }
}
