//! Synthetic matrix generators used by the benchmark driver
//!
//! All generated entries have value one.

use crate::error::{Result, SpmmError};
use crate::matrix::SparseMatrixCSR;
use crate::scalar::Scalar;

/// Adjacency matrix of a `width × width` 2-D lattice (5-point stencil).
///
/// Each vertex links to its north/south/east/west neighbours; `self_loops`
/// adds the diagonal.
pub fn grid2d<T: Scalar>(width: usize, self_loops: bool) -> Result<SparseMatrixCSR<T>> {
    if width == 0 {
        return Err(SpmmError::InvalidArgument("grid2d width must be positive".into()));
    }
    let n = width * width;
    let mut triplets = Vec::with_capacity(n * 5);

    for i in 0..width {
        for j in 0..width {
            let me = i * width + j;
            if i > 0 {
                triplets.push((me, me - width, T::one()));
            }
            if j > 0 {
                triplets.push((me, me - 1, T::one()));
            }
            if self_loops {
                triplets.push((me, me, T::one()));
            }
            if j + 1 < width {
                triplets.push((me, me + 1, T::one()));
            }
            if i + 1 < width {
                triplets.push((me, me + width, T::one()));
            }
        }
    }

    SparseMatrixCSR::from_triplets(n, n, triplets)
}

/// Adjacency matrix of a `width³` 3-D lattice (7-point stencil)
pub fn grid3d<T: Scalar>(width: usize, self_loops: bool) -> Result<SparseMatrixCSR<T>> {
    if width == 0 {
        return Err(SpmmError::InvalidArgument("grid3d width must be positive".into()));
    }
    let plane = width * width;
    let n = plane * width;
    let mut triplets = Vec::with_capacity(n * 7);

    for i in 0..width {
        for j in 0..width {
            for k in 0..width {
                let me = i * plane + j * width + k;
                if i > 0 {
                    triplets.push((me, me - plane, T::one()));
                }
                if j > 0 {
                    triplets.push((me, me - width, T::one()));
                }
                if k > 0 {
                    triplets.push((me, me - 1, T::one()));
                }
                if self_loops {
                    triplets.push((me, me, T::one()));
                }
                if k + 1 < width {
                    triplets.push((me, me + 1, T::one()));
                }
                if j + 1 < width {
                    triplets.push((me, me + width, T::one()));
                }
                if i + 1 < width {
                    triplets.push((me, me + plane, T::one()));
                }
            }
        }
    }

    SparseMatrixCSR::from_triplets(n, n, triplets)
}

/// Wheel graph with `spokes` rim vertices.
///
/// Row 0 is the hub and links to every rim vertex, so it holds `spokes`
/// nonzeros; each rim vertex links to the next one around the rim.
pub fn wheel<T: Scalar>(spokes: usize) -> Result<SparseMatrixCSR<T>> {
    if spokes == 0 {
        return Err(SpmmError::InvalidArgument("wheel needs at least one spoke".into()));
    }
    let n = spokes + 1;
    let mut triplets = Vec::with_capacity(spokes * 2);

    for rim in 1..=spokes {
        triplets.push((0, rim, T::one()));
    }
    for rim in 1..=spokes {
        let next = rim % spokes + 1;
        triplets.push((rim, next, T::one()));
    }

    SparseMatrixCSR::from_triplets(n, n, triplets)
}

/// Fully dense `n_rows × n_cols` matrix stored as CSR
pub fn dense<T: Scalar>(n_rows: usize, n_cols: usize) -> Result<SparseMatrixCSR<T>> {
    if n_rows == 0 || n_cols == 0 {
        return Err(SpmmError::InvalidArgument(
            "dense matrix dimensions must be positive".into(),
        ));
    }
    let row_ptr = (0..=n_rows).map(|r| r * n_cols).collect();
    let col_idx = (0..n_rows).flat_map(|_| 0..n_cols).collect();
    let values = vec![T::one(); n_rows * n_cols];

    SparseMatrixCSR::try_new(n_rows, n_cols, row_ptr, col_idx, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid2d_degrees() {
        let m = grid2d::<f64>(3, false).unwrap();
        assert_eq!(m.n_rows, 9);
        // corners 2, edges 3, centre 4
        let lens: Vec<_> = (0..9).map(|r| m.row_len(r)).collect();
        assert_eq!(lens, vec![2, 3, 2, 3, 4, 3, 2, 3, 2]);
    }

    #[test]
    fn test_grid2d_self_loops() {
        let m = grid2d::<f64>(2, true).unwrap();
        assert_eq!(m.nnz(), 4 * 3);
        assert!(m.row_iter(3).any(|(c, _)| c == 3));
    }

    #[test]
    fn test_grid3d_size() {
        let m = grid3d::<f32>(3, false).unwrap();
        assert_eq!(m.n_rows, 27);
        // 3 * width^2 * (width - 1) undirected edges, stored both ways
        assert_eq!(m.nnz(), 2 * 3 * 9 * 2);
        assert_eq!(m.row_len(13), 6);
    }

    #[test]
    fn test_wheel_hub_row() {
        let m = wheel::<f64>(5).unwrap();
        assert_eq!(m.n_rows, 6);
        assert_eq!(m.row_len(0), 5);
        assert_eq!(m.nnz(), 10);
        let last: Vec<_> = m.row_iter(5).map(|(c, _)| c).collect();
        assert_eq!(last, vec![1]);
    }

    #[test]
    fn test_dense() {
        let m = dense::<f64>(3, 4).unwrap();
        assert_eq!(m.nnz(), 12);
        assert_eq!(m.row_ptr, vec![0, 4, 8, 12]);
        assert!(dense::<f64>(0, 4).is_err());
    }
}
