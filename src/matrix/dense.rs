//! Dense multi-vector blocks and the row-major / column-major layout adapter

use std::fmt;

use aligned_vec::AVec;
use ndarray::{ArrayView2, ArrayViewMut2, ShapeBuilder};

use crate::constants::DENSE_BLOCK_ALIGNMENT;
use crate::error::{Result, SpmmError};
use crate::scalar::Scalar;

/// Storage order of a dense `rows × vectors` block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Components of one row are contiguous (`data[row * n_vectors + v]`)
    RowMajor,
    /// One vector is contiguous across rows (`data[v * n_rows + row]`)
    ColumnMajor,
}

impl Layout {
    #[inline]
    fn offset(self, row: usize, vector: usize, n_rows: usize, n_vectors: usize) -> usize {
        match self {
            Layout::RowMajor => row * n_vectors + vector,
            Layout::ColumnMajor => vector * n_rows + row,
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::RowMajor => write!(f, "row-major"),
            Layout::ColumnMajor => write!(f, "column-major"),
        }
    }
}

/// A `n_rows × n_vectors` table of values in a declared [`Layout`].
///
/// Used both for the kernel input (`num_cols × num_vectors`) and output
/// (`num_rows × num_vectors`). Storage is cache-line aligned.
#[derive(Clone)]
pub struct DenseBlock<T> {
    n_rows: usize,
    n_vectors: usize,
    layout: Layout,
    data: AVec<T>,
}

impl<T: Scalar> DenseBlock<T> {
    /// A block with every entry set to `value`
    pub fn filled(n_rows: usize, n_vectors: usize, layout: Layout, value: T) -> Self {
        Self {
            n_rows,
            n_vectors,
            layout,
            data: AVec::from_iter(
                DENSE_BLOCK_ALIGNMENT,
                std::iter::repeat(value).take(n_rows * n_vectors),
            ),
        }
    }

    /// A zero-initialized block
    pub fn zeros(n_rows: usize, n_vectors: usize, layout: Layout) -> Self {
        Self::filled(n_rows, n_vectors, layout, T::zero())
    }

    /// Builds a block whose entry `(row, vector)` is `f(row, vector)`
    pub fn from_fn(
        n_rows: usize,
        n_vectors: usize,
        layout: Layout,
        mut f: impl FnMut(usize, usize) -> T,
    ) -> Self {
        let mut block = Self::zeros(n_rows, n_vectors, layout);
        for row in 0..n_rows {
            for vector in 0..n_vectors {
                block.set(row, vector, f(row, vector));
            }
        }
        block
    }

    /// Wraps storage that is already laid out in `layout`
    pub fn from_vec(n_rows: usize, n_vectors: usize, layout: Layout, data: Vec<T>) -> Result<Self> {
        if data.len() != n_rows * n_vectors {
            return Err(SpmmError::DimensionMismatch {
                what: "dense block storage",
                expected: n_rows * n_vectors,
                got: data.len(),
            });
        }
        Ok(Self {
            n_rows,
            n_vectors,
            layout,
            data: AVec::from_iter(DENSE_BLOCK_ALIGNMENT, data),
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_vectors(&self) -> usize {
        self.n_vectors
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[inline]
    pub fn get(&self, row: usize, vector: usize) -> T {
        self.data[self.layout.offset(row, vector, self.n_rows, self.n_vectors)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, vector: usize, value: T) {
        let idx = self.layout.offset(row, vector, self.n_rows, self.n_vectors);
        self.data[idx] = value;
    }

    /// Overwrites every entry with `value`
    pub fn fill(&mut self, value: T) {
        self.data.iter_mut().for_each(|v| *v = value);
    }

    /// Copy of vector `vector` across all rows
    pub fn column(&self, vector: usize) -> Vec<T> {
        (0..self.n_rows).map(|row| self.get(row, vector)).collect()
    }

    /// Logical `n_rows × n_vectors` view, independent of storage order
    pub fn view(&self) -> ArrayView2<'_, T> {
        // Length is fixed at construction, so the shape always matches.
        logical_view(&self.data, self.n_rows, self.n_vectors, self.layout)
            .unwrap_or_else(|_| unreachable!("dense block storage length is n_rows * n_vectors"))
    }

    /// Layout adapter: returns a copy stored in `layout` with identical values
    pub fn to_layout(&self, layout: Layout) -> DenseBlock<T> {
        if layout == self.layout {
            return self.clone();
        }
        let mut out = Self::zeros(self.n_rows, self.n_vectors, layout);
        out.view_mut().assign(&self.view());
        out
    }

    fn view_mut(&mut self) -> ArrayViewMut2<'_, T> {
        logical_view_mut(&mut self.data, self.n_rows, self.n_vectors, self.layout)
            .unwrap_or_else(|_| unreachable!("dense block storage length is n_rows * n_vectors"))
    }
}

impl<T: Scalar> fmt::Debug for DenseBlock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DenseBlock")
            .field("n_rows", &self.n_rows)
            .field("n_vectors", &self.n_vectors)
            .field("layout", &self.layout)
            .field("data", &self.view())
            .finish()
    }
}

impl<T: Scalar> PartialEq for DenseBlock<T> {
    /// Logical equality: same shape and same values, storage order ignored
    fn eq(&self, other: &Self) -> bool {
        self.n_rows == other.n_rows && self.n_vectors == other.n_vectors && self.view() == other.view()
    }
}

fn logical_view<T>(
    data: &[T],
    n_rows: usize,
    n_vectors: usize,
    layout: Layout,
) -> Result<ArrayView2<'_, T>> {
    let view = match layout {
        Layout::RowMajor => ArrayView2::from_shape((n_rows, n_vectors), data)?,
        Layout::ColumnMajor => ArrayView2::from_shape((n_rows, n_vectors).f(), data)?,
    };
    Ok(view)
}

fn logical_view_mut<T>(
    data: &mut [T],
    n_rows: usize,
    n_vectors: usize,
    layout: Layout,
) -> Result<ArrayViewMut2<'_, T>> {
    let view = match layout {
        Layout::RowMajor => ArrayViewMut2::from_shape((n_rows, n_vectors), data)?,
        Layout::ColumnMajor => ArrayViewMut2::from_shape((n_rows, n_vectors).f(), data)?,
    };
    Ok(view)
}

/// Copies a raw `n_rows × n_vectors` buffer between storage orders.
///
/// Used by the kernels to stage column-major input into row-major scratch
/// and to write row-major scratch into a column-major output block.
pub fn transpose_into<T: Scalar>(
    src: &[T],
    src_layout: Layout,
    dst: &mut [T],
    dst_layout: Layout,
    n_rows: usize,
    n_vectors: usize,
) -> Result<()> {
    let src_view = logical_view(src, n_rows, n_vectors, src_layout)?;
    let mut dst_view = logical_view_mut(dst, n_rows, n_vectors, dst_layout)?;
    dst_view.assign(&src_view);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_follow_layout() {
        let row_major = DenseBlock::<f64>::from_fn(2, 3, Layout::RowMajor, |r, v| (r * 10 + v) as f64);
        assert_eq!(row_major.as_slice(), &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);

        let col_major = row_major.to_layout(Layout::ColumnMajor);
        assert_eq!(col_major.as_slice(), &[0.0, 10.0, 1.0, 11.0, 2.0, 12.0]);
        assert_eq!(col_major.get(1, 2), 12.0);
        assert_eq!(col_major, row_major);
    }

    #[test]
    fn test_layout_roundtrip_is_exact() {
        let block = DenseBlock::<f32>::from_fn(5, 4, Layout::ColumnMajor, |r, v| {
            (r as f32 + 0.1) * (v as f32 - 1.7)
        });
        let back = block.to_layout(Layout::RowMajor).to_layout(Layout::ColumnMajor);
        assert_eq!(back.as_slice(), block.as_slice());
    }

    #[test]
    fn test_transpose_into() {
        let src = [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0]; // 3 rows x 2 vectors, row-major
        let mut dst = [0.0f64; 6];
        transpose_into(&src, Layout::RowMajor, &mut dst, Layout::ColumnMajor, 3, 2).unwrap();
        assert_eq!(dst, [1.0, 3.0, 5.0, 2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(DenseBlock::<f64>::from_vec(2, 2, Layout::RowMajor, vec![0.0; 3]).is_err());
    }

    #[test]
    fn test_column_extracts_vector() {
        let block = DenseBlock::<f64>::from_fn(3, 2, Layout::ColumnMajor, |r, v| (r + v * 100) as f64);
        assert_eq!(block.column(1), vec![100.0, 101.0, 102.0]);
    }
}
