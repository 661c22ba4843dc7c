//! Integration tests for dense block layouts and the layout adapter

use mergespmm::matrix::transpose_into;
use mergespmm::{DenseBlock, Layout};

#[test]
fn test_storage_order() {
    let block = DenseBlock::from_fn(2, 3, Layout::RowMajor, |r, v| (10 * r + v) as f64);
    assert_eq!(block.as_slice(), &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);

    let col = block.to_layout(Layout::ColumnMajor);
    assert_eq!(col.layout(), Layout::ColumnMajor);
    assert_eq!(col.as_slice(), &[0.0, 10.0, 1.0, 11.0, 2.0, 12.0]);
    assert_eq!(col, block);
}

#[test]
fn test_round_trip_is_exact() {
    let block = DenseBlock::from_fn(17, 5, Layout::ColumnMajor, |r, v| {
        (r as f32 * 0.37).cos() / (v as f32 + 0.3)
    });
    let back = block.to_layout(Layout::RowMajor).to_layout(Layout::ColumnMajor);
    assert_eq!(back.as_slice(), block.as_slice());
}

#[test]
fn test_transpose_into_checks_lengths() {
    let src = vec![1.0f64; 6];
    let mut dst = vec![0.0f64; 5];
    assert!(transpose_into(&src, Layout::RowMajor, &mut dst, Layout::ColumnMajor, 2, 3).is_err());
}

#[test]
fn test_transpose_into_swaps_order() {
    let src = vec![1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0];
    let mut dst = vec![0.0f64; 6];
    transpose_into(&src, Layout::ColumnMajor, &mut dst, Layout::RowMajor, 3, 2).unwrap();
    // Column-major 3 x 2: columns [1, 2, 3] and [4, 5, 6]
    assert_eq!(dst, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
}

#[test]
fn test_single_vector_layouts_share_storage() {
    let row = DenseBlock::from_fn(4, 1, Layout::RowMajor, |r, _| r as f64);
    let col = row.to_layout(Layout::ColumnMajor);
    assert_eq!(row.as_slice(), col.as_slice());
}
