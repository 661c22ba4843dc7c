//! Integration tests for the SpMM strategies

use mergespmm::kernel::{apply_carry_outs, consume_interval};
use mergespmm::matrix::generators;
use mergespmm::{
    plan_partition, reference_spmm, DenseBlock, KernelConfig, Layout, PartitionStrategy,
    SparseMatrixCSR, SpmmEngine, SpmmError, Strategy,
};

const LAYOUTS: [Layout; 2] = [Layout::RowMajor, Layout::ColumnMajor];

/// 4 × 4 matrix with an empty row:
/// [1 1 0 0]
/// [0 0 0 0]
/// [2 0 1 0]
/// [0 3 0 1]
fn scenario_matrix() -> SparseMatrixCSR<f64> {
    SparseMatrixCSR::new(
        4,
        4,
        vec![0, 2, 2, 4, 6],
        vec![0, 1, 0, 2, 1, 3],
        vec![1.0, 1.0, 2.0, 1.0, 3.0, 1.0],
    )
}

fn engine(threads: usize) -> SpmmEngine {
    SpmmEngine::new(KernelConfig::with_threads(threads)).unwrap()
}

fn assert_close(actual: &DenseBlock<f64>, expected: &DenseBlock<f64>, tol: f64) {
    assert_eq!(actual.n_rows(), expected.n_rows());
    assert_eq!(actual.n_vectors(), expected.n_vectors());
    for r in 0..actual.n_rows() {
        for v in 0..actual.n_vectors() {
            let (a, e) = (actual.get(r, v), expected.get(r, v));
            assert!(
                (a - e).abs() <= tol,
                "row {} vector {}: got {}, expected {}",
                r,
                v,
                a,
                e
            );
        }
    }
}

#[test]
fn test_scenario_every_strategy_and_layout() {
    let a = scenario_matrix();

    for threads in [1, 2, 3, 4] {
        let engine = engine(threads);
        for strategy in Strategy::ALL {
            for input_layout in LAYOUTS {
                for output_layout in LAYOUTS {
                    let x = DenseBlock::filled(4, 1, input_layout, 1.0);
                    let y = engine.multiply(strategy, &a, &x, output_layout).unwrap();

                    assert_eq!(y.layout(), output_layout);
                    assert_eq!(
                        y.column(0),
                        vec![2.0, 0.0, 3.0, 4.0],
                        "{} with {} threads, {} -> {}",
                        strategy,
                        threads,
                        input_layout,
                        output_layout
                    );
                }
            }
        }
    }
}

#[test]
fn test_scenario_two_vectors() {
    let a = scenario_matrix();
    // Column 0 all ones, column 1 = [1, 2, 3, 4]
    let x = DenseBlock::from_fn(4, 2, Layout::RowMajor, |r, v| if v == 0 { 1.0 } else { (r + 1) as f64 });

    for strategy in [Strategy::MergePath, Strategy::NonzeroSplit] {
        let y = engine(3).multiply(strategy, &a, &x, Layout::RowMajor).unwrap();
        assert_eq!(y.column(0), vec![2.0, 0.0, 3.0, 4.0]);
        assert_eq!(y.column(1), vec![3.0, 0.0, 5.0, 10.0]);
    }
}

#[test]
fn test_single_thread_is_bit_identical_to_reference() {
    let a = generators::grid2d::<f64>(12, true).unwrap();
    let x = DenseBlock::from_fn(a.n_cols, 5, Layout::RowMajor, |r, v| {
        1.0 / (1.0 + r as f64) + 0.1 * v as f64
    });
    let expected = reference_spmm(&a, &x).unwrap();

    let engine = engine(1);
    for strategy in [Strategy::RowParallel, Strategy::MergePath, Strategy::NonzeroSplit] {
        let y = engine.multiply(strategy, &a, &x, Layout::RowMajor).unwrap();
        assert_eq!(y.as_slice(), expected.as_slice(), "{}", strategy);
    }
}

#[test]
fn test_empty_rows_are_zeroed() {
    // Rows 1, 3 and 4 (trailing) are empty
    let a = SparseMatrixCSR::new(
        5,
        3,
        vec![0, 2, 2, 5, 5, 5],
        vec![0, 2, 0, 1, 2],
        vec![1.0, 2.0, 3.0, 4.0, 5.0],
    );
    let x = DenseBlock::filled(3, 3, Layout::RowMajor, 1.0);

    for threads in [1, 2, 3, 7] {
        for strategy in Strategy::ALL {
            let mut y = DenseBlock::filled(5, 3, Layout::RowMajor, f64::NAN);
            engine(threads).prepare(strategy, &a).run(&x, &mut y).unwrap();
            for v in 0..3 {
                assert_eq!(y.column(v), vec![3.0, 0.0, 12.0, 0.0, 0.0], "{}", strategy);
            }
        }
    }
}

#[test]
fn test_row_spanning_many_threads() {
    // Wheel hub row 0 holds 1000 of 2000 nonzeros
    let a = generators::wheel::<f64>(1000).unwrap();
    let x = DenseBlock::from_fn(a.n_cols, 4, Layout::ColumnMajor, |r, v| (r % 7) as f64 + v as f64);
    let expected = reference_spmm(&a, &x).unwrap();

    for threads in [2, 8, 64, 256] {
        let engine = engine(threads);
        for strategy in [Strategy::MergePath, Strategy::NonzeroSplit] {
            let y = engine.multiply(strategy, &a, &x, Layout::ColumnMajor).unwrap();
            assert_close(&y, &expected, 1e-9);
        }
    }
}

#[test]
fn test_carry_out_lands_in_split_row() {
    let a = scenario_matrix();
    let x = vec![1.0; 4];
    let plan = plan_partition(PartitionStrategy::MergePath, a.row_end_offsets(), 3);

    // Thread 1 stops inside row 3 after nonzero 4
    assert_eq!(plan[1].end.row, 3);
    assert_eq!(plan[1].end.nonzero, 5);

    let mut y = vec![f64::NAN; 4];
    let mut carries = Vec::new();
    let mut rest = y.as_mut_slice();
    for work in &plan {
        let (chunk, tail) = rest.split_at_mut(work.rows().len());
        carries.push(consume_interval(&a, &x, 1, work, chunk));
        rest = tail;
    }
    assert_eq!(carries[1].row, 3);
    assert_eq!(carries[1].partial, vec![3.0]);
    // Row 3 before fix-up only holds thread 2's share
    assert_eq!(y[3], 1.0);

    apply_carry_outs(&carries, &mut y, 4, 1);
    assert_eq!(y, vec![2.0, 0.0, 3.0, 4.0]);
}

#[test]
fn test_random_lattices_match_reference() {
    let a = generators::grid3d::<f64>(6, false).unwrap();
    let x = DenseBlock::from_fn(a.n_cols, 7, Layout::RowMajor, |r, v| ((r * 31 + v * 17) % 13) as f64 - 6.0);
    let expected = reference_spmm(&a, &x).unwrap();

    let engine = engine(5);
    for strategy in Strategy::ALL {
        for output_layout in LAYOUTS {
            let y = engine.multiply(strategy, &a, &x, output_layout).unwrap();
            assert_close(&y, &expected, 1e-9);
        }
    }
}

#[test]
fn test_prepared_kernel_is_reusable() {
    let a = generators::grid2d::<f32>(5, false).unwrap();
    let engine = engine(4);
    let mut kernel = engine.prepare(Strategy::NonzeroSplit, &a);

    let mut y = DenseBlock::zeros(a.n_rows, 2, Layout::ColumnMajor);
    for value in [1.0f32, 2.0, 3.0] {
        let x = DenseBlock::filled(a.n_cols, 2, Layout::ColumnMajor, value);
        kernel.run(&x, &mut y).unwrap();
        for r in 0..a.n_rows {
            assert_eq!(y.get(r, 1), value * a.row_len(r) as f32);
        }
    }
}

#[test]
fn test_zero_vectors_is_a_no_op() {
    let a = scenario_matrix();
    let x = DenseBlock::zeros(4, 0, Layout::RowMajor);
    for strategy in Strategy::ALL {
        let y = engine(2).multiply(strategy, &a, &x, Layout::ColumnMajor).unwrap();
        assert_eq!(y.n_vectors(), 0);
    }
}

#[test]
fn test_invalid_thread_counts() {
    assert!(matches!(
        SpmmEngine::new(KernelConfig::with_threads(0)),
        Err(SpmmError::InvalidThreadCount { requested: 0, .. })
    ));
    let too_many = KernelConfig {
        n_threads: 257,
        max_threads: 256,
    };
    assert!(matches!(
        SpmmEngine::new(too_many),
        Err(SpmmError::InvalidThreadCount { requested: 257, .. })
    ));
}

#[test]
fn test_dimension_mismatch() {
    let a = scenario_matrix();
    let engine = engine(2);

    let x = DenseBlock::filled(3, 2, Layout::RowMajor, 1.0);
    assert!(matches!(
        engine.multiply(Strategy::MergePath, &a, &x, Layout::RowMajor),
        Err(SpmmError::DimensionMismatch { .. })
    ));

    let x = DenseBlock::filled(4, 2, Layout::RowMajor, 1.0);
    let mut y = DenseBlock::zeros(4, 3, Layout::RowMajor);
    let result = engine.prepare(Strategy::Library, &a).run(&x, &mut y);
    assert!(matches!(result, Err(SpmmError::DimensionMismatch { .. })));
}
