//! Benchmark comparing the SpMM strategies
//!
//! Uses the wheel graph (one hub row holding half the nonzeros) to show the
//! load-balancing effect, and a lattice as the well-behaved control.

use std::hint::black_box;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mergespmm::matrix::generators;
use mergespmm::{DenseBlock, KernelConfig, Layout, SparseMatrixCSR, SpmmEngine, Strategy};

const NUM_VECTORS: usize = 16;

fn bench_matrix(c: &mut Criterion, group_name: &str, a: &SparseMatrixCSR<f64>) {
    let engine = SpmmEngine::new(KernelConfig::default()).unwrap();
    let x = DenseBlock::filled(a.n_cols, NUM_VECTORS, Layout::RowMajor, 10.0);

    let mut group = c.benchmark_group(group_name);
    group.sample_size(20);
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(5));
    group.throughput(Throughput::Elements((a.nnz() * NUM_VECTORS) as u64));

    for strategy in Strategy::ALL {
        for output_layout in [Layout::RowMajor, Layout::ColumnMajor] {
            let mut kernel = engine.prepare(strategy, a);
            let mut y = DenseBlock::zeros(a.n_rows, NUM_VECTORS, output_layout);

            group.bench_function(
                BenchmarkId::new(strategy.to_string(), output_layout),
                |bencher| {
                    bencher.iter(|| {
                        kernel.run(black_box(&x), &mut y).unwrap();
                        black_box(&y);
                    });
                },
            );
        }
    }
    group.finish();
}

fn bench_wheel(c: &mut Criterion) {
    let a = generators::wheel::<f64>(1 << 18).unwrap();
    bench_matrix(c, "wheel_262144", &a);
}

fn bench_grid2d(c: &mut Criterion) {
    let a = generators::grid2d::<f64>(512, false).unwrap();
    bench_matrix(c, "grid2d_512", &a);
}

criterion_group!(benches, bench_wheel, bench_grid2d);
criterion_main!(benches);
