//! Load-balanced SpMM over merge-path intervals
//!
//! Each worker walks its `[start, end)` interval of the merge path. Whenever
//! it crosses a row boundary it stores the running totals of that row into
//! its own slice of the output and resets them. Nonzeros consumed after the
//! last boundary belong to a row that a later worker finishes, so they are
//! returned as a [`CarryOut`] and added in a serial pass once every worker
//! has joined.

use std::ops::Range;

use rayon::prelude::*;
use rayon::ThreadPool;

use crate::matrix::SparseMatrixCSR;
use crate::partition::{plan_partition, PartitionStrategy, ThreadWork};
use crate::scalar::Scalar;

/// Partial sums a worker accumulated for `row` without reaching its end
#[derive(Debug, Clone, PartialEq)]
pub struct CarryOut<T> {
    pub row: usize,
    pub partial: Vec<T>,
}

/// Adds `val * x[col, ..]` into `total` for every nonzero in `nonzeros`.
///
/// `x` is row-major with `total.len()` components per row.
#[inline]
pub(crate) fn accumulate<T: Scalar>(
    a: &SparseMatrixCSR<T>,
    x: &[T],
    nonzeros: Range<usize>,
    total: &mut [T],
) {
    let n_vectors = total.len();
    let cols = &a.col_idx[nonzeros.clone()];
    let vals = &a.values[nonzeros];

    for (&col, &val) in cols.iter().zip(vals) {
        let x_row = &x[col * n_vectors..(col + 1) * n_vectors];
        for (t, &xv) in total.iter_mut().zip(x_row) {
            *t += val * xv;
        }
    }
}

/// Runs one worker's interval, writing rows `work.rows()` into `out`.
///
/// `out` holds exactly those rows, row-major.
pub fn consume_interval<T: Scalar>(
    a: &SparseMatrixCSR<T>,
    x: &[T],
    n_vectors: usize,
    work: &ThreadWork,
    out: &mut [T],
) -> CarryOut<T> {
    let row_end_offsets = a.row_end_offsets();
    let nonzeros = work.nonzeros();
    let mut running_total = vec![T::zero(); n_vectors];
    let mut nonzero = nonzeros.start;

    // Consume whole rows
    for (row, out_row) in work.rows().zip(out.chunks_exact_mut(n_vectors)) {
        let row_stop = row_end_offsets[row];
        accumulate(a, x, nonzero..row_stop, &mut running_total);
        nonzero = row_stop;

        out_row.copy_from_slice(&running_total);
        running_total.fill(T::zero());
    }

    // Consume partial portion of the last row
    accumulate(a, x, nonzero..nonzeros.end, &mut running_total);

    CarryOut {
        row: work.end.row,
        partial: running_total,
    }
}

/// Adds every carry-out whose row exists into the row-major output.
///
/// All carries are applied, not only the one of the worker before a row
/// boundary: a worker whose whole interval sits inside one long row also
/// carries out, and its share must land in that row as well.
pub fn apply_carry_outs<T: Scalar>(
    carry_outs: &[CarryOut<T>],
    y: &mut [T],
    num_rows: usize,
    n_vectors: usize,
) {
    for carry in carry_outs.iter().filter(|c| c.row < num_rows) {
        let out_row = &mut y[carry.row * n_vectors..(carry.row + 1) * n_vectors];
        for (o, &c) in out_row.iter_mut().zip(&carry.partial) {
            *o += c;
        }
    }
}

/// Splits the row-major output into the disjoint row ranges of `plan`
fn split_rows_mut<'a, T>(
    mut rest: &'a mut [T],
    plan: &[ThreadWork],
    n_vectors: usize,
) -> Vec<&'a mut [T]> {
    let mut chunks = Vec::with_capacity(plan.len());
    for work in plan {
        let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(work.rows().len() * n_vectors);
        chunks.push(chunk);
        rest = tail;
    }
    chunks
}

/// `y = A * x` with one partition interval per pool thread.
///
/// `x` is the row-major `num_cols × n_vectors` input and `y` the row-major
/// `num_rows × n_vectors` output; every entry of `y` is overwritten.
pub(crate) fn spmm_balanced<T: Scalar>(
    pool: &ThreadPool,
    strategy: PartitionStrategy,
    a: &SparseMatrixCSR<T>,
    x: &[T],
    y: &mut [T],
    n_vectors: usize,
) {
    let plan = plan_partition(strategy, a.row_end_offsets(), pool.current_num_threads());

    let carry_outs: Vec<CarryOut<T>> = {
        let chunks = split_rows_mut(y, &plan, n_vectors);
        pool.install(|| {
            plan.par_iter()
                .zip(chunks.into_par_iter())
                .map(|(work, out)| consume_interval(a, x, n_vectors, work, out))
                .collect()
        })
    };

    // Carry-out fix-up (rows spanning multiple threads)
    apply_carry_outs(&carry_outs, y, a.n_rows, n_vectors);
}
