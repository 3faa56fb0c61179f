//! Column partitioning and the worker activation loop.

use std::ops::Range;

use log::debug;

use crate::buffer::LatticeView;
use crate::sim::RunContext;
use crate::StepKernel;

/// Partition `[0, cols)` into `workers` contiguous ranges.
///
/// Every worker gets `cols / workers` columns and the last absorbs the
/// remainder, so the ranges cover each column exactly once. With more
/// workers than columns the leading ranges are empty and the last takes
/// everything; the pool still cycles them through the barrier.
pub(crate) fn column_ranges(cols: usize, workers: usize) -> Vec<Range<usize>> {
    debug_assert!(workers > 0);
    let stride = cols / workers;
    let mut ranges = Vec::with_capacity(workers);
    let mut start = 0;
    for worker in 0..workers {
        let end = if worker + 1 == workers {
            cols
        } else {
            start + stride
        };
        ranges.push(start..end);
        start = end;
    }
    ranges
}

/// Body of one persistent worker thread.
///
/// Parks on the barrier between activations; each activation either runs
/// the kernel over the assigned band of the write view or, when the run
/// flag has been cleared, reports once more and exits. The view pair is
/// swapped locally after every completed activation, in lockstep with the
/// controller's swap at the rendezvous.
pub(crate) fn worker_loop<K: StepKernel>(
    ctx: &RunContext,
    id: usize,
    mut kernel: K,
    mut read: LatticeView,
    mut write: LatticeView,
    cols: Range<usize>,
) {
    debug!("worker {id} up, columns {cols:?}");
    loop {
        ctx.barrier.wait_release(id);
        if !ctx.running() {
            ctx.barrier.report_done();
            break;
        }
        // SAFETY: during a step every thread only reads the read-role
        // buffer, and each worker writes a band of the write-role buffer
        // that is disjoint from all others; the barrier orders the phases
        // and keeps the roles in lockstep (see buffer module docs).
        let grid = unsafe { read.as_lattice_ref() };
        let mut band = unsafe { write.band_mut(cols.clone()) };
        kernel.update_columns(grid, &mut band);
        drop(band);
        ctx.barrier.report_done();
        std::mem::swap(&mut read, &mut write);
    }
    debug!("worker {id} down");
}
