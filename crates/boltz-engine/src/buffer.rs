//! Shared double-buffered grid storage for one run.
//!
//! A run owns two equally-shaped cell buffers. Workers and the controller
//! never exchange buffer contents, only the roles of two raw views: during
//! a step every thread reads the read-role buffer and each worker writes
//! its own disjoint column band of the write-role buffer; at the rendezvous
//! each participant swaps its local pair of views. The step barrier keeps
//! every participant's parity in lockstep, so the roles never diverge and
//! no location is ever written by two threads in the same phase.
//!
//! All access after the pool spawns goes through the raw views; the owning
//! `Vec`s are only touched again when the run context drops, after the pool
//! has been joined (or has exited).

use std::cell::UnsafeCell;
use std::ops::Range;
use std::slice;

use boltz_lattice::{Cell, ColumnBand, Lattice, LatticeRef};

/// Owns the two cell buffers of a run.
pub(crate) struct GridBuffers {
    rows: usize,
    cols: usize,
    a: UnsafeCell<Vec<Cell>>,
    b: UnsafeCell<Vec<Cell>>,
}

// SAFETY: the buffers are reached only through `LatticeView`s obtained in
// the single-threaded start path; afterwards the barrier protocol above
// serializes every dereference.
unsafe impl Sync for GridBuffers {}

impl GridBuffers {
    /// Buffer A takes the initial grid state; buffer B starts zeroed and is
    /// fully overwritten on the first step.
    pub(crate) fn new(initial: Lattice) -> Self {
        let rows = initial.rows();
        let cols = initial.cols();
        Self {
            rows,
            cols,
            a: UnsafeCell::new(initial.into_cells()),
            b: UnsafeCell::new(vec![Cell::default(); rows * cols]),
        }
    }

    /// Raw views of the two buffers in their starting roles (read, write).
    ///
    /// # Safety
    ///
    /// Must be called while no other thread can access the buffers; the
    /// returned views must keep to the role protocol in the module docs and
    /// must not outlive `self`.
    pub(crate) unsafe fn views(&self) -> (LatticeView, LatticeView) {
        let a = LatticeView {
            base: (*self.a.get()).as_mut_ptr(),
            rows: self.rows,
            cols: self.cols,
        };
        let b = LatticeView {
            base: (*self.b.get()).as_mut_ptr(),
            rows: self.rows,
            cols: self.cols,
        };
        (a, b)
    }
}

/// Raw view of one grid buffer, shared across the pool.
#[derive(Clone, Copy)]
pub(crate) struct LatticeView {
    base: *mut Cell,
    rows: usize,
    cols: usize,
}

// SAFETY: the pointer targets a buffer owned by the run context, which the
// pool keeps alive; the barrier protocol decides which thread may
// dereference it in which phase.
unsafe impl Send for LatticeView {}
unsafe impl Sync for LatticeView {}

impl LatticeView {
    /// Read view of the whole grid.
    ///
    /// # Safety
    ///
    /// No thread may write this buffer while the returned reference lives.
    pub(crate) unsafe fn as_lattice_ref<'a>(self) -> LatticeRef<'a> {
        LatticeRef::new(
            self.rows,
            self.cols,
            slice::from_raw_parts(self.base, self.rows * self.cols),
        )
    }

    /// Mutable view of a contiguous column band.
    ///
    /// # Safety
    ///
    /// While the returned band lives, no other thread may touch these
    /// columns and none may read the buffer; concurrent bands of the same
    /// buffer must be disjoint.
    pub(crate) unsafe fn band_mut<'a>(self, cols: Range<usize>) -> ColumnBand<'a> {
        debug_assert!(cols.start <= cols.end && cols.end <= self.cols);
        let cells = slice::from_raw_parts_mut(
            self.base.add(cols.start * self.rows),
            (cols.end - cols.start) * self.rows,
        );
        ColumnBand::new(cols.start, self.rows, cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_views_address_the_buffers() {
        let mut initial = Lattice::new(4, 6);
        initial.cell_mut(5, 3).f[0] = 9.0;
        let buffers = GridBuffers::new(initial);

        // Single-threaded here, so the access contract is trivially met.
        let (read, write) = unsafe { buffers.views() };
        let grid = unsafe { read.as_lattice_ref() };
        assert_eq!(grid.cell(5, 3).f[0], 9.0);
        assert_eq!(grid.cell(0, 0).f[0], 0.0);

        let mut band = unsafe { write.band_mut(2..4) };
        band.cell_mut(2, 1).f[0] = 4.0;
        drop(band);
        let written = unsafe { write.as_lattice_ref() };
        assert_eq!(written.cell(2, 1).f[0], 4.0);

        // Views are roles, not copies: the read side is untouched.
        assert_eq!(grid.cell(2, 1).f[0], 0.0);
    }
}
