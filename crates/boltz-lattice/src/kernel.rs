//! The collide-and-stream step, formulated as a gather.
//!
//! Each target cell of the write grid is assembled from the post-collision
//! state of its own and its two neighbor columns on the read grid, so a
//! worker that owns a column band writes only inside that band. The three
//! source columns are collided into a small ring buffer that slides across
//! the band, which re-collides one halo column per band edge instead of
//! sharing intermediate state between workers.
//!
//! Solid sites (obstacles, and the top/bottom rows in wall modes) stay
//! all-zero; a distribution that would stream out of one reverses back into
//! its source (bounce-back) or, for slippery walls, reflects specularly.
//! In bounded-x mode the open edge columns are closed by the Zou/He rules
//! after streaming.

use std::ops::Range;
use std::sync::Arc;

use crate::boundary::{
    apply_inlet, apply_outlet, BoundaryConditions, EdgeFlowSpec, MIRROR_Y,
};
use crate::cell::{Cell, E, OPP};
use crate::lattice::{ColumnBand, Lattice, LatticeRef, ObstacleMask};

/// Physical parameters of the collide-and-stream rule.
#[derive(Clone, Copy, Debug)]
pub struct FlowParams {
    pub boundary: BoundaryConditions,
    /// BGK relaxation time; must exceed 0.5.
    pub tau: f64,
    /// Horizontal body-force acceleration per step.
    pub accel_x: f64,
    /// Acceleration-driven mode: columns wrap and every column is forced;
    /// otherwise the domain is bounded in x with inlet/outlet edges and
    /// only interior columns are forced.
    pub use_accel_x: bool,
    pub inlet: EdgeFlowSpec,
    pub outlet: EdgeFlowSpec,
}

/// One collided source column of the sliding ring.
#[derive(Clone, Debug, Default)]
struct PostColumn {
    /// Global column index, `None` when the column lies outside a bounded
    /// domain (its slots stream in nothing).
    x: Option<usize>,
    cells: Vec<Cell>,
}

/// The step rule bundled with its parameters, obstacle mask and scratch.
///
/// Workers clone one instance each; the mask is shared, the ring scratch is
/// per-instance so stepping needs no allocation.
#[derive(Clone, Debug)]
pub struct CollideStream {
    mask: Arc<ObstacleMask>,
    params: FlowParams,
    accel_x_tau: f64,
    /// Sliding post-collision columns: [x-1, x, x+1].
    ring: [PostColumn; 3],
}

impl CollideStream {
    pub fn new(mask: Arc<ObstacleMask>, params: FlowParams) -> Self {
        Self {
            mask,
            params,
            accel_x_tau: params.accel_x * params.tau,
            ring: Default::default(),
        }
    }

    /// Starting grid: fluid cells at rest equilibrium, solid sites inert.
    pub fn init(&self) -> Lattice {
        let (rows, cols) = (self.mask.rows(), self.mask.cols());
        let mut lattice = Lattice::new(rows, cols);
        for x in 0..cols {
            for y in 0..rows {
                if !self.solid_site(x, y) {
                    lattice.cell_mut(x, y).init();
                }
            }
        }
        lattice
    }

    /// One step for a whole grid; the single-threaded form of the update.
    pub fn step(&mut self, read: &Lattice, write: &mut Lattice) {
        let cols = read.cols();
        let mut band = write.band_mut(0..cols);
        self.update_columns(read.as_ref(), &mut band);
    }

    /// One step for a contiguous column band of the write grid.
    ///
    /// Reads columns `span.start - 1 ..= span.end` of the read grid and
    /// writes only inside the band, so disjoint bands can be updated
    /// concurrently.
    pub fn update_columns(&mut self, read: LatticeRef<'_>, band: &mut ColumnBand<'_>) {
        if band.is_empty() {
            return;
        }
        let rows = read.rows();
        let cols = read.cols();
        let span = band.cols();
        self.ensure_ring(rows);

        self.load_ring_slot(read, self.neighbor_col(span.start, -1, cols), 0);
        self.load_ring_slot(read, Some(span.start), 1);
        self.load_ring_slot(read, self.neighbor_col(span.start, 1, cols), 2);

        for x in span.clone() {
            self.assemble_column(band, x, rows);
            if x + 1 < span.end {
                self.ring.rotate_left(1);
                self.load_ring_slot(read, self.neighbor_col(x + 1, 1, cols), 2);
            }
        }

        if !self.params.use_accel_x {
            self.close_open_edges(band, rows, cols, span);
        }
    }

    fn ensure_ring(&mut self, rows: usize) {
        for slot in &mut self.ring {
            if slot.cells.len() != rows {
                slot.cells.resize(rows, Cell::default());
            }
        }
    }

    /// Collide one read-grid column into a ring slot.
    fn load_ring_slot(&mut self, read: LatticeRef<'_>, x: Option<usize>, slot: usize) {
        self.ring[slot].x = x;
        let Some(cx) = x else { return };
        let force = self.forced_term(cx);
        let tau = self.params.tau;
        for y in 0..read.rows() {
            self.ring[slot].cells[y] = if self.solid_site(cx, y) {
                Cell::default()
            } else {
                read.cell(cx, y).collided(tau, force)
            };
        }
    }

    /// Assemble the streamed values of write column `x` from the ring.
    fn assemble_column(&self, band: &mut ColumnBand<'_>, x: usize, rows: usize) {
        let periodic = self.params.boundary.periodic();
        for y in 0..rows {
            if self.solid_site(x, y) {
                *band.cell_mut(x, y) = Cell::default();
                continue;
            }
            let mut out = Cell::default();
            for i in 0..9 {
                let [ex, ey] = E[i];
                // Straight-line source of slot i is one e_i behind the target.
                let sy = if periodic {
                    (y as i32 - ey).rem_euclid(rows as i32) as usize
                } else {
                    debug_assert!((y as i32 - ey) >= 0 && ((y as i32 - ey) as usize) < rows);
                    (y as i32 - ey) as usize
                };
                let slot = &self.ring[(1 - ex) as usize];
                let Some(sx) = slot.x else {
                    // Open x edge: left zero for the Zou/He closure.
                    continue;
                };
                out.f[i] = if !self.solid_site(sx, sy) {
                    slot.cells[sy].f[i]
                } else if self.params.boundary == BoundaryConditions::Slippery
                    && !self.mask.solid(sx, sy)
                    && !self.solid_site(sx, y)
                {
                    // Free-slip wall: the particle keeps its horizontal
                    // motion, so it arrives from the same row, mirrored.
                    slot.cells[y].f[MIRROR_Y[i]]
                } else {
                    // No-slip wall or obstacle: the target's own
                    // post-collision value comes straight back.
                    self.ring[1].cells[y].f[OPP[i]]
                };
            }
            *band.cell_mut(x, y) = out;
        }
    }

    /// Zou/He closure on any open edge column inside the band.
    fn close_open_edges(
        &self,
        band: &mut ColumnBand<'_>,
        rows: usize,
        cols: usize,
        span: Range<usize>,
    ) {
        let (y0, y1) = if self.params.boundary.periodic() {
            (0, rows)
        } else {
            (1, rows.saturating_sub(1))
        };
        if span.contains(&0) {
            for y in y0..y1 {
                if !self.mask.solid(0, y) {
                    apply_inlet(band.cell_mut(0, y), self.params.inlet);
                }
            }
        }
        if span.contains(&(cols - 1)) {
            for y in y0..y1 {
                if !self.mask.solid(cols - 1, y) {
                    apply_outlet(band.cell_mut(cols - 1, y), self.params.outlet);
                }
            }
        }
    }

    /// Source column one step sideways, wrapping only in acceleration mode.
    fn neighbor_col(&self, x: usize, dx: i32, cols: usize) -> Option<usize> {
        let nx = x as i32 + dx;
        if (0..cols as i32).contains(&nx) {
            Some(nx as usize)
        } else if self.params.use_accel_x {
            Some(nx.rem_euclid(cols as i32) as usize)
        } else {
            None
        }
    }

    /// Body-force term for a column: `a_x · τ`, or 0 where unforced.
    fn forced_term(&self, x: usize) -> f64 {
        if self.params.use_accel_x || (x > 0 && x + 1 < self.mask.cols()) {
            self.accel_x_tau
        } else {
            0.0
        }
    }

    fn solid_site(&self, x: usize, y: usize) -> bool {
        self.mask.solid(x, y)
            || (!self.params.boundary.periodic() && (y == 0 || y + 1 == self.mask.rows()))
    }
}
