//! Threaded collide-and-stream engine for 2D lattice-Boltzmann flow.
//!
//! A run owns a fixed pool of persistent worker threads, each bound to a
//! contiguous column band of a double-buffered grid. A hand-rolled
//! two-phase barrier paces the pool: the controller releases every worker,
//! each computes one step for its band and reports back, the controller
//! swaps the grid roles in O(1) and periodically extracts a scalar result
//! field (density, speed or vorticity) under a dedicated lock that
//! consumers can read at any time. Stopping is cooperative and cheap:
//! clearing one flag winds the whole pool down.
//!
//! The physics itself lives in [`boltz_lattice`]; the engine drives it
//! through the [`StepKernel`] trait, so the concurrency core can also run a
//! stub rule in tests.
//!
//! # Example
//!
//! ```
//! use boltz_engine::{ResultsMode, SimConfig, Simulation};
//! use boltz_lattice::{BoundaryConditions, ObstacleMask};
//!
//! // A tiny periodic run that stops on its own.
//! let config = SimConfig {
//!     results_mode: ResultsMode::Density,
//!     boundary: BoundaryConditions::Periodic,
//!     use_accel_x: true,
//!     accel_x: 0.0,
//!     num_threads: 2,
//!     warmup_steps: 0,
//!     refresh_steps: 10,
//!     max_steps: Some(50),
//!     ..SimConfig::default()
//! };
//!
//! let mut sim = Simulation::start(config, ObstacleMask::open(8, 8)).unwrap();
//! sim.wait();
//! let field = sim.snapshot();
//! assert!((field.at(4, 4) - 1.0).abs() < 1e-9);
//! ```

pub mod barrier;
mod buffer;
pub mod config;
pub mod error;
pub mod results;
pub mod sim;
mod worker;

pub use boltz_lattice;

pub use barrier::StepBarrier;
pub use config::{ResultsMode, SimConfig};
pub use error::{EngineError, Result};
pub use results::ScalarField;
pub use sim::{SimHandle, Simulation};

use boltz_lattice::{CollideStream, ColumnBand, Lattice, LatticeRef};

/// Pluggable step rule driven by the worker pool.
///
/// Each worker owns one instance (cloned at start), so `update_columns`
/// may keep per-worker scratch behind `&mut self`.
pub trait StepKernel: Send + 'static {
    /// Build the starting read grid; its shape fixes the run's dimensions.
    fn init(&self) -> Lattice;

    /// Compute one step for a column band of the write grid.
    ///
    /// Must write every cell of the band and nothing else; `read` is the
    /// whole previous-step grid.
    fn update_columns(&mut self, read: LatticeRef<'_>, band: &mut ColumnBand<'_>);
}

impl StepKernel for CollideStream {
    fn init(&self) -> Lattice {
        CollideStream::init(self)
    }

    fn update_columns(&mut self, read: LatticeRef<'_>, band: &mut ColumnBand<'_>) {
        CollideStream::update_columns(self, read, band);
    }
}
