//! D2Q9 lattice-Boltzmann building blocks for 2D incompressible flow.
//!
//! Cells carry nine directional particle distributions; repeated BGK
//! collision and streaming recovers incompressible Navier-Stokes behavior at
//! macroscopic scales. This crate holds the single-threaded pieces: the
//! cell model, grid storage with column-band views, boundary rules
//! (bounce-back, slippery and periodic walls, Zou/He inlet-outlet) and the
//! gather-form collide-and-stream kernel. The threaded driver lives in
//! `boltz-engine`.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use boltz_lattice::{
//!     BoundaryConditions, CollideStream, EdgeFlow, EdgeFlowSpec, FlowParams, Lattice,
//!     ObstacleMask,
//! };
//!
//! // Body-force driven flow between two no-slip walls.
//! let mask = Arc::new(ObstacleMask::open(16, 16));
//! let mut kernel = CollideStream::new(
//!     mask,
//!     FlowParams {
//!         boundary: BoundaryConditions::BounceBack,
//!         tau: 0.8,
//!         accel_x: 1e-5,
//!         use_accel_x: true,
//!         inlet: EdgeFlowSpec { flow: EdgeFlow::FixedSpeed, density: 1.05, speed: 0.0 },
//!         outlet: EdgeFlowSpec { flow: EdgeFlow::FixedSpeed, density: 1.0, speed: 0.0 },
//!     },
//! );
//!
//! let mut read = kernel.init();
//! let mut write = Lattice::new(16, 16);
//! for _ in 0..100 {
//!     kernel.step(&read, &mut write);
//!     std::mem::swap(&mut read, &mut write);
//! }
//!
//! let u = read.cell(8, 8).velocity();
//! assert!(u[0] > 0.0, "channel flow should move with the force");
//! ```

pub mod boundary;
pub mod cell;
pub mod kernel;
pub mod lattice;

pub use boundary::{BoundaryConditions, EdgeFlow, EdgeFlowSpec};
pub use cell::Cell;
pub use kernel::{CollideStream, FlowParams};
pub use lattice::{ColumnBand, Lattice, LatticeRef, ObstacleMask};

/// Lattice sound speed squared: c_s² = 1/3
pub const C_S_SQ: f64 = 1.0 / 3.0;

/// Kinematic viscosity of the model for a given relaxation time.
///
/// ν = c_s² (τ − 1/2)
pub fn viscosity(tau: f64) -> f64 {
    C_S_SQ * (tau - 0.5)
}
