//! Run configuration: everything a simulation needs, fixed at start.

use boltz_lattice::{BoundaryConditions, EdgeFlow, EdgeFlowSpec, FlowParams};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Which scalar field the extractor publishes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultsMode {
    #[default]
    Density,
    Speed,
    Vorticity,
}

/// Simulation parameters. No field may change once a run has started.
///
/// `Default` mirrors the stock channel-flow setup: no-slip walls,
/// speed-driven inlet and outlet, result refresh every 10 steps after a
/// 2000-step warm-up, eight workers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub results_mode: ResultsMode,
    pub boundary: BoundaryConditions,
    /// Steps between result refreshes.
    pub refresh_steps: u64,
    /// Steps to run before the first refresh.
    pub warmup_steps: u64,
    /// Stop on its own after this many steps; `None` runs until stopped.
    pub max_steps: Option<u64>,
    /// Horizontal body-force acceleration per step.
    pub accel_x: f64,
    /// Acceleration-driven mode: columns wrap, every column is forced and
    /// the inlet/outlet edges are disabled.
    pub use_accel_x: bool,
    pub inlet: EdgeFlow,
    pub outlet: EdgeFlow,
    pub inlet_density: f64,
    pub outlet_density: f64,
    pub inlet_speed: f64,
    pub outlet_speed: f64,
    /// BGK relaxation time; above 0.5 for a positive viscosity.
    pub tau: f64,
    pub num_threads: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            results_mode: ResultsMode::Density,
            boundary: BoundaryConditions::BounceBack,
            refresh_steps: 10,
            warmup_steps: 2000,
            max_steps: None,
            accel_x: 0.015,
            use_accel_x: false,
            inlet: EdgeFlow::FixedSpeed,
            outlet: EdgeFlow::FixedSpeed,
            inlet_density: 1.05,
            outlet_density: 1.0,
            inlet_speed: 0.5,
            outlet_speed: 0.5,
            tau: 0.6,
            num_threads: 8,
        }
    }
}

impl SimConfig {
    /// Reject invalid parameters before any thread spawns.
    pub fn validate(&self) -> Result<()> {
        if self.num_threads == 0 {
            return Err(EngineError::NoWorkers);
        }
        if self.refresh_steps == 0 {
            return Err(EngineError::ZeroRefresh);
        }
        if !self.tau.is_finite() || self.tau <= 0.5 {
            return Err(EngineError::BadTau(self.tau));
        }
        if !self.accel_x.is_finite() {
            return Err(EngineError::BadAccel(self.accel_x));
        }
        for density in [self.inlet_density, self.outlet_density] {
            if !density.is_finite() || density <= 0.0 {
                return Err(EngineError::BadEdgeDensity(density));
            }
        }
        // The Zou/He closure divides by 1 ∓ u.
        for speed in [self.inlet_speed, self.outlet_speed] {
            if !speed.is_finite() || speed.abs() >= 1.0 {
                return Err(EngineError::BadEdgeSpeed(speed));
            }
        }
        Ok(())
    }

    /// Kernel-facing bundle of the physical parameters.
    pub fn flow_params(&self) -> FlowParams {
        FlowParams {
            boundary: self.boundary,
            tau: self.tau,
            accel_x: self.accel_x,
            use_accel_x: self.use_accel_x,
            inlet: EdgeFlowSpec {
                flow: self.inlet,
                density: self.inlet_density,
                speed: self.inlet_speed,
            },
            outlet: EdgeFlowSpec {
                flow: self.outlet,
                density: self.outlet_density,
                speed: self.outlet_speed,
            },
        }
    }
}
