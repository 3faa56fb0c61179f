//! Domain boundary rules: top/bottom wall modes and Zou/He inlet-outlet.
//!
//! The left/right edges are either periodic (body-force driven flow) or open
//! (inlet on column 0, outlet on the last column); the open-edge closure is
//! the standard D2Q9 Zou/He scheme with zero vertical velocity.

use serde::{Deserialize, Serialize};

use crate::cell::Cell;

/// Treatment of the top and bottom grid rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryConditions {
    /// Inert wall rows, incoming distributions reversed (no-slip).
    #[default]
    BounceBack,
    /// Rows wrap around; no walls.
    Periodic,
    /// Inert wall rows, specular reflection (free-slip): the vertical
    /// component reverses, the horizontal component is kept.
    Slippery,
}

impl BoundaryConditions {
    /// True when rows wrap instead of ending at walls.
    #[inline]
    pub fn periodic(&self) -> bool {
        matches!(self, BoundaryConditions::Periodic)
    }
}

/// Direction reflected about the horizontal axis (ey negated), used by the
/// slippery wall rule.
pub const MIRROR_Y: [usize; 9] = [0, 1, 4, 3, 2, 8, 7, 6, 5];

/// Which quantity an open edge prescribes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeFlow {
    FixedDensity,
    #[default]
    FixedSpeed,
}

/// Zou/He prescription for one open edge column.
#[derive(Clone, Copy, Debug)]
pub struct EdgeFlowSpec {
    pub flow: EdgeFlow,
    pub density: f64,
    pub speed: f64,
}

/// Zou/He closure on an inlet cell (left wall; unknowns E, NE, SE).
///
/// The three distributions pointing into the domain are reconstructed so the
/// cell realizes the prescribed density or horizontal speed with zero
/// vertical velocity.
pub fn apply_inlet(cell: &mut Cell, spec: EdgeFlowSpec) {
    let f = &cell.f;
    let known = f[0] + f[2] + f[4] + 2.0 * (f[3] + f[6] + f[7]);
    let (rho, u) = match spec.flow {
        EdgeFlow::FixedSpeed => (known / (1.0 - spec.speed), spec.speed),
        EdgeFlow::FixedDensity => (spec.density, 1.0 - known / spec.density),
    };
    let shear = 0.5 * (cell.f[2] - cell.f[4]);
    cell.f[1] = cell.f[3] + (2.0 / 3.0) * rho * u;
    cell.f[5] = cell.f[7] - shear + (1.0 / 6.0) * rho * u;
    cell.f[8] = cell.f[6] + shear + (1.0 / 6.0) * rho * u;
}

/// Zou/He closure on an outlet cell (right wall; unknowns W, NW, SW).
pub fn apply_outlet(cell: &mut Cell, spec: EdgeFlowSpec) {
    let f = &cell.f;
    let known = f[0] + f[2] + f[4] + 2.0 * (f[1] + f[5] + f[8]);
    let (rho, u) = match spec.flow {
        EdgeFlow::FixedSpeed => (known / (1.0 + spec.speed), spec.speed),
        EdgeFlow::FixedDensity => (spec.density, known / spec.density - 1.0),
    };
    let shear = 0.5 * (cell.f[2] - cell.f[4]);
    cell.f[3] = cell.f[1] - (2.0 / 3.0) * rho * u;
    cell.f[6] = cell.f[8] - shear - (1.0 / 6.0) * rho * u;
    cell.f[7] = cell.f[5] + shear - (1.0 / 6.0) * rho * u;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::E;

    fn streamed_cell() -> Cell {
        // A mildly sheared non-equilibrium cell standing in for the
        // post-streaming state at an edge column.
        let mut cell = Cell::equilibrium(1.0, [0.12, 0.03]);
        cell.f[2] += 0.004;
        cell.f[7] -= 0.002;
        cell
    }

    #[test]
    fn test_mirror_reflects_vertical() {
        for i in 0..9 {
            assert_eq!(E[MIRROR_Y[i]][0], E[i][0]);
            assert_eq!(E[MIRROR_Y[i]][1], -E[i][1]);
            assert_eq!(MIRROR_Y[MIRROR_Y[i]], i);
        }
    }

    #[test]
    fn test_inlet_fixed_speed() {
        let mut cell = streamed_cell();
        apply_inlet(
            &mut cell,
            EdgeFlowSpec {
                flow: EdgeFlow::FixedSpeed,
                density: 0.0,
                speed: 0.1,
            },
        );
        let u = cell.velocity();
        assert!((u[0] - 0.1).abs() < 1e-12, "ux = {}", u[0]);
        assert!(u[1].abs() < 1e-12, "uy = {}", u[1]);
    }

    #[test]
    fn test_inlet_fixed_density() {
        let mut cell = streamed_cell();
        apply_inlet(
            &mut cell,
            EdgeFlowSpec {
                flow: EdgeFlow::FixedDensity,
                density: 1.05,
                speed: 0.0,
            },
        );
        assert!((cell.density() - 1.05).abs() < 1e-12);
        assert!(cell.velocity()[1].abs() < 1e-12);
    }

    #[test]
    fn test_outlet_fixed_speed() {
        let mut cell = streamed_cell();
        apply_outlet(
            &mut cell,
            EdgeFlowSpec {
                flow: EdgeFlow::FixedSpeed,
                density: 0.0,
                speed: 0.08,
            },
        );
        let u = cell.velocity();
        assert!((u[0] - 0.08).abs() < 1e-12, "ux = {}", u[0]);
        assert!(u[1].abs() < 1e-12);
    }

    #[test]
    fn test_outlet_fixed_density() {
        let mut cell = streamed_cell();
        apply_outlet(
            &mut cell,
            EdgeFlowSpec {
                flow: EdgeFlow::FixedDensity,
                density: 1.0,
                speed: 0.0,
            },
        );
        assert!((cell.density() - 1.0).abs() < 1e-12);
        assert!(cell.velocity()[1].abs() < 1e-12);
    }
}
