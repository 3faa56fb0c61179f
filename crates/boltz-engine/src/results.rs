//! Scalar result fields extracted from the running grid.

use boltz_lattice::{BoundaryConditions, LatticeRef};
use serde::{Deserialize, Serialize};

use crate::config::ResultsMode;

/// Dense scalar matrix with the lattice's shape and column-major layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScalarField {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl ScalarField {
    pub(crate) fn zeroed(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize) -> f64 {
        self.data[x * self.rows + y]
    }

    /// Flat column-major values.
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    /// Smallest and largest value, useful for scaling a rendering.
    pub fn min_max(&self) -> (f64, f64) {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for &v in &self.data {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        (lo, hi)
    }
}

/// Reduce the grid into `field` according to the extraction mode.
///
/// Runs on the controller between steps, under the results lock, so a
/// consumer never observes a half-refreshed field.
pub(crate) fn extract_into(
    field: &mut ScalarField,
    grid: LatticeRef<'_>,
    mode: ResultsMode,
    boundary: BoundaryConditions,
) {
    let rows = grid.rows();
    let cols = grid.cols();
    debug_assert!(field.rows == rows && field.cols == cols);
    match mode {
        ResultsMode::Density => {
            for x in 0..cols {
                for y in 0..rows {
                    field.data[x * rows + y] = grid.cell(x, y).density();
                }
            }
        }
        ResultsMode::Speed => {
            for x in 0..cols {
                for y in 0..rows {
                    field.data[x * rows + y] = grid.cell(x, y).speed();
                }
            }
        }
        ResultsMode::Vorticity => {
            // Finite difference against the next row and the previous
            // column. The row lookup always wraps; the column lookup wraps
            // only in periodic mode and otherwise reads a still wall.
            let periodic = boundary.periodic();
            for x in 0..cols {
                for y in 0..rows {
                    let v = grid.cell(x, y).velocity();
                    let row_ahead = if y + 1 < rows { y + 1 } else { 0 };
                    let vrow = grid.cell(x, row_ahead).velocity();
                    let vcol = if x > 0 {
                        grid.cell(x - 1, y).velocity()
                    } else if periodic {
                        grid.cell(cols - 1, y).velocity()
                    } else {
                        [0.0, 0.0]
                    };
                    field.data[x * rows + y] = (vcol[1] - v[1]) - (vrow[0] - v[0]);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boltz_lattice::{Cell, Lattice};

    fn uniform(rows: usize, cols: usize, rho: f64, u: [f64; 2]) -> Lattice {
        let mut lat = Lattice::new(rows, cols);
        for x in 0..cols {
            for y in 0..rows {
                *lat.cell_mut(x, y) = Cell::equilibrium(rho, u);
            }
        }
        lat
    }

    #[test]
    fn test_density_extraction() {
        let lat = uniform(4, 5, 1.08, [0.0, 0.0]);
        let mut field = ScalarField::zeroed(4, 5);
        extract_into(
            &mut field,
            lat.as_ref(),
            ResultsMode::Density,
            BoundaryConditions::BounceBack,
        );
        for &v in field.values() {
            assert!((v - 1.08).abs() < 1e-12);
        }
    }

    #[test]
    fn test_speed_extraction() {
        let lat = uniform(4, 5, 1.0, [0.03, -0.04]);
        let mut field = ScalarField::zeroed(4, 5);
        extract_into(
            &mut field,
            lat.as_ref(),
            ResultsMode::Speed,
            BoundaryConditions::BounceBack,
        );
        for &v in field.values() {
            assert!((v - 0.05).abs() < 1e-12, "speed = {v}");
        }
    }

    #[test]
    fn test_vorticity_still_grid_is_exactly_zero() {
        let lat = uniform(6, 6, 1.0, [0.0, 0.0]);
        let mut field = ScalarField::zeroed(6, 6);
        for boundary in [BoundaryConditions::BounceBack, BoundaryConditions::Periodic] {
            extract_into(&mut field, lat.as_ref(), ResultsMode::Vorticity, boundary);
            for &v in field.values() {
                assert_eq!(v, 0.0);
            }
        }
    }

    #[test]
    fn test_vorticity_column_wrap_depends_on_mode() {
        // Column 0 looks back at the last column only in periodic mode.
        // All x-velocities stay zero so only the column term contributes.
        let mut lat = uniform(3, 3, 1.0, [0.0, 0.0]);
        *lat.cell_mut(0, 1) = Cell::equilibrium(1.0, [0.0, 0.3]);
        *lat.cell_mut(2, 1) = Cell::equilibrium(1.0, [0.0, 0.7]);

        let mut field = ScalarField::zeroed(3, 3);
        extract_into(
            &mut field,
            lat.as_ref(),
            ResultsMode::Vorticity,
            BoundaryConditions::Periodic,
        );
        assert!((field.at(0, 1) - (0.7 - 0.3)).abs() < 1e-12);

        extract_into(
            &mut field,
            lat.as_ref(),
            ResultsMode::Vorticity,
            BoundaryConditions::BounceBack,
        );
        assert!((field.at(0, 1) - (0.0 - 0.3)).abs() < 1e-12);
    }

    #[test]
    fn test_vorticity_row_always_wraps() {
        // The last row looks ahead to row 0 in every mode.
        let mut lat = uniform(3, 3, 1.0, [0.0, 0.0]);
        *lat.cell_mut(1, 0) = Cell::equilibrium(1.0, [0.2, 0.0]);
        *lat.cell_mut(1, 2) = Cell::equilibrium(1.0, [0.5, 0.0]);

        let mut field = ScalarField::zeroed(3, 3);
        for boundary in [BoundaryConditions::BounceBack, BoundaryConditions::Periodic] {
            extract_into(&mut field, lat.as_ref(), ResultsMode::Vorticity, boundary);
            // At (1, 2): -(vrow.x - v.x) with vrow read from row 0.
            assert!(
                (field.at(1, 2) - -(0.2 - 0.5)).abs() < 1e-12,
                "mode {boundary:?}: {}",
                field.at(1, 2)
            );
        }
    }

    #[test]
    fn test_min_max() {
        let mut field = ScalarField::zeroed(2, 2);
        field.data.copy_from_slice(&[0.5, -1.0, 2.0, 0.0]);
        assert_eq!(field.min_max(), (-1.0, 2.0));
    }
}
