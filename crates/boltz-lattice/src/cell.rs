//! D2Q9 cell: nine directional particle distributions at one lattice site.
//!
//! Direction numbering on the 2D square lattice:
//! ```text
//!   6   2   5
//!    \  |  /
//!   3 - 0 - 1
//!    /  |  \
//!   7   4   8
//! ```

/// D2Q9 discrete velocities: [ex, ey]
pub const E: [[i32; 2]; 9] = [
    [0, 0],   // 0: rest
    [1, 0],   // 1: east
    [0, 1],   // 2: north
    [-1, 0],  // 3: west
    [0, -1],  // 4: south
    [1, 1],   // 5: northeast
    [-1, 1],  // 6: northwest
    [-1, -1], // 7: southwest
    [1, -1],  // 8: southeast
];

/// D2Q9 weights
pub const W: [f64; 9] = [
    4.0 / 9.0, // 0: rest
    1.0 / 9.0, // 1-4: cardinal
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 36.0, // 5-8: diagonal
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
];

/// Opposite direction indices for bounce-back
pub const OPP: [usize; 9] = [0, 3, 4, 1, 2, 7, 8, 5, 6];

/// Equilibrium distribution for one direction.
///
/// f_i^eq = w_i ρ [1 + 3(e_i·u) + 9/2(e_i·u)² - 3/2(u·u)]
#[inline]
fn equilibrium_slot(i: usize, rho: f64, u: [f64; 2]) -> f64 {
    let ex = E[i][0] as f64;
    let ey = E[i][1] as f64;
    let eu = ex * u[0] + ey * u[1];
    let uu = u[0] * u[0] + u[1] * u[1];
    W[i] * rho * (1.0 + 3.0 * eu + 4.5 * eu * eu - 1.5 * uu)
}

/// One lattice site: distribution functions f_i for the nine directions.
///
/// The all-zero cell doubles as the inert marker for solid sites (obstacles
/// and, in non-periodic modes, the top/bottom edge rows); inert cells are
/// never collided and bounce incoming distributions back.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cell {
    /// Distribution functions f_i
    pub f: [f64; 9],
}

impl Cell {
    /// Cell at equilibrium for the given density and velocity.
    pub fn equilibrium(rho: f64, u: [f64; 2]) -> Self {
        Self {
            f: std::array::from_fn(|i| equilibrium_slot(i, rho, u)),
        }
    }

    /// Reset to the run start state: equilibrium at unit density, fluid at rest.
    pub fn init(&mut self) {
        *self = Self::equilibrium(1.0, [0.0, 0.0]);
    }

    /// Macroscopic density ρ = Σ f_i.
    #[inline]
    pub fn density(&self) -> f64 {
        self.f.iter().sum()
    }

    /// Macroscopic velocity u = Σ e_i f_i / ρ.
    ///
    /// Zero for vanishing density, so inert (all-zero) cells report a
    /// still fluid instead of NaN.
    #[inline]
    pub fn velocity(&self) -> [f64; 2] {
        let rho = self.density();
        if rho < 1e-12 {
            return [0.0, 0.0];
        }
        let mut u = [0.0, 0.0];
        for (i, e) in E.iter().enumerate() {
            u[0] += self.f[i] * e[0] as f64;
            u[1] += self.f[i] * e[1] as f64;
        }
        u[0] /= rho;
        u[1] /= rho;
        u
    }

    /// Velocity magnitude.
    #[inline]
    pub fn speed(&self) -> f64 {
        let u = self.velocity();
        (u[0] * u[0] + u[1] * u[1]).sqrt()
    }

    /// BGK collision: relax toward equilibrium with relaxation time τ.
    ///
    /// `accel_x_tau` is the body-force term `a_x · τ`, applied as a shift of
    /// the horizontal equilibrium velocity; pass 0 for unforced sites. One
    /// collision then adds exactly `a_x` to the macroscopic velocity of a
    /// cell that started at equilibrium.
    #[inline]
    pub fn collided(&self, tau: f64, accel_x_tau: f64) -> Self {
        let rho = self.density();
        let mut u = self.velocity();
        u[0] += accel_x_tau;
        Self {
            f: std::array::from_fn(|i| {
                let feq = equilibrium_slot(i, rho, u);
                self.f[i] - (self.f[i] - feq) / tau
            }),
        }
    }
}
