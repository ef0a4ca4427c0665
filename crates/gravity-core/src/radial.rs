// ─────────────────────────────────────────────────────────────────────
// SCPN Gravity Core — Radial Operator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Constant part of the radial tridiagonal operator and the per-mode
//! assembly with the falloff outer boundary.
//!
//! The base operator discretizes d/dr(r^2 dPhi/dr) in flux form with a
//! natural zero-gradient inner boundary. Each angular mode adds a
//! diagonal shift -lambda dv/r^2 and a Robin-type correction at the
//! outer interface that imposes the analytic power-law decay of that
//! mode, Phi proportional to r^(-(1+s)/2), s = sqrt(1 - 4 lambda).

use gravity_math::tridiag::spd_solve_in_place;
use gravity_types::error::{GravityError, GravityResult};
use gravity_types::state::SphericalGrid;
use ndarray::Array2;

/// Largest admissible spectral eigenvalue: beyond 1/4 the decay exponent
/// turns imaginary and the outer boundary condition is undefined.
pub const LAMBDA_MAX: f64 = 0.25;

#[derive(Debug, Clone)]
pub struct RadialOperator {
    /// Mode-independent diagonal [n_r].
    pub diag0: Vec<f64>,
    /// Symmetric off-diagonal [n_r - 1].
    pub offdiag0: Vec<f64>,
}

impl RadialOperator {
    pub fn new(grid: &SphericalGrid) -> Self {
        let n = grid.n_r;
        let mut offdiag0 = vec![0.0; n - 1];
        for i in 0..n - 1 {
            offdiag0[i] = -grid.da_r[i + 1] / (grid.r_c[i + 1] - grid.r_c[i]);
        }
        let mut diag0 = vec![0.0; n];
        diag0[0] = -offdiag0[0];
        for i in 1..n - 1 {
            diag0[i] = -offdiag0[i] - offdiag0[i - 1];
        }
        diag0[n - 1] = -offdiag0[n - 2];
        RadialOperator { diag0, offdiag0 }
    }

    /// Diagonal of the operator for spectral eigenvalue `lambda`,
    /// including the outer-boundary decay correction.
    pub fn mode_diagonal(&self, grid: &SphericalGrid, lambda: f64) -> GravityResult<Vec<f64>> {
        if lambda > LAMBDA_MAX {
            return Err(GravityError::LinAlg(format!(
                "Spectral eigenvalue {lambda} exceeds {LAMBDA_MAX}: decay exponent undefined"
            )));
        }
        let n = grid.n_r;
        let mut diag = vec![0.0; n];
        for i in 0..n {
            diag[i] =
                self.diag0[i] - lambda * grid.dv_r[i] / (grid.r_c[i] * grid.r_c[i]);
        }
        let s = (1.0 - 4.0 * lambda).sqrt();
        let r_out = grid.r_if[n];
        diag[n - 1] +=
            grid.da_r[n] * (1.0 + s) / (2.0 * r_out) * (grid.r_c[n - 1] / r_out).powf(s);
        Ok(diag)
    }

    /// Solve the per-mode system in place for the two RHS columns
    /// (real and imaginary part of the transformed source).
    ///
    /// `theta_mode` and `phi_wavenumber` only label diagnostics.
    pub fn solve_mode(
        &self,
        grid: &SphericalGrid,
        lambda: f64,
        rhs: &mut Array2<f64>,
        theta_mode: usize,
        phi_wavenumber: usize,
    ) -> GravityResult<()> {
        let diag = self
            .mode_diagonal(grid, lambda)
            .map_err(|e| breakdown(theta_mode, phi_wavenumber, lambda, &e))?;
        spd_solve_in_place(&diag, &self.offdiag0, rhs).map_err(|e| {
            GravityError::TridiagonalBreakdown {
                theta_mode,
                phi_mode: phi_wavenumber,
                message: format!(
                    "{e}; lambda = {lambda:e}, diag[0] = {:e}, diag[{}] = {:e}, offdiag[0] = {:e}",
                    diag[0],
                    grid.n_r - 1,
                    diag[grid.n_r - 1],
                    self.offdiag0[0]
                ),
            }
        })
    }
}

fn breakdown(
    theta_mode: usize,
    phi_mode: usize,
    lambda: f64,
    cause: &GravityError,
) -> GravityError {
    GravityError::TridiagonalBreakdown {
        theta_mode,
        phi_mode,
        message: format!("{cause}; lambda = {lambda:e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> SphericalGrid {
        SphericalGrid::uniform(16, 16.0, 8, 8).unwrap()
    }

    #[test]
    fn test_base_operator_row_sums_vanish() {
        // Pure Neumann operator: constant vectors are in the null space.
        let g = grid();
        let op = RadialOperator::new(&g);
        let n = g.n_r;
        for i in 0..n {
            let mut row = op.diag0[i];
            if i > 0 {
                row += op.offdiag0[i - 1];
            }
            if i + 1 < n {
                row += op.offdiag0[i];
            }
            assert!(row.abs() < 1e-9, "row {i} sum = {row}");
        }
    }

    #[test]
    fn test_monopole_correction_equals_center_radius() {
        // For lambda = 0 the exponent is s = 1 and the correction reduces
        // to da * 2/(2 r_out) * (r_c/r_out) = r_c[n-1].
        let g = grid();
        let op = RadialOperator::new(&g);
        let diag = op.mode_diagonal(&g, 0.0).unwrap();
        let n = g.n_r;
        let correction = diag[n - 1] - op.diag0[n - 1];
        assert!((correction - g.r_c[n - 1]).abs() < 1e-10);
    }

    #[test]
    fn test_mode_solve_succeeds_for_negative_lambda() {
        let g = grid();
        let op = RadialOperator::new(&g);
        for &lambda in &[0.0, -2.0, -6.0, -30.0] {
            let mut rhs = Array2::from_shape_fn((g.n_r, 2), |(i, c)| {
                -g.dv_r[i] * ((i + c) as f64).cos()
            });
            op.solve_mode(&g, lambda, &mut rhs, 1, 0).unwrap();
            assert!(rhs.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_lambda_above_quarter_rejected() {
        let g = grid();
        let op = RadialOperator::new(&g);
        let mut rhs = Array2::zeros((g.n_r, 2));
        let err = op.solve_mode(&g, 0.3, &mut rhs, 3, 5).unwrap_err();
        match err {
            GravityError::TridiagonalBreakdown {
                theta_mode,
                phi_mode,
                message,
            } => {
                assert_eq!((theta_mode, phi_mode), (3, 5));
                assert!(message.contains("exceeds"));
            }
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_monopole_solution_decays_like_inverse_r() {
        // Point source in the innermost cell, lambda = 0: outside the
        // source the discrete solution tracks C/r to second order.
        let g = grid();
        let op = RadialOperator::new(&g);
        let mut rhs = Array2::zeros((g.n_r, 2));
        rhs[[0, 0]] = -g.dv_r[0];
        op.solve_mode(&g, 0.0, &mut rhs, 1, 0).unwrap();
        // Negative potential, rising monotonically toward zero outward.
        assert!(rhs[[0, 0]] < 0.0);
        for i in 1..g.n_r {
            assert!(rhs[[i, 0]] > rhs[[i - 1, 0]]);
            assert!(rhs[[i, 0]] < 0.0);
        }
        // Far field ratio approaches r ratio
        let far = rhs[[g.n_r - 1, 0]] / rhs[[g.n_r - 2, 0]];
        let expected = g.r_c[g.n_r - 2] / g.r_c[g.n_r - 1];
        assert!(
            (far - expected).abs() < 0.05,
            "far-field decay {far} vs 1/r ratio {expected}"
        );
    }
}
