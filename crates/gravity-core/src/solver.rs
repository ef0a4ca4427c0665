// ─────────────────────────────────────────────────────────────────────
// SCPN Gravity Core — Solver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! The solver handle: immutable spectral setup plus the solve pipeline.
//!
//! `GravitySolver::new` performs the whole offline setup (geometry
//! validation, radial operator, bit-reversal table, per-wavenumber
//! eigenbases) and the handle stays immutable afterwards; a rank may
//! hold several independent handles. `solve` is stateless across calls:
//! it allocates its working buffers, runs
//! rho -> FFT -> parity split -> theta transform -> radial solves ->
//! backward transform -> recombine -> inverse FFT -> Phi,
//! and leaves no residue in the handle.

use crate::eigenbasis::{build_mode_bases, ModeBasis};
use crate::radial::RadialOperator;
use crate::topology::CartComm;
use crate::{fourier, legendre, parity};
use gravity_math::fft::bit_reversal_table;
use gravity_types::error::{GravityError, GravityResult};
use gravity_types::state::{RankWindow, SphericalGrid};
use ndarray::{Array2, Array3};
use num_complex::Complex64;

pub struct GravitySolver<C: CartComm> {
    comm: C,
    grid: SphericalGrid,
    window: RankWindow,
    radial: RadialOperator,
    bitrev: Vec<usize>,
    modes: Vec<ModeBasis>,
}

impl<C: CartComm> GravitySolver<C> {
    /// Offline setup. Validates every precondition, then builds the
    /// immutable spectral data for this rank's window.
    pub fn new(grid: SphericalGrid, window: RankWindow, comm: C) -> GravityResult<Self> {
        window.validate(&grid, comm.dims(), comm.coords())?;
        let radial = RadialOperator::new(&grid);
        let bitrev = bit_reversal_table(grid.n_phi);
        let modes = build_mode_bases(&grid, &window, &bitrev)?;
        Ok(GravitySolver {
            comm,
            grid,
            window,
            radial,
            bitrev,
            modes,
        })
    }

    pub fn grid(&self) -> &SphericalGrid {
        &self.grid
    }

    pub fn window(&self) -> &RankWindow {
        &self.window
    }

    /// Bit-reversal permutation mapping storage slot to global wavenumber.
    pub fn bit_reversal(&self) -> &[usize] {
        &self.bitrev
    }

    /// Spectral setup of the locally-owned phi slots.
    pub fn modes(&self) -> &[ModeBasis] {
        &self.modes
    }

    /// Solve div grad Phi = rho on this rank's window.
    ///
    /// `rho` has shape (n_loc, n_r, o_loc) in (theta, r, phi) order; the
    /// returned potential has the same shape and indexing. Values outside
    /// the window are neither read nor produced.
    pub fn solve(&self, rho: &Array3<f64>) -> GravityResult<Array3<f64>> {
        let n_loc = self.window.n_loc();
        let o_loc = self.window.o_loc();
        let n_r = self.grid.n_r;
        if rho.dim() != (n_loc, n_r, o_loc) {
            return Err(GravityError::GridViolation(format!(
                "Source shape {:?} does not match local window ({n_loc}, {n_r}, {o_loc})",
                rho.dim()
            )));
        }

        let mut buf = rho.mapv(|v| Complex64::new(v, 0.0));
        fourier::forward_phi(&self.comm, &self.window, self.grid.n_phi, &mut buf)?;
        parity::split(&self.comm, &self.window, self.grid.n_theta, &mut buf)?;

        let mut y = legendre::forward(&self.comm, &self.grid, &self.window, &self.modes, &buf)?;
        self.solve_radial_modes(&mut y)?;
        let field = legendre::backward(&self.comm, &self.grid, &self.window, &self.modes, &y)?;

        for t in 0..n_loc {
            for i in 0..n_r {
                for kk in 0..o_loc {
                    buf[[t, i, kk]] =
                        Complex64::new(field[[t, 2 * i, kk]], field[[t, 2 * i + 1, kk]]);
                }
            }
        }

        parity::recombine(&self.comm, &self.window, self.grid.n_theta, &mut buf)?;
        fourier::inverse_phi(&self.comm, &self.window, self.grid.n_phi, &mut buf)?;
        Ok(buf.mapv(|c| c.re))
    }

    /// Per-(theta-mode, phi-mode) SPD tridiagonal solves, in place on the
    /// transformed coefficients.
    fn solve_radial_modes(&self, y: &mut Array3<f64>) -> GravityResult<()> {
        let n_loc = self.window.n_loc();
        let o_loc = self.window.o_loc();
        let n_r = self.grid.n_r;
        for t in 0..n_loc {
            // Concatenated mode index: the reduce-scatter leaves block
            // ownership aligned with the theta window.
            let mode = self.window.n_s + t;
            for kk in 0..o_loc {
                let lambda = self.modes[kk].lambda[mode - 1];
                let mut rhs = Array2::from_shape_fn((n_r, 2), |(i, c)| {
                    -y[[t, 2 * i + c, kk]] * self.grid.dv_r[i]
                });
                self.radial.solve_mode(
                    &self.grid,
                    lambda,
                    &mut rhs,
                    mode,
                    self.modes[kk].wavenumber,
                )?;
                for i in 0..n_r {
                    y[[t, 2 * i, kk]] = rhs[[i, 0]];
                    y[[t, 2 * i + 1, kk]] = rhs[[i, 1]];
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::ThreadComm;

    fn solo_solver(n_r: usize, n_theta: usize, n_phi: usize) -> GravitySolver<ThreadComm> {
        let grid = SphericalGrid::uniform(n_r, n_r as f64, n_theta, n_phi).unwrap();
        let window = RankWindow::from_blocks(&grid, 1, 1, (0, 0)).unwrap();
        GravitySolver::new(grid, window, ThreadComm::solo()).unwrap()
    }

    #[test]
    fn test_zero_density_gives_zero_potential() {
        let solver = solo_solver(16, 8, 8);
        let rho = Array3::zeros((8, 16, 8));
        let phi = solver.solve(&rho).unwrap();
        for &v in phi.iter() {
            assert!(v.abs() < 1e-12, "zero source must give zero potential: {v}");
        }
    }

    #[test]
    fn test_solve_rejects_wrong_shape() {
        let solver = solo_solver(8, 8, 8);
        let rho = Array3::zeros((8, 7, 8));
        assert!(matches!(
            solver.solve(&rho),
            Err(GravityError::GridViolation(_))
        ));
    }

    #[test]
    fn test_handle_exposes_immutable_setup() {
        let solver = solo_solver(8, 8, 8);
        assert_eq!(solver.bit_reversal(), &[0, 4, 2, 6, 1, 5, 3, 7]);
        assert_eq!(solver.modes().len(), 8);
        assert_eq!(solver.window().n_loc(), 8);
        // Monopole eigenvalue of the k = 0 slot vanishes.
        assert!(solver.modes()[0].lambda[0].abs() < 1e-9);
    }

    #[test]
    fn test_two_handles_coexist_on_one_rank() {
        let a = solo_solver(8, 8, 8);
        let b = solo_solver(12, 4, 4);
        let rho_a = Array3::zeros((8, 8, 8));
        let rho_b = Array3::zeros((4, 12, 4));
        assert!(a.solve(&rho_a).is_ok());
        assert!(b.solve(&rho_b).is_ok());
    }
}
