// ─────────────────────────────────────────────────────────────────────
// SCPN Gravity Core — Angular Eigenbasis
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-wavenumber diagonalization of the discrete theta operator.
//!
//! The angular Laplacian commutes with the equatorial reflection
//! theta -> pi - theta, so each phi wavenumber splits into two half-sized
//! generalized eigenproblems: even parity (Neumann at the equator) and
//! odd parity (Dirichlet at the equator). Eigenvalues are the discrete
//! analog of -l(l+1); eigenvectors are B-orthonormal with B = diag(vol_th)
//! over the lower hemisphere.

use crate::radial::LAMBDA_MAX;
use gravity_math::eigen::generalized_symmetric_tridiagonal;
use gravity_types::error::{GravityError, GravityResult};
use gravity_types::state::{RankWindow, SphericalGrid};
use ndarray::{Array1, Array2};

/// Spectral data for one locally-owned phi slot.
#[derive(Debug, Clone)]
pub struct ModeBasis {
    /// Global phi wavenumber labeling this slot (bit-reversed storage).
    pub wavenumber: usize,
    /// Concatenated eigenvalues: even parity in 0..n_theta/2, odd parity
    /// in n_theta/2..n_theta, each sector sorted descending.
    pub lambda: Array1<f64>,
    /// Even-parity eigenvector basis [n_theta/2, n_theta/2]; rows are
    /// lower-hemisphere theta zones, columns are modes.
    pub even: Array2<f64>,
    /// Odd-parity eigenvector basis, same layout.
    pub odd: Array2<f64>,
}

impl ModeBasis {
    pub fn build(grid: &SphericalGrid, wavenumber: usize) -> GravityResult<Self> {
        let half = grid.n_theta / 2;
        let dth = grid.d_theta;
        let dth2 = dth * dth;

        // lambda_phi(k) = (2 sin(k dphi / 2) / dphi)^2 * dtheta
        let sk = 2.0 * (0.5 * wavenumber as f64 * grid.d_phi).sin() / grid.d_phi;
        let lam_phi = sk * sk * dth;

        // Tridiagonal coefficients of the theta operator on the lower
        // hemisphere; the sub-diagonal equals the super-diagonal by
        // construction (sin of the shared interface).
        let mut b = vec![0.0; half];
        let mut c = vec![0.0; half];
        for t in 0..half {
            b[t] = -(grid.theta_if[t].sin() + grid.theta_if[t + 1].sin()) / dth2
                - lam_phi / (grid.theta_c[t].sin() * dth);
            c[t] = grid.theta_if[t + 1].sin() / dth2;
        }
        let weight: Vec<f64> = grid.vol_th.iter().take(half).copied().collect();

        let solve_sector = |parity: usize| -> GravityResult<(Array1<f64>, Array2<f64>)> {
            let mut diag = b.clone();
            // Equator closure: Neumann folds the mirror coupling in,
            // Dirichlet folds it out.
            if parity == 0 {
                diag[half - 1] = b[half - 1] + c[half - 1];
            } else {
                diag[half - 1] = b[half - 1] - c[half - 1];
            }
            let (values, vectors) =
                generalized_symmetric_tridiagonal(&diag, &c[..half - 1], &weight).map_err(
                    |e| GravityError::EigenFailure {
                        wavenumber,
                        parity,
                        message: e.to_string(),
                    },
                )?;
            for &v in values.iter() {
                if v > LAMBDA_MAX {
                    return Err(GravityError::EigenFailure {
                        wavenumber,
                        parity,
                        message: format!(
                            "eigenvalue {v} exceeds {LAMBDA_MAX}; outer decay exponent undefined"
                        ),
                    });
                }
            }
            Ok((values, vectors))
        };
        let (even_values, even) = solve_sector(0)?;
        let (odd_values, odd) = solve_sector(1)?;

        let mut lambda = Array1::zeros(grid.n_theta);
        for t in 0..half {
            lambda[t] = even_values[t];
            lambda[half + t] = odd_values[t];
        }

        Ok(ModeBasis {
            wavenumber,
            lambda,
            even,
            odd,
        })
    }
}

/// Build the eigenbases for every phi slot in this rank's window.
///
/// Slot kk holds the spectrum of global wavenumber `bitrev[o_s - 1 + kk]`,
/// matching the bit-reversed storage order of the forward FFT.
pub fn build_mode_bases(
    grid: &SphericalGrid,
    window: &RankWindow,
    bitrev: &[usize],
) -> GravityResult<Vec<ModeBasis>> {
    (0..window.o_loc())
        .map(|kk| ModeBasis::build(grid, bitrev[window.o_s - 1 + kk]))
        .collect()
}
