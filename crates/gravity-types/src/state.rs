// ─────────────────────────────────────────────────────────────────────
// SCPN Gravity Core — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Spherical-grid geometry and rank-window decomposition metadata.
//!
//! A `SphericalGrid` is built once per solver handle and holds every
//! geometric array the spectral pipeline consumes: radial interfaces,
//! cell centers, face areas, cell volumes, and the uniform angular grid
//! with its cosine-difference volume weights.

use crate::error::{GravityError, GravityResult};
use ndarray::Array1;

/// Spherical polar grid with precomputed metric arrays.
///
/// Radial zones are cell-centered between the `n_r + 1` interfaces in
/// `r_if`; the angular grid is uniform with `d_theta = pi / n_theta` and
/// `d_phi = 2 pi / n_phi`. `n_theta` and `n_phi` must be powers of two.
#[derive(Debug, Clone)]
pub struct SphericalGrid {
    pub n_r: usize,
    pub n_theta: usize,
    pub n_phi: usize,
    /// Radial interfaces [n_r + 1], monotone increasing, r_if[0] >= 0.
    pub r_if: Array1<f64>,
    /// Radial cell centers [n_r].
    pub r_c: Array1<f64>,
    /// Interface areas r_if^2 [n_r + 1].
    pub da_r: Array1<f64>,
    /// Cell volumes (r_if[i+1]^3 - r_if[i]^3) / 3 [n_r].
    pub dv_r: Array1<f64>,
    /// Theta interfaces [n_theta + 1].
    pub theta_if: Array1<f64>,
    /// Theta cell centers [n_theta].
    pub theta_c: Array1<f64>,
    /// Volume weight (cos theta_if[j] - cos theta_if[j+1]) / d_theta [n_theta].
    pub vol_th: Array1<f64>,
    pub d_theta: f64,
    pub d_phi: f64,
}

impl SphericalGrid {
    /// Build the grid from radial interfaces and angular zone counts.
    pub fn from_interfaces(
        r_if: Array1<f64>,
        n_theta: usize,
        n_phi: usize,
    ) -> GravityResult<Self> {
        if r_if.len() < 3 {
            return Err(GravityError::GridViolation(format!(
                "Need at least 2 radial zones, got {} interfaces",
                r_if.len()
            )));
        }
        let n_r = r_if.len() - 1;
        if r_if[0] < 0.0 {
            return Err(GravityError::GridViolation(format!(
                "Innermost radial interface must be >= 0, got {}",
                r_if[0]
            )));
        }
        for i in 0..n_r {
            if r_if[i + 1] <= r_if[i] {
                return Err(GravityError::GridViolation(format!(
                    "Radial interfaces must increase monotonically: r_if[{}] = {} >= r_if[{}] = {}",
                    i,
                    r_if[i],
                    i + 1,
                    r_if[i + 1]
                )));
            }
        }
        if !n_theta.is_power_of_two() || n_theta < 2 {
            return Err(GravityError::GridViolation(format!(
                "n_theta must be a power of two >= 2, got {n_theta}"
            )));
        }
        if !n_phi.is_power_of_two() || n_phi < 2 {
            return Err(GravityError::GridViolation(format!(
                "n_phi must be a power of two >= 2, got {n_phi}"
            )));
        }

        let r_c = Array1::from_shape_fn(n_r, |i| 0.5 * (r_if[i] + r_if[i + 1]));
        let da_r = r_if.mapv(|r| r * r);
        let dv_r = Array1::from_shape_fn(n_r, |i| {
            (r_if[i + 1].powi(3) - r_if[i].powi(3)) / 3.0
        });

        let d_theta = std::f64::consts::PI / n_theta as f64;
        let d_phi = 2.0 * std::f64::consts::PI / n_phi as f64;
        let theta_if = Array1::from_shape_fn(n_theta + 1, |j| j as f64 * d_theta);
        let theta_c = Array1::from_shape_fn(n_theta, |j| (j as f64 + 0.5) * d_theta);
        let vol_th = Array1::from_shape_fn(n_theta, |j| {
            (theta_if[j].cos() - theta_if[j + 1].cos()) / d_theta
        });

        Ok(SphericalGrid {
            n_r,
            n_theta,
            n_phi,
            r_if,
            r_c,
            da_r,
            dv_r,
            theta_if,
            theta_c,
            vol_th,
            d_theta,
            d_phi,
        })
    }

    /// Uniform radial spacing on [0, r_max].
    pub fn uniform(n_r: usize, r_max: f64, n_theta: usize, n_phi: usize) -> GravityResult<Self> {
        if n_r == 0 || r_max <= 0.0 {
            return Err(GravityError::GridViolation(format!(
                "Uniform grid needs n_r > 0 and r_max > 0, got n_r = {n_r}, r_max = {r_max}"
            )));
        }
        let r_if = Array1::from_shape_fn(n_r + 1, |i| i as f64 * r_max / n_r as f64);
        Self::from_interfaces(r_if, n_theta, n_phi)
    }

    /// Volume of cell (i, j) under midpoint quadrature. Independent of phi.
    pub fn cell_volume(&self, i: usize, j: usize) -> f64 {
        self.dv_r[i] * self.vol_th[j] * self.d_theta * self.d_phi
    }

    pub fn outer_radius(&self) -> f64 {
        self.r_if[self.n_r]
    }
}

/// Contiguous (theta, phi) window owned by one rank, 1-based inclusive
/// as seen by the spectral pipeline.
///
/// The window must tile the angular mesh in equal power-of-two blocks;
/// `validate` checks agreement with the process-grid shape and this
/// rank's coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankWindow {
    pub n_s: usize,
    pub n_e: usize,
    pub o_s: usize,
    pub o_e: usize,
}

impl RankWindow {
    pub fn new(n_s: usize, n_e: usize, o_s: usize, o_e: usize) -> Self {
        RankWindow { n_s, n_e, o_s, o_e }
    }

    /// Window of the rank at Cartesian coordinates (theta_block, phi_block)
    /// in a (p, q) process grid.
    pub fn from_blocks(
        grid: &SphericalGrid,
        p: usize,
        q: usize,
        coords: (usize, usize),
    ) -> GravityResult<Self> {
        if p == 0 || q == 0 || grid.n_theta % p != 0 || grid.n_phi % q != 0 {
            return Err(GravityError::GridViolation(format!(
                "Process grid ({p}, {q}) does not divide mesh ({}, {})",
                grid.n_theta, grid.n_phi
            )));
        }
        let n_loc = grid.n_theta / p;
        let o_loc = grid.n_phi / q;
        let window = RankWindow::new(
            coords.0 * n_loc + 1,
            (coords.0 + 1) * n_loc,
            coords.1 * o_loc + 1,
            (coords.1 + 1) * o_loc,
        );
        window.validate(grid, (p, q), coords)?;
        Ok(window)
    }

    pub fn n_loc(&self) -> usize {
        self.n_e - self.n_s + 1
    }

    pub fn o_loc(&self) -> usize {
        self.o_e - self.o_s + 1
    }

    /// Block index of this rank along the theta axis.
    pub fn theta_block(&self) -> usize {
        (self.n_s - 1) / self.n_loc()
    }

    /// Block index of this rank along the phi axis.
    pub fn phi_block(&self) -> usize {
        (self.o_s - 1) / self.o_loc()
    }

    pub fn validate(
        &self,
        grid: &SphericalGrid,
        dims: (usize, usize),
        coords: (usize, usize),
    ) -> GravityResult<()> {
        if self.n_s < 1 || self.n_s > self.n_e || self.n_e > grid.n_theta {
            return Err(GravityError::GridViolation(format!(
                "Theta window [{}, {}] out of range for n_theta = {}",
                self.n_s, self.n_e, grid.n_theta
            )));
        }
        if self.o_s < 1 || self.o_s > self.o_e || self.o_e > grid.n_phi {
            return Err(GravityError::GridViolation(format!(
                "Phi window [{}, {}] out of range for n_phi = {}",
                self.o_s, self.o_e, grid.n_phi
            )));
        }
        let n_loc = self.n_loc();
        let o_loc = self.o_loc();
        if !n_loc.is_power_of_two() || grid.n_theta % n_loc != 0 {
            return Err(GravityError::GridViolation(format!(
                "Local theta extent {n_loc} must be a power of two dividing {}",
                grid.n_theta
            )));
        }
        if !o_loc.is_power_of_two() || grid.n_phi % o_loc != 0 {
            return Err(GravityError::GridViolation(format!(
                "Local phi extent {o_loc} must be a power of two dividing {}",
                grid.n_phi
            )));
        }
        if (self.n_s - 1) % n_loc != 0 || (self.o_s - 1) % o_loc != 0 {
            return Err(GravityError::GridViolation(format!(
                "Window ({}, {}) is not block-aligned",
                self.n_s, self.o_s
            )));
        }
        let (p, q) = dims;
        if p != grid.n_theta / n_loc || q != grid.n_phi / o_loc {
            return Err(GravityError::GridViolation(format!(
                "Communicator shape ({p}, {q}) disagrees with window blocks ({}, {})",
                grid.n_theta / n_loc,
                grid.n_phi / o_loc
            )));
        }
        if coords != (self.theta_block(), self.phi_block()) {
            return Err(GravityError::GridViolation(format!(
                "Rank coordinates {:?} disagree with window blocks ({}, {})",
                coords,
                self.theta_block(),
                self.phi_block()
            )));
        }
        Ok(())
    }
}
