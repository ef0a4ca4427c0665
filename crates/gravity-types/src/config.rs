// ─────────────────────────────────────────────────────────────────────
// SCPN Gravity Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{GravityError, GravityResult};
use crate::state::SphericalGrid;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Top-level solver configuration.
///
/// Drivers load this from JSON; the solver itself only ever sees the
/// `SphericalGrid` built from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    pub run_name: String,
    pub mesh: MeshDims,
    pub radial: RadialSpacing,
    pub process_grid: ProcessGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshDims {
    pub n_r: usize,
    pub n_theta: usize,
    pub n_phi: usize,
}

/// Radial interface spacing law.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RadialSpacing {
    /// Equal zone widths on [0, r_max].
    Uniform { r_max: f64 },
    /// Geometric stretching: first zone width `dr_first`, each zone wider
    /// by the constant factor `ratio`.
    Stretched { dr_first: f64, ratio: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessGrid {
    pub p_theta: usize,
    pub q_phi: usize,
}

impl SolverConfig {
    pub fn from_file(path: &str) -> GravityResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_str_json(&contents)
    }

    pub fn from_str_json(contents: &str) -> GravityResult<Self> {
        let config: Self = serde_json::from_str(contents)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> GravityResult<()> {
        if self.mesh.n_r == 0 {
            return Err(GravityError::ConfigError("n_r must be positive".into()));
        }
        if self.process_grid.p_theta == 0 || self.process_grid.q_phi == 0 {
            return Err(GravityError::ConfigError(
                "Process grid dimensions must be positive".into(),
            ));
        }
        if !self.process_grid.p_theta.is_power_of_two()
            || !self.process_grid.q_phi.is_power_of_two()
        {
            return Err(GravityError::ConfigError(format!(
                "Process grid ({}, {}) must have power-of-two dimensions",
                self.process_grid.p_theta, self.process_grid.q_phi
            )));
        }
        if let RadialSpacing::Stretched { dr_first, ratio } = self.radial {
            if dr_first <= 0.0 || ratio < 1.0 {
                return Err(GravityError::ConfigError(format!(
                    "Stretched spacing needs dr_first > 0 and ratio >= 1, got {dr_first}, {ratio}"
                )));
            }
        }
        Ok(())
    }

    /// Radial interface coordinates implied by the spacing law.
    pub fn build_radial_interfaces(&self) -> Array1<f64> {
        let n_r = self.mesh.n_r;
        match self.radial {
            RadialSpacing::Uniform { r_max } => {
                Array1::from_shape_fn(n_r + 1, |i| i as f64 * r_max / n_r as f64)
            }
            RadialSpacing::Stretched { dr_first, ratio } => {
                let mut r_if = Array1::zeros(n_r + 1);
                let mut dr = dr_first;
                for i in 1..=n_r {
                    r_if[i] = r_if[i - 1] + dr;
                    dr *= ratio;
                }
                r_if
            }
        }
    }

    pub fn build_grid(&self) -> GravityResult<SphericalGrid> {
        SphericalGrid::from_interfaces(
            self.build_radial_interfaces(),
            self.mesh.n_theta,
            self.mesh.n_phi,
        )
    }
}
