// ─────────────────────────────────────────────────────────────────────
// SCPN Gravity Core — Error
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GravityError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Grid constraint violated: {0}")]
    GridViolation(String),

    #[error("Linear algebra error: {0}")]
    LinAlg(String),

    #[error("Angular eigensolver failed for wavenumber {wavenumber}, parity {parity}: {message}")]
    EigenFailure {
        wavenumber: usize,
        parity: usize,
        message: String,
    },

    #[error(
        "Radial solve broke down at theta-mode {theta_mode}, phi-mode {phi_mode}: {message}"
    )]
    TridiagonalBreakdown {
        theta_mode: usize,
        phi_mode: usize,
        message: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type GravityResult<T> = Result<T, GravityError>;
