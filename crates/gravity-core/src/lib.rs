// ─────────────────────────────────────────────────────────────────────
// SCPN Gravity Core — Gravity Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Distributed spectral solver for the 3D Poisson equation in spherical
//! polar coordinates.
//!
//! The solve pipeline runs SPMD over a 2D Cartesian process grid along
//! (theta, phi): forward phi-FFT, parity split across theta mirrors,
//! forward Legendre transform with a recursive-halving reduction, one SPD
//! tridiagonal radial solve per angular mode, and the matching backward
//! pipeline.

pub mod eigenbasis;
pub mod fourier;
pub mod legendre;
pub mod parity;
pub mod radial;
pub mod solver;
pub mod topology;

pub use solver::GravitySolver;
pub use topology::{run_mesh, CartComm, MeshAxis, ThreadComm};
