// ─────────────────────────────────────────────────────────────────────
// SCPN Gravity Core — Tridiag
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! LDL' factorization and solve for symmetric positive definite
//! tridiagonal systems with multiple right-hand sides.
//!
//! No pivoting: the per-mode radial operators are SPD by construction,
//! and a non-positive pivot means the assembly violated that contract,
//! which the caller must treat as fatal.

use gravity_types::error::{GravityError, GravityResult};
use ndarray::Array2;

/// Solve A X = B in place for SPD tridiagonal A.
///
/// - `diag`: main diagonal \[n\]
/// - `offdiag`: symmetric off-diagonal \[n-1\]
/// - `rhs`: right-hand sides as columns \[n, ncols\]; overwritten with
///   the solution.
///
/// Fails with a `LinAlg` error naming the offending row if a pivot is
/// not strictly positive.
pub fn spd_solve_in_place(
    diag: &[f64],
    offdiag: &[f64],
    rhs: &mut Array2<f64>,
) -> GravityResult<()> {
    let n = diag.len();
    if n == 0 || offdiag.len() != n - 1 || rhs.nrows() != n {
        return Err(GravityError::LinAlg(format!(
            "Inconsistent system sizes: diag {}, offdiag {}, rhs rows {}",
            n,
            offdiag.len(),
            rhs.nrows()
        )));
    }
    let ncols = rhs.ncols();

    // Factor A = L D L' with unit lower bidiagonal L.
    let mut d = vec![0.0; n];
    let mut l = vec![0.0; n.saturating_sub(1)];
    d[0] = diag[0];
    if d[0] <= 0.0 {
        return Err(GravityError::LinAlg(format!(
            "Non-positive pivot {} at row 0: system is not SPD",
            d[0]
        )));
    }
    for i in 0..n - 1 {
        l[i] = offdiag[i] / d[i];
        d[i + 1] = diag[i + 1] - l[i] * offdiag[i];
        if d[i + 1] <= 0.0 {
            return Err(GravityError::LinAlg(format!(
                "Non-positive pivot {} at row {}: system is not SPD",
                d[i + 1],
                i + 1
            )));
        }
    }

    // Forward substitution L y = b, then diagonal scale and L' x = y.
    for c in 0..ncols {
        for i in 1..n {
            let prev = rhs[[i - 1, c]];
            rhs[[i, c]] -= l[i - 1] * prev;
        }
        for i in 0..n {
            rhs[[i, c]] /= d[i];
        }
        for i in (0..n - 1).rev() {
            let next = rhs[[i + 1, c]];
            rhs[[i, c]] -= l[i] * next;
        }
    }
    Ok(())
}
