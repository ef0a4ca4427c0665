// ─────────────────────────────────────────────────────────────────────
// SCPN Gravity Core — Eigen
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Symmetric eigensolvers via cyclic Jacobi rotations.
//!
//! The angular operators diagonalized here are at most a few hundred rows,
//! so a dense Jacobi sweep is sufficient and keeps the factorization free
//! of external LAPACK bindings.

use gravity_types::error::{GravityError, GravityResult};
use ndarray::{Array1, Array2};

const MAX_SWEEPS: usize = 100;
const OFF_DIAG_TOL: f64 = 1e-13;

/// Eigendecomposition of a dense symmetric matrix by cyclic Jacobi.
///
/// Returns (eigenvalues, eigenvectors) with eigenvalues sorted descending
/// and eigenvectors as the matching orthonormal columns.
pub fn jacobi_symmetric(a: &Array2<f64>) -> GravityResult<(Array1<f64>, Array2<f64>)> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(GravityError::LinAlg(format!(
            "Jacobi needs a square matrix, got {}x{}",
            a.nrows(),
            a.ncols()
        )));
    }

    let mut m = a.clone();
    let mut v = Array2::eye(n);
    let scale = m.iter().fold(0.0f64, |acc, x| acc.max(x.abs())).max(1.0);

    let mut converged = false;
    for _ in 0..MAX_SWEEPS {
        let mut off_diag = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                off_diag += m[[i, j]].abs();
            }
        }
        if off_diag < OFF_DIAG_TOL * scale {
            converged = true;
            break;
        }

        // Elements small enough that skipping them cannot stall the
        // convergence test above are left alone.
        let skip = OFF_DIAG_TOL * scale / (n * n) as f64;
        for i in 0..n {
            for j in (i + 1)..n {
                if m[[i, j]].abs() < skip {
                    continue;
                }
                let tau = (m[[j, j]] - m[[i, i]]) / (2.0 * m[[i, j]]);
                let t = if tau >= 0.0 {
                    1.0 / (tau + (1.0 + tau * tau).sqrt())
                } else {
                    -1.0 / (-tau + (1.0 + tau * tau).sqrt())
                };
                let cos = 1.0 / (1.0 + t * t).sqrt();
                let sin = t * cos;

                let mii = m[[i, i]];
                let mjj = m[[j, j]];
                let mij = m[[i, j]];
                m[[i, i]] = cos * cos * mii - 2.0 * sin * cos * mij + sin * sin * mjj;
                m[[j, j]] = sin * sin * mii + 2.0 * sin * cos * mij + cos * cos * mjj;
                m[[i, j]] = 0.0;
                m[[j, i]] = 0.0;

                for r in 0..n {
                    if r == i || r == j {
                        continue;
                    }
                    let ri = m[[r, i]];
                    let rj = m[[r, j]];
                    m[[r, i]] = cos * ri - sin * rj;
                    m[[i, r]] = m[[r, i]];
                    m[[r, j]] = sin * ri + cos * rj;
                    m[[j, r]] = m[[r, j]];
                }

                for r in 0..n {
                    let vi = v[[r, i]];
                    let vj = v[[r, j]];
                    v[[r, i]] = cos * vi - sin * vj;
                    v[[r, j]] = sin * vi + cos * vj;
                }
            }
        }
    }

    if !converged {
        return Err(GravityError::LinAlg(format!(
            "Jacobi eigensolver did not converge within {MAX_SWEEPS} sweeps (n = {n})"
        )));
    }

    // Sort descending, permuting eigenvector columns alongside.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| {
        m[[j, j]]
            .partial_cmp(&m[[i, i]])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let values = Array1::from_shape_fn(n, |p| m[[order[p], order[p]]]);
    let vectors = Array2::from_shape_fn((n, n), |(r, p)| v[[r, order[p]]]);
    Ok((values, vectors))
}

/// Generalized symmetric tridiagonal eigenproblem A v = omega B v with
/// B = diag(weight), weight > 0.
///
/// `diag` holds the n diagonal entries of A, `sub` the n-1 symmetric
/// off-diagonal entries. Eigenvalues come back sorted descending;
/// eigenvector columns are B-orthonormal: v_p' B v_q = delta_pq.
pub fn generalized_symmetric_tridiagonal(
    diag: &[f64],
    sub: &[f64],
    weight: &[f64],
) -> GravityResult<(Array1<f64>, Array2<f64>)> {
    let n = diag.len();
    if n == 0 || sub.len() != n - 1 || weight.len() != n {
        return Err(GravityError::LinAlg(format!(
            "Inconsistent tridiagonal sizes: diag {}, sub {}, weight {}",
            n,
            sub.len(),
            weight.len()
        )));
    }
    for (i, &w) in weight.iter().enumerate() {
        if w <= 0.0 {
            return Err(GravityError::LinAlg(format!(
                "Weight matrix must be positive definite: weight[{i}] = {w}"
            )));
        }
    }

    // Reduce to standard form C = B^{-1/2} A B^{-1/2}, still symmetric.
    let inv_sqrt_w: Vec<f64> = weight.iter().map(|w| 1.0 / w.sqrt()).collect();
    let mut c = Array2::zeros((n, n));
    for i in 0..n {
        c[[i, i]] = diag[i] * inv_sqrt_w[i] * inv_sqrt_w[i];
    }
    for i in 0..n - 1 {
        let off = sub[i] * inv_sqrt_w[i] * inv_sqrt_w[i + 1];
        c[[i, i + 1]] = off;
        c[[i + 1, i]] = off;
    }

    let (values, u) = jacobi_symmetric(&c)?;

    // Back-transform v = B^{-1/2} u; columns stay B-orthonormal because
    // v' B v = u' u = I.
    let vectors = Array2::from_shape_fn((n, n), |(r, p)| u[[r, p]] * inv_sqrt_w[r]);
    Ok((values, vectors))
}
