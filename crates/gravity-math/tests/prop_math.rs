// ─────────────────────────────────────────────────────────────────────
// SCPN Gravity Core — Property-Based Tests (proptest) for gravity-math
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for gravity-math using proptest.
//!
//! Covers: bit-reversal involution, butterfly FFT round-trips and
//! agreement with rustfft, SPD tridiagonal residuals, Jacobi eigenpair
//! residuals and orthonormality.

use gravity_math::eigen::{generalized_symmetric_tridiagonal, jacobi_symmetric};
use gravity_math::fft::{bit_reversal_table, dif_forward, dit_inverse};
use gravity_math::tridiag::spd_solve_in_place;
use ndarray::Array2;
use num_complex::Complex64;
use proptest::prelude::*;
use rustfft::FftPlanner;

fn deterministic_signal(n: usize, seed: u64) -> Vec<Complex64> {
    (0..n)
        .map(|g| {
            let x = (g as f64 + 1.0) * (seed as f64 + 3.0);
            Complex64::new((x * 0.37).sin(), (x * 0.61).cos())
        })
        .collect()
}

// ── Bit Reversal ─────────────────────────────────────────────────────

proptest! {
    /// index[index[i]] == i for every power-of-two table size.
    #[test]
    fn bit_reversal_involution(exp in 1u32..12) {
        let n = 1usize << exp;
        let table = bit_reversal_table(n);
        for i in 0..n {
            prop_assert_eq!(table[table[i]], i);
        }
    }

    /// The table is a permutation: every slot is hit exactly once.
    #[test]
    fn bit_reversal_is_permutation(exp in 1u32..12) {
        let n = 1usize << exp;
        let table = bit_reversal_table(n);
        let mut seen = vec![false; n];
        for &t in &table {
            prop_assert!(!seen[t]);
            seen[t] = true;
        }
    }
}

// ── Butterfly FFT ────────────────────────────────────────────────────

proptest! {
    /// inverse(forward(x)) == x within O(n eps).
    #[test]
    fn fft_roundtrip(exp in 1u32..10, seed in 0u64..32) {
        let n = 1usize << exp;
        let original = deterministic_signal(n, seed);
        let mut row = original.clone();
        dif_forward(&mut row);
        dit_inverse(&mut row);
        let tol = 1e-12 * n as f64;
        for (a, b) in row.iter().zip(original.iter()) {
            prop_assert!((a - b).norm() < tol);
        }
    }

    /// Bit-reverse-permuted butterfly output matches rustfft.
    #[test]
    fn fft_matches_rustfft(exp in 1u32..9, seed in 0u64..16) {
        let n = 1usize << exp;
        let table = bit_reversal_table(n);
        let signal = deterministic_signal(n, seed);

        let mut ours = signal.clone();
        dif_forward(&mut ours);

        let mut reference = signal;
        let mut planner = FftPlanner::new();
        planner.plan_fft_forward(n).process(&mut reference);

        let tol = 1e-10 * n as f64;
        for s in 0..n {
            let diff = (ours[s] - reference[table[s]]).norm();
            prop_assert!(diff < tol,
                "slot {} (wavenumber {}): {} vs {}", s, table[s], ours[s], reference[table[s]]);
        }
    }

    /// Forward transform is linear.
    #[test]
    fn fft_linearity(exp in 1u32..8, alpha in -3.0f64..3.0) {
        let n = 1usize << exp;
        let a = deterministic_signal(n, 1);
        let b = deterministic_signal(n, 2);

        let mut combined: Vec<Complex64> =
            a.iter().zip(b.iter()).map(|(x, y)| x * alpha + y).collect();
        dif_forward(&mut combined);

        let mut fa = a;
        let mut fb = b;
        dif_forward(&mut fa);
        dif_forward(&mut fb);

        let tol = 1e-10 * n as f64;
        for s in 0..n {
            let expected = fa[s] * alpha + fb[s];
            prop_assert!((combined[s] - expected).norm() < tol);
        }
    }
}

// ── SPD Tridiagonal Solver ───────────────────────────────────────────

proptest! {
    /// Solutions satisfy A x = b for diagonally dominant SPD systems.
    #[test]
    fn spd_solve_residual(n in 2usize..40, coupling in 0.05f64..0.95, ncols in 1usize..4) {
        let diag = vec![2.0; n];
        let offdiag = vec![-coupling; n - 1];
        let b = Array2::from_shape_fn((n, ncols), |(i, c)| ((i * 5 + c * 3) as f64).sin());
        let mut x = b.clone();
        spd_solve_in_place(&diag, &offdiag, &mut x).unwrap();

        for c in 0..ncols {
            for i in 0..n {
                let mut ax = diag[i] * x[[i, c]];
                if i > 0 {
                    ax += offdiag[i - 1] * x[[i - 1, c]];
                }
                if i + 1 < n {
                    ax += offdiag[i] * x[[i + 1, c]];
                }
                prop_assert!((ax - b[[i, c]]).abs() < 1e-10,
                    "residual at ({}, {}): {}", i, c, ax - b[[i, c]]);
            }
        }
    }
}

// ── Jacobi Eigensolver ───────────────────────────────────────────────

proptest! {
    /// Eigenpairs satisfy A v = lambda v and the trace is preserved.
    #[test]
    fn jacobi_eigenpair_residual(n in 2usize..10) {
        let a = {
            let mut m = Array2::zeros((n, n));
            for i in 0..n {
                for j in 0..n {
                    let v = ((i * 7 + j * 11 + 5) as f64).sin();
                    m[[i, j]] += v;
                    m[[j, i]] += v;
                }
            }
            m
        };
        let (vals, vecs) = jacobi_symmetric(&a).unwrap();

        let trace: f64 = (0..n).map(|i| a[[i, i]]).sum();
        let eig_sum: f64 = vals.iter().sum();
        prop_assert!((trace - eig_sum).abs() < 1e-9);

        for p in 0..n {
            for r in 0..n {
                let mut av = 0.0;
                for s in 0..n {
                    av += a[[r, s]] * vecs[[s, p]];
                }
                prop_assert!((av - vals[p] * vecs[[r, p]]).abs() < 1e-8,
                    "eigenpair residual at ({}, {})", r, p);
            }
        }
    }

    /// Generalized eigenvector columns are B-orthonormal.
    #[test]
    fn generalized_b_orthonormal(n in 2usize..12) {
        let diag: Vec<f64> = (0..n).map(|i| -1.0 - ((i * 3) as f64).cos().abs()).collect();
        let sub: Vec<f64> = (0..n - 1).map(|i| 0.5 * ((i + 1) as f64).sin()).collect();
        let weight: Vec<f64> = (0..n).map(|i| 0.2 + 0.1 * i as f64).collect();
        let (_, v) = generalized_symmetric_tridiagonal(&diag, &sub, &weight).unwrap();

        for p in 0..n {
            for q in 0..n {
                let mut dot = 0.0;
                for r in 0..n {
                    dot += v[[r, p]] * weight[r] * v[[r, q]];
                }
                let expected = if p == q { 1.0 } else { 0.0 };
                prop_assert!((dot - expected).abs() < 1e-9);
            }
        }
    }
}
