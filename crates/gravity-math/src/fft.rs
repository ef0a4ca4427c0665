//! Radix-2 butterfly stages and the bit-reversal table.
//!
//! Convention matches numpy:
//! - Forward transform: unnormalized, decimation in frequency, natural
//!   input order, bit-reversed output order.
//! - Inverse transform: normalized by 1/n, decimation in time,
//!   bit-reversed input order, natural output order.
//!
//! The stages are exposed one at a time so a distributed caller can
//! interleave them with slab exchanges; `dif_forward`/`dit_inverse` run
//! the whole ladder for the single-owner case and for tests.

use num_complex::Complex64;
use std::f64::consts::PI;

/// Bit-reversal permutation of [0, n) for n a power of two.
///
/// The table is an involution: `table[table[i]] == i`.
pub fn bit_reversal_table(n: usize) -> Vec<usize> {
    assert!(n.is_power_of_two(), "bit reversal needs a power of two");
    let bits = n.trailing_zeros();
    (0..n)
        .map(|i| (i.reverse_bits() >> (usize::BITS - bits)) as usize)
        .collect()
}

/// Twiddle factor exp(-i pi e / di) for a forward stage of stride `di`.
///
/// Inverse stages use the conjugate.
pub fn stage_twiddle(exponent: usize, di: usize) -> Complex64 {
    Complex64::from_polar(1.0, -PI * exponent as f64 / di as f64)
}

/// One forward (decimation-in-frequency) butterfly stage of stride `di`.
///
/// Pairs (t, t + di) within each group of 2*di entries:
///   even slot <- lo + hi
///   odd slot  <- (lo - hi) * w^t
///
/// Requires `2 * di <= row.len()` and `row.len() % (2 * di) == 0`.
pub fn dif_stage(row: &mut [Complex64], di: usize) {
    debug_assert!(di >= 1 && 2 * di <= row.len() && row.len() % (2 * di) == 0);
    for base in (0..row.len()).step_by(2 * di) {
        for t in 0..di {
            let w = stage_twiddle(t, di);
            let lo = row[base + t];
            let hi = row[base + t + di];
            row[base + t] = lo + hi;
            row[base + t + di] = (lo - hi) * w;
        }
    }
}

/// One inverse (decimation-in-time) butterfly stage of stride `di`.
///
/// The twiddle multiplies the partner addend:
///   even slot <- lo + w^t * hi
///   odd slot  <- lo - w^t * hi
pub fn dit_stage(row: &mut [Complex64], di: usize) {
    debug_assert!(di >= 1 && 2 * di <= row.len() && row.len() % (2 * di) == 0);
    for base in (0..row.len()).step_by(2 * di) {
        for t in 0..di {
            let w = stage_twiddle(t, di).conj();
            let lo = row[base + t];
            let hi = row[base + t + di] * w;
            row[base + t] = lo + hi;
            row[base + t + di] = lo - hi;
        }
    }
}

/// Full forward transform: natural order in, bit-reversed order out.
pub fn dif_forward(row: &mut [Complex64]) {
    let n = row.len();
    assert!(n.is_power_of_two());
    let mut di = n / 2;
    while di >= 1 {
        dif_stage(row, di);
        di /= 2;
    }
}

/// Full inverse transform: bit-reversed order in, natural order out.
///
/// Applies the 1/n normalization once, up front.
pub fn dit_inverse(row: &mut [Complex64]) {
    let n = row.len();
    assert!(n.is_power_of_two());
    let scale = 1.0 / n as f64;
    for v in row.iter_mut() {
        *v *= scale;
    }
    let mut di = 1;
    while 2 * di <= n {
        dit_stage(row, di);
        di *= 2;
    }
}
