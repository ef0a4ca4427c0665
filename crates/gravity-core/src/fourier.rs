// ─────────────────────────────────────────────────────────────────────
// SCPN Gravity Core — Distributed Fourier Transform
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Distributed radix-2 FFT along the phi axis of the process grid.
//!
//! The forward transform runs log2(n_phi) decimation-in-frequency stages
//! from the largest stride down. A stage whose pair stride fits inside
//! the local slab is a plain butterfly over local phi lanes; otherwise
//! both members of every pair live on one partner rank and the stage
//! becomes a full-slab exchange, with the lower half applying the
//! additive update and the upper half the subtractive update with
//! twiddle. Output stays in bit-reversed order: local slot kk holds
//! global wavenumber bitrev[o_s - 1 + kk].
//!
//! The inverse runs the conjugate stages in the opposite order with the
//! twiddle moved onto the partner addend, pre-scaled once by 1/n_phi.

use crate::topology::{CartComm, MeshAxis};
use gravity_math::fft::{dif_stage, dit_stage, stage_twiddle};
use gravity_types::error::GravityResult;
use gravity_types::state::RankWindow;
use ndarray::Array3;
use num_complex::Complex64;

const TAG_FORWARD: u32 = 0x0100;
const TAG_INVERSE: u32 = 0x0140;

/// Forward transform of the local field block [n_loc, n_r, o_loc],
/// in place along the phi axis.
pub fn forward_phi<C: CartComm>(
    comm: &C,
    window: &RankWindow,
    n_phi: usize,
    buf: &mut Array3<Complex64>,
) -> GravityResult<()> {
    let o_loc = window.o_loc();
    let mut stage = 0u32;
    let mut di = n_phi / 2;
    while di >= 1 {
        if 2 * di <= o_loc {
            local_stage(buf, di, true);
        } else {
            exchange_stage(comm, window, di, TAG_FORWARD + stage, buf, true)?;
        }
        di /= 2;
        stage += 1;
    }
    Ok(())
}

/// Inverse transform, dividing by n_phi once up front.
pub fn inverse_phi<C: CartComm>(
    comm: &C,
    window: &RankWindow,
    n_phi: usize,
    buf: &mut Array3<Complex64>,
) -> GravityResult<()> {
    let o_loc = window.o_loc();
    let scale = 1.0 / n_phi as f64;
    buf.mapv_inplace(|v| v * scale);

    let mut stage = 0u32;
    let mut di = 1;
    while 2 * di <= n_phi {
        if 2 * di <= o_loc {
            local_stage(buf, di, false);
        } else {
            exchange_stage(comm, window, di, TAG_INVERSE + stage, buf, false)?;
        }
        di *= 2;
        stage += 1;
    }
    Ok(())
}

/// Butterfly a stage that lives entirely inside the local slab.
///
/// The twiddle exponent is (global phi index) mod di; the window start
/// is a multiple of 2*di here, so the local index works directly.
fn local_stage(buf: &mut Array3<Complex64>, di: usize, forward: bool) {
    for mut lane in buf.lanes_mut(ndarray::Axis(2)) {
        let row = lane.as_slice_mut().expect("phi lanes must be contiguous");
        if forward {
            dif_stage(row, di);
        } else {
            dit_stage(row, di);
        }
    }
}

/// Butterfly a stage whose pairs straddle a process boundary.
///
/// Every local index has its partner at the rank di/o_loc steps along
/// phi. The lower half of each pair posts send before receive, the
/// upper half the reverse, so the pairwise exchange cannot deadlock.
fn exchange_stage<C: CartComm>(
    comm: &C,
    window: &RankWindow,
    di: usize,
    tag: u32,
    buf: &mut Array3<Complex64>,
    forward: bool,
) -> GravityResult<()> {
    let o_loc = window.o_loc();
    let o0 = window.o_s - 1;
    let lower = (o0 / di) % 2 == 0;
    let rank_step = (di / o_loc) as isize;
    let shift = if lower { rank_step } else { -rank_step };

    let send: Vec<Complex64> = buf.iter().copied().collect();
    let mut recv = vec![Complex64::new(0.0, 0.0); send.len()];
    if lower {
        comm.send_complex(MeshAxis::Phi, shift, tag, &send)?;
        comm.recv_complex(MeshAxis::Phi, shift, tag, &mut recv)?;
    } else {
        comm.recv_complex(MeshAxis::Phi, shift, tag, &mut recv)?;
        comm.send_complex(MeshAxis::Phi, shift, tag, &send)?;
    }

    let (n_loc, n_r, _) = buf.dim();
    let mut flat = 0usize;
    for j in 0..n_loc {
        for i in 0..n_r {
            for kk in 0..o_loc {
                let mine = buf[[j, i, kk]];
                let theirs = recv[flat];
                flat += 1;
                let e = (o0 + kk) % di;
                buf[[j, i, kk]] = if forward {
                    if lower {
                        mine + theirs
                    } else {
                        (theirs - mine) * stage_twiddle(e, di)
                    }
                } else {
                    let w = stage_twiddle(e, di).conj();
                    if lower {
                        mine + w * theirs
                    } else {
                        theirs - w * mine
                    }
                };
            }
        }
    }
    Ok(())
}
