// ─────────────────────────────────────────────────────────────────────
// SCPN Gravity Core — Parity Projector
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Mirror-partner exchange across the equator.
//!
//! After the split, a rank in the lower half of the theta axis holds the
//! even component at its own rows, and its mirror partner holds the odd
//! component indexed by mirrored rows: upper slot j carries the odd
//! coefficient of row n_theta + 1 - j. The recombine step is the exact
//! inverse (sum below the equator, difference above, no 1/2 factor).

use crate::topology::{CartComm, MeshAxis};
use gravity_types::error::{GravityError, GravityResult};
use gravity_types::state::RankWindow;
use ndarray::{s, Array3, ArrayView3};
use num_complex::Complex64;

const TAG_SPLIT: u32 = 0x0200;
const TAG_RECOMBINE: u32 = 0x0201;

/// Split the field into even (lower half) and odd (upper half) parts.
pub fn split<C: CartComm>(
    comm: &C,
    window: &RankWindow,
    n_theta: usize,
    buf: &mut Array3<Complex64>,
) -> GravityResult<()> {
    project(comm, window, n_theta, buf, true)
}

/// Recombine even and odd parts back into the full field.
pub fn recombine<C: CartComm>(
    comm: &C,
    window: &RankWindow,
    n_theta: usize,
    buf: &mut Array3<Complex64>,
) -> GravityResult<()> {
    project(comm, window, n_theta, buf, false)
}

fn project<C: CartComm>(
    comm: &C,
    window: &RankWindow,
    n_theta: usize,
    buf: &mut Array3<Complex64>,
    splitting: bool,
) -> GravityResult<()> {
    let n_loc = window.n_loc();
    let p = n_theta / n_loc;

    if p == 1 {
        return mirror_local(n_theta, buf, splitting);
    }

    let l0 = window.theta_block();
    let partner = p - 1 - l0;
    let shift = partner as isize - l0 as isize;
    let lower = l0 < p / 2;
    let tag = if splitting { TAG_SPLIT } else { TAG_RECOMBINE };

    let send: Vec<Complex64> = buf.iter().copied().collect();
    let mut recv = vec![Complex64::new(0.0, 0.0); send.len()];
    if lower {
        comm.send_complex(MeshAxis::Theta, shift, tag, &send)?;
        comm.recv_complex(MeshAxis::Theta, shift, tag, &mut recv)?;
    } else {
        comm.recv_complex(MeshAxis::Theta, shift, tag, &mut recv)?;
        comm.send_complex(MeshAxis::Theta, shift, tag, &send)?;
    }

    let dim = buf.dim();
    let partner_slab = ArrayView3::from_shape(dim, &recv)
        .map_err(|e| GravityError::Transport(format!("Partner slab shape mismatch: {e}")))?;
    // Reversing theta aligns partner row n_theta + 1 - j with local row j.
    let mirrored = partner_slab.slice(s![..;-1, .., ..]);

    for j in 0..dim.0 {
        for i in 0..dim.1 {
            for kk in 0..dim.2 {
                let mine = buf[[j, i, kk]];
                let theirs = mirrored[[j, i, kk]];
                buf[[j, i, kk]] = match (splitting, lower) {
                    (true, true) => 0.5 * (mine + theirs),
                    (true, false) => 0.5 * (theirs - mine),
                    (false, true) => mine + theirs,
                    (false, false) => theirs - mine,
                };
            }
        }
    }
    Ok(())
}

/// Single theta-rank branch: the mirror pairing is local. The scratch
/// copy keeps the update free of any in-place ordering dependency.
fn mirror_local(
    n_theta: usize,
    buf: &mut Array3<Complex64>,
    splitting: bool,
) -> GravityResult<()> {
    let half = n_theta / 2;
    let scratch = buf.clone();
    let (_, n_r, o_loc) = buf.dim();
    for jl in 0..half {
        let ju = n_theta - 1 - jl;
        for i in 0..n_r {
            for kk in 0..o_loc {
                let a = scratch[[jl, i, kk]];
                let b = scratch[[ju, i, kk]];
                if splitting {
                    buf[[jl, i, kk]] = 0.5 * (a + b);
                    buf[[ju, i, kk]] = 0.5 * (a - b);
                } else {
                    buf[[jl, i, kk]] = a + b;
                    buf[[ju, i, kk]] = a - b;
                }
            }
        }
    }
    Ok(())
}
