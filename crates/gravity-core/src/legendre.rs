// ─────────────────────────────────────────────────────────────────────
// SCPN Gravity Core — Distributed Legendre Transform
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Forward and backward theta transforms against the angular eigenbases,
//! with the recursive-halving reduction that both directions share.
//!
//! Each rank multiplies its local theta slab against the sub-block of
//! its parity's eigenvector basis, producing partial sums for every mode
//! block of the sector. The reduction then sums partials across the
//! sector's ranks while scattering mode ownership, so that after
//! log2(P/2) levels each rank holds exactly the coefficient block that
//! matches its own theta window (and, by the concatenated eigenvalue
//! layout, the entries lambda[n_s..n_e]).
//!
//! Odd-parity ranks address the eigenbasis through a row-reversed view:
//! the parity split leaves the upper hemisphere holding mirrored rows,
//! and reversing the basis rows restores the pairing without any data
//! movement.

use crate::eigenbasis::ModeBasis;
use crate::topology::{CartComm, MeshAxis};
use gravity_types::error::{GravityError, GravityResult};
use gravity_types::state::{RankWindow, SphericalGrid};
use ndarray::{s, Array2, Array3, ArrayView3};
use num_complex::Complex64;

const TAG_FORWARD_REDUCE: u32 = 0x0300;
const TAG_BACKWARD_REDUCE: u32 = 0x0340;

/// Forward transform: parity-split spectral field -> eigenmode
/// coefficients for the modes this rank owns.
///
/// Input shape (n_loc, n_r, o_loc) complex; output (n_loc, 2 n_r, o_loc)
/// real with interleaved real/imaginary columns.
pub fn forward<C: CartComm>(
    comm: &C,
    grid: &SphericalGrid,
    window: &RankWindow,
    modes: &[ModeBasis],
    buf: &Array3<Complex64>,
) -> GravityResult<Array3<f64>> {
    let n_loc = window.n_loc();
    let o_loc = window.o_loc();
    let n_r = grid.n_r;
    let half = grid.n_theta / 2;
    let p = grid.n_theta / n_loc;

    if p == 1 {
        let mut y = Array3::zeros((grid.n_theta, 2 * n_r, o_loc));
        for kk in 0..o_loc {
            let xw_low = weighted_block(buf, grid, window, kk, 0, half);
            let xw_up = weighted_block(buf, grid, window, kk, half, grid.n_theta);
            let ye = modes[kk].even.t().dot(&xw_low);
            let yo = modes[kk].odd.slice(s![..;-1, ..]).t().dot(&xw_up);
            y.slice_mut(s![0..half, .., kk]).assign(&ye);
            y.slice_mut(s![half.., .., kk]).assign(&yo);
        }
        return Ok(y);
    }

    let sector = p / 2;
    let parity = usize::from(window.n_e > half);
    let c = window.theta_block() - parity * sector;

    let mut y = Array3::zeros((half, 2 * n_r, o_loc));
    for kk in 0..o_loc {
        let xw = weighted_block(buf, grid, window, kk, 0, n_loc);
        let partial = if parity == 0 {
            modes[kk]
                .even
                .slice(s![c * n_loc..(c + 1) * n_loc, ..])
                .t()
                .dot(&xw)
        } else {
            modes[kk]
                .odd
                .slice(s![..;-1, ..])
                .slice(s![c * n_loc..(c + 1) * n_loc, ..])
                .t()
                .dot(&xw)
        };
        y.slice_mut(s![.., .., kk]).assign(&partial);
    }

    reduce_halving(comm, window, &mut y, TAG_FORWARD_REDUCE)?;
    Ok(y.slice(s![0..n_loc, .., ..]).to_owned())
}

/// Backward transform: eigenmode coefficients -> parity-split field
/// values on this rank's theta slab. No weight scaling, plain (not
/// transposed) multiplication, same reduction.
pub fn backward<C: CartComm>(
    comm: &C,
    grid: &SphericalGrid,
    window: &RankWindow,
    modes: &[ModeBasis],
    coeffs: &Array3<f64>,
) -> GravityResult<Array3<f64>> {
    let n_loc = window.n_loc();
    let o_loc = window.o_loc();
    let n_r = grid.n_r;
    let half = grid.n_theta / 2;
    let p = grid.n_theta / n_loc;

    if p == 1 {
        let mut out = Array3::zeros((grid.n_theta, 2 * n_r, o_loc));
        for kk in 0..o_loc {
            let xe = coeffs.slice(s![0..half, .., kk]).to_owned();
            let xo = coeffs.slice(s![half.., .., kk]).to_owned();
            let field_low = modes[kk].even.dot(&xe);
            let field_up = modes[kk].odd.slice(s![..;-1, ..]).dot(&xo);
            out.slice_mut(s![0..half, .., kk]).assign(&field_low);
            out.slice_mut(s![half.., .., kk]).assign(&field_up);
        }
        return Ok(out);
    }

    let sector = p / 2;
    let parity = usize::from(window.n_e > half);
    let c = window.theta_block() - parity * sector;

    let mut y = Array3::zeros((half, 2 * n_r, o_loc));
    for kk in 0..o_loc {
        let xhat = coeffs.slice(s![.., .., kk]).to_owned();
        let partial = if parity == 0 {
            modes[kk]
                .even
                .slice(s![.., c * n_loc..(c + 1) * n_loc])
                .dot(&xhat)
        } else {
            modes[kk]
                .odd
                .slice(s![..;-1, ..])
                .slice(s![.., c * n_loc..(c + 1) * n_loc])
                .dot(&xhat)
        };
        y.slice_mut(s![.., .., kk]).assign(&partial);
    }

    reduce_halving(comm, window, &mut y, TAG_BACKWARD_REDUCE)?;
    Ok(y.slice(s![0..n_loc, .., ..]).to_owned())
}

/// Weight-scaled real view of the complex slab rows [row_start, row_end):
/// x[t, 2i] = Re * vol_th, x[t, 2i + 1] = Im * vol_th.
fn weighted_block(
    buf: &Array3<Complex64>,
    grid: &SphericalGrid,
    window: &RankWindow,
    kk: usize,
    row_start: usize,
    row_end: usize,
) -> Array2<f64> {
    let n_r = buf.dim().1;
    Array2::from_shape_fn((row_end - row_start, 2 * n_r), |(t, col)| {
        let w = grid.vol_th[window.n_s - 1 + row_start + t];
        let v = buf[[row_start + t, col / 2, kk]];
        if col % 2 == 0 {
            v.re * w
        } else {
            v.im * w
        }
    })
}

/// Recursive-halving reduce-scatter over the parity sector.
///
/// At level `inc` a rank pairs with its neighbor `inc` theta-blocks away;
/// the "right-sending" member (even block index over inc) ships the
/// odd-indexed slab-row blocks and keeps the even-indexed ones, its
/// partner the reverse. Kept and received partials are combined pair by
/// pair, sequentially, halving the active block count until one block of
/// fully-summed coefficients remains in rows 0..n_loc.
fn reduce_halving<C: CartComm>(
    comm: &C,
    window: &RankWindow,
    y: &mut Array3<f64>,
    tag_base: u32,
) -> GravityResult<()> {
    let n_loc = window.n_loc();
    let (rows, ncols, o_loc) = y.dim();
    let mut blocks = rows / n_loc;
    let block_len = n_loc * ncols * o_loc;
    let l0 = window.theta_block();

    let mut inc = 1usize;
    let mut level = 0u32;
    while blocks > 1 {
        let keep_even = (l0 / inc) % 2 == 0;
        let shift = if keep_even {
            inc as isize
        } else {
            -(inc as isize)
        };

        let ship_first = usize::from(keep_even);
        let mut send = Vec::with_capacity(blocks / 2 * block_len);
        let mut b = ship_first;
        while b < blocks {
            send.extend(y.slice(s![b * n_loc..(b + 1) * n_loc, .., ..]).iter());
            b += 2;
        }

        let mut recv = vec![0.0; send.len()];
        let tag = tag_base + level;
        if keep_even {
            comm.send_real(MeshAxis::Theta, shift, tag, &send)?;
            comm.recv_real(MeshAxis::Theta, shift, tag, &mut recv)?;
        } else {
            comm.recv_real(MeshAxis::Theta, shift, tag, &mut recv)?;
            comm.send_real(MeshAxis::Theta, shift, tag, &send)?;
        }

        // Pairwise combine, sequential in t: writes trail reads.
        let kept_first = 1 - ship_first;
        for t in 0..blocks / 2 {
            let kept = kept_first + 2 * t;
            let chunk = ArrayView3::from_shape(
                (n_loc, ncols, o_loc),
                &recv[t * block_len..(t + 1) * block_len],
            )
            .map_err(|e| GravityError::Transport(format!("Reduction chunk shape: {e}")))?;
            for r in 0..n_loc {
                for col in 0..ncols {
                    for kk in 0..o_loc {
                        y[[t * n_loc + r, col, kk]] =
                            y[[kept * n_loc + r, col, kk]] + chunk[[r, col, kk]];
                    }
                }
            }
        }

        blocks /= 2;
        inc *= 2;
        level += 1;
    }
    Ok(())
}
