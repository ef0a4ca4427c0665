// ─────────────────────────────────────────────────────────────────────
// SCPN Gravity Core — Topology
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Cartesian process-grid transport abstraction.
//!
//! The solver only ever needs blocking pairwise send/recv of contiguous
//! double and complex-double buffers, addressed by a signed coordinate
//! shift along one mesh axis. `CartComm` captures exactly that surface;
//! `ThreadComm` is an in-process mesh of channel-connected ranks used by
//! the test suite and single-node drivers. Wiring the same trait to an
//! MPI binding is a driver concern.

use gravity_types::error::{GravityError, GravityResult};
use num_complex::Complex64;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Duration;

/// Axes of the (theta, phi) process grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshAxis {
    Theta,
    Phi,
}

/// Blocking pairwise transport over a 2D Cartesian process grid.
///
/// Every exchange in the solver is a matched send/recv pair between two
/// ranks; the posting order is chosen by the caller, so implementations
/// must not require both sides to post in the same order.
pub trait CartComm {
    /// Process-grid shape (P, Q) along (theta, phi).
    fn dims(&self) -> (usize, usize);

    /// This rank's coordinates.
    fn coords(&self) -> (usize, usize);

    fn send_real(&self, axis: MeshAxis, shift: isize, tag: u32, data: &[f64])
        -> GravityResult<()>;

    fn recv_real(&self, axis: MeshAxis, shift: isize, tag: u32, out: &mut [f64])
        -> GravityResult<()>;

    fn send_complex(
        &self,
        axis: MeshAxis,
        shift: isize,
        tag: u32,
        data: &[Complex64],
    ) -> GravityResult<()>;

    fn recv_complex(
        &self,
        axis: MeshAxis,
        shift: isize,
        tag: u32,
        out: &mut [Complex64],
    ) -> GravityResult<()>;

    /// Coordinates of the rank at `shift` steps along `axis`.
    fn neighbor(&self, axis: MeshAxis, shift: isize) -> GravityResult<(usize, usize)> {
        let (p, q) = self.dims();
        let (ct, cp) = self.coords();
        let (pos, extent) = match axis {
            MeshAxis::Theta => (ct, p),
            MeshAxis::Phi => (cp, q),
        };
        let target = pos as isize + shift;
        if target < 0 || target >= extent as isize {
            return Err(GravityError::Transport(format!(
                "Neighbor shift {shift} along {axis:?} leaves the process grid \
                 (position {pos} of {extent})"
            )));
        }
        let target = target as usize;
        Ok(match axis {
            MeshAxis::Theta => (target, cp),
            MeshAxis::Phi => (ct, target),
        })
    }
}

enum Payload {
    Real(Vec<f64>),
    Complex(Vec<Complex64>),
}

struct Packet {
    from: (usize, usize),
    tag: u32,
    payload: Payload,
}

const RECV_TIMEOUT: Duration = Duration::from_secs(60);

/// In-process Cartesian mesh backed by mpsc channels.
///
/// Each rank owns one inbox; packets from unrelated peers that arrive
/// ahead of the expected one are stashed and matched later by
/// (source, tag), so the SPMD exchange patterns cannot interleave into a
/// wrong delivery.
pub struct ThreadComm {
    dims: (usize, usize),
    coords: (usize, usize),
    peers: HashMap<(usize, usize), Sender<Packet>>,
    inbox: Receiver<Packet>,
    stash: RefCell<VecDeque<Packet>>,
}

impl ThreadComm {
    /// Build all ranks of a (p, q) mesh. The returned vector is ordered
    /// theta-major: rank (ct, cp) sits at index ct * q + cp.
    pub fn mesh(p: usize, q: usize) -> Vec<ThreadComm> {
        assert!(p >= 1 && q >= 1, "mesh dimensions must be positive");
        let mut senders = Vec::with_capacity(p * q);
        let mut inboxes = Vec::with_capacity(p * q);
        for _ in 0..p * q {
            let (tx, rx) = channel();
            senders.push(tx);
            inboxes.push(rx);
        }
        let mut ranks = Vec::with_capacity(p * q);
        for ct in 0..p {
            for cp in 0..q {
                let mut peers = HashMap::new();
                for ot in 0..p {
                    for op in 0..q {
                        peers.insert((ot, op), senders[ot * q + op].clone());
                    }
                }
                ranks.push(ThreadComm {
                    dims: (p, q),
                    coords: (ct, cp),
                    peers,
                    inbox: inboxes.remove(0),
                    stash: RefCell::new(VecDeque::new()),
                });
            }
        }
        ranks
    }

    /// Single-rank communicator for serial solves.
    pub fn solo() -> ThreadComm {
        Self::mesh(1, 1).remove(0)
    }

    fn post(&self, axis: MeshAxis, shift: isize, tag: u32, payload: Payload) -> GravityResult<()> {
        let target = self.neighbor(axis, shift)?;
        let sender = self.peers.get(&target).ok_or_else(|| {
            GravityError::Transport(format!("No channel to rank {target:?}"))
        })?;
        sender
            .send(Packet {
                from: self.coords,
                tag,
                payload,
            })
            .map_err(|_| {
                GravityError::Transport(format!("Peer {target:?} disconnected during send"))
            })
    }

    fn take(&self, axis: MeshAxis, shift: isize, tag: u32) -> GravityResult<Payload> {
        let source = self.neighbor(axis, shift)?;
        let mut stash = self.stash.borrow_mut();
        if let Some(pos) = stash
            .iter()
            .position(|pkt| pkt.from == source && pkt.tag == tag)
        {
            if let Some(pkt) = stash.remove(pos) {
                return Ok(pkt.payload);
            }
        }
        loop {
            let pkt = self.inbox.recv_timeout(RECV_TIMEOUT).map_err(|e| {
                GravityError::Transport(format!(
                    "Receive from {source:?} (tag {tag}) failed: {e}"
                ))
            })?;
            if pkt.from == source && pkt.tag == tag {
                return Ok(pkt.payload);
            }
            stash.push_back(pkt);
        }
    }
}

impl CartComm for ThreadComm {
    fn dims(&self) -> (usize, usize) {
        self.dims
    }

    fn coords(&self) -> (usize, usize) {
        self.coords
    }

    fn send_real(
        &self,
        axis: MeshAxis,
        shift: isize,
        tag: u32,
        data: &[f64],
    ) -> GravityResult<()> {
        self.post(axis, shift, tag, Payload::Real(data.to_vec()))
    }

    fn recv_real(
        &self,
        axis: MeshAxis,
        shift: isize,
        tag: u32,
        out: &mut [f64],
    ) -> GravityResult<()> {
        match self.take(axis, shift, tag)? {
            Payload::Real(data) if data.len() == out.len() => {
                out.copy_from_slice(&data);
                Ok(())
            }
            Payload::Real(data) => Err(GravityError::Transport(format!(
                "Length mismatch on real receive: got {}, expected {}",
                data.len(),
                out.len()
            ))),
            Payload::Complex(_) => Err(GravityError::Transport(
                "Type mismatch: expected real payload, got complex".to_string(),
            )),
        }
    }

    fn send_complex(
        &self,
        axis: MeshAxis,
        shift: isize,
        tag: u32,
        data: &[Complex64],
    ) -> GravityResult<()> {
        self.post(axis, shift, tag, Payload::Complex(data.to_vec()))
    }

    fn recv_complex(
        &self,
        axis: MeshAxis,
        shift: isize,
        tag: u32,
        out: &mut [Complex64],
    ) -> GravityResult<()> {
        match self.take(axis, shift, tag)? {
            Payload::Complex(data) if data.len() == out.len() => {
                out.copy_from_slice(&data);
                Ok(())
            }
            Payload::Complex(data) => Err(GravityError::Transport(format!(
                "Length mismatch on complex receive: got {}, expected {}",
                data.len(),
                out.len()
            ))),
            Payload::Real(_) => Err(GravityError::Transport(
                "Type mismatch: expected complex payload, got real".to_string(),
            )),
        }
    }
}

/// Run one closure per rank of a (p, q) mesh on scoped threads and
/// collect the per-rank results in theta-major order.
pub fn run_mesh<T, F>(p: usize, q: usize, f: F) -> GravityResult<Vec<T>>
where
    F: Fn(ThreadComm) -> GravityResult<T> + Sync,
    T: Send,
{
    let comms = ThreadComm::mesh(p, q);
    let f = &f;
    let outcomes: Vec<GravityResult<T>> = std::thread::scope(|scope| {
        let handles: Vec<_> = comms
            .into_iter()
            .map(|comm| scope.spawn(move || f(comm)))
            .collect();
        handles
            .into_iter()
            .map(|h| {
                h.join().unwrap_or_else(|_| {
                    Err(GravityError::Transport("Rank thread panicked".to_string()))
                })
            })
            .collect()
    });
    outcomes.into_iter().collect()
}
