//! A minimal process communicator abstraction.
//!
//! The upstream library drives its distributed engines over MPI. This
//! workspace has no MPI binding available, so distributed execution is
//! simulated in-process: each "process" is a rayon task running inside a
//! [`rayon::scope`], and point-to-point / collective operations are modeled
//! with per-rank mailboxes guarded by a [`parking_lot::Mutex`]. The API
//! surface (`send`, `recv`, `alltoallv`, `allgather`, `allreduce_max`)
//! mirrors the handful of MPI calls the spec's engines actually use, so the
//! engines above this crate read the same way they would against a real
//! communicator.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

struct Mailbox {
    queues: Vec<Mutex<Vec<Vec<u8>>>>,
    signal: Condvar,
    lock: Mutex<()>,
}

/// A communicator shared by every simulated process in a single `Comm::run`
/// invocation. Cloning a `Comm` is cheap; each clone is bound to a distinct
/// rank within the same process group.
#[derive(Clone)]
pub struct Comm {
    rank: usize,
    size: usize,
    mailbox: Arc<Mailbox>,
}

impl Comm {
    /// Runs `body` once per simulated process, `proc_count` processes total,
    /// each on its own rayon task, and returns the per-process results in
    /// rank order.
    pub fn run<T, F>(proc_count: usize, body: F) -> Vec<T>
    where
        T: Send,
        F: Fn(Comm) -> T + Send + Sync,
    {
        let mailbox = Arc::new(Mailbox {
            queues: (0..proc_count).map(|_| Mutex::new(Vec::new())).collect(),
            signal: Condvar::new(),
            lock: Mutex::new(()),
        });

        let comms: Vec<Comm> = (0..proc_count)
            .map(|rank| Comm {
                rank,
                size: proc_count,
                mailbox: mailbox.clone(),
            })
            .collect();

        let mut results = Vec::with_capacity(proc_count);
        rayon::scope(|s| {
            let (tx, rx) = std::sync::mpsc::channel();
            for comm in comms {
                let tx = tx.clone();
                let body = &body;
                s.spawn(move |_| {
                    let rank = comm.rank;
                    let result = body(comm);
                    tx.send((rank, result)).expect("result channel open");
                });
            }
            drop(tx);
            let mut collected: Vec<Option<T>> = (0..proc_count).map(|_| None).collect();
            for (rank, result) in rx {
                collected[rank] = Some(result);
            }
            results = collected.into_iter().map(|r| r.unwrap()).collect();
        });
        results
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Sends a message to `dest`, encoding it with `bincode`-free raw bytes
    /// supplied by the caller (the engines above serialize their own
    /// fixed-width records).
    pub fn send_raw(&self, dest: usize, payload: Vec<u8>) {
        let _guard = self.mailbox.lock.lock();
        self.mailbox.queues[dest].lock().push(payload);
        self.mailbox.signal.notify_all();
    }

    /// Blocks until exactly `expected` messages have been received from any
    /// source and returns them in arrival order. Used by the neighbor-
    /// exchange rounds in the coarsening engine, which know in advance how
    /// many proposals/acknowledgements they must collect.
    pub fn recv_n_raw(&self, expected: usize) -> Vec<Vec<u8>> {
        let mut out = Vec::with_capacity(expected);
        loop {
            {
                let mut q = self.mailbox.queues[self.rank].lock();
                while let Some(msg) = q.pop() {
                    out.push(msg);
                    if out.len() == expected {
                        return out;
                    }
                }
            }
            if out.len() >= expected {
                return out;
            }
            let mut guard = self.mailbox.lock.lock();
            self.mailbox.signal.wait(&mut guard);
        }
    }

    /// A simple barrier-free all-to-all-v: every rank provides a payload per
    /// destination rank (possibly empty), the call returns once every rank
    /// has sent its outbound batch and collected every inbound message
    /// addressed to it. `counts` must list, for every source rank, how many
    /// messages this rank expects to receive from it overall (used so each
    /// rank knows when it has drained its mailbox for the round).
    pub fn alltoallv_raw(&self, outbound: Vec<Vec<u8>>, expected_total: usize) -> Vec<Vec<u8>> {
        for (dest, payload) in outbound.into_iter().enumerate() {
            if dest != self.rank {
                self.send_raw(dest, payload);
            }
        }
        self.recv_n_raw(expected_total)
    }

    /// All-to-all-v where every rank provides one payload per destination
    /// rank (possibly empty) and gets back every other rank's payload
    /// addressed to it, tagged with the sender's rank. Unlike
    /// [`Comm::alltoallv_raw`], the caller doesn't need to separately track
    /// who sent what — every rank must call this together, once per round.
    pub fn alltoallv_tagged(&self, mut outbound: Vec<Vec<u8>>) -> Vec<(usize, Vec<u8>)> {
        for (dest, payload) in outbound.iter_mut().enumerate() {
            if dest != self.rank {
                let mut tagged = (self.rank as u64).to_le_bytes().to_vec();
                tagged.extend_from_slice(payload);
                self.send_raw(dest, tagged);
            }
        }
        let expected = self.size.saturating_sub(1);
        self.recv_n_raw(expected)
            .into_iter()
            .map(|msg| {
                let sender = u64::from_le_bytes(msg[0..8].try_into().unwrap()) as usize;
                (sender, msg[8..].to_vec())
            })
            .collect()
    }

    /// `allgather` of a single `usize` per rank.
    pub fn allgather_usize(&self, value: usize) -> Vec<usize> {
        if self.rank == 0 {
            let mut out = vec![0usize; self.size];
            out[0] = value;
            for msg in self.recv_n_raw(self.size - 1) {
                let rank = usize::from_le_bytes(msg[0..8].try_into().unwrap());
                let v = usize::from_le_bytes(msg[8..16].try_into().unwrap());
                out[rank] = v;
            }
            for dest in 1..self.size {
                self.send_raw(dest, bincode_usize_vec(&out));
            }
            out
        } else {
            let mut payload = self.rank.to_le_bytes().to_vec();
            payload.extend_from_slice(&value.to_le_bytes());
            self.send_raw(0, payload);
            let msg = self.recv_n_raw(1).pop().unwrap();
            decode_usize_vec(&msg)
        }
    }

    /// `allreduce` with the `MAX` operator over a single `i32` status code.
    pub fn allreduce_max_i32(&self, value: i32) -> i32 {
        let gathered = self.allgather_usize(value as u32 as usize);
        gathered.into_iter().map(|v| v as i32).max().unwrap_or(0)
    }

    /// `allgather` of a variable-length byte payload per rank, used by
    /// [`distributed_map`](crate)-style callers that assemble a global
    /// problem instance from per-process slices before invoking a
    /// sequential routine. Every rank gets back every rank's payload, in
    /// rank order.
    pub fn allgather_bytes(&self, payload: Vec<u8>) -> Vec<Vec<u8>> {
        if self.rank == 0 {
            let mut out: Vec<Vec<u8>> = vec![Vec::new(); self.size];
            out[0] = payload;
            for msg in self.recv_n_raw(self.size - 1) {
                let rank = u64::from_le_bytes(msg[0..8].try_into().unwrap()) as usize;
                out[rank] = msg[8..].to_vec();
            }
            let mut encoded = Vec::new();
            for v in &out {
                encoded.extend_from_slice(&(v.len() as u64).to_le_bytes());
                encoded.extend_from_slice(v);
            }
            for dest in 1..self.size {
                self.send_raw(dest, encoded.clone());
            }
            out
        } else {
            let mut tagged = (self.rank as u64).to_le_bytes().to_vec();
            tagged.extend_from_slice(&payload);
            self.send_raw(0, tagged);
            let msg = self.recv_n_raw(1).pop().unwrap();
            let mut out = Vec::with_capacity(self.size);
            let mut off = 0;
            for _ in 0..self.size {
                let len = u64::from_le_bytes(msg[off..off + 8].try_into().unwrap()) as usize;
                off += 8;
                out.push(msg[off..off + len].to_vec());
                off += len;
            }
            out
        }
    }
}

fn bincode_usize_vec(values: &[usize]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 8);
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

fn decode_usize_vec(bytes: &[u8]) -> Vec<usize> {
    bytes
        .chunks_exact(8)
        .map(|c| usize::from_le_bytes(c.try_into().unwrap()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allgather_collects_every_rank() {
        let results = Comm::run(4, |comm| comm.allgather_usize(comm.rank() * 10));
        for gathered in results {
            assert_eq!(gathered, vec![0, 10, 20, 30]);
        }
    }

    #[test]
    fn allgather_bytes_collects_variable_length_payloads() {
        let results = Comm::run(3, |comm| {
            let payload = vec![comm.rank() as u8; comm.rank() + 1];
            comm.allgather_bytes(payload)
        });
        for gathered in results {
            assert_eq!(gathered, vec![vec![0u8], vec![1u8, 1], vec![2u8, 2, 2]]);
        }
    }

    #[test]
    fn allreduce_max_picks_largest_status() {
        let results = Comm::run(3, |comm| comm.allreduce_max_i32(comm.rank() as i32));
        assert!(results.iter().all(|&r| r == 2));
    }
}
