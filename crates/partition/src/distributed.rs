//! Distributed K-way mapping (spec §6 `distributed_map`): gathers a
//! [`DistGraph`]'s per-process slices into a single shared [`Graph`] on
//! every process and runs the sequential recursive-bisection driver inside,
//! matching the spec's literal framing of the distributed mapping entry
//! point as "a recursive-bisection driver that invokes a sequential K-way
//! mapping inside" rather than a from-scratch distributed partitioner.
//!
//! `scotch_graph::Comm::allgather_bytes` stands in for the distributed
//! engine's would-be data-movement step (in the original, folding the graph
//! down to fewer processes before running a local routine); gathering to
//! every process is the simplest faithful instance of that idea in this
//! workspace's simulated-MPI substrate.

use scotch_context::Context;
use scotch_graph::{CsrLayout, DistGraph, Graph, Idx};

use crate::error::Error;
use crate::rb::partition;

fn encode_slice<NI: Idx>(dist: &DistGraph<NI>) -> Vec<u8> {
    let (start, end) = dist.local_vert_range();
    let local = dist.local();
    let n_local = dist.local_count().index();

    let weights: Vec<u64> = (0..n_local)
        .map(|v| local.vertex_load(NI::new(v)).index() as u64)
        .collect();

    let mut edges: Vec<u64> = Vec::new();
    for v in 0..n_local {
        let u_global = start.index() as u64 + v as u64;
        for t in local.neighbors(NI::new(v)) {
            let v_global = dist.to_global(t.target).index() as u64;
            if u_global < v_global {
                edges.push(u_global);
                edges.push(v_global);
                edges.push(t.value.index() as u64);
            }
        }
    }

    let mut out = Vec::new();
    out.extend_from_slice(&(start.index() as u64).to_le_bytes());
    out.extend_from_slice(&(end.index() as u64).to_le_bytes());
    out.extend_from_slice(&(weights.len() as u64).to_le_bytes());
    for w in &weights {
        out.extend_from_slice(&w.to_le_bytes());
    }
    out.extend_from_slice(&((edges.len() / 3) as u64).to_le_bytes());
    for chunk in edges.chunks_exact(3) {
        out.extend_from_slice(&chunk[0].to_le_bytes());
        out.extend_from_slice(&chunk[1].to_le_bytes());
        out.extend_from_slice(&chunk[2].to_le_bytes());
    }
    out
}

fn decode_slice(bytes: &[u8]) -> (u64, u64, Vec<u64>, Vec<(u64, u64, u64)>) {
    let mut off = 0;
    let read_u64 = |bytes: &[u8], off: &mut usize| -> u64 {
        let v = u64::from_le_bytes(bytes[*off..*off + 8].try_into().unwrap());
        *off += 8;
        v
    };
    let start = read_u64(bytes, &mut off);
    let end = read_u64(bytes, &mut off);
    let n_weights = read_u64(bytes, &mut off) as usize;
    let weights: Vec<u64> = (0..n_weights).map(|_| read_u64(bytes, &mut off)).collect();
    let n_edges = read_u64(bytes, &mut off) as usize;
    let edges: Vec<(u64, u64, u64)> = (0..n_edges)
        .map(|_| {
            let u = read_u64(bytes, &mut off);
            let v = read_u64(bytes, &mut off);
            let w = read_u64(bytes, &mut off);
            (u, v, w)
        })
        .collect();
    (start, end, weights, edges)
}

/// Assembles the full graph from every process's slice of `dist`, runs the
/// sequential [`partition`] driver identically on every process, and
/// returns this process's local slice of the result (indexed `0..local_count`,
/// matching `dist.local()`'s owned-vertex numbering).
pub fn distributed_map<NI: Idx>(
    dist: &DistGraph<NI>,
    k: usize,
    ctx: &Context,
) -> Result<Vec<i32>, Error> {
    let payload = encode_slice(dist);
    let gathered = dist.comm().allgather_bytes(payload);

    let global_n = dist.global_vert_count().index();
    let mut weights = vec![NI::new(1); global_n];
    let mut edges: Vec<(NI, NI, NI)> = Vec::new();
    for msg in &gathered {
        let (start, _end, local_weights, local_edges) = decode_slice(msg);
        for (i, &w) in local_weights.iter().enumerate() {
            weights[start as usize + i] = NI::new(w as usize);
        }
        for (u, v, w) in local_edges {
            edges.push((NI::new(u as usize), NI::new(v as usize), NI::new(w as usize)));
        }
    }

    let global = Graph::build(NI::zero(), NI::new(global_n), &edges, Some(weights), CsrLayout::Sorted)
        .map_err(|e| Error::Inconsistent(format!("gathered graph failed to rebuild: {e}")))?;

    let global_part = partition(&global, k, ctx)?;

    let (start, end) = dist.local_vert_range();
    Ok(global_part[start.index()..end.index()].to_vec())
}
