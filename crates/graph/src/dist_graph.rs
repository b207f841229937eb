//! Distributed graph (spec §3 "Distributed graph" row).
//!
//! Adds to [`Graph`] a communicator, the process count/rank, a per-process
//! vertex-range table and a ghost-vertex region. The union of per-process
//! vertex ranges is contiguous over `[baseval, baseval + global_vert_count)`
//! and every edge endpoint is either a local vertex or a known ghost.

use crate::comm::Comm;
use crate::graph::graph::Graph;
use crate::index::Idx;

fn encode_u64s(values: impl Iterator<Item = u64>) -> Vec<u8> {
    let mut out = Vec::new();
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

fn decode_u64s(bytes: &[u8]) -> Vec<u64> {
    bytes
        .chunks_exact(8)
        .map(|c| u64::from_le_bytes(c.try_into().unwrap()))
        .collect()
}

/// A per-process slice of a distributed graph.
#[derive(Debug, Clone)]
pub struct DistGraph<NI: Idx> {
    local: Graph<NI>,
    /// Number of non-ghost vertices. `local`'s CSR is sized
    /// `local_count + ghost_globals.len()` so that edges may reference ghost
    /// targets; only the first `local_count` rows are ever iterated as
    /// "owned" vertices.
    local_count: NI,
    comm: Comm,
    /// `proc_vert_ranges[p]` is the half-open `[start, end)` global vertex
    /// range owned by process `p`.
    proc_vert_ranges: Vec<(NI, NI)>,
    /// Global vertex numbers of the ghost vertices appended after the local
    /// vertices in `local`'s vertex numbering.
    ghost_globals: Vec<NI>,
}

impl<NI: Idx> DistGraph<NI> {
    pub fn new(
        local: Graph<NI>,
        local_count: NI,
        comm: Comm,
        proc_vert_ranges: Vec<(NI, NI)>,
        ghost_globals: Vec<NI>,
    ) -> Self {
        debug_assert_eq!(
            local.vert_count().index(),
            local_count.index() + ghost_globals.len()
        );
        Self {
            local,
            local_count,
            comm,
            proc_vert_ranges,
            ghost_globals,
        }
    }

    pub fn local(&self) -> &Graph<NI> {
        &self.local
    }

    /// Number of non-ghost vertices owned by this process.
    pub fn local_count(&self) -> NI {
        self.local_count
    }

    pub fn ghost_count(&self) -> usize {
        self.ghost_globals.len()
    }

    pub fn comm(&self) -> &Comm {
        &self.comm
    }

    pub fn proc_count(&self) -> usize {
        self.comm.size()
    }

    pub fn proc_rank(&self) -> usize {
        self.comm.rank()
    }

    pub fn local_vert_range(&self) -> (NI, NI) {
        self.proc_vert_ranges[self.proc_rank()]
    }

    pub fn global_vert_count(&self) -> NI {
        let last = self.proc_vert_ranges.last().copied().unwrap_or((
            NI::zero(),
            NI::zero(),
        ));
        last.1
    }

    /// Translates a local vertex index into its global number.
    pub fn to_global(&self, local: NI) -> NI {
        let n_local = self.local_count.index();
        if local.index() < n_local {
            self.local_vert_range().0 + local
        } else {
            self.ghost_globals[local.index() - n_local]
        }
    }

    /// The process owning global vertex `g`, found via the sorted
    /// per-process range table.
    pub fn owner_of(&self, g: NI) -> usize {
        self.proc_vert_ranges
            .iter()
            .position(|&(start, end)| g.index() >= start.index() && g.index() < end.index())
            .expect("global vertex is covered by exactly one process range")
    }

    pub fn is_ghost(&self, local: NI) -> bool {
        local.index() >= self.local_count.index()
    }

    /// If global vertex `g` is owned by this process, its local index.
    pub fn to_local_owned(&self, g: NI) -> Option<usize> {
        let (start, end) = self.local_vert_range();
        if g.index() >= start.index() && g.index() < end.index() {
            Some(g.index() - start.index())
        } else {
            None
        }
    }

    /// If global vertex `g` is a known ghost of this process, its position
    /// in the ghost region (i.e. `local_count + position` is its local
    /// index in the CSR).
    pub fn to_local_ghost(&self, g: NI) -> Option<usize> {
        self.ghost_globals.iter().position(|&gg| gg.index() == g.index())
    }

    /// Synchronizes a per-local-vertex array onto the ghost region: every
    /// ghost slot is overwritten with the value currently held by the
    /// owning process for that global vertex. Two rank-tagged rounds over
    /// the communicator: a request round (every process tells every owner
    /// which of its vertices it needs) followed by a response round (every
    /// owner answers every requester that asked it something).
    pub fn sync_to_ghosts(&self, values: &mut [NI]) {
        debug_assert_eq!(values.len(), self.local_count.index() + self.ghost_globals.len());
        let n_local = self.local_count.index();
        let proc_count = self.proc_count();

        let mut requests_per_owner: Vec<Vec<NI>> = vec![Vec::new(); proc_count];
        for &g in &self.ghost_globals {
            requests_per_owner[self.owner_of(g)].push(g);
        }

        let request_payloads: Vec<Vec<u8>> = requests_per_owner
            .iter()
            .map(|globals| encode_u64s(globals.iter().map(|g| g.index() as u64)))
            .collect();
        let inbound_requests = self.comm.alltoallv_tagged(request_payloads);

        let (range_start, _) = self.local_vert_range();
        let mut response_payloads: Vec<Vec<u8>> = vec![Vec::new(); proc_count];
        for (requester, payload) in &inbound_requests {
            let globals = decode_u64s(payload);
            let mut response = Vec::with_capacity(globals.len() * 8);
            for g in globals {
                let local_idx = g as usize - range_start.index();
                response.extend_from_slice(&(values[local_idx].index() as u64).to_le_bytes());
            }
            response_payloads[*requester] = response;
        }
        let inbound_responses = self.comm.alltoallv_tagged(response_payloads);

        for (owner, payload) in &inbound_responses {
            let decoded = decode_u64s(payload);
            for (&g, &v) in requests_per_owner[*owner].iter().zip(decoded.iter()) {
                let ghost_idx = self
                    .ghost_globals
                    .iter()
                    .position(|&gg| gg.index() == g.index())
                    .expect("requested ghost is present in ghost_globals");
                values[n_local + ghost_idx] = NI::new(v as usize);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::csr::CsrLayout;

    #[test]
    fn owner_of_resolves_contiguous_ranges() {
        let edges = vec![(0u32, 1, 1u32)];
        let local = Graph::build(0, 2, &edges, None, CsrLayout::Sorted).unwrap();
        let results = Comm::run(2, move |comm| {
            let ranges = vec![(0u32, 2u32), (2u32, 4u32)];
            let dg = DistGraph::new(local.clone(), 2, comm, ranges, Vec::new());
            (dg.owner_of(0), dg.owner_of(3))
        });
        for (o0, o3) in results {
            assert_eq!(o0, 0);
            assert_eq!(o3, 1);
        }
    }

    #[test]
    fn sync_to_ghosts_pulls_owner_values() {
        // Two processes, each owning two vertices and holding one ghost of
        // the other's last vertex: P0 owns {0,1}, ghosts {2}; P1 owns {2,3},
        // ghosts {1}. Local CSR has no edges here; only value sync matters.
        let edges: Vec<(u32, u32, u32)> = vec![];
        let local0 = Graph::build(0, 3, &edges, None, CsrLayout::Sorted).unwrap();
        let local1 = Graph::build(0, 3, &edges, None, CsrLayout::Sorted).unwrap();
        let ranges = vec![(0u32, 2u32), (2u32, 4u32)];

        let results = Comm::run(2, move |comm| {
            let rank = comm.rank();
            if rank == 0 {
                let dg = DistGraph::new(local0.clone(), 2, comm, ranges.clone(), vec![2u32]);
                let mut values = vec![10u32, 11, 0];
                dg.sync_to_ghosts(&mut values);
                values
            } else {
                let dg = DistGraph::new(local1.clone(), 2, comm, ranges.clone(), vec![1u32]);
                let mut values = vec![20u32, 21, 0];
                dg.sync_to_ghosts(&mut values);
                values
            }
        });

        assert_eq!(results[0], vec![10, 11, 20]);
        assert_eq!(results[1], vec![20, 21, 11]);
    }
}
