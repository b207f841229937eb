//! Coarse adjacency assembly (spec §4.3.2). For every coarse vertex built
//! from fine vertices `a` and (optionally) `b`, enumerate the fine edges of
//! both, translate endpoints through the fine-to-coarse map, and merge
//! duplicates into a single coarse edge whose weight is the sum of the
//! contributing fine-edge weights; self-loops are discarded.
//!
//! The merge uses a power-of-two open-addressed hash table keyed by the
//! coarse endpoint, sized at least `4 * max fine degree`, matching the
//! spec's sizing rule.

use scotch_graph::{CsrLayout, Graph, Idx};

use crate::multinode::MultinodeTable;

/// A minimal open-addressed hash table mapping a coarse vertex id to a slot
/// in an accumulation buffer, used once per coarse vertex to merge
/// multi-edges in `O(degree)` expected time.
struct EdgeAccumulator<NI> {
    mask: usize,
    slots: Vec<Option<NI>>,
    weights: Vec<u64>,
}

impl<NI: Idx> EdgeAccumulator<NI> {
    fn with_capacity_hint(max_degree: usize) -> Self {
        let capacity = (4 * max_degree.max(1)).next_power_of_two();
        Self {
            mask: capacity - 1,
            slots: vec![None; capacity],
            weights: vec![0; capacity],
        }
    }

    fn add(&mut self, target: NI, weight: u64) {
        let mut slot = target.index() & self.mask;
        loop {
            match self.slots[slot] {
                Some(existing) if existing.index() == target.index() => {
                    self.weights[slot] += weight;
                    return;
                }
                None => {
                    self.slots[slot] = Some(target);
                    self.weights[slot] = weight;
                    return;
                }
                Some(_) => slot = (slot + 1) & self.mask,
            }
        }
    }

    fn drain(&mut self) -> Vec<(NI, u64)> {
        let mut out = Vec::new();
        for (slot, target) in self.slots.iter_mut().enumerate() {
            if let Some(t) = target.take() {
                out.push((t, self.weights[slot]));
                self.weights[slot] = 0;
            }
        }
        out
    }
}

/// Builds the coarse graph for a shared-memory multinode table. `fine` is
/// the graph being coarsened; `fine_to_coarse[v]` gives the coarse vertex
/// number of fine vertex `v`.
pub fn assemble_coarse_shared<NI: Idx>(
    fine: &Graph<NI>,
    fine_to_coarse: &[NI],
    multinodes: &MultinodeTable<NI>,
) -> Graph<NI> {
    let coarse_count = multinodes.len();
    let max_degree = fine.vert_max_degree().index();
    let mut acc: EdgeAccumulator<NI> = EdgeAccumulator::with_capacity_hint(max_degree * 2 + 1);

    let mut edges = Vec::new();
    let mut coarse_weights = Vec::with_capacity(coarse_count);

    for coarse in 0..coarse_count {
        let coarse_ni = NI::new(coarse);
        let (a, b) = multinodes.fines(coarse_ni);

        let mut vertex_weight = fine.vertex_load(a);
        for t in fine.neighbors(a) {
            let ct = fine_to_coarse[t.target.index()];
            if ct.index() != coarse {
                acc.add(ct, t.value.index() as u64);
            }
        }
        if b.index() != a.index() {
            vertex_weight = vertex_weight + fine.vertex_load(b);
            for t in fine.neighbors(b) {
                let ct = fine_to_coarse[t.target.index()];
                if ct.index() != coarse {
                    acc.add(ct, t.value.index() as u64);
                }
            }
        }
        coarse_weights.push(vertex_weight);

        for (ct, w) in acc.drain() {
            if ct.index() > coarse {
                edges.push((coarse_ni, ct, NI::new(w as usize)));
            } else if ct.index() < coarse {
                // Already emitted when `ct` was processed as the lower
                // endpoint; nothing to do (avoids emitting each undirected
                // coarse edge twice before `Graph::build` symmetrizes it).
            }
        }
    }

    Graph::build(
        fine.baseval(),
        NI::new(coarse_count),
        &edges,
        Some(coarse_weights),
        CsrLayout::Sorted,
    )
    .expect("coarse vertex-weight cardinality matches coarse_count")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scotch_graph::CsrLayout;

    #[test]
    fn grid_coarsening_preserves_vertex_weight_sum() {
        // 4x4 grid, spec §8 scenario 4.
        let n = 4;
        let mut edges = Vec::new();
        for r in 0..n {
            for c in 0..n {
                let v = (r * n + c) as u32;
                if c + 1 < n {
                    edges.push((v, v + 1, 1u32));
                }
                if r + 1 < n {
                    edges.push((v, v + n as u32, 1u32));
                }
            }
        }
        let fine: Graph<u32> = Graph::build(0, 16, &edges, None, CsrLayout::Sorted).unwrap();

        // A trivial perfect matching: pair up consecutive vertices.
        let mut table: MultinodeTable<u32> = MultinodeTable::with_capacity(8);
        let mut fine_to_coarse = vec![0u32; 16];
        for pair in 0..8 {
            let a = (pair * 2) as u32;
            let b = a + 1;
            let c = table.push_pair(a, b);
            fine_to_coarse[a as usize] = c;
            fine_to_coarse[b as usize] = c;
        }

        let coarse = assemble_coarse_shared(&fine, &fine_to_coarse, &table);
        assert_eq!(coarse.vert_count(), 8);
        assert_eq!(coarse.velo_sum(), fine.velo_sum());
    }

    #[test]
    fn self_loops_are_discarded() {
        let fine: Graph<u32> = Graph::build(0, 2, &[(0, 1, 3u32)], None, CsrLayout::Sorted).unwrap();
        let mut table: MultinodeTable<u32> = MultinodeTable::with_capacity(1);
        table.push_pair(0, 1);
        let fine_to_coarse = vec![0u32, 0u32];
        let coarse = assemble_coarse_shared(&fine, &fine_to_coarse, &table);
        assert_eq!(coarse.vert_count(), 1);
        assert_eq!(coarse.edge_count(), 0);
    }
}
