//! Leaf ordering methods (spec §4.2's halo-graph-ordering method table,
//! spec §4.5's "leaf ordering strategy"): fill an inverse-permutation slice
//! with a bijection onto its global-index range.
//!
//! The richer named heuristics the strategy table lists (halo-AMD, AMF,
//! Gibbs-Poole-Stockmeyer, block splitting, compression) are left as
//! pluggable strategy-table entries; this crate ships the two leaf methods
//! needed for a complete, self-contained default strategy.

use scotch_graph::{Graph, Idx};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeafOrder {
    /// `Simple`: identity ordering — vertex `i` gets rank `i`.
    Identity,
    /// A minimum-degree-like greedy elimination order: repeatedly pick the
    /// remaining vertex of lowest current degree, number it next, and
    /// remove it from the degree count of its neighbors.
    Greedy,
}

impl LeafOrder {
    /// Returns a local permutation `perm` such that `perm[rank] = local_vertex`,
    /// i.e. the order in which local vertices `0..n` should be numbered.
    pub fn order<NI: Idx>(&self, graph: &Graph<NI>) -> Vec<usize> {
        let n = graph.vert_count().index();
        match self {
            LeafOrder::Identity => (0..n).collect(),
            LeafOrder::Greedy => greedy_minimum_degree(graph),
        }
    }
}

fn greedy_minimum_degree<NI: Idx>(graph: &Graph<NI>) -> Vec<usize> {
    let n = graph.vert_count().index();
    let mut degree: Vec<usize> = (0..n).map(|v| graph.degree(NI::new(v)).index()).collect();
    let mut removed = vec![false; n];
    let mut order = Vec::with_capacity(n);

    for _ in 0..n {
        let next = (0..n)
            .filter(|&v| !removed[v])
            .min_by_key(|&v| degree[v])
            .expect("at least one vertex remains");
        removed[next] = true;
        order.push(next);
        for t in graph.neighbors(NI::new(next)) {
            let w = t.target.index();
            if !removed[w] && degree[w] > 0 {
                degree[w] -= 1;
            }
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use scotch_graph::CsrLayout;

    #[test]
    fn identity_numbers_vertices_in_place() {
        let g: Graph<u32> = Graph::build(0, 4, &[(0, 1, 1)], None, CsrLayout::Sorted).unwrap();
        assert_eq!(LeafOrder::Identity.order(&g), vec![0, 1, 2, 3]);
    }

    #[test]
    fn greedy_order_is_a_permutation() {
        let edges: Vec<(u32, u32, u32)> = vec![(0, 1, 1), (1, 2, 1), (2, 3, 1), (1, 3, 1)];
        let g: Graph<u32> = Graph::build(0, 4, &edges, None, CsrLayout::Sorted).unwrap();
        let order = LeafOrder::Greedy.order(&g);
        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3]);
        // lowest-degree vertex (0, degree 1) is numbered first.
        assert_eq!(order[0], 0);
    }
}
