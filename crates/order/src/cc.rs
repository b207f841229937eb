//! Weakly-connected-component detection over a small induced graph, used to
//! recognize the `DiCo` case at a nested-dissection leaf (spec §8 scenario
//! 3). Leaf-sized graphs make a sequential BFS the right tool here; the
//! workspace's parallel union-find machinery (`scotch_graph`'s distributed
//! ghost-sync helpers) is reserved for the coarsening/partitioning engines'
//! whole-graph scale.

use std::collections::VecDeque;

use scotch_graph::{Graph, Idx};

/// Returns, for each vertex, the id of its connected component (`0..c`),
/// components numbered in order of first visit.
pub fn connected_components<NI: Idx>(graph: &Graph<NI>) -> Vec<usize> {
    let n = graph.vert_count().index();
    let mut labels = vec![usize::MAX; n];
    let mut next_label = 0usize;

    for start in 0..n {
        if labels[start] != usize::MAX {
            continue;
        }
        let mut queue = VecDeque::new();
        queue.push_back(start);
        labels[start] = next_label;
        while let Some(v) = queue.pop_front() {
            for t in graph.neighbors(NI::new(v)) {
                let w = t.target.index();
                if labels[w] == usize::MAX {
                    labels[w] = next_label;
                    queue.push_back(w);
                }
            }
        }
        next_label += 1;
    }
    labels
}

pub fn component_count(labels: &[usize]) -> usize {
    labels.iter().copied().max().map_or(0, |m| m + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scotch_graph::CsrLayout;

    #[test]
    fn two_disjoint_edges_form_two_components() {
        let edges: Vec<(u32, u32, u32)> = vec![(0, 1, 1), (2, 3, 1)];
        let g: Graph<u32> = Graph::build(0, 4, &edges, None, CsrLayout::Sorted).unwrap();
        let labels = connected_components(&g);
        assert_eq!(component_count(&labels), 2);
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[2], labels[3]);
        assert_ne!(labels[0], labels[2]);
    }

    #[test]
    fn fully_isolated_vertices_each_get_their_own_component() {
        let g: Graph<u32> = Graph::build(0, 3, &[], None, CsrLayout::Sorted).unwrap();
        let labels = connected_components(&g);
        assert_eq!(component_count(&labels), 3);
    }
}
