//! Halo (sub)mesh / halo graph (spec §3).
//!
//! A halo mesh extends a graph with a set of halo vertices appended after
//! the non-halo ones. Halo vertices carry adjacencies that cross the
//! subgraph boundary and must not be renumbered — they are placeholders for
//! vertices that live on a neighboring process or subdomain.

use crate::graph::graph::Graph;
use crate::index::Idx;

/// A graph plus a halo region. `vnohnnd` is the first halo vertex number;
/// vertices `[baseval, vnohnnd)` are non-halo, `[vnohnnd, vert_count)` are
/// halo vertices.
#[derive(Debug, Clone)]
pub struct HaloMesh<NI: Idx> {
    graph: Graph<NI>,
    vnohnnd: NI,
}

impl<NI: Idx> HaloMesh<NI> {
    pub fn new(graph: Graph<NI>, vnohnnd: NI) -> Self {
        debug_assert!(vnohnnd.index() <= graph.vert_count().index());
        Self { graph, vnohnnd }
    }

    pub fn graph(&self) -> &Graph<NI> {
        &self.graph
    }

    pub fn vnohnnd(&self) -> NI {
        self.vnohnnd
    }

    pub fn is_halo(&self, v: NI) -> bool {
        v.index() >= self.vnohnnd.index()
    }

    /// Induces the halo submesh of a vertex list, keeping every vertex in
    /// `list` that is itself non-halo as non-halo, and re-appending the halo
    /// frontier (any vertex adjacent to `list` that is not itself in
    /// `list`) after it, matching `hmeshInducePart`'s contract in the
    /// original library.
    pub fn induce_part(&self, part: &[i32], part_id: i32) -> (Self, Vec<NI>) {
        let mut core: Vec<NI> = (0..self.vnohnnd.index())
            .filter(|&v| part[v] == part_id)
            .map(NI::new)
            .collect();

        let core_set: std::collections::HashSet<usize> =
            core.iter().map(|v| v.index()).collect();
        let mut frontier = Vec::new();
        for &v in &core {
            for t in self.graph.neighbors(v) {
                let w = t.target.index();
                if !core_set.contains(&w) && w >= self.vnohnnd.index() {
                    frontier.push(t.target);
                }
            }
        }
        frontier.sort_by_key(|v| v.index());
        frontier.dedup_by_key(|v| v.index());

        let new_vnohnnd = NI::new(core.len());
        core.extend(frontier);

        let (sub_graph, vnumtab) = self.graph.induce_list(&core);
        (Self::new(sub_graph, new_vnohnnd), vnumtab)
    }

    /// `meshInduceSepa`: induces the subgraph spanned by the separator
    /// vertex list alone (no halo region retained).
    pub fn induce_sepa(&self, sepa: &[NI]) -> (Graph<NI>, Vec<NI>) {
        self.graph.induce_list(sepa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::csr::CsrLayout;

    #[test]
    fn induce_part_keeps_core_non_halo() {
        let edges = vec![(0u32, 1, 1u32), (1, 2, 1), (2, 3, 1)];
        let graph = Graph::build(0, 4, &edges, None, CsrLayout::Sorted).unwrap();
        let mesh = HaloMesh::new(graph, 4);
        let part = vec![0, 0, 1, 1];
        let (sub, vnumtab) = mesh.induce_part(&part, 0);
        assert_eq!(sub.vnohnnd(), 2);
        assert_eq!(vnumtab[0], 0);
        assert_eq!(vnumtab[1], 1);
    }
}
