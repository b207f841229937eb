//! The `Graph` entity (spec §3 "Graph" row).
//!
//! A `Graph` is a CSR adjacency plus a configurable base index and optional
//! vertex/edge weights. It is the read-only value type that every engine in
//! this workspace consumes; none of them mutate it. New graphs are produced
//! either by a loader (out of scope here, see §1) or by inducing a subgraph
//! from an existing one.

use rayon::prelude::*;

use crate::graph::csr::{Csr, CsrLayout, Target};
use crate::index::Idx;
use crate::Error;

/// A graph with symmetric adjacency, a base index and optional vertex/edge
/// weights.
///
/// Invariants (spec §3, §8): the adjacency is symmetric; weights, when
/// present, are non-negative; `sum(vertex weights) == velo_sum`.
#[derive(Debug, Clone)]
pub struct Graph<NI: Idx> {
    baseval: NI,
    csr: Csr<NI, NI, NI>,
    vertex_load: Option<Box<[NI]>>,
    velo_sum: NI,
    edlo_sum: NI,
    vert_max_degree: NI,
}

impl<NI: Idx> Graph<NI> {
    /// Builds a graph from an edge list. `edges` holds `(u, v, edge_weight)`
    /// triples relative to `baseval`; each edge is installed symmetrically.
    /// `vertex_weights`, when given, must have exactly `vert_count` entries.
    pub fn build(
        baseval: NI,
        vert_count: NI,
        edges: &[(NI, NI, NI)],
        vertex_weights: Option<Vec<NI>>,
        layout: CsrLayout,
    ) -> Result<Self, Error> {
        if let Some(w) = &vertex_weights {
            if w.len() != vert_count.index() {
                return Err(Error::InvalidNodeValues);
            }
        }

        let csr = Csr::from_edges(vert_count, edges, layout);

        let vert_max_degree = (0..vert_count.index())
            .into_par_iter()
            .map(NI::new)
            .map(|v| csr.degree(v))
            .max()
            .unwrap_or_else(NI::zero);

        // Each undirected edge contributes its weight on both endpoints.
        let edlo_sum = edges.iter().fold(NI::zero(), |acc, &(_, _, w)| acc + w) * NI::new(2);

        let velo_sum = match &vertex_weights {
            Some(w) => w.iter().fold(NI::zero(), |acc, &x| acc + x),
            None => vert_count,
        };

        Ok(Self {
            baseval,
            csr,
            vertex_load: vertex_weights.map(Vec::into_boxed_slice),
            velo_sum,
            edlo_sum,
            vert_max_degree,
        })
    }

    pub fn baseval(&self) -> NI {
        self.baseval
    }

    pub fn vert_count(&self) -> NI {
        self.csr.node_count()
    }

    pub fn edge_count(&self) -> NI {
        self.csr.edge_count()
    }

    pub fn velo_sum(&self) -> NI {
        self.velo_sum
    }

    pub fn edlo_sum(&self) -> NI {
        self.edlo_sum
    }

    pub fn vert_max_degree(&self) -> NI {
        self.vert_max_degree
    }

    pub fn degree(&self, v: NI) -> NI {
        self.csr.degree(v)
    }

    pub fn neighbors(&self, v: NI) -> impl Iterator<Item = &Target<NI, NI>> {
        self.csr.targets_with_values(v).iter()
    }

    pub fn vertex_load(&self, v: NI) -> NI {
        match &self.vertex_load {
            Some(w) => w[v.index()],
            None => NI::new(1),
        }
    }

    pub fn csr(&self) -> &Csr<NI, NI, NI> {
        &self.csr
    }

    /// `graph_induce_part`: builds the subgraph of `self` consisting of the
    /// vertices whose `part[v] == part_id`. Induced vertices keep a back-map
    /// (`vnumtab`, original-numbered) to the vertices of `self`.
    pub fn induce_part(&self, part: &[i32], part_id: i32) -> (Self, Vec<NI>) {
        let vnumtab: Vec<NI> = (0..self.vert_count().index())
            .filter(|&v| part[v] == part_id)
            .map(NI::new)
            .collect();
        self.induce_list(&vnumtab)
    }

    /// `graph_induce_list`: builds the subgraph induced by an explicit
    /// vertex list. Returns the induced graph and the back-map `vnumtab`,
    /// such that induced vertex `i` corresponds to original vertex
    /// `vnumtab[i]`.
    pub fn induce_list(&self, vnumtab: &[NI]) -> (Self, Vec<NI>) {
        let new_count = vnumtab.len();
        let mut orig_to_new = vec![None; self.vert_count().index()];
        for (new_v, &orig_v) in vnumtab.iter().enumerate() {
            orig_to_new[orig_v.index()] = Some(NI::new(new_v));
        }

        let mut edges = Vec::new();
        for (new_u, &orig_u) in vnumtab.iter().enumerate() {
            for t in self.neighbors(orig_u) {
                if let Some(new_v) = orig_to_new[t.target.index()] {
                    if new_v.index() > new_u {
                        edges.push((NI::new(new_u), new_v, t.value));
                    }
                }
            }
        }

        let vertex_weights = self
            .vertex_load
            .as_ref()
            .map(|_| vnumtab.iter().map(|&v| self.vertex_load(v)).collect());

        let induced = Self::build(
            self.baseval,
            NI::new(new_count),
            &edges,
            vertex_weights,
            CsrLayout::Unsorted,
        )
        .expect("induced subgraph preserves vertex-weight cardinality");

        (induced, vnumtab.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(n: usize) -> Graph<u32> {
        let edges: Vec<_> = (0..n as u32 - 1).map(|i| (i, i + 1, 1u32)).collect();
        Graph::build(0, n as u32, &edges, None, CsrLayout::Sorted).unwrap()
    }

    #[test]
    fn build_preserves_weight_sum() {
        let g = chain(8);
        assert_eq!(g.vert_count(), 8);
        assert_eq!(g.velo_sum(), 8);
        assert_eq!(g.edge_count(), 14);
    }

    #[test]
    fn induce_part_is_symmetric_and_preserves_weight() {
        let g = chain(8);
        let part: Vec<i32> = (0..8).map(|v| if v < 4 { 0 } else { 1 }).collect();
        let (sub, vnumtab) = g.induce_part(&part, 0);
        assert_eq!(sub.vert_count(), 4);
        assert_eq!(vnumtab, vec![0, 1, 2, 3]);
        assert_eq!(sub.edge_count(), 6); // 3 undirected edges -> 6 directed entries
        for v in 0..sub.vert_count() {
            for t in sub.neighbors(v) {
                assert!(sub.neighbors(t.target).any(|back| back.target == v));
            }
        }
    }

    #[test]
    fn induce_list_empty_graph_succeeds() {
        let g = chain(4);
        let (sub, vnumtab) = g.induce_list(&[]);
        assert_eq!(sub.vert_count(), 0);
        assert!(vnumtab.is_empty());
    }
}
