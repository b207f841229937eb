//! Distributed nested-dissection ordering over halo meshes (spec §4.5):
//! recursive vertex-separator split, column-block tree construction,
//! inverse-permutation assembly.

pub mod cblk;
pub mod cc;
pub mod error;
pub mod leaf;
pub mod nd;

use scotch_context::Context;
use scotch_graph::{HaloMesh, Idx};
use scotch_partition::default_strategy;
use scotch_strategy::Strategy;

pub use cblk::{CblkFlags, ColumnBlock};
pub use error::Error;
pub use leaf::LeafOrder;
pub use nd::{order_nd, OrderShared};

/// An ordering result (spec §3 "Order" row): the inverse permutation and
/// the column-block tree it was built from.
#[derive(Debug, Clone)]
pub struct Order<NI: Idx> {
    pub baseval: NI,
    pub vnod_count: usize,
    /// `peritab[rank]` is the original global vertex numbered `rank`.
    pub peritab: Vec<NI>,
    pub root: ColumnBlock,
    pub cblk_count: usize,
    pub tree_node_count: usize,
}

/// Orders `mesh`'s non-halo vertices by recursive nested dissection,
/// splitting the context at each recursion level (spec §4.5). Drives step
/// 1's vertex-separator computation with the default greedy-growing
/// method; see [`order_via_strategy`] to supply a caller strategy.
pub fn order<NI: Idx>(mesh: &HaloMesh<NI>, ctx: &Context, leaf_order: LeafOrder) -> Result<Order<NI>, Error> {
    order_via_strategy(mesh, ctx, leaf_order, &default_strategy())
}

/// Same as [`order`], but every recursive step's vertex-separator
/// computation (spec §4.5 step 1) is driven by `sepa_strategy` through
/// `scotch_partition`'s vertex-separator strategy table (spec §4.2),
/// shared with partitioning-with-overlap's use of the same table.
pub fn order_via_strategy<NI: Idx>(
    mesh: &HaloMesh<NI>,
    ctx: &Context,
    leaf_order: LeafOrder,
    sepa_strategy: &Strategy,
) -> Result<Order<NI>, Error> {
    let vnod_count = mesh.vnohnnd().index();
    if vnod_count == 0 {
        return Ok(Order {
            baseval: mesh.graph().baseval(),
            vnod_count: 0,
            peritab: Vec::new(),
            root: ColumnBlock::leaf(0),
            cblk_count: 0,
            tree_node_count: 1,
        });
    }

    let shared = OrderShared::new(vnod_count);
    let identity: Vec<NI> = (0..vnod_count).map(NI::new).collect();
    let root = order_nd(mesh, &identity, 0, ctx, leaf_order, &shared, sepa_strategy)?;
    let peritab = shared.into_peritab();

    Ok(Order {
        baseval: mesh.graph().baseval(),
        cblk_count: root.cblk_count(),
        tree_node_count: root.tree_node_count(),
        vnod_count,
        peritab,
        root,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scotch_context::OptionMap;
    use scotch_graph::{CsrLayout, Graph};

    #[test]
    fn star_orders_every_vertex_exactly_once() {
        let edges: Vec<(u32, u32, u32)> = (1..=9).map(|leaf| (0, leaf, 1)).collect();
        let g: Graph<u32> = Graph::build(0, 10, &edges, None, CsrLayout::Sorted).unwrap();
        let mesh = HaloMesh::new(g, 10);
        let ctx = Context::init(2, OptionMap::new());
        let result = order(&mesh, &ctx, LeafOrder::Greedy).unwrap();

        assert_eq!(result.vnod_count, 10);
        assert_eq!(result.peritab.len(), 10);
        let mut sorted = result.peritab.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..10).collect::<Vec<_>>());
        assert_eq!(result.cblk_count, result.root.cblk_count());
    }

    #[test]
    fn empty_mesh_orders_trivially() {
        let g: Graph<u32> = Graph::build(0, 0, &[], None, CsrLayout::Sorted).unwrap();
        let mesh = HaloMesh::new(g, 0);
        let ctx = Context::init(1, OptionMap::new());
        let result = order(&mesh, &ctx, LeafOrder::Identity).unwrap();
        assert_eq!(result.vnod_count, 0);
        assert!(result.peritab.is_empty());
    }
}
