//! Recursive nested-dissection ordering over a halo mesh (spec §4.5).
//!
//! Grounded on `hmesh_order_nd.c`'s six-step recursive procedure and
//! `hdgraph_order_st.c`'s dispatch-to-leaf-or-recurse shape: check
//! connectivity first (a disconnected core becomes a `DiCo` node, one child
//! per weakly-connected component, spec §8 scenario 3), otherwise derive a
//! vertex-separator mesh, recurse on both parts through a context split,
//! order the separator directly, and assemble a `NedI` column-block node
//! tying the three sub-ranges of the inverse permutation together.

use parking_lot::Mutex;
use scotch_context::Context;
use scotch_graph::{Graph, HaloMesh, Idx};
use scotch_partition::{default_strategy, separate_via_strategy};
use scotch_strategy::Strategy;

use crate::cblk::ColumnBlock;
use crate::cc::{component_count, connected_components};
use crate::error::Error;
use crate::leaf::LeafOrder;

struct OrderInner<NI> {
    peritab: Vec<NI>,
}

/// The shared accumulation target for one `order` call: the global inverse
/// permutation, written under one lock by every leaf of the recursion
/// (spec §5 "Order tree accounting" / the global-frontier-array policy
/// adapted to ordering's single shared array).
pub struct OrderShared<NI> {
    inner: Mutex<OrderInner<NI>>,
}

impl<NI: Idx> OrderShared<NI> {
    pub fn new(vnod_count: usize) -> Self {
        Self {
            inner: Mutex::new(OrderInner {
                peritab: vec![NI::zero(); vnod_count],
            }),
        }
    }

    fn write_range(&self, ordenum: usize, globals: &[NI]) {
        let mut inner = self.inner.lock();
        for (i, &g) in globals.iter().enumerate() {
            inner.peritab[ordenum + i] = g;
        }
    }

    pub fn into_peritab(self) -> Vec<NI> {
        self.inner.into_inner().peritab
    }
}

/// One recursive step: orders `mesh`'s non-halo vertices into the global
/// slice `[ordenum, ordenum + mesh.vnohnnd())` of `shared`'s inverse
/// permutation, and returns the column-block subtree covering that slice.
/// `vnumtab[i]` is `mesh`'s local vertex `i` translated to the caller's
/// original global numbering. `sepa_strategy` drives step 1's
/// vertex-separator computation through `scotch_partition`'s strategy table
/// (spec §4.2, §4.5 step 1) rather than hardcoding the greedy method.
pub fn order_nd<NI: Idx>(
    mesh: &HaloMesh<NI>,
    vnumtab: &[NI],
    ordenum: usize,
    ctx: &Context,
    leaf_order: LeafOrder,
    shared: &OrderShared<NI>,
    sepa_strategy: &Strategy,
) -> Result<ColumnBlock, Error> {
    let core_n = mesh.vnohnnd().index();
    if core_n == 0 {
        return Ok(ColumnBlock::leaf(0));
    }

    let core_list: Vec<NI> = (0..core_n).map(NI::new).collect();
    let (core_graph, _identity) = mesh.graph().induce_list(&core_list);

    // Disconnected subgraphs are recognized before bisection is even
    // attempted (spec §8 scenario 3): each weakly-connected component is
    // ordered independently and the node becomes `DiCo` rather than `NedI`.
    let labels = connected_components(&core_graph);
    let comps = component_count(&labels);
    if comps > 1 {
        return order_dico(
            &core_graph,
            &labels,
            comps,
            vnumtab,
            ordenum,
            ctx,
            leaf_order,
            shared,
            sepa_strategy,
        );
    }

    let sep = separate_via_strategy(&core_graph, 1, 1, sepa_strategy)?;
    let count0 = sep.iter().filter(|&&p| p == 0).count();
    let count1 = sep.iter().filter(|&&p| p == 1).count();

    if count0 == 0 || count1 == 0 {
        return Ok(order_leaf(&core_graph, vnumtab, ordenum, leaf_order, shared));
    }

    let sepa_list: Vec<NI> = (0..core_n).filter(|&v| sep[v] == -1).map(NI::new).collect();
    let nsep = sepa_list.len();

    let (part0, vn0) = mesh.induce_part(&sep, 0);
    let (part1, vn1) = mesh.induce_part(&sep, 1);
    let global_vn0: Vec<NI> = vn0.iter().map(|&v| vnumtab[v.index()]).collect();
    let global_vn1: Vec<NI> = vn1.iter().map(|&v| vnumtab[v.index()]).collect();

    let sep_ordenum = ordenum + count0 + count1;
    if nsep > 0 {
        let (sepa_graph, sepa_vnumtab) = mesh.induce_sepa(&sepa_list);
        let order = leaf_order.order(&sepa_graph);
        let globals: Vec<NI> = order.iter().map(|&local| vnumtab[sepa_vnumtab[local].index()]).collect();
        shared.write_range(sep_ordenum, &globals);
    }

    let mut ctx_owned = ctx.clone();
    let (left, right) = match ctx_owned.split_launch(|sub_ctx, idx| {
        if idx == 0 {
            order_nd(&part0, &global_vn0, ordenum, sub_ctx, leaf_order, shared, sepa_strategy)
        } else {
            order_nd(&part1, &global_vn1, ordenum + count0, sub_ctx, leaf_order, shared, sepa_strategy)
        }
    }) {
        Some((l, r)) => (l?, r?),
        None => (
            order_nd(&part0, &global_vn0, ordenum, ctx, leaf_order, shared, sepa_strategy)?,
            order_nd(&part1, &global_vn1, ordenum + count0, ctx, leaf_order, shared, sepa_strategy)?,
        ),
    };

    let sep_node = if nsep > 0 {
        Some(ColumnBlock::leaf(nsep))
    } else {
        None
    };
    Ok(ColumnBlock::nedi(core_n, left, right, sep_node))
}

/// Leaf ordering: delegates to the configured leaf strategy. By the time
/// this is called the caller (`order_nd`) has already established that
/// `core_graph` is a single weakly-connected component — the `DiCo` case
/// (spec §8 scenario 3) is handled upfront in `order_nd`/`order_dico`,
/// before bisection is even attempted.
fn order_leaf<NI: Idx>(
    core_graph: &Graph<NI>,
    vnumtab: &[NI],
    ordenum: usize,
    leaf_order: LeafOrder,
    shared: &OrderShared<NI>,
) -> ColumnBlock {
    let n = core_graph.vert_count().index();
    let order = leaf_order.order(core_graph);
    let globals: Vec<NI> = order.iter().map(|&local| vnumtab[local]).collect();
    shared.write_range(ordenum, &globals);
    ColumnBlock::leaf(n)
}

/// Handles a core graph that decomposes into `comps` weakly-connected
/// components (spec §8 scenario 3): each component is ordered
/// independently — recursing back into nested dissection if it is itself
/// large enough to bisect further — and the node becomes `DiCo` with one
/// child per component, each inheriting this node's parent rather than
/// nesting under a further `NedI` split.
#[allow(clippy::too_many_arguments)]
fn order_dico<NI: Idx>(
    core_graph: &Graph<NI>,
    labels: &[usize],
    comps: usize,
    vnumtab: &[NI],
    ordenum: usize,
    ctx: &Context,
    leaf_order: LeafOrder,
    shared: &OrderShared<NI>,
    sepa_strategy: &Strategy,
) -> Result<ColumnBlock, Error> {
    let n = core_graph.vert_count().index();
    let mut children = Vec::with_capacity(comps);
    let mut cursor = ordenum;
    for comp in 0..comps {
        let members: Vec<NI> = (0..n).filter(|&v| labels[v] == comp).map(NI::new).collect();
        let (comp_graph, comp_vnumtab) = core_graph.induce_list(&members);
        let comp_n = comp_graph.vert_count().index();
        let global_vnumtab: Vec<NI> = comp_vnumtab.iter().map(|&v| vnumtab[v.index()]).collect();
        let comp_mesh = HaloMesh::new(comp_graph, NI::new(comp_n));
        let child = order_nd(
            &comp_mesh,
            &global_vnumtab,
            cursor,
            ctx,
            leaf_order,
            shared,
            sepa_strategy,
        )?;
        cursor += comp_n;
        children.push(child);
    }
    Ok(ColumnBlock::dico(n, children))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scotch_context::OptionMap;
    use scotch_graph::CsrLayout;

    fn whole_mesh<NI: Idx>(graph: Graph<NI>) -> HaloMesh<NI> {
        let n = graph.vert_count();
        HaloMesh::new(graph, n)
    }

    #[test]
    fn chain_produces_a_bijective_peritab() {
        let n = 15u32;
        let edges: Vec<_> = (0..n - 1).map(|i| (i, i + 1, 1u32)).collect();
        let g: Graph<u32> = Graph::build(0, n, &edges, None, CsrLayout::Sorted).unwrap();
        let mesh = whole_mesh(g);
        let shared = OrderShared::new(n as usize);
        let identity: Vec<u32> = (0..n).collect();
        let ctx = Context::init(2, OptionMap::new());
        let tree = order_nd(&mesh, &identity, 0, &ctx, LeafOrder::Greedy, &shared, &default_strategy()).unwrap();

        assert_eq!(tree.vnod_count, n as usize);
        let peritab = shared.into_peritab();
        let mut sorted = peritab.clone();
        sorted.sort_unstable();
        let expected: Vec<u32> = (0..n).collect();
        assert_eq!(sorted, expected, "peritab must be a bijection onto 0..n");
    }

    #[test]
    fn disconnected_leaf_produces_a_dico_node() {
        // spec §8 scenario 3: two disjoint triangles. Connectivity is
        // checked before bisection is even attempted, so the root must be
        // `DiCo` with two child leaves of `vnod_count = 3` each, not `NedI`.
        let edges: Vec<(u32, u32, u32)> = vec![(0, 1, 1), (1, 2, 1), (0, 2, 1), (3, 4, 1), (4, 5, 1), (3, 5, 1)];
        let g: Graph<u32> = Graph::build(0, 6, &edges, None, CsrLayout::Sorted).unwrap();
        let mesh = whole_mesh(g);
        let shared = OrderShared::new(6);
        let identity: Vec<u32> = (0..6).collect();
        let ctx = Context::init(1, OptionMap::new());
        let tree = order_nd(&mesh, &identity, 0, &ctx, LeafOrder::Identity, &shared, &default_strategy()).unwrap();

        use crate::cblk::CblkFlags;
        assert!(tree.type_flags.contains(CblkFlags::DI_CO));
        assert!(!tree.type_flags.contains(CblkFlags::NED_I));
        assert_eq!(tree.children.len(), 2);
        for child in &tree.children {
            assert!(child.type_flags.contains(CblkFlags::LEAF));
            assert_eq!(child.vnod_count, 3);
        }
        let peritab = shared.into_peritab();
        let mut sorted = peritab.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4, 5]);
    }
}
