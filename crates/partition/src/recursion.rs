//! Recursive bisection with overlap (spec §4.4): the top-level
//! vertex-separator K-way partitioning loop.
//!
//! Grounded on `wgraph_part_rb.c`'s recursion shape: `wgraphPartRb3One` /
//! `wgraphPartRb3Both` (write a terminal part's vertices straight into the
//! global part array) and `wgraphPartRb3Fron` / `wgraphPartRb3SepFron`
//! (append a subgraph's local frontier into the global frontier array under
//! a lock) are folded into [`RecursionState`]'s two append methods below;
//! `WgraphPartRbData`'s mutex becomes a single `parking_lot::Mutex` guarding
//! both arrays together.

use parking_lot::Mutex;
use scotch_context::Context;
use scotch_graph::{Graph, Idx};
use scotch_strategy::Strategy;

use crate::error::Error;
use crate::strat::{default_strategy, separate_via_strategy};

struct RecursionInner<NI> {
    part: Vec<i32>,
    frontier: Vec<NI>,
}

/// Shared accumulation target for one `partition_with_overlap` call: the
/// global part array and the global frontier array, both written under one
/// lock since every leaf of the recursion contributes disjoint slices of
/// each (spec §5 "Shared-resource policy").
pub struct RecursionState<NI> {
    inner: Mutex<RecursionInner<NI>>,
}

impl<NI: Idx> RecursionState<NI> {
    fn new(n: usize) -> Self {
        Self {
            inner: Mutex::new(RecursionInner {
                part: vec![-1; n],
                frontier: Vec::new(),
            }),
        }
    }

    /// Writes `domnnum` into the global part array for every vertex in
    /// `globals` (a terminal, non-separator subdomain).
    fn write_terminal(&self, globals: &[NI], domnnum: i32) {
        let mut inner = self.inner.lock();
        for &v in globals {
            inner.part[v.index()] = domnnum;
        }
    }

    /// Marks `globals` as frontier: `-1` in the part array, appended to the
    /// global frontier array. The frontier produced at one recursion level
    /// is final — those vertices are excluded from both induced halves and
    /// never revisited by deeper recursion (spec §4.4 "Frontier handling").
    fn mark_frontier(&self, globals: &[NI]) {
        let mut inner = self.inner.lock();
        for &v in globals {
            inner.part[v.index()] = -1;
        }
        inner.frontier.extend_from_slice(globals);
    }

    fn into_parts(self) -> (Vec<i32>, Vec<NI>) {
        let inner = self.inner.into_inner();
        (inner.part, inner.frontier)
    }
}

/// `partition_with_overlap`: assigns every vertex of `graph` to
/// `part[v] in {-1, 0..k-1}`, `-1` marking the vertex separator that
/// isolates every part from its neighbors (spec §4.4). Uses the default
/// greedy-growing vertex-separator method at every level; see
/// [`partition_with_overlap_via_strategy`] to supply a caller strategy.
pub fn partition_with_overlap<NI: Idx>(
    graph: &Graph<NI>,
    k: usize,
    ctx: &Context,
) -> Result<Vec<i32>, Error> {
    partition_with_overlap_via_strategy(graph, k, ctx, &default_strategy())
}

/// Same as [`partition_with_overlap`], but step 3's vertex-separator
/// computation (spec §4.4) is driven by `strategy` through the vertex-
/// separator strategy table (spec §4.2) instead of a hardcoded method.
pub fn partition_with_overlap_via_strategy<NI: Idx>(
    graph: &Graph<NI>,
    k: usize,
    ctx: &Context,
    strategy: &Strategy,
) -> Result<Vec<i32>, Error> {
    if k == 0 {
        return Err(Error::InvalidArgument("k must be >= 1".into()));
    }
    let n = graph.vert_count().index();
    if n == 0 {
        return Ok(Vec::new());
    }
    if k == 1 {
        return Ok(vec![0; n]);
    }

    let state = RecursionState::new(n);
    let identity: Vec<NI> = (0..n).map(NI::new).collect();
    recurse(graph, &identity, 0, k, ctx, &state, strategy)?;
    let (part, _frontier) = state.into_parts();
    Ok(part)
}

/// One level of the recursion: `sub_graph` covers `d` subdomains starting at
/// `domnnum`; `vnumtab[i]` is `sub_graph`'s vertex `i` translated back to the
/// original graph's numbering.
fn recurse<NI: Idx>(
    sub_graph: &Graph<NI>,
    vnumtab: &[NI],
    domnnum: usize,
    d: usize,
    ctx: &Context,
    state: &RecursionState<NI>,
    strategy: &Strategy,
) -> Result<(), Error> {
    let ln = sub_graph.vert_count().index();
    if ln == 0 {
        return Ok(());
    }
    if d == 1 {
        state.write_terminal(vnumtab, domnnum as i32);
        return Ok(());
    }

    let weight0 = d / 2;
    let weight1 = d - weight0;
    let mut sep = separate_via_strategy(sub_graph, weight0, weight1, strategy)
        .map_err(|e| Error::StrategyError(e.to_string()))?;
    let mut count0 = sep.iter().filter(|&&p| p == 0).count();
    let mut count1 = sep.iter().filter(|&&p| p == 1).count();

    // Degenerate separator (spec step 5): collapse to the non-empty half and
    // force a plain (non-overlap) bipartition so recursion makes progress.
    if count0 == 0 || count1 == 0 {
        sep = crate::bipart::bipartition(sub_graph, weight0, weight1);
        count0 = sep.iter().filter(|&&p| p == 0).count();
        count1 = ln - count0;
    }

    let frontier_globals: Vec<NI> = (0..ln)
        .filter(|&v| sep[v] == -1)
        .map(|v| vnumtab[v])
        .collect();
    if !frontier_globals.is_empty() {
        state.mark_frontier(&frontier_globals);
    }

    let (g0, vn0) = sub_graph.induce_part(&sep, 0);
    let (g1, vn1) = sub_graph.induce_part(&sep, 1);
    let global_vn0: Vec<NI> = vn0.iter().map(|&v| vnumtab[v.index()]).collect();
    let global_vn1: Vec<NI> = vn1.iter().map(|&v| vnumtab[v.index()]).collect();

    if d == 2 {
        state.write_terminal(&global_vn0, domnnum as i32);
        state.write_terminal(&global_vn1, (domnnum + 1) as i32);
        return Ok(());
    }

    let mut ctx_owned = ctx.clone();
    match ctx_owned.split_launch(|sub_ctx, idx| {
        if idx == 0 {
            recurse(&g0, &global_vn0, domnnum, weight0, sub_ctx, state, strategy)
        } else {
            recurse(&g1, &global_vn1, domnnum + weight0, weight1, sub_ctx, state, strategy)
        }
    }) {
        Some((r0, r1)) => {
            r0?;
            r1?;
        }
        None => {
            recurse(&g0, &global_vn0, domnnum, weight0, ctx, state, strategy)?;
            recurse(&g1, &global_vn1, domnnum + weight0, weight1, ctx, state, strategy)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scotch_context::{Context, OptionMap};
    use scotch_graph::CsrLayout;

    #[test]
    fn linear_chain_k2_splits_evenly_with_small_cut() {
        // spec §8 scenario 1.
        let n = 8u32;
        let edges: Vec<_> = (0..n - 1).map(|i| (i, i + 1, 1u32)).collect();
        let g: Graph<u32> = Graph::build(0, n, &edges, None, CsrLayout::Sorted).unwrap();
        let ctx = Context::init(2, OptionMap::new());
        let part = partition_with_overlap(&g, 2, &ctx).unwrap();
        let count0 = part.iter().filter(|&&p| p == 0).count();
        let count1 = part.iter().filter(|&&p| p == 1).count();
        let fron = part.iter().filter(|&&p| p == -1).count();
        assert_eq!(count0 + count1 + fron, 8);
        assert!((3..=5).contains(&count0), "count0 = {count0}");
    }

    #[test]
    fn star_k3_isolates_the_center() {
        // spec §8 scenario 2.
        let edges: Vec<(u32, u32, u32)> = (1..=9).map(|leaf| (0, leaf, 1)).collect();
        let g: Graph<u32> = Graph::build(0, 10, &edges, None, CsrLayout::Sorted).unwrap();
        let ctx = Context::init(1, OptionMap::new());
        let part = partition_with_overlap(&g, 3, &ctx).unwrap();
        assert!(part.iter().all(|&p| p >= -1 && p < 3));
        let fron = part.iter().filter(|&&p| p == -1).count();
        assert!(fron >= 1, "expected at least the center in the separator");
    }

    #[test]
    fn k_equals_one_assigns_every_vertex_to_part_zero() {
        let edges: Vec<(u32, u32, u32)> = vec![(0, 1, 1)];
        let g: Graph<u32> = Graph::build(0, 3, &edges, None, CsrLayout::Sorted).unwrap();
        let ctx = Context::init(1, OptionMap::new());
        let part = partition_with_overlap(&g, 1, &ctx).unwrap();
        assert_eq!(part, vec![0, 0, 0]);
    }

    #[test]
    fn empty_graph_succeeds_trivially() {
        let g: Graph<u32> = Graph::build(0, 0, &[], None, CsrLayout::Sorted).unwrap();
        let ctx = Context::init(1, OptionMap::new());
        let part = partition_with_overlap(&g, 4, &ctx).unwrap();
        assert!(part.is_empty());
    }

    #[test]
    fn via_strategy_with_select_still_makes_progress() {
        use scotch_strategy::Params;

        let n = 16u32;
        let edges: Vec<_> = (0..n - 1).map(|i| (i, i + 1, 1u32)).collect();
        let g: Graph<u32> = Graph::build(0, n, &edges, None, CsrLayout::Sorted).unwrap();
        let ctx = Context::init(2, OptionMap::new());
        let strategy = Strategy::Select(
            Box::new(Strategy::method("gg", Params::new())),
            Box::new(Strategy::method("zi", Params::new())),
        );
        let part = partition_with_overlap_via_strategy(&g, 4, &ctx, &strategy).unwrap();
        assert_eq!(part.len(), n as usize);
        assert!(part.iter().all(|&p| (-1..4).contains(&p)));
    }
}
