//! Plain recursive-bisection K-way mapping (spec §6 `partition`): the same
//! recursion shape as [`crate::recursion`] but with no separator/frontier —
//! every vertex lands in exactly one of `0..k-1`. Grounded on the same
//! `wgraph_part_rb.c` recursion, specialized to its edge-cut variant
//! (`bgraphBipartSt` without the separator step).

use parking_lot::Mutex;
use scotch_context::Context;
use scotch_graph::{Graph, Idx};

use crate::bipart::bipartition;
use crate::error::Error;

/// Recursively bisects `graph` into `k` parts labeled `0..k-1`, balancing
/// each split by vertex weight. Unlike [`crate::partition_with_overlap`],
/// there is no frontier: every vertex belongs to exactly one part.
pub fn partition<NI: Idx>(graph: &Graph<NI>, k: usize, ctx: &Context) -> Result<Vec<i32>, Error> {
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

    let part = Mutex::new(vec![0i32; n]);
    let identity: Vec<NI> = (0..n).map(NI::new).collect();
    recurse(graph, &identity, 0, k, ctx, &part);
    Ok(part.into_inner())
}

fn recurse<NI: Idx>(
    sub_graph: &Graph<NI>,
    vnumtab: &[NI],
    domnnum: usize,
    d: usize,
    ctx: &Context,
    part: &Mutex<Vec<i32>>,
) {
    if d == 1 || sub_graph.vert_count().index() <= 1 {
        write(part, vnumtab, domnnum as i32);
        return;
    }

    let weight0 = d / 2;
    let weight1 = d - weight0;
    let local = bipartition(sub_graph, weight0, weight1);

    let (g0, vn0) = sub_graph.induce_part(&local, 0);
    let (g1, vn1) = sub_graph.induce_part(&local, 1);
    let global_vn0: Vec<NI> = vn0.iter().map(|&v| vnumtab[v.index()]).collect();
    let global_vn1: Vec<NI> = vn1.iter().map(|&v| vnumtab[v.index()]).collect();

    if d == 2 {
        write(part, &global_vn0, domnnum as i32);
        write(part, &global_vn1, (domnnum + 1) as i32);
        return;
    }

    let mut ctx_owned = ctx.clone();
    let split = ctx_owned.split_launch(|sub_ctx, idx| {
        if idx == 0 {
            recurse(&g0, &global_vn0, domnnum, weight0, sub_ctx, part);
        } else {
            recurse(&g1, &global_vn1, domnnum + weight0, weight1, sub_ctx, part);
        }
    });

    if split.is_none() {
        recurse(&g0, &global_vn0, domnnum, weight0, ctx, part);
        recurse(&g1, &global_vn1, domnnum + weight0, weight1, ctx, part);
    }
}

fn write<NI: Idx>(part: &Mutex<Vec<i32>>, globals: &[NI], domnnum: i32) {
    let mut guard = part.lock();
    for &v in globals {
        guard[v.index()] = domnnum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scotch_context::OptionMap;
    use scotch_graph::CsrLayout;

    #[test]
    fn every_vertex_gets_a_part_in_range() {
        let n = 10u32;
        let edges: Vec<_> = (0..n - 1).map(|i| (i, i + 1, 1u32)).collect();
        let g: Graph<u32> = Graph::build(0, n, &edges, None, CsrLayout::Sorted).unwrap();
        let ctx = Context::init(2, OptionMap::new());
        let part = partition(&g, 4, &ctx).unwrap();
        assert_eq!(part.len(), 10);
        assert!(part.iter().all(|&p| (0..4).contains(&p)));
    }

    #[test]
    fn k_equals_one_assigns_everything_to_part_zero() {
        let edges: Vec<(u32, u32, u32)> = vec![(0, 1, 1)];
        let g: Graph<u32> = Graph::build(0, 3, &edges, None, CsrLayout::Sorted).unwrap();
        let ctx = Context::init(1, OptionMap::new());
        let part = partition(&g, 1, &ctx).unwrap();
        assert_eq!(part, vec![0, 0, 0]);
    }

    #[test]
    fn rejects_zero_parts() {
        let g: Graph<u32> = Graph::build(0, 2, &[(0, 1, 1)], None, CsrLayout::Sorted).unwrap();
        let ctx = Context::init(1, OptionMap::new());
        assert!(partition(&g, 0, &ctx).is_err());
    }
}
