//! Multinode construction by matching (spec §4.3.1): for every fine vertex,
//! decide a mate (another fine vertex, or none — a singleton). Two
//! heuristics, chosen by the caller: heavy-edge (prefer the heaviest
//! incident edge) and hybrid (heavy-edge for low-degree vertices, weighted
//! random for the rest).
//!
//! This module covers the local-only ("both endpoints on this process")
//! part of the protocol; [`crate::dist_matching`] layers the cross-process
//! negotiation on top for distributed graphs.

use scotch_context::RandomStream;
use scotch_graph::{Graph, Idx};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchingHeuristic {
    HeavyEdge,
    /// Heavy-edge for vertices of degree `<= degree_threshold`, weighted
    /// random choice among unmatched neighbors for the rest.
    Hybrid { degree_threshold: usize },
}

impl Default for MatchingHeuristic {
    fn default() -> Self {
        MatchingHeuristic::HeavyEdge
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MatchingOptions {
    pub heuristic: MatchingHeuristic,
    /// Under `NoMerge = true`, degree-0 vertices remain singletons (spec
    /// §4.3.1); under `false` they may be paired together.
    pub no_merge: bool,
}

impl Default for MatchingOptions {
    fn default() -> Self {
        Self {
            heuristic: MatchingHeuristic::default(),
            no_merge: false,
        }
    }
}

/// Vertices may belong to a fixed-vertex class (spec §4.3.1); two vertices
/// carrying distinct non-`None` labels may never match.
pub type FixedLabels = [Option<i32>];

fn classes_compatible(a: Option<i32>, b: Option<i32>) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => x == y,
        _ => true,
    }
}

/// Result of local matching: `mate[v]` is the vertex `v` merges with, or `v`
/// itself if `v` is a singleton. Always satisfies `mate[mate[v]] == v`.
pub fn match_local<NI: Idx>(
    graph: &Graph<NI>,
    fixed: Option<&FixedLabels>,
    options: &MatchingOptions,
    random: &mut RandomStream,
) -> Vec<NI> {
    match_restricted(graph, fixed, options, random, |_| true)
}

/// Same as [`match_local`] but only considers neighbors for which
/// `eligible(target)` holds — used by distributed matching to restrict the
/// first pass to local-local edges.
pub fn match_restricted<NI: Idx>(
    graph: &Graph<NI>,
    fixed: Option<&FixedLabels>,
    options: &MatchingOptions,
    random: &mut RandomStream,
    eligible: impl Fn(NI) -> bool,
) -> Vec<NI> {
    let n = graph.vert_count().index();
    let mut mate: Vec<NI> = (0..n).map(NI::new).collect();
    let mut matched = vec![false; n];

    let label_of = |v: usize| -> Option<i32> { fixed.and_then(|f| f[v]) };

    let mut order: Vec<usize> = (0..n).collect();
    // Randomize visiting order so that repeated runs under a non-fixed seed
    // don't systematically privilege low-numbered vertices; under
    // `RandomFixedSeed` this is still reproducible since `random` is shared.
    for i in (1..order.len()).rev() {
        let j = random.next_usize_below(i + 1);
        order.swap(i, j);
    }

    for &u in &order {
        if matched[u] {
            continue;
        }
        let nu = NI::new(u);
        let candidate = pick_candidate(graph, nu, &matched, label_of, options, random, &eligible);
        if let Some(v) = candidate {
            matched[u] = true;
            matched[v.index()] = true;
            mate[u] = v;
            mate[v.index()] = nu;
        }
    }

    if !options.no_merge {
        pair_remaining_isolated(graph, &mut mate, &mut matched, label_of);
    }

    mate
}

#[allow(clippy::too_many_arguments)]
fn pick_candidate<NI: Idx>(
    graph: &Graph<NI>,
    u: NI,
    matched: &[bool],
    label_of: impl Fn(usize) -> Option<i32>,
    options: &MatchingOptions,
    random: &mut RandomStream,
    eligible: &impl Fn(NI) -> bool,
) -> Option<NI> {
    let degree = graph.degree(u).index();
    let label_u = label_of(u.index());

    let candidates: Vec<(NI, NI)> = graph
        .neighbors(u)
        .filter(|t| t.target != u)
        .filter(|t| eligible(t.target))
        .filter(|t| !matched[t.target.index()])
        .filter(|t| classes_compatible(label_u, label_of(t.target.index())))
        .map(|t| (t.target, t.value))
        .collect();

    if candidates.is_empty() {
        return None;
    }

    let use_heavy_edge = match options.heuristic {
        MatchingHeuristic::HeavyEdge => true,
        MatchingHeuristic::Hybrid { degree_threshold } => degree <= degree_threshold,
    };

    if use_heavy_edge {
        candidates
            .into_iter()
            .max_by_key(|&(v, w)| (w, std::cmp::Reverse(v.index())))
            .map(|(v, _)| v)
    } else {
        let total_weight: u64 = candidates.iter().map(|&(_, w)| w.index() as u64 + 1).sum();
        let mut pick = random.next_u64() % total_weight.max(1);
        for &(v, w) in &candidates {
            let w = w.index() as u64 + 1;
            if pick < w {
                return Some(v);
            }
            pick -= w;
        }
        candidates.last().map(|&(v, _)| v)
    }
}

fn pair_remaining_isolated<NI: Idx>(
    graph: &Graph<NI>,
    mate: &mut [NI],
    matched: &mut [bool],
    label_of: impl Fn(usize) -> Option<i32>,
) {
    let mut leftover: Vec<usize> = (0..matched.len())
        .filter(|&v| !matched[v] && graph.degree(NI::new(v)).index() == 0)
        .collect();

    leftover.sort_by_key(|&v| label_of(v));
    let mut i = 0;
    while i + 1 < leftover.len() {
        let (a, b) = (leftover[i], leftover[i + 1]);
        if classes_compatible(label_of(a), label_of(b)) {
            mate[a] = NI::new(b);
            mate[b] = NI::new(a);
            matched[a] = true;
            matched[b] = true;
            i += 2;
        } else {
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scotch_graph::CsrLayout;

    fn path(n: usize) -> Graph<u32> {
        let edges: Vec<_> = (0..n as u32 - 1).map(|i| (i, i + 1, 1u32)).collect();
        Graph::build(0, n as u32, &edges, None, CsrLayout::Sorted).unwrap()
    }

    #[test]
    fn matching_is_symmetric() {
        let g = path(8);
        let mut rng = RandomStream::seeded(1);
        let mate = match_local(&g, None, &MatchingOptions::default(), &mut rng);
        for v in 0..mate.len() {
            assert_eq!(mate[mate[v].index()].index(), v);
        }
    }

    #[test]
    fn odd_path_leaves_exactly_one_singleton() {
        let g = path(9);
        let mut rng = RandomStream::seeded(7);
        let mate = match_local(&g, None, &MatchingOptions::default(), &mut rng);
        let singletons = (0..mate.len()).filter(|&v| mate[v].index() == v).count();
        assert_eq!(singletons, 1);
    }

    #[test]
    fn fixed_classes_are_never_crossed() {
        let g = path(4);
        let fixed = vec![Some(0), Some(1), Some(0), Some(1)];
        let mut rng = RandomStream::seeded(3);
        let mate = match_local(&g, Some(&fixed), &MatchingOptions::default(), &mut rng);
        for v in 0..mate.len() {
            let m = mate[v].index();
            if m != v {
                assert_eq!(fixed[v], fixed[m]);
            }
        }
    }

    #[test]
    fn isolated_vertices_singleton_under_no_merge() {
        let g: Graph<u32> = Graph::build(0, 3, &[], None, CsrLayout::Sorted).unwrap();
        let mut rng = RandomStream::seeded(5);
        let options = MatchingOptions {
            no_merge: true,
            ..Default::default()
        };
        let mate = match_local(&g, None, &options, &mut rng);
        assert_eq!(mate, vec![0, 1, 2]);
    }

    #[test]
    fn isolated_vertices_pair_up_without_no_merge() {
        let g: Graph<u32> = Graph::build(0, 4, &[], None, CsrLayout::Sorted).unwrap();
        let mut rng = RandomStream::seeded(5);
        let mate = match_local(&g, None, &MatchingOptions::default(), &mut rng);
        assert!(mate.iter().enumerate().all(|(v, &m)| mate[m.index()].index() == v));
        assert!(mate.iter().enumerate().all(|(v, &m)| m.index() != v));
    }
}
