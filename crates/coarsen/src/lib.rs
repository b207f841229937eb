//! Distributed coarsening and matching (spec §4.3).
//!
//! Produces a coarser graph `G'` from a fine graph `G` such that
//! `|V(G')| <= ratio * |V(G)|`, bounded below by `min_size`, by matching
//! fine vertices into multinodes and assembling their merged adjacency.
//! [`coarsen_shared`] is the single-process specialization used directly by
//! [`coarsen`] (the `graph_coarsen` operation of spec §6); [`coarsen_distributed`]
//! layers cross-process mate negotiation and an optional fold step on top.

pub mod assembly;
pub mod dist_matching;
pub mod error;
pub mod fold;
pub mod matching;
pub mod multinode;

pub use error::Error;
pub use matching::{MatchingHeuristic, MatchingOptions};
pub use multinode::MultinodeTable;

use log::{debug, info};
use scotch_context::RandomStream;
use scotch_graph::{DistGraph, Graph, Idx};

/// Tunables for one coarsening pass (spec §4.3's ratio/min-size guard,
/// folding flags and matching heuristic selection).
#[derive(Clone, Debug)]
pub struct CoarsenOptions {
    /// Stop once `vert_count <= min_size`.
    pub min_size: usize,
    /// Stop (soft-failure) once a pass contracts by less than `ratio`.
    pub ratio: f64,
    pub matching: MatchingOptions,
    /// Bounded number of distributed negotiation rounds before the final
    /// local-only pass (spec §4.3.1 step 4).
    pub max_negotiation_rounds: usize,
}

impl Default for CoarsenOptions {
    fn default() -> Self {
        Self {
            min_size: 1,
            ratio: 0.9,
            matching: MatchingOptions::default(),
            max_negotiation_rounds: 4,
        }
    }
}

/// Outcome of a single coarsening pass: either it made progress, or the
/// minimum-size/ratio stall guard fired and the input graph is returned
/// unchanged (spec §7's coarsening soft-failure).
pub enum CoarsenOutcome<NI: Idx> {
    Coarsened {
        graph: Graph<NI>,
        fine_to_coarse: Vec<NI>,
        multinodes: MultinodeTable<NI>,
    },
    RatioNotMet {
        graph: Graph<NI>,
    },
}

/// Single-process coarsening entry point (the `graph_coarsen` operation of
/// spec §6, treated as a thin specialization of the distributed engine: no
/// communicator, no folding).
pub fn coarsen_shared<NI: Idx>(
    graph: &Graph<NI>,
    fixed: Option<&matching::FixedLabels>,
    options: &CoarsenOptions,
    random: &mut RandomStream,
) -> CoarsenOutcome<NI> {
    let fine_count = graph.vert_count().index();
    if fine_count <= options.min_size {
        info!("coarsen_shared: vert_count {fine_count} already at or below min_size, skipping");
        return CoarsenOutcome::RatioNotMet {
            graph: graph.clone(),
        };
    }

    let mate = matching::match_local(graph, fixed, &options.matching, random);
    let mut multinodes: MultinodeTable<NI> = MultinodeTable::with_capacity(fine_count);
    let mut fine_to_coarse = vec![NI::zero(); fine_count];
    let mut assigned = vec![false; fine_count];
    for v in 0..fine_count {
        if assigned[v] {
            continue;
        }
        let nv = NI::new(v);
        let m = mate[v].index();
        let coarse = if m == v {
            multinodes.push_singleton(nv)
        } else {
            multinodes.push_pair(nv, NI::new(m))
        };
        fine_to_coarse[v] = coarse;
        assigned[v] = true;
        if m != v {
            fine_to_coarse[m] = coarse;
            assigned[m] = true;
        }
    }

    let coarse_count = multinodes.len();
    let achieved_ratio = coarse_count as f64 / fine_count as f64;
    if coarse_count >= fine_count || achieved_ratio > options.ratio {
        debug!(
            "coarsen_shared: pass achieved ratio {achieved_ratio:.3} > target {:.3}, stalling",
            options.ratio
        );
        return CoarsenOutcome::RatioNotMet {
            graph: graph.clone(),
        };
    }

    let coarse_graph = assembly::assemble_coarse_shared(graph, &fine_to_coarse, &multinodes);
    CoarsenOutcome::Coarsened {
        graph: coarse_graph,
        fine_to_coarse,
        multinodes,
    }
}

/// Distributed coarsening entry point: matching negotiated across the
/// communicator, global coarse-vertex renumbering, then shared-memory
/// adjacency assembly applied to the local slice (folding, when requested,
/// is a caller-driven follow-up via [`fold::compute_fold_plan`], since it
/// depends on the caller's chosen target process count).
pub fn coarsen_distributed<NI: Idx>(
    dist: &DistGraph<NI>,
    fixed: Option<&matching::FixedLabels>,
    options: &CoarsenOptions,
    random: &mut RandomStream,
) -> CoarsenOutcome<NI> {
    let local_count = dist.local_count().index();
    if local_count <= options.min_size {
        return CoarsenOutcome::RatioNotMet {
            graph: dist.local().clone(),
        };
    }

    let mate = dist_matching::match_distributed(
        dist,
        fixed,
        &options.matching,
        random,
        options.max_negotiation_rounds,
    );
    let (fine_to_coarse, local_coarse_count) = dist_matching::assign_coarse_numbers(dist, &mate);

    let achieved_ratio = local_coarse_count as f64 / local_count as f64;
    if achieved_ratio > options.ratio {
        debug!(
            "coarsen_distributed: local pass achieved ratio {achieved_ratio:.3} > target {:.3}, stalling"
        );
        return CoarsenOutcome::RatioNotMet {
            graph: dist.local().clone(),
        };
    }

    // Build a local multinode table from the matching (global coarse ids
    // aren't contiguous from 0 locally, but `assemble_coarse_shared` only
    // needs fine-to-coarse translation restricted to locally-owned fine
    // vertices and a dense local multinode index). Two local fines sharing
    // a global coarse id are the two halves of a local-local match and must
    // become one `push_pair` entry — recording each as its own
    // `push_singleton` would drop the second fine's weight and adjacency
    // from `assemble_coarse_shared` (spec §8's coarse/fine weight-sum
    // invariant).
    let mut locals_by_global: std::collections::HashMap<usize, Vec<usize>> =
        std::collections::HashMap::new();
    for v in 0..local_count {
        locals_by_global
            .entry(fine_to_coarse[v].index())
            .or_default()
            .push(v);
    }
    let mut sorted_globals: Vec<usize> = locals_by_global.keys().copied().collect();
    sorted_globals.sort_unstable();

    let mut multinodes: MultinodeTable<NI> = MultinodeTable::with_capacity(local_coarse_count);
    let mut dense_fine_to_coarse = vec![NI::zero(); local_count];
    for g in sorted_globals {
        let locals = &locals_by_global[&g];
        let dense = if locals.len() >= 2 {
            multinodes.push_pair(NI::new(locals[0]), NI::new(locals[1]))
        } else {
            multinodes.push_singleton(NI::new(locals[0]))
        };
        for &v in locals {
            dense_fine_to_coarse[v] = dense;
        }
    }

    let local_graph = dist.local();
    let coarse_local = assembly::assemble_coarse_shared(local_graph, &{
        let mut full = dense_fine_to_coarse.clone();
        full.resize(local_graph.vert_count().index(), NI::zero());
        full
    }, &multinodes);

    CoarsenOutcome::Coarsened {
        graph: coarse_local,
        fine_to_coarse: dense_fine_to_coarse,
        multinodes,
    }
}
