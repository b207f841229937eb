//! Static mapping, graph partitioning and sparse-matrix ordering on very
//! large graphs and meshes: the public facade over the context, strategy,
//! coarsening, partitioning and ordering engines (spec §6).
//!
//! Every operation here is a thin orchestration function gluing
//! `scotch_context` + `scotch_graph` + `scotch_strategy` + the engine
//! crates together; none of them implement algorithms of their own.

use scotch_context::{option_parse, Context, OptionMap, RandomStream};
use scotch_graph::{DistGraph, Graph, HaloMesh, Idx};
use scotch_strategy::Strategy;
use thiserror::Error;

pub use scotch_partition::{default_strategy as default_separator_strategy, vertex_separator_table};

pub use scotch_coarsen::{CoarsenOptions, CoarsenOutcome, MatchingOptions};
pub use scotch_order::{ColumnBlock, LeafOrder, Order};
pub use scotch_partition::WgraphCost;

/// Aggregates every engine crate's error type (spec §7's taxonomy:
/// `OutOfMemory`, `InvalidArgument`, `CommunicationFailure`, `Inconsistent`,
/// `StrategyError`, `Unsupported`).
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Context(#[from] scotch_context::Error),
    #[error(transparent)]
    Graph(#[from] scotch_graph::Error),
    #[error(transparent)]
    Strategy(#[from] scotch_strategy::Error),
    #[error(transparent)]
    Coarsen(#[from] scotch_coarsen::Error),
    #[error(transparent)]
    Partition(#[from] scotch_partition::Error),
    #[error(transparent)]
    Order(#[from] scotch_order::Error),
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

/// Distinguishes a clean result from one recovered from a soft failure
/// (spec §7: coarsening's "could not meet the contraction ratio" case).
/// Callers that don't care about the distinction `.into_inner()` through to
/// the wrapped value.
#[derive(Clone, Debug)]
pub enum PartialOutcome<T> {
    Complete(T),
    DegradedRatio(T),
}

impl<T> PartialOutcome<T> {
    pub fn into_inner(self) -> T {
        match self {
            PartialOutcome::Complete(v) => v,
            PartialOutcome::DegradedRatio(v) => v,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, PartialOutcome::DegradedRatio(_))
    }
}

/// `context_init` (spec §4.1). `thrdnbr == 0` means "use every core the OS
/// reports"; see [`option_parse`] for the textual option grammar.
pub fn context_init(thrdnbr: usize, options: OptionMap) -> Context {
    Context::init(thrdnbr, options)
}

/// `context_exit`: a no-op in this port (ownership drops the context's
/// resources), kept for interface parity with spec §4.1.
pub fn context_exit(_ctx: Context) {}

/// `strategy_parse`.
pub fn strategy_parse(text: &str) -> Result<Strategy, Error> {
    Ok(scotch_strategy::parse(text)?)
}

/// `strategy_free`: a no-op drop in Rust, kept as an explicit function
/// purely for interface parity with spec §6.
pub fn strategy_free(_strategy: Strategy) {}

/// `graph_coarsen` (spec §6): single-process coarsening.
pub fn coarsen<NI: Idx>(
    graph: &Graph<NI>,
    options: &CoarsenOptions,
    random: &mut RandomStream,
) -> PartialOutcome<CoarsenOutcome<NI>> {
    match scotch_coarsen::coarsen_shared(graph, None, options, random) {
        outcome @ CoarsenOutcome::Coarsened { .. } => PartialOutcome::Complete(outcome),
        outcome @ CoarsenOutcome::RatioNotMet { .. } => PartialOutcome::DegradedRatio(outcome),
    }
}

/// Plain recursive-bisection K-way mapping, no overlap (spec §6
/// `partition`).
pub fn partition<NI: Idx>(graph: &Graph<NI>, k: usize, ctx: &Context) -> Result<Vec<i32>, Error> {
    Ok(scotch_partition::partition(graph, k, ctx)?)
}

/// Recursive-bisection K-way mapping with a vertex-separator overlap (spec
/// §6 `partition_with_overlap`, spec §4.4). Uses the default greedy-growing
/// vertex-separator method; see [`partition_with_overlap_via_strategy`] to
/// drive the per-level separator step with a caller-supplied strategy tree.
pub fn partition_with_overlap<NI: Idx>(
    graph: &Graph<NI>,
    k: usize,
    ctx: &Context,
) -> Result<Vec<i32>, Error> {
    Ok(scotch_partition::partition_with_overlap(graph, k, ctx)?)
}

/// Same as [`partition_with_overlap`], but every level of the recursion
/// dispatches its vertex-separator computation through `strategy` (spec
/// §4.2's strategy tree algebra: `Concat`/`Cond`/`Select` over the
/// vertex-separator method table's `gg`/`zi` entries).
pub fn partition_with_overlap_via_strategy<NI: Idx>(
    graph: &Graph<NI>,
    k: usize,
    ctx: &Context,
    strategy: &Strategy,
) -> Result<Vec<i32>, Error> {
    Ok(scotch_partition::partition_with_overlap_via_strategy(
        graph, k, ctx, strategy,
    )?)
}

/// Distributed K-way mapping (spec §6 `distributed_map`, spec §4.2's
/// "recursive-bisection driver invokes a sequential K-way mapping inside").
pub fn distributed_map<NI: Idx>(
    dist: &DistGraph<NI>,
    k: usize,
    ctx: &Context,
) -> Result<Vec<i32>, Error> {
    Ok(scotch_partition::distributed_map(dist, k, ctx)?)
}

/// Distributed nested-dissection ordering over a halo mesh (spec §6
/// `order`, spec §4.5).
pub fn order<NI: Idx>(mesh: &HaloMesh<NI>, ctx: &Context, leaf_order: LeafOrder) -> Result<Order<NI>, Error> {
    Ok(scotch_order::order(mesh, ctx, leaf_order)?)
}

/// Same as [`order`], but every recursive step's vertex-separator
/// computation is driven by `sepa_strategy` (spec §4.2, §4.5 step 1)
/// instead of the default greedy-growing method.
pub fn order_via_strategy<NI: Idx>(
    mesh: &HaloMesh<NI>,
    ctx: &Context,
    leaf_order: LeafOrder,
    sepa_strategy: &Strategy,
) -> Result<Order<NI>, Error> {
    Ok(scotch_order::order_via_strategy(mesh, ctx, leaf_order, sepa_strategy)?)
}
