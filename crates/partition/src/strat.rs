//! Vertex-separator strategy table (spec §4.2's "separate vertex-separator
//! strategy table", invoked from partitioning-with-overlap's step 3, §4.4,
//! and reused verbatim by nested-dissection ordering, §4.5).
//!
//! Wraps the concrete [`separate_greedy`]/[`bipartition`] methods behind the
//! generic [`scotch_strategy`] dispatcher, so a caller-supplied
//! [`Strategy`] tree (`Cond`/`Select`/`Concat` over "gg"/"zi") actually
//! drives which one runs, instead of the engine picking a method itself.

use scotch_graph::{Graph, Idx};
use scotch_strategy::{dispatch, Features, MethodDispatch, MethodEntry, Params, ProblemState, Strategy, StrategyTable};

use crate::separator::separate_greedy;

/// Problem state for one vertex-separator call: the subgraph being split
/// and the target weight ratio, plus the tripartition a method fills in.
#[derive(Clone)]
pub struct SeparatorState<'g, NI: Idx> {
    graph: &'g Graph<NI>,
    weight0: usize,
    weight1: usize,
    pub part: Vec<i32>,
}

impl<'g, NI: Idx> SeparatorState<'g, NI> {
    pub fn new(graph: &'g Graph<NI>, weight0: usize, weight1: usize) -> Self {
        Self {
            graph,
            weight0,
            weight1,
            part: Vec::new(),
        }
    }

    fn sepa_count(&self) -> usize {
        self.part.iter().filter(|&&p| p == -1).count()
    }
}

impl<'g, NI: Idx> Features for SeparatorState<'g, NI> {
    fn feature(&self, name: &str) -> f64 {
        match name {
            "vertnbr" => self.graph.vert_count().index() as f64,
            "edgenbr" => self.graph.edge_count().index() as f64,
            _ => 0.0,
        }
    }
}

impl<'g, NI: Idx> ProblemState for SeparatorState<'g, NI> {
    /// Fewer separator vertices wins, matching spec §4.2's comparator note
    /// for `Select` ("prefer lower cut" generalized to "lower separator").
    fn better_than(&self, other: &Self) -> bool {
        self.sepa_count() < other.sepa_count()
    }
}

/// The vertex-separator method table: `gg` (greedy-growing, spec's
/// "Edge-separator-to-overlap"/greedy-growing family) and `zi`
/// ("Zero-initialization": the whole graph as part 0, empty separator,
/// left for recursion's degenerate-separator handling to collapse).
pub struct SeparatorTable;

impl<'g, NI: Idx> MethodDispatch<SeparatorState<'g, NI>> for SeparatorTable {
    fn call(
        &self,
        method: &str,
        _params: &Params,
        state: &mut SeparatorState<'g, NI>,
    ) -> Result<(), scotch_strategy::Error> {
        match method {
            "gg" => {
                state.part = separate_greedy(state.graph, state.weight0, state.weight1);
                Ok(())
            }
            "zi" => {
                state.part = vec![0; state.graph.vert_count().index()];
                Ok(())
            }
            _ => Err(scotch_strategy::Error::UnknownMethod {
                table: "vertex_separator".into(),
                name: method.into(),
            }),
        }
    }
}

/// Returns the default vertex-separator strategy (`Method("gg")`), used
/// whenever a caller doesn't supply one of their own.
pub fn default_strategy() -> Strategy {
    Strategy::method("gg", Params::new())
}

/// Registers `gg` and `zi` in a fresh method table, mirroring spec §4.2's
/// per-table `(name, function, defaults)` registration convention.
pub fn vertex_separator_table() -> StrategyTable {
    let mut table = StrategyTable::new("vertex_separator");
    table.register(MethodEntry {
        name: "gg",
        params: Vec::new(),
        defaults: Params::new(),
    });
    table.register(MethodEntry {
        name: "zi",
        params: Vec::new(),
        defaults: Params::new(),
    });
    table
}

/// Runs `strategy` (or the default greedy-growing method) against
/// `graph`'s vertex-separator problem, returning the resulting
/// tripartition.
pub fn separate_via_strategy<NI: Idx>(
    graph: &Graph<NI>,
    weight0: usize,
    weight1: usize,
    strategy: &Strategy,
) -> Result<Vec<i32>, scotch_strategy::Error> {
    let mut state = SeparatorState::new(graph, weight0, weight1);
    dispatch(strategy, &mut state, &SeparatorTable)?;
    Ok(state.part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scotch_graph::CsrLayout;
    use scotch_strategy::condition::{Expr, Op};

    fn chain(n: u32) -> Graph<u32> {
        let edges: Vec<_> = (0..n - 1).map(|i| (i, i + 1, 1u32)).collect();
        Graph::build(0, n, &edges, None, CsrLayout::Sorted).unwrap()
    }

    #[test]
    fn default_strategy_matches_direct_call() {
        let g = chain(12);
        let direct = separate_greedy(&g, 1, 1);
        let via_strategy = separate_via_strategy(&g, 1, 1, &default_strategy()).unwrap();
        assert_eq!(direct, via_strategy);
    }

    #[test]
    fn zero_init_method_yields_a_degenerate_separator() {
        let g = chain(6);
        let strategy = Strategy::method("zi", Params::new());
        let part = separate_via_strategy(&g, 1, 1, &strategy).unwrap();
        assert!(part.iter().all(|&p| p == 0));
    }

    #[test]
    fn cond_picks_gg_for_larger_graphs() {
        let strategy = Strategy::Cond {
            test: Expr::Cmp {
                feature: "vertnbr".into(),
                op: Op::Ge,
                value: 4.0,
            },
            then_branch: Box::new(Strategy::method("gg", Params::new())),
            else_branch: Some(Box::new(Strategy::method("zi", Params::new()))),
        };
        let small = chain(2);
        let part_small = separate_via_strategy(&small, 1, 1, &strategy).unwrap();
        assert!(part_small.iter().all(|&p| p == 0));

        let large = chain(10);
        let part_large = separate_via_strategy(&large, 1, 1, &strategy).unwrap();
        assert!(part_large.iter().any(|&p| p == -1));
    }

    #[test]
    fn select_keeps_the_smaller_separator() {
        let g = chain(12);
        let strategy = Strategy::Select(
            Box::new(Strategy::method("gg", Params::new())),
            Box::new(Strategy::method("zi", Params::new())),
        );
        // `zi` has an empty (trivially smaller) separator, so `Select` must
        // prefer it over `gg`'s nonzero one.
        let part = separate_via_strategy(&g, 1, 1, &strategy).unwrap();
        assert!(part.iter().all(|&p| p == 0));
    }

    #[test]
    fn unknown_method_is_rejected() {
        let g = chain(4);
        let strategy = Strategy::method("nope", Params::new());
        assert!(separate_via_strategy(&g, 1, 1, &strategy).is_err());
    }
}
