//! `wgraph_cost`: post-partitioning consistency accounting (spec §4.4).
//!
//! After a recursive-bisection-with-overlap run returns, sums the frontier
//! load and per-part loads and checks they account for the whole graph.

use scotch_graph::{Graph, Idx};

use crate::error::Error;

#[derive(Clone, Debug)]
pub struct WgraphCost<NI: Idx> {
    pub fron_load: NI,
    pub fron_count: usize,
    /// Indexed by part id `0..k`.
    pub part_loads: Vec<NI>,
}

/// Computes `fron_load` (sum of vertex weights over the frontier) and the
/// per-part loads, then checks `sum(part_loads) + fron_load == velo_sum`
/// (spec §4.4's consistency check).
pub fn wgraph_cost<NI: Idx>(graph: &Graph<NI>, part: &[i32], k: usize) -> Result<WgraphCost<NI>, Error> {
    let mut fron_load = NI::zero();
    let mut fron_count = 0usize;
    let mut part_loads = vec![NI::zero(); k];

    for (v, &p) in part.iter().enumerate() {
        let load = graph.vertex_load(NI::new(v));
        if p == -1 {
            fron_load += load;
            fron_count += 1;
        } else {
            let p = p as usize;
            if p >= k {
                return Err(Error::Inconsistent(format!(
                    "part label {p} out of range for k={k}"
                )));
            }
            part_loads[p] += load;
        }
    }

    let total: NI = part_loads.iter().fold(fron_load, |acc, &x| acc + x);
    if total.index() != graph.velo_sum().index() {
        return Err(Error::Inconsistent(format!(
            "frontier+part loads {} do not account for graph velo_sum {}",
            total.index(),
            graph.velo_sum().index()
        )));
    }

    Ok(WgraphCost {
        fron_load,
        fron_count,
        part_loads,
    })
}

/// Checks `max_k load_k / avg_load <= 1 + balrat` (spec §8's imbalance
/// invariant). An empty `part_loads` or all-zero load is trivially balanced.
pub fn is_balanced<NI: Idx>(part_loads: &[NI], balrat: f64) -> bool {
    let k = part_loads.len();
    if k == 0 {
        return true;
    }
    let total: u64 = part_loads.iter().map(|&l| l.index() as u64).sum();
    if total == 0 {
        return true;
    }
    let avg = total as f64 / k as f64;
    part_loads
        .iter()
        .all(|&l| (l.index() as f64) / avg <= 1.0 + balrat + 1e-9)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scotch_graph::CsrLayout;

    #[test]
    fn cost_accounts_for_the_whole_graph() {
        let n = 8u32;
        let edges: Vec<_> = (0..n - 1).map(|i| (i, i + 1, 1u32)).collect();
        let g: Graph<u32> = Graph::build(0, n, &edges, None, CsrLayout::Sorted).unwrap();
        let part = vec![0, 0, 0, 0, -1, 1, 1, 1];
        let cost = wgraph_cost(&g, &part, 2).unwrap();
        assert_eq!(cost.fron_count, 1);
        assert_eq!(cost.part_loads, vec![4, 3]);
    }

    #[test]
    fn balance_check_flags_skewed_parts() {
        assert!(is_balanced::<u32>(&[10, 10], 0.05));
        assert!(!is_balanced::<u32>(&[18, 2], 0.05));
    }
}
