//! Plain bipartition fallback (spec §4.2's bipartition-method parameter to
//! recursive bisection; SPEC_FULL's `Bipart::Greedy`).
//!
//! A breadth-first growth from a high-degree seed, stopping once the
//! growing region's vertex-weight reaches its target share, followed by a
//! bounded number of Fiduccia-Mattheyses-style boundary swaps that reduce
//! the cut without pushing the balance further from target.

use std::collections::VecDeque;

use scotch_graph::{Graph, Idx};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bipart {
    Greedy,
}

/// Splits `graph`'s vertices into two parts (`0`/`1`) whose vertex-weight
/// totals approximate the ratio `weight0 : weight1`. Used as the leaf
/// bipartition method by recursive bisection.
pub fn bipartition<NI: Idx>(graph: &Graph<NI>, weight0: usize, weight1: usize) -> Vec<i32> {
    let n = graph.vert_count().index();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 || weight1 == 0 {
        return vec![0; n];
    }
    if weight0 == 0 {
        return vec![1; n];
    }

    let total_load: u64 = (0..n).map(|v| graph.vertex_load(NI::new(v)).index() as u64).sum();
    let target0 = (total_load * weight0 as u64) / (weight0 as u64 + weight1 as u64);

    let mut part = vec![-1i32; n];
    let mut load0: u64 = 0;
    let mut queue: VecDeque<usize> = VecDeque::new();

    let seed = (0..n)
        .max_by_key(|&v| graph.degree(NI::new(v)).index())
        .unwrap();
    part[seed] = 0;
    load0 += graph.vertex_load(NI::new(seed)).index() as u64;
    queue.push_back(seed);

    loop {
        while load0 < target0 {
            let Some(u) = queue.pop_front() else { break };
            for t in graph.neighbors(NI::new(u)) {
                let v = t.target.index();
                if part[v] == -1 {
                    part[v] = 0;
                    load0 += graph.vertex_load(NI::new(v)).index() as u64;
                    queue.push_back(v);
                    if load0 >= target0 {
                        break;
                    }
                }
            }
        }
        if load0 >= target0 {
            break;
        }
        // Component exhausted before reaching target: seed growth from the
        // highest-degree unassigned vertex in the next component.
        match (0..n)
            .filter(|&v| part[v] == -1)
            .max_by_key(|&v| graph.degree(NI::new(v)).index())
        {
            Some(next_seed) => {
                part[next_seed] = 0;
                load0 += graph.vertex_load(NI::new(next_seed)).index() as u64;
                queue.push_back(next_seed);
            }
            None => break,
        }
    }

    for p in part.iter_mut() {
        if *p == -1 {
            *p = 1;
        }
    }

    refine_boundary(graph, &mut part, weight0, weight1);
    part
}

/// Bounded Fiduccia-Mattheyses-style pass: repeatedly moves the boundary
/// vertex with the largest cut-reduction gain, as long as the move doesn't
/// worsen the balance beyond a loose tolerance. Stops after a fixed number
/// of passes or once no positive-gain move remains.
fn refine_boundary<NI: Idx>(graph: &Graph<NI>, part: &mut [i32], weight0: usize, weight1: usize) {
    let n = part.len();
    if n == 0 {
        return;
    }
    let total_load: i64 = (0..n).map(|v| graph.vertex_load(NI::new(v)).index() as i64).sum();
    let target0 = if weight0 + weight1 == 0 {
        total_load / 2
    } else {
        total_load * weight0 as i64 / (weight0 as i64 + weight1 as i64).max(1)
    };
    let tolerance = (total_load / 10).max(1);

    for _pass in 0..8 {
        let load0: i64 = (0..n)
            .filter(|&v| part[v] == 0)
            .map(|v| graph.vertex_load(NI::new(v)).index() as i64)
            .sum();

        let mut best: Option<(usize, i64)> = None;
        for v in 0..n {
            let own = part[v];
            let vload = graph.vertex_load(NI::new(v)).index() as i64;
            let new_load0 = if own == 0 { load0 - vload } else { load0 + vload };
            if (new_load0 - target0).abs() > (load0 - target0).abs() + tolerance {
                continue;
            }
            let mut gain: i64 = 0;
            for t in graph.neighbors(NI::new(v)) {
                let w = t.value.index() as i64;
                if part[t.target.index()] == own {
                    gain -= w;
                } else {
                    gain += w;
                }
            }
            if gain > best.map(|(_, g)| g).unwrap_or(0) {
                best = Some((v, gain));
            }
        }

        match best {
            Some((v, _)) => part[v] = 1 - part[v],
            None => break,
        }
    }
}
