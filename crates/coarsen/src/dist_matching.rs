//! Cross-process mate negotiation and coarse-vertex renumbering (spec
//! §4.3.1): the distributed counterpart to [`crate::matching`]'s local-only
//! pass, plus the "assignment of coarse-vertex numbers" step that follows
//! it.
//!
//! Protocol, matching the spec's five numbered steps: local pass (commit
//! local-local matches immediately, buffer remote proposals), exchange
//! round, reconciliation (accept the highest-priority inbound proposal per
//! owned vertex, reject the rest), repeat for a bounded number of rounds,
//! then a final local-only pass over whatever is left unmatched.

use scotch_context::RandomStream;
use scotch_graph::{DistGraph, Idx};

use crate::matching::{match_restricted, FixedLabels, MatchingOptions};

fn classes_compatible(a: Option<i32>, b: Option<i32>) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => x == y,
        _ => true,
    }
}

fn encode_proposals(items: &[(u64, u64, u64)]) -> Vec<u8> {
    let mut out = Vec::with_capacity(items.len() * 24);
    for &(a, b, w) in items {
        out.extend_from_slice(&a.to_le_bytes());
        out.extend_from_slice(&b.to_le_bytes());
        out.extend_from_slice(&w.to_le_bytes());
    }
    out
}

fn decode_proposals(bytes: &[u8]) -> Vec<(u64, u64, u64)> {
    bytes
        .chunks_exact(24)
        .map(|c| {
            let a = u64::from_le_bytes(c[0..8].try_into().unwrap());
            let b = u64::from_le_bytes(c[8..16].try_into().unwrap());
            let w = u64::from_le_bytes(c[16..24].try_into().unwrap());
            (a, b, w)
        })
        .collect()
}

/// Runs the distributed matching protocol and returns, for every local
/// (non-ghost) vertex, its chosen mate as a global vertex number, or `None`
/// if it remains a singleton.
pub fn match_distributed<NI: Idx>(
    dist: &DistGraph<NI>,
    fixed: Option<&FixedLabels>,
    options: &MatchingOptions,
    random: &mut RandomStream,
    max_rounds: usize,
) -> Vec<Option<NI>> {
    let local_count = dist.local_count().index();
    let label_of = |v: usize| -> Option<i32> { fixed.and_then(|f| f[v]) };

    let mut mate: Vec<Option<NI>> = vec![None; local_count];
    let mut matched = vec![false; local_count];
    // Ghost candidates this vertex already tried and got rejected, so a
    // later round doesn't propose to the same partner again.
    let mut excluded: Vec<std::collections::HashSet<usize>> =
        vec![std::collections::HashSet::new(); local_count];

    for _round in 0..max_rounds {
        if matched.iter().all(|&m| m) {
            break;
        }

        let mut outbound: Vec<Vec<(u64, u64, u64)>> = vec![Vec::new(); dist.proc_count()];
        let mut order: Vec<usize> = (0..local_count).filter(|&u| !matched[u]).collect();
        for i in (1..order.len()).rev() {
            let j = random.next_usize_below(i + 1);
            order.swap(i, j);
        }

        for u in order {
            if matched[u] {
                continue;
            }
            let global_u = dist.to_global(NI::new(u)).index() as u64;
            let label_u = label_of(u);
            let mut best: Option<(NI, u64, bool)> = None; // (target local idx, weight, is_local)
            for t in dist.local().neighbors(NI::new(u)) {
                let tgt = t.target;
                if tgt.index() == u {
                    continue;
                }
                let is_local = tgt.index() < local_count;
                if is_local && matched[tgt.index()] {
                    continue;
                }
                if excluded[u].contains(&tgt.index()) {
                    continue;
                }
                if !classes_compatible(label_u, if is_local { label_of(tgt.index()) } else { None }) {
                    continue;
                }
                let w = t.value.index() as u64;
                if best.map(|(_, bw, _)| w > bw).unwrap_or(true) {
                    best = Some((tgt, w, is_local));
                }
            }

            if let Some((tgt, w, is_local)) = best {
                if is_local {
                    if !matched[tgt.index()] {
                        matched[u] = true;
                        matched[tgt.index()] = true;
                        mate[u] = Some(dist.to_global(tgt));
                        mate[tgt.index()] = Some(dist.to_global(NI::new(u)));
                    }
                } else {
                    let global_t = dist.to_global(tgt).index() as u64;
                    let owner = dist.owner_of(tgt);
                    outbound[owner].push((global_u, global_t, w));
                }
            }
        }

        let outbound_bytes: Vec<Vec<u8>> = outbound
            .iter()
            .map(|items| encode_proposals(items))
            .collect();
        let inbound = dist.comm().alltoallv_tagged(outbound_bytes);

        // Group inbound proposals by the owned vertex they target.
        let (range_start, _) = dist.local_vert_range();
        let mut best_per_owned: std::collections::HashMap<u64, (usize, u64, u64, usize)> =
            std::collections::HashMap::new(); // to_global -> (sender_rank, from_global, weight, local_idx)
        for (sender, payload) in &inbound {
            for (from_g, to_g, w) in decode_proposals(payload) {
                let local_idx = to_g as usize - range_start.index();
                if matched[local_idx] {
                    continue;
                }
                let better = match best_per_owned.get(&to_g) {
                    None => true,
                    Some(&(cur_rank, cur_from, cur_w, _)) => {
                        (w, std::cmp::Reverse(*sender), std::cmp::Reverse(from_g))
                            > (cur_w, std::cmp::Reverse(cur_rank), std::cmp::Reverse(cur_from))
                    }
                };
                if better {
                    best_per_owned.insert(to_g, (*sender, from_g, w, local_idx));
                }
            }
        }

        let mut acks: Vec<Vec<(u64, u64, u64)>> = vec![Vec::new(); dist.proc_count()];
        for (&to_g, &(sender_rank, from_g, _w, local_idx)) in &best_per_owned {
            matched[local_idx] = true;
            mate[local_idx] = Some(NI::new(from_g as usize));
            acks[sender_rank].push((from_g, to_g, 1));
        }
        // Reject every other inbound proposal explicitly so the proposer
        // can exclude that partner next round.
        for (sender, payload) in &inbound {
            for (from_g, to_g, _w) in decode_proposals(payload) {
                let accepted = best_per_owned
                    .get(&to_g)
                    .map(|&(_, winner_from, _, _)| winner_from == from_g)
                    .unwrap_or(false);
                if !accepted {
                    acks[*sender].push((from_g, to_g, 0));
                }
            }
        }

        let ack_bytes: Vec<Vec<u8>> = acks.iter().map(|items| encode_proposals(items)).collect();
        let inbound_acks = dist.comm().alltoallv_tagged(ack_bytes);

        for (_sender, payload) in &inbound_acks {
            for (from_g, to_g, accepted) in decode_proposals(&payload) {
                let local_idx = from_g as usize - range_start.index();
                if accepted != 0 {
                    matched[local_idx] = true;
                    mate[local_idx] = Some(NI::new(to_g as usize));
                } else {
                    let ghost_idx = dist
                        .to_local_ghost(NI::new(to_g as usize))
                        .unwrap_or(usize::MAX);
                    if ghost_idx != usize::MAX {
                        excluded[local_idx].insert(ghost_idx);
                    }
                }
            }
        }
    }

    if !options.no_merge {
        finalize_local_pass(dist, &mut mate, &mut matched, label_of);
    }

    mate
}

/// Matches whatever local vertices remain unmatched after the distributed
/// rounds, considering only local-local edges (spec step 5: "final pass
/// matches all remaining unmatched vertices locally").
fn finalize_local_pass<NI: Idx>(
    dist: &DistGraph<NI>,
    mate: &mut [Option<NI>],
    matched: &mut [bool],
    label_of: impl Fn(usize) -> Option<i32>,
) {
    let local_count = dist.local_count().index();
    if matched.iter().all(|&m| m) {
        return;
    }
    let mut rng = RandomStream::seeded(0x5151_5151);
    let sub_mate = match_restricted(
        dist.local(),
        None,
        &MatchingOptions {
            no_merge: false,
            ..MatchingOptions::default()
        },
        &mut rng,
        |t| t.index() < local_count,
    );
    for u in 0..local_count {
        if matched[u] {
            continue;
        }
        let m = sub_mate[u].index();
        if m != u && m < local_count && !matched[m] {
            let _ = &label_of; // fixed classes already respected by sub_mate
            matched[u] = true;
            matched[m] = true;
            mate[u] = Some(dist.to_global(NI::new(m)));
            mate[m] = Some(dist.to_global(NI::new(u)));
        }
    }
}

/// Assigns global coarse-vertex numbers from a completed matching (spec
/// §4.3.1 "Assignment of coarse-vertex numbers"). Returns the fine-to-coarse
/// map (indexed like the local graph, local vertices then ghosts) and the
/// number of coarse vertices this process is the representative owner of.
pub fn assign_coarse_numbers<NI: Idx>(
    dist: &DistGraph<NI>,
    mate: &[Option<NI>],
) -> (Vec<NI>, usize) {
    let local_count = dist.local_count().index();
    let ghost_count = dist.ghost_count();

    let mut representative = vec![true; local_count];
    for u in 0..local_count {
        let global_u = dist.to_global(NI::new(u)).index();
        if let Some(mg) = mate[u] {
            representative[u] = global_u < mg.index();
        }
    }

    let local_coarse_count = representative.iter().filter(|&&r| r).count();
    let counts = dist.comm().allgather_usize(local_coarse_count);
    let coarse_base: usize = counts[..dist.proc_rank()].iter().sum();

    let mut values = vec![NI::zero(); local_count + ghost_count];
    let mut running = 0usize;
    for u in 0..local_count {
        if representative[u] {
            values[u] = NI::new(coarse_base + running);
            running += 1;
        }
    }
    for u in 0..local_count {
        if !representative[u] {
            if let Some(mg) = mate[u] {
                if let Some(local_mate) = dist.to_local_owned(mg) {
                    values[u] = values[local_mate];
                }
            }
        }
    }

    dist.sync_to_ghosts(&mut values);

    for u in 0..local_count {
        if !representative[u] {
            if let Some(mg) = mate[u] {
                if dist.to_local_owned(mg).is_none() {
                    if let Some(ghost_idx) = dist.to_local_ghost(mg) {
                        values[u] = values[local_count + ghost_idx];
                    }
                }
            }
        }
    }

    (values, local_coarse_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scotch_graph::{Comm, CsrLayout, Graph};

    // Two processes each own a 4-vertex path segment; a single cross-process
    // edge links vertex 3 (P0) to vertex 4 (P1, ghosted on P0) and vertex 4
    // to vertex 3 (ghosted on P1). Global path: 0-1-2-3-4-5-6-7.
    fn build(rank: usize) -> (Graph<u32>, u32, Vec<(u32, u32)>, Vec<u32>) {
        let ranges = vec![(0u32, 4u32), (4u32, 8u32)];
        if rank == 0 {
            let edges = vec![(0u32, 1, 1u32), (1, 2, 1), (2, 3, 1), (3, 4, 1)];
            let g = Graph::build(0, 5, &edges, None, CsrLayout::Sorted).unwrap();
            (g, 4, ranges, vec![4])
        } else {
            let edges = vec![(1u32, 0u32, 1u32), (1, 2, 1), (2, 3, 1), (3, 4, 1)];
            // local vertex 0 is the ghost (global 3); local 1..4 are global 4..7.
            let g = Graph::build(0, 5, &edges, None, CsrLayout::Sorted).unwrap();
            (g, 4, ranges, vec![3])
        }
    }

    #[test]
    fn distributed_matching_is_symmetric_across_processes() {
        let results = Comm::run(2, |comm| {
            let rank = comm.rank();
            let (local, local_count, ranges, ghosts) = build(rank);
            let dist = DistGraph::new(local, local_count, comm, ranges, ghosts);
            let mut rng = RandomStream::seeded(11);
            let mate = match_distributed(
                &dist,
                None,
                &MatchingOptions::default(),
                &mut rng,
                4,
            );
            let globals: Vec<u32> = (0..4).map(|u| dist.to_global(u).index() as u32).collect();
            (globals, mate.iter().map(|m| m.map(|x| x.index() as u32)).collect::<Vec<_>>())
        });

        let (globals0, mate0) = &results[0];
        let (globals1, mate1) = &results[1];
        for (i, &g) in globals0.iter().enumerate() {
            if let Some(m) = mate0[i] {
                let owner_list = if (0..4).contains(&m) { (globals0, mate0) } else { (globals1, mate1) };
                let j = owner_list.0.iter().position(|&x| x == m).unwrap();
                assert_eq!(owner_list.1[j], Some(g));
            }
        }
    }
}
