//! Folding and the fold-communication pattern (spec §4.3.3–§4.3.4).
//!
//! `Fold` redistributes the coarse graph held across `P` processes onto the
//! first `ceil(P/2)` of them; `FoldDup` instead produces two duplicated
//! copies on two disjoint halves. Both reuse the same communication-pattern
//! computation, which depends only on the per-process vertex counts, not on
//! graph contents — matching `dgraph_fold_comm.c`'s separation of pattern
//! computation from data movement.

use crate::error::Error;

#[derive(Clone, Copy, Debug)]
pub enum FoldMode {
    Fold,
    FoldDup,
}

/// One leg of a fold transfer: `count` vertices starting at `first_vertex`
/// (in the sender's original local numbering) move to `partner`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub partner: usize,
    pub count: usize,
    pub first_vertex: usize,
}

/// The fold-communication pattern for one target half: which processes
/// send, which receive (a process may do both when overload forces it to
/// additionally keep some of its own data as a "sender-receiver"), and the
/// transfer list each side must carry out.
#[derive(Clone, Debug)]
pub struct FoldCommPlan {
    pub target_count: usize,
    /// Indexed by original process rank; empty if that rank sends nothing.
    pub sender_transfers: Vec<Vec<Transfer>>,
    /// Indexed by original process rank; empty if that rank receives
    /// nothing (including ranks `>= target_count`, which normally don't
    /// receive unless promoted to a sender-receiver).
    pub receiver_transfers: Vec<Vec<Transfer>>,
    /// Whether a rank keeps (part of) its own local data after folding —
    /// true for every receiver rank, and for any overloaded sender promoted
    /// to sender-receiver.
    pub retains_local: Vec<bool>,
}

impl FoldCommPlan {
    /// The contiguous local offset a chunk lands at on the receiving side:
    /// its own retained prefix (if any) followed by the transfers already
    /// recorded before `transfer_index`.
    pub fn receiver_offset(&self, receiver: usize, transfer_index: usize, own_retained_count: usize) -> usize {
        let mut offset = own_retained_count;
        for t in &self.receiver_transfers[receiver][..transfer_index] {
            offset += t.count;
        }
        offset
    }
}

/// Computes the fold-communication pattern for `counts[p]` vertices on
/// process `p`, folding onto the first `target_count` processes.
///
/// Ports the retry-loop shape of `dgraph_fold_comm.c`'s `FOLDCOMMNBR`
/// search: starting from `fold_comm_nbr`, greedily pair the least-loaded
/// receiver with the most-loaded sender, splitting a sender's payload
/// across receivers (and, if still over capacity, promoting the sender
/// itself to an additional receiver of its own remainder) until every
/// sender's load is placed or the per-process message cap is exceeded, in
/// which case `fold_comm_nbr` is doubled and the search retried, up to
/// `max_fold_comm_nbr`.
pub fn compute_fold_plan(
    counts: &[usize],
    target_count: usize,
    mut fold_comm_nbr: usize,
    max_fold_comm_nbr: usize,
) -> Result<FoldCommPlan, Error> {
    if target_count == 0 || target_count > counts.len() {
        return Err(Error::InvalidArgument(
            "fold target process count must be in 1..=process count".into(),
        ));
    }
    loop {
        match try_plan(counts, target_count, fold_comm_nbr) {
            Some(plan) => return Ok(plan),
            None => {
                if fold_comm_nbr >= max_fold_comm_nbr {
                    return Err(Error::FoldCommOverflow(max_fold_comm_nbr));
                }
                fold_comm_nbr = (fold_comm_nbr * 2).min(max_fold_comm_nbr);
            }
        }
    }
}

fn try_plan(counts: &[usize], target_count: usize, fold_comm_nbr: usize) -> Option<FoldCommPlan> {
    let proc_count = counts.len();
    let total: usize = counts.iter().sum();
    let base = total / target_count;
    let extra = total % target_count;
    // Receiver `r` targets `base + 1` vertices for `r < extra`, else `base`.
    let target_for = |r: usize| base + if r < extra { 1 } else { 0 };

    let mut sender_transfers = vec![Vec::new(); proc_count];
    let mut receiver_transfers = vec![Vec::new(); proc_count];
    let mut retains_local = vec![false; proc_count];
    for r in 0..target_count {
        retains_local[r] = true;
    }

    let mut remaining: Vec<usize> = (target_count..proc_count).map(|p| counts[p]).collect();
    let mut cursor: Vec<usize> = vec![0; remaining.len()]; // next un-sent vertex offset, per sender
    let mut capacity: Vec<i64> = (0..target_count)
        .map(|r| target_for(r) as i64 - counts[r] as i64)
        .collect();
    let mut msg_count = vec![0usize; proc_count];

    loop {
        // Pick the sender (original index into `target_count..proc_count`)
        // with the largest remaining load.
        let sender_slot = remaining
            .iter()
            .enumerate()
            .filter(|&(_, &rem)| rem > 0)
            .max_by_key(|&(_, &rem)| rem)
            .map(|(i, _)| i);
        let Some(sender_slot) = sender_slot else { break };
        let sender_rank = target_count + sender_slot;

        // Pick the receiver with the most remaining capacity.
        let receiver = capacity
            .iter()
            .enumerate()
            .max_by_key(|&(_, &cap)| cap)
            .map(|(i, _)| i)
            .unwrap();

        if capacity[receiver] <= 0 {
            // No receiver has room left; the sender keeps its remainder and
            // becomes a sender-receiver of its own leftover data.
            retains_local[sender_rank] = true;
            remaining[sender_slot] = 0;
            continue;
        }

        let take = remaining[sender_slot].min(capacity[receiver] as usize);
        if msg_count[sender_rank] >= fold_comm_nbr || msg_count[receiver] >= fold_comm_nbr {
            return None;
        }
        let transfer = Transfer {
            partner: receiver,
            count: take,
            first_vertex: cursor[sender_slot],
        };
        sender_transfers[sender_rank].push(transfer);
        receiver_transfers[receiver].push(Transfer {
            partner: sender_rank,
            count: take,
            first_vertex: cursor[sender_slot],
        });
        msg_count[sender_rank] += 1;
        msg_count[receiver] += 1;
        cursor[sender_slot] += take;
        remaining[sender_slot] -= take;
        capacity[receiver] -= take as i64;
    }

    Some(FoldCommPlan {
        target_count,
        sender_transfers,
        receiver_transfers,
        retains_local,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_counts_fold_without_transfers_needed() {
        let counts = vec![10, 10, 10, 10];
        let plan = compute_fold_plan(&counts, 2, 4, 64).unwrap();
        let received: usize = plan.receiver_transfers.iter().flatten().map(|t| t.count).sum();
        let sent: usize = plan.sender_transfers.iter().flatten().map(|t| t.count).sum();
        assert_eq!(received, sent);
        assert_eq!(sent, 20); // the two upper-half processes' full load moves
    }

    #[test]
    fn every_moved_vertex_is_accounted_for_exactly_once() {
        let counts = vec![3, 7, 2, 9, 1, 5];
        let plan = compute_fold_plan(&counts, 3, 4, 64).unwrap();
        let total_upper: usize = counts[3..].iter().sum();
        let sent: usize = plan.sender_transfers.iter().flatten().map(|t| t.count).sum();
        assert_eq!(sent, total_upper);
        let received: usize = plan.receiver_transfers.iter().flatten().map(|t| t.count).sum();
        assert_eq!(received, sent);
    }

    #[test]
    fn overflow_reports_error_when_cap_never_suffices() {
        // target_count 0 is rejected outright as an invalid target.
        let err = compute_fold_plan(&[1, 2, 3], 0, 1, 1).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
