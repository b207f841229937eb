use rayon::prelude::*;

use crate::index::Idx;

/// Defines how the neighbor list of individual vertices is organized within
/// the CSR target array.
#[derive(Clone, Copy, Debug)]
pub enum CsrLayout {
    /// Neighbor lists are sorted and may contain duplicate target ids.
    Sorted,
    /// Neighbor lists are not in any particular order. This is the default
    /// representation produced by [`Csr::from_edges`].
    Unsorted,
    /// Neighbor lists are sorted and do not contain duplicate target ids.
    /// Self-loops, i.e. edges of the form `(u, u)`, are removed.
    Deduplicated,
}

impl Default for CsrLayout {
    fn default() -> Self {
        CsrLayout::Unsorted
    }
}

/// A Compressed-Sparse-Row data structure used to represent the symmetric
/// adjacency of a graph or halo mesh.
///
/// The data structure is composed of two arrays: `offsets` and `targets`. For
/// a vertex count `n` and edge count `m`, `offsets` has exactly `n + 1` and
/// `targets` exactly `m` entries.
///
/// For a given vertex `u`, `offsets[u]` stores the start index of the
/// neighbor list of `u` in `targets`. The degree of `u` is
/// `offsets[u + 1] - offsets[u]`.
#[derive(Debug, Clone)]
pub struct Csr<Index: Idx, NI, EV> {
    offsets: Box<[Index]>,
    targets: Box<[Target<NI, EV>]>,
}

/// The target of an edge together with the value (typically a weight)
/// attached to that edge.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct Target<NI, EV> {
    pub target: NI,
    pub value: EV,
}

impl<T: Ord, V> Ord for Target<T, V> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.target.cmp(&other.target)
    }
}

impl<T: PartialOrd, V> PartialOrd for Target<T, V> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.target.partial_cmp(&other.target)
    }
}

impl<T: PartialEq, V> PartialEq for Target<T, V> {
    fn eq(&self, other: &Self) -> bool {
        self.target.eq(&other.target)
    }
}

impl<T: Eq, V> Eq for Target<T, V> {}

impl<T, EV> Target<T, EV> {
    pub fn new(target: T, value: EV) -> Self {
        Self { target, value }
    }
}

impl<Index: Idx, NI, EV> Csr<Index, NI, EV> {
    pub fn new(offsets: Box<[Index]>, targets: Box<[Target<NI, EV>]>) -> Self {
        Self { offsets, targets }
    }

    #[inline]
    pub fn node_count(&self) -> Index {
        Index::new(self.offsets.len() - 1)
    }

    #[inline]
    pub fn edge_count(&self) -> Index {
        Index::new(self.targets.len())
    }

    #[inline]
    pub fn degree(&self, i: Index) -> Index {
        let from = self.offsets[i.index()];
        let to = self.offsets[(i + Index::new(1)).index()];
        to - from
    }

    #[inline]
    pub fn targets_with_values(&self, i: Index) -> &[Target<NI, EV>] {
        let from = self.offsets[i.index()];
        let to = self.offsets[(i + Index::new(1)).index()];
        &self.targets[from.index()..to.index()]
    }

    pub fn offsets(&self) -> &[Index] {
        &self.offsets
    }
}

/// Builds a CSR from an explicit edge list. Each undirected edge `(u, v, w)`
/// is inserted twice, once for `u` and once for `v`, matching the symmetric
/// adjacency invariant required of every graph container in this crate.
impl<NI, EV> Csr<NI, NI, EV>
where
    NI: Idx,
    EV: Copy + Send + Sync,
{
    pub fn from_edges(node_count: NI, edges: &[(NI, NI, EV)], layout: CsrLayout) -> Self {
        let mut degrees = vec![NI::zero(); node_count.index()];
        for &(u, v, _) in edges {
            degrees[u.index()] += NI::new(1);
            degrees[v.index()] += NI::new(1);
        }

        let offsets = prefix_sum(degrees);
        let edge_count = offsets[node_count.index()].index();
        let mut targets = Vec::<Target<NI, EV>>::with_capacity(edge_count);
        // SAFETY: every slot in `cursor[u]..offsets[u+1]` is written exactly
        // once below before `targets` is read.
        unsafe { targets.set_len(edge_count) };

        let mut cursor = offsets.clone();
        for &(u, v, w) in edges {
            let pu = cursor[u.index()].index();
            targets[pu] = Target::new(v, w);
            cursor[u.index()] += NI::new(1);

            let pv = cursor[v.index()].index();
            targets[pv] = Target::new(u, w);
            cursor[v.index()] += NI::new(1);
        }

        let mut csr = Csr::new(offsets.into_boxed_slice(), targets.into_boxed_slice());
        match layout {
            CsrLayout::Unsorted => {}
            CsrLayout::Sorted => sort_targets(csr.offsets(), {
                // targets is private; re-borrow via a helper method below
                csr_targets_mut(&mut csr)
            }),
            CsrLayout::Deduplicated => {
                sort_targets(csr.offsets(), csr_targets_mut(&mut csr));
            }
        }
        csr
    }
}

fn csr_targets_mut<Index: Idx, NI, EV>(csr: &mut Csr<Index, NI, EV>) -> &mut [Target<NI, EV>] {
    &mut csr.targets
}

/// Computes the CSR offset array from a per-vertex degree array.
pub fn prefix_sum<NI: Idx>(degrees: Vec<NI>) -> Vec<NI> {
    let mut last = *degrees.last().unwrap_or(&NI::zero());
    let mut sums = degrees
        .into_iter()
        .scan(NI::zero(), |total, degree| {
            let value = *total;
            *total += degree;
            Some(value)
        })
        .collect::<Vec<_>>();
    last += *sums.last().unwrap_or(&NI::zero());
    sums.push(last);
    sums
}

/// Sorts the neighbor list of every vertex in place, in parallel.
pub fn sort_targets<NI, T, EV>(offsets: &[NI], targets: &mut [Target<T, EV>])
where
    NI: Idx,
    T: Copy + Send + Ord,
    EV: Send,
{
    to_mut_slices(offsets, targets)
        .into_par_iter()
        .for_each(|list| list.sort_unstable());
}

// Splits `targets` into one mutable slice per vertex, according to `offsets`.
fn to_mut_slices<'a, NI: Idx, T>(offsets: &[NI], targets: &'a mut [T]) -> Vec<&'a mut [T]> {
    let mut slices = Vec::with_capacity(offsets.len() - 1);
    let mut rest = targets;
    let mut prev = NI::zero();
    for &end in &offsets[1..] {
        let (left, right) = rest.split_at_mut((end - prev).index());
        slices.push(left);
        rest = right;
        prev = end;
    }
    slices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_edges_symmetric() {
        let csr: Csr<u32, u32, ()> =
            Csr::from_edges(4, &[(0, 1, ()), (1, 2, ()), (2, 3, ())], CsrLayout::Sorted);
        assert_eq!(csr.node_count(), 4);
        assert_eq!(csr.edge_count(), 6);
        assert_eq!(csr.degree(0), 1);
        assert_eq!(csr.degree(1), 2);
        assert_eq!(csr.degree(2), 2);
        assert_eq!(csr.degree(3), 1);
    }

    #[test]
    fn prefix_sum_basic() {
        let offsets = prefix_sum(vec![2u32, 0, 3]);
        assert_eq!(&*offsets, &[0, 2, 2, 5]);
    }
}
