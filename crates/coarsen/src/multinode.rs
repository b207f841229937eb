//! Multinode table (spec §3 "Multinode table" row): an ordered sequence of
//! `(fine_a, fine_b)` entries indexed by coarse-vertex number. `fine_a ==
//! fine_b` marks a singleton multinode.

use scotch_graph::Idx;

#[derive(Clone, Debug, Default)]
pub struct MultinodeTable<NI> {
    entries: Vec<(NI, NI)>,
}

impl<NI: Idx> MultinodeTable<NI> {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            entries: Vec::with_capacity(cap),
        }
    }

    pub fn push_pair(&mut self, fine_a: NI, fine_b: NI) -> NI {
        let coarse = NI::new(self.entries.len());
        self.entries.push((fine_a, fine_b));
        coarse
    }

    pub fn push_singleton(&mut self, fine: NI) -> NI {
        self.push_pair(fine, fine)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_singleton(&self, coarse: NI) -> bool {
        let (a, b) = self.entries[coarse.index()];
        a.index() == b.index()
    }

    pub fn fines(&self, coarse: NI) -> (NI, NI) {
        self.entries[coarse.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &(NI, NI)> {
        self.entries.iter()
    }

    /// Restores every fine vertex's part assignment for a part labeling of
    /// the coarse graph (the coarsen/uncoarsen round-trip law, spec §8).
    pub fn uncoarsen_parts(&self, coarse_part: &[i32], fine_count: usize) -> Vec<i32> {
        let mut fine_part = vec![-1; fine_count];
        for (coarse, &(a, b)) in self.entries.iter().enumerate() {
            let label = coarse_part[coarse];
            fine_part[a.index()] = label;
            if b.index() != a.index() {
                fine_part[b.index()] = label;
            }
        }
        fine_part
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_roundtrips_through_uncoarsen() {
        let mut table: MultinodeTable<u32> = MultinodeTable::with_capacity(2);
        table.push_pair(0, 1);
        table.push_singleton(2);
        assert!(!table.is_singleton(0));
        assert!(table.is_singleton(1));

        let fine_part = table.uncoarsen_parts(&[0, 1], 3);
        assert_eq!(fine_part, vec![0, 0, 1]);
    }
}
