//! Column-block tree (spec §3 "Column-block tree node"): the structural
//! output of nested-dissection ordering alongside the inverse permutation.

use bitflags::bitflags;

bitflags! {
    /// `type_flags`: a bitset, combinations of which encode a
    /// nested-dissection leaf (spec §3's ORDERCBLK flag semantics).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CblkFlags: u8 {
        /// Nested-dissection node with up to three children (left, right,
        /// separator).
        const NED_I = 0b0001;
        /// Node for disconnected components; children adopt this node's
        /// parent rather than nesting under it.
        const DI_CO = 0b0010;
        /// Sequentially dependent node whose children form a chain.
        const SEQU = 0b0100;
        /// Terminal leaf.
        const LEAF = 0b1000;
    }
}

/// One node of the ordering's column-block tree.
#[derive(Clone, Debug)]
pub struct ColumnBlock {
    pub type_flags: CblkFlags,
    pub vnod_count: usize,
    pub children: Vec<ColumnBlock>,
}

impl ColumnBlock {
    pub fn leaf(vnod_count: usize) -> Self {
        Self {
            type_flags: CblkFlags::LEAF,
            vnod_count,
            children: Vec::new(),
        }
    }

    pub fn nedi(vnod_count: usize, left: ColumnBlock, right: ColumnBlock, sep: Option<ColumnBlock>) -> Self {
        let mut children = vec![left, right];
        children.extend(sep);
        Self {
            type_flags: CblkFlags::NED_I,
            vnod_count,
            children,
        }
    }

    pub fn dico(vnod_count: usize, children: Vec<ColumnBlock>) -> Self {
        Self {
            type_flags: CblkFlags::DI_CO,
            vnod_count,
            children,
        }
    }

    /// Counts every node in this subtree, self included.
    pub fn tree_node_count(&self) -> usize {
        1 + self.children.iter().map(ColumnBlock::tree_node_count).sum::<usize>()
    }

    /// Counts leaf (terminal) nodes in this subtree.
    pub fn cblk_count(&self) -> usize {
        if self.children.is_empty() {
            1
        } else {
            self.children.iter().map(ColumnBlock::cblk_count).sum()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nedi_node_counts_include_children() {
        let tree = ColumnBlock::nedi(10, ColumnBlock::leaf(4), ColumnBlock::leaf(4), Some(ColumnBlock::leaf(2)));
        assert_eq!(tree.tree_node_count(), 4);
        assert_eq!(tree.cblk_count(), 3);
        assert!(tree.type_flags.contains(CblkFlags::NED_I));
    }

    #[test]
    fn leaf_is_its_own_single_block() {
        let leaf = ColumnBlock::leaf(6);
        assert_eq!(leaf.tree_node_count(), 1);
        assert_eq!(leaf.cblk_count(), 1);
    }
}
