// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bottom-up construction of the balanced layer.

use crate::arena::NodeId;
use crate::node::{NonleafNode, TreeNode};
use crate::store::TreeStore;

impl<K: Copy, L, N> TreeStore<K, L, N> {
    /// Build a perfectly balanced layer of non-leaf nodes over the chain.
    ///
    /// Any previously built layer is torn down first, so rebuilding is
    /// idempotent. At each level consecutive nodes are paired; a trailing
    /// unpaired node gets a parent with only a left child. Building requires
    /// at least two leaves; with fewer the root stays `None`.
    ///
    /// `make_data` produces the payload for each new non-leaf node.
    ///
    /// # Range rule
    ///
    /// A parent's `low` is the low key of its left child. Its `high` is
    /// taken from the right child: for a leaf right child, the key of the
    /// leaf following it in the chain (or its own key when it is the last
    /// leaf); for a non-leaf right child, that child's `high`. With no right
    /// child the left child supplies the same bound.
    pub fn build_upper_levels(&mut self, mut make_data: impl FnMut() -> N) -> Option<NodeId> {
        self.clear_upper_levels();
        if self.leaf_count() < 2 {
            return None;
        }

        let mut level: Vec<NodeId> = self.leaf_ids().collect();
        while level.len() > 1 {
            let mut next_level = Vec::with_capacity(level.len().div_ceil(2));
            for pair in level.chunks(2) {
                let left = pair[0];
                let right = pair.get(1).copied();

                let low = self.node(left).low_key();
                let high = match right {
                    Some(right_id) => self.upper_bound_of(right_id),
                    None => self.upper_bound_of(left),
                };

                let parent = self.arena.insert(TreeNode::Nonleaf(NonleafNode {
                    low,
                    high,
                    left,
                    right,
                    parent: None,
                    data: make_data(),
                }));
                self.node_mut(left).set_parent(Some(parent));
                if let Some(right_id) = right {
                    self.node_mut(right_id).set_parent(Some(parent));
                }
                next_level.push(parent);
            }
            level = next_level;
        }

        let root = level[0];
        self.set_root(Some(root));
        Some(root)
    }

    /// The exclusive upper bound contributed by `id` when it is the
    /// rightmost child of a new parent.
    fn upper_bound_of(&self, id: NodeId) -> K {
        match self.node(id) {
            TreeNode::Leaf(leaf) => match leaf.next {
                Some(next) => self.node(next).leaf().key,
                None => leaf.key,
            },
            TreeNode::Nonleaf(nonleaf) => nonleaf.high,
        }
    }
}
