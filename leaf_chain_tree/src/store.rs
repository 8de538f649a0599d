// SPDX-License-Identifier: MIT OR Apache-2.0

//! The tree store: node arena, chain endpoints and the tree root.

use crate::arena::{NodeArena, NodeId};
use crate::node::{LeafNode, TreeNode};

/// Arena-backed leaf chain plus the balanced layer built on top of it.
///
/// `K` is the key type, `L` the leaf payload, `N` the non-leaf payload.
/// The store owns every node; clients navigate through [`NodeId`]s.
#[derive(Debug, Clone)]
pub struct TreeStore<K, L, N> {
    pub(crate) arena: NodeArena<K, L, N>,
    first_leaf: Option<NodeId>,
    last_leaf: Option<NodeId>,
    root: Option<NodeId>,
    leaf_count: usize,
}

impl<K, L, N> TreeStore<K, L, N> {
    pub fn new() -> Self {
        Self {
            arena: NodeArena::new(),
            first_leaf: None,
            last_leaf: None,
            root: None,
            leaf_count: 0,
        }
    }

    pub fn first_leaf(&self) -> Option<NodeId> {
        self.first_leaf
    }

    pub fn last_leaf(&self) -> Option<NodeId> {
        self.last_leaf
    }

    /// The root of the balanced layer, if it has been built.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Total number of live nodes, leaves and non-leaves.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Resolve a node id.
    ///
    /// # Panics
    ///
    /// Panics if the id is stale.
    pub fn node(&self, id: NodeId) -> &TreeNode<K, L, N> {
        &self.arena[id]
    }

    /// Mutable counterpart of [`node`][Self::node].
    pub fn node_mut(&mut self, id: NodeId) -> &mut TreeNode<K, L, N> {
        &mut self.arena[id]
    }

    /// Append a leaf at the end of the chain.
    ///
    /// The caller is responsible for keeping the chain sorted; this method
    /// performs no key comparison.
    pub fn push_leaf_back(&mut self, key: K, data: L) -> NodeId {
        let id = self.arena.insert(TreeNode::Leaf(LeafNode {
            key,
            prev: self.last_leaf,
            next: None,
            parent: None,
            data,
        }));

        match self.last_leaf {
            Some(last) => self.arena[last].leaf_mut().next = Some(id),
            None => self.first_leaf = Some(id),
        }
        self.last_leaf = Some(id);
        self.leaf_count += 1;
        id
    }

    /// Splice a new leaf into the chain immediately before `at`.
    pub fn insert_leaf_before(&mut self, at: NodeId, key: K, data: L) -> NodeId {
        let prev = self.arena[at].leaf().prev;
        let id = self.arena.insert(TreeNode::Leaf(LeafNode {
            key,
            prev,
            next: Some(at),
            parent: None,
            data,
        }));

        self.arena[at].leaf_mut().prev = Some(id);
        match prev {
            Some(prev_id) => self.arena[prev_id].leaf_mut().next = Some(id),
            None => self.first_leaf = Some(id),
        }
        self.leaf_count += 1;
        id
    }

    /// Splice a new leaf into the chain immediately after `at`.
    pub fn insert_leaf_after(&mut self, at: NodeId, key: K, data: L) -> NodeId {
        let next = self.arena[at].leaf().next;
        let id = self.arena.insert(TreeNode::Leaf(LeafNode {
            key,
            prev: Some(at),
            next,
            parent: None,
            data,
        }));

        self.arena[at].leaf_mut().next = Some(id);
        match next {
            Some(next_id) => self.arena[next_id].leaf_mut().prev = Some(id),
            None => self.last_leaf = Some(id),
        }
        self.leaf_count += 1;
        id
    }

    /// Unlink a leaf from the chain and drop it, returning its payload.
    pub fn unlink_leaf(&mut self, id: NodeId) -> (K, L) {
        let node = self.arena.remove(id);
        let leaf = match node {
            TreeNode::Leaf(leaf) => leaf,
            TreeNode::Nonleaf(_) => panic!("unlink_leaf called on a non-leaf node"),
        };

        match leaf.prev {
            Some(prev) => self.arena[prev].leaf_mut().next = leaf.next,
            None => self.first_leaf = leaf.next,
        }
        match leaf.next {
            Some(next) => self.arena[next].leaf_mut().prev = leaf.prev,
            None => self.last_leaf = leaf.prev,
        }
        self.leaf_count -= 1;
        (leaf.key, leaf.data)
    }

    /// Iterate over leaf ids in chain (key) order.
    pub fn leaf_ids(&self) -> LeafIdIter<'_, K, L, N> {
        LeafIdIter {
            store: self,
            cursor: self.first_leaf,
        }
    }

    /// Iterate over `(NodeId, &LeafNode)` pairs in chain order.
    pub fn leaves(&self) -> impl Iterator<Item = (NodeId, &LeafNode<K, L>)> {
        self.leaf_ids().map(move |id| (id, self.node(id).leaf()))
    }

    /// Remove every node, leaves included.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.first_leaf = None;
        self.last_leaf = None;
        self.root = None;
        self.leaf_count = 0;
    }

    /// Remove every non-leaf node, keeping the chain intact.
    pub fn clear_upper_levels(&mut self) {
        let nonleaf_ids: Vec<NodeId> = self
            .arena
            .iter()
            .filter(|(_, node)| !node.is_leaf())
            .map(|(id, _)| id)
            .collect();
        for id in nonleaf_ids {
            self.arena.remove(id);
        }

        let mut cursor = self.first_leaf;
        while let Some(id) = cursor {
            let leaf = self.arena[id].leaf_mut();
            leaf.parent = None;
            cursor = leaf.next;
        }
        self.root = None;
    }

    pub(crate) fn set_root(&mut self, root: Option<NodeId>) {
        self.root = root;
    }
}

impl<K, L, N> Default for TreeStore<K, L, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over leaf ids in chain order.
#[derive(Debug)]
pub struct LeafIdIter<'a, K, L, N> {
    store: &'a TreeStore<K, L, N>,
    cursor: Option<NodeId>,
}

impl<K, L, N> Iterator for LeafIdIter<'_, K, L, N> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        self.cursor = self.store.node(id).leaf().next;
        Some(id)
    }
}
