// SPDX-License-Identifier: MIT OR Apache-2.0

//! Arena storage for tree nodes.
//!
//! Nodes are kept in a [`slab::Slab`] and referenced through [`NodeId`]
//! handles. Ids stay stable for the lifetime of the node, so links between
//! nodes survive any mutation to other slots.

use std::ops::{Index, IndexMut};

use slab::Slab;

use crate::node::TreeNode;

/// Index into the node arena.
///
/// A lightweight handle (single `u32`) that is stable across mutations to
/// other slots in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Convert to a `usize` key for indexing into the underlying slab.
    pub(crate) const fn key(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_slab(key: usize) -> Self {
        assert!(
            key <= u32::MAX as usize,
            "tried to store more than {} nodes in the arena",
            u32::MAX
        );
        Self(key as u32)
    }
}

/// Arena storage for [`TreeNode`]s.
///
/// A newtype over [`Slab`] that provides type-safe indexing via [`NodeId`]
/// instead of raw `usize`.
#[derive(Debug, Clone)]
pub(crate) struct NodeArena<K, L, N> {
    nodes: Slab<TreeNode<K, L, N>>,
}

impl<K, L, N> NodeArena<K, L, N> {
    pub fn new() -> Self {
        Self { nodes: Slab::new() }
    }

    /// The number of live nodes (leaf and non-leaf) in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn insert(&mut self, node: TreeNode<K, L, N>) -> NodeId {
        NodeId::from_slab(self.nodes.insert(node))
    }

    /// Remove a node from the arena, returning it.
    ///
    /// # Panics
    ///
    /// Panics if the id is not live.
    pub fn remove(&mut self, id: NodeId) -> TreeNode<K, L, N> {
        self.nodes.remove(id.key())
    }

    /// Iterate over all live nodes, yielding `(NodeId, &TreeNode)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TreeNode<K, L, N>)> {
        self.nodes
            .iter()
            .map(|(key, node)| (NodeId::from_slab(key), node))
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

impl<K, L, N> Default for NodeArena<K, L, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, L, N> Index<NodeId> for NodeArena<K, L, N> {
    type Output = TreeNode<K, L, N>;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.key()]
    }
}

impl<K, L, N> IndexMut<NodeId> for NodeArena<K, L, N> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        &mut self.nodes[id.key()]
    }
}
