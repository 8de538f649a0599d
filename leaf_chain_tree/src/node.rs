// SPDX-License-Identifier: MIT OR Apache-2.0

//! Node types for the leaf chain and the balanced layer above it.

use crate::arena::NodeId;

/// A leaf node in the chain.
///
/// Leaves are sorted by `key` and linked through `prev`/`next`. The `parent`
/// link is only populated while the upper levels are built.
#[derive(Debug, Clone)]
pub struct LeafNode<K, L> {
    pub key: K,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
    pub parent: Option<NodeId>,
    /// Client payload attached to this leaf.
    pub data: L,
}

/// A non-leaf node covering the half-open key range `[low, high)`.
///
/// The right child is absent when the level below had an odd number of
/// nodes and this parent absorbed the trailing one.
#[derive(Debug, Clone)]
pub struct NonleafNode<K, N> {
    pub low: K,
    pub high: K,
    pub left: NodeId,
    pub right: Option<NodeId>,
    pub parent: Option<NodeId>,
    /// Client payload attached to this node.
    pub data: N,
}

/// A node in the tree: either a chain leaf or a balanced-layer non-leaf.
#[derive(Debug, Clone)]
pub enum TreeNode<K, L, N> {
    Leaf(LeafNode<K, L>),
    Nonleaf(NonleafNode<K, N>),
}

impl<K, L, N> TreeNode<K, L, N> {
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    pub fn as_leaf(&self) -> Option<&LeafNode<K, L>> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Nonleaf(_) => None,
        }
    }

    pub fn as_leaf_mut(&mut self) -> Option<&mut LeafNode<K, L>> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Nonleaf(_) => None,
        }
    }

    pub fn as_nonleaf(&self) -> Option<&NonleafNode<K, N>> {
        match self {
            Self::Nonleaf(nonleaf) => Some(nonleaf),
            Self::Leaf(_) => None,
        }
    }

    pub fn as_nonleaf_mut(&mut self) -> Option<&mut NonleafNode<K, N>> {
        match self {
            Self::Nonleaf(nonleaf) => Some(nonleaf),
            Self::Leaf(_) => None,
        }
    }

    /// Expect this node to be a leaf.
    ///
    /// # Panics
    ///
    /// Panics if the node is a non-leaf; links only ever point at the node
    /// kind they were created for, so a mismatch is a library bug.
    pub fn leaf(&self) -> &LeafNode<K, L> {
        self.as_leaf().expect("node id refers to a non-leaf node")
    }

    /// Mutable counterpart of [`leaf`][Self::leaf].
    pub fn leaf_mut(&mut self) -> &mut LeafNode<K, L> {
        self.as_leaf_mut()
            .expect("node id refers to a non-leaf node")
    }

    /// Expect this node to be a non-leaf.
    ///
    /// # Panics
    ///
    /// Panics if the node is a leaf.
    pub fn nonleaf(&self) -> &NonleafNode<K, N> {
        self.as_nonleaf().expect("node id refers to a leaf node")
    }

    /// Mutable counterpart of [`nonleaf`][Self::nonleaf].
    pub fn nonleaf_mut(&mut self) -> &mut NonleafNode<K, N> {
        self.as_nonleaf_mut()
            .expect("node id refers to a leaf node")
    }

    pub fn set_parent(&mut self, parent: Option<NodeId>) {
        match self {
            Self::Leaf(leaf) => leaf.parent = parent,
            Self::Nonleaf(nonleaf) => nonleaf.parent = parent,
        }
    }
}

impl<K: Copy, L, N> TreeNode<K, L, N> {
    /// The lowest key this node is responsible for: the key itself for a
    /// leaf, `low` for a non-leaf.
    pub fn low_key(&self) -> K {
        match self {
            Self::Leaf(leaf) => leaf.key,
            Self::Nonleaf(nonleaf) => nonleaf.low,
        }
    }
}
