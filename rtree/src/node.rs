// SPDX-License-Identifier: MIT OR Apache-2.0

//! Node storage for the R-tree arena.

use crate::geometry::Extent;

/// Index into the node arena.
///
/// A lightweight handle (single `u32`) that stays stable for the lifetime
/// of the node, in particular across sibling insertions and removals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub(crate) struct NodeId(u32);

impl NodeId {
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

/// Public handle to a stored value, returned by insertion and searches and
/// accepted by [`erase`][crate::RTree::erase].
///
/// Erasing invalidates every outstanding handle for that value; handles of
/// other values stay valid across splits, reinsertion cascades and root
/// replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(pub(crate) u32);

impl From<NodeId> for EntryId {
    fn from(id: NodeId) -> Self {
        Self(id.0)
    }
}

impl From<EntryId> for NodeId {
    fn from(id: EntryId) -> Self {
        Self(id.0)
    }
}

/// The payload of a node: a directory with children, or an owned value.
#[derive(Debug, Clone)]
pub(crate) enum NodeKind<V> {
    /// Directory whose children are value nodes.
    LeafDirectory(Vec<NodeId>),
    /// Directory whose children are other directories.
    NonLeafDirectory(Vec<NodeId>),
    /// A stored value.
    Value(V),
}

impl<V> NodeKind<V> {
    pub fn is_directory(&self) -> bool {
        matches!(self, Self::LeafDirectory(_) | Self::NonLeafDirectory(_))
    }

    pub fn is_leaf_directory(&self) -> bool {
        matches!(self, Self::LeafDirectory(_))
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Children of a directory node.
    ///
    /// # Panics
    ///
    /// Panics on a value node; callers only navigate directories.
    pub fn children(&self) -> &[NodeId] {
        match self {
            Self::LeafDirectory(children) | Self::NonLeafDirectory(children) => children,
            Self::Value(_) => panic!("value nodes have no children"),
        }
    }

    /// Mutable counterpart of [`children`][Self::children].
    pub fn children_mut(&mut self) -> &mut Vec<NodeId> {
        match self {
            Self::LeafDirectory(children) | Self::NonLeafDirectory(children) => children,
            Self::Value(_) => panic!("value nodes have no children"),
        }
    }

    /// A short name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::LeafDirectory(_) => "directory-leaf",
            Self::NonLeafDirectory(_) => "directory-nonleaf",
            Self::Value(_) => "value",
        }
    }
}

/// A node in the arena: its extent, its parent link and its payload.
#[derive(Debug, Clone)]
pub(crate) struct RTreeNode<K, V, const D: usize> {
    pub extent: Extent<K, D>,
    pub parent: Option<NodeId>,
    pub kind: NodeKind<V>,
}
