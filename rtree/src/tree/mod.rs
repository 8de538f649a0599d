// SPDX-License-Identifier: MIT OR Apache-2.0

//! The R-tree container: arena, root bookkeeping and shared maintenance.

mod erase;
mod insert;
mod invariants;
mod search;

use slab::Slab;

use crate::TreeParams;
use crate::geometry::{Extent, SpatialKey};
use crate::node::{NodeId, NodeKind, RTreeNode};

pub use search::{SearchHit, ValuesIter};

/// The role of a node, as reported to [`RTree::walk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    DirectoryLeaf,
    DirectoryNonLeaf,
    Value,
}

/// Properties of one node, handed to the [`RTree::walk`] visitor.
#[derive(Debug, Clone, Copy)]
pub struct NodeProperties<K, const D: usize> {
    pub node_type: NodeType,
    pub extent: Extent<K, D>,
    /// Distance from the root; the root itself is at depth zero.
    pub depth: usize,
}

/// An R-tree over `D`-dimensional extents keyed by `K`, storing values of
/// type `V`.
///
/// # Arena storage
///
/// All nodes live in a [`Slab`]; parents and children reference each other
/// through stable ids. Moving a node between directories only rewrites ids,
/// so no pointer fix-up pass is ever needed, and dropping the tree frees
/// every node without recursing through the structure.
#[derive(Debug, Clone)]
pub struct RTree<K, V, const D: usize> {
    nodes: Slab<RTreeNode<K, V, D>>,
    root: NodeId,
    params: TreeParams,
    len: usize,
}

impl<K: SpatialKey, V, const D: usize> RTree<K, V, D> {
    /// Create an empty tree with the default [`TreeParams`].
    pub fn new() -> Self {
        Self::with_params(TreeParams::default())
    }

    /// Create an empty tree with explicit fan-out bounds.
    ///
    /// # Panics
    ///
    /// Panics unless `1 <= min_node_size <= max_node_size / 2`; the R*
    /// split distributions are only well-defined under that relation.
    pub fn with_params(params: TreeParams) -> Self {
        assert!(params.min_node_size >= 1, "min_node_size must be positive");
        assert!(
            params.min_node_size <= params.max_node_size / 2,
            "min_node_size must not exceed half of max_node_size"
        );

        let mut nodes = Slab::new();
        let root = NodeId::from_slab(nodes.insert(RTreeNode {
            extent: Extent::default(),
            parent: None,
            kind: NodeKind::LeafDirectory(Vec::new()),
        }));

        Self {
            nodes,
            root,
            params,
            len: 0,
        }
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The fan-out and depth bounds this tree was built with.
    pub fn params(&self) -> TreeParams {
        self.params
    }

    /// The extent of the root directory, i.e. the union of every stored
    /// extent. Meaningless while the tree is empty.
    pub fn extent(&self) -> Extent<K, D> {
        self.node(self.root).extent
    }

    pub(crate) fn node(&self, id: NodeId) -> &RTreeNode<K, V, D> {
        &self.nodes[id.key()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut RTreeNode<K, V, D> {
        &mut self.nodes[id.key()]
    }

    pub(crate) fn root_id(&self) -> NodeId {
        self.root
    }

    pub(crate) fn arena(&self) -> &Slab<RTreeNode<K, V, D>> {
        &self.nodes
    }

    pub(crate) fn arena_mut(&mut self) -> &mut Slab<RTreeNode<K, V, D>> {
        &mut self.nodes
    }

    pub(crate) fn set_len(&mut self, len: usize) {
        self.len = len;
    }

    /// Tight union of the extents of `ids`.
    ///
    /// # Panics
    ///
    /// Panics on an empty slice; directories recompute their extent only
    /// while they have children.
    pub(crate) fn extent_union(&self, ids: &[NodeId]) -> Extent<K, D> {
        let mut iter = ids.iter();
        let first = iter.next().expect("extent union over no nodes");
        let mut merged = self.node(*first).extent;
        for id in iter {
            merged.extend_to_fit(&self.node(*id).extent);
        }
        merged
    }

    /// Recompute a directory's extent from its children. Returns whether
    /// the extent changed. An empty directory resets to the default extent.
    pub(crate) fn pack(&mut self, id: NodeId) -> bool {
        let fresh = {
            let node = self.node(id);
            let children = node.kind.children();
            if children.is_empty() {
                Extent::default()
            } else {
                self.extent_union(children)
            }
        };

        let node = self.node_mut(id);
        let changed = node.extent != fresh;
        node.extent = fresh;
        changed
    }

    /// Re-pack ancestors starting from `id` until an extent stops changing.
    pub(crate) fn pack_upward(&mut self, mut id: Option<NodeId>) {
        while let Some(current) = id {
            if !self.pack(current) {
                return;
            }
            id = self.node(current).parent;
        }
    }

    /// Visit every node in depth-first order, reporting its type, extent
    /// and depth. Intended for diagnostics and structural assertions.
    pub fn walk(&self, mut visit: impl FnMut(&NodeProperties<K, D>)) {
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let node = self.node(id);
            let node_type = match &node.kind {
                NodeKind::LeafDirectory(_) => NodeType::DirectoryLeaf,
                NodeKind::NonLeafDirectory(_) => NodeType::DirectoryNonLeaf,
                NodeKind::Value(_) => NodeType::Value,
            };
            visit(&NodeProperties {
                node_type,
                extent: node.extent,
                depth,
            });

            if let NodeKind::LeafDirectory(children) | NodeKind::NonLeafDirectory(children) =
                &node.kind
            {
                for &child in children.iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
        }
    }

    /// Walk upward shrinking ancestor extents after `affected` was removed
    /// somewhere below `id`.
    ///
    /// An ancestor can only shrink when the removed extent touched its
    /// boundary; the walk stops as soon as an extent is unaffected.
    pub(crate) fn shrink_upward(&mut self, id: Option<NodeId>, affected: Extent<K, D>) {
        let mut id = id;
        let mut affected = affected;
        while let Some(current) = id {
            if !self.node(current).extent.contains_at_boundary(&affected) {
                return;
            }
            let original = self.node(current).extent;
            if !self.pack(current) {
                return;
            }
            affected = original;
            id = self.node(current).parent;
        }
    }
}

impl<K: SpatialKey, V, const D: usize> Default for RTree<K, V, D> {
    fn default() -> Self {
        Self::new()
    }
}
