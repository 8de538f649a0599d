// SPDX-License-Identifier: MIT OR Apache-2.0

//! Erasure: value removal, underflow dissolution and root collapse.

use crate::geometry::SpatialKey;
use crate::node::{EntryId, NodeId, NodeKind};
use crate::{RTree, RTreeError};

impl<K: SpatialKey, V, const D: usize> RTree<K, V, D> {
    /// Remove the value behind `entry` and return it.
    ///
    /// When the containing leaf directory drops below `min_node_size` (and
    /// is not the root) it is dissolved: the directory disappears and its
    /// surviving values are reinserted through the choose-subtree path. An
    /// ancestor that underflows as a consequence is dissolved the same way.
    /// Ancestor extents shrink only when the erased extent touched their
    /// boundary.
    ///
    /// Fails with [`RTreeError::InvalidEntry`] when the handle is stale, in
    /// which case the tree is unchanged. No other failure exists: orphan
    /// reinsertion descends along existing child links and always lands in
    /// a leaf directory, so the dissolution can never strand a value.
    pub fn erase(&mut self, entry: EntryId) -> Result<V, RTreeError> {
        let vid = NodeId::from(entry);
        let valid = self
            .arena()
            .get(vid.key())
            .is_some_and(|node| node.kind.is_value());
        if !valid {
            return Err(RTreeError::InvalidEntry);
        }

        let parent = self
            .node(vid)
            .parent
            .expect("a value node always hangs under a leaf directory");
        self.node_mut(parent).kind.children_mut().retain(|&c| c != vid);

        let removed = self.arena_mut().remove(vid.key());
        let erased_extent = removed.extent;
        let value = match removed.kind {
            NodeKind::Value(value) => value,
            _ => unreachable!("validated above"),
        };
        self.set_len(self.len() - 1);

        let surviving = self.node(parent).kind.children().len();
        if parent == self.root_id() || surviving >= self.params().min_node_size {
            self.shrink_upward(Some(parent), erased_extent);
            return Ok(value);
        }

        // Underflow: dissolve the directory (and any ancestor that
        // underflows in turn), then reinsert the orphaned values.
        let mut orphans: Vec<NodeId> = Vec::new();
        let mut doomed = parent;
        loop {
            let up = self
                .node(doomed)
                .parent
                .expect("the loop never dissolves the root");
            self.node_mut(up).kind.children_mut().retain(|&c| c != doomed);
            self.collect_orphans(doomed, &mut orphans);

            if up == self.root_id() {
                self.pack(up);
                break;
            }
            if self.node(up).kind.children().len() >= self.params().min_node_size {
                self.pack(up);
                let above = self.node(up).parent;
                self.pack_upward(above);
                break;
            }
            doomed = up;
        }

        self.collapse_root();
        for orphan in orphans {
            self.reinsert_node(orphan);
        }
        Ok(value)
    }

    /// Free the directory subtree rooted at `id`, detaching every value
    /// node below it into `orphans`. Iterative so deletion cost never
    /// depends on the call stack.
    fn collect_orphans(&mut self, id: NodeId, orphans: &mut Vec<NodeId>) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.arena_mut().remove(current.key());
            match node.kind {
                NodeKind::LeafDirectory(children) => {
                    for child in children {
                        self.node_mut(child).parent = None;
                        orphans.push(child);
                    }
                }
                NodeKind::NonLeafDirectory(children) => stack.extend(children),
                NodeKind::Value(_) => unreachable!("values are detached by their parent"),
            }
        }
    }

    /// Collapse trivial root levels: a non-leaf root with a single
    /// directory child adopts that child's contents. The root id stays
    /// stable throughout.
    fn collapse_root(&mut self) {
        loop {
            let root = self.root_id();
            let only_child = match &self.node(root).kind {
                NodeKind::NonLeafDirectory(children) if children.len() == 1 => children[0],
                _ => return,
            };

            let child = self.arena_mut().remove(only_child.key());
            let grandchildren: Vec<NodeId> = child.kind.children().to_vec();

            let root_node = self.node_mut(root);
            root_node.kind = child.kind;
            root_node.extent = child.extent;
            for grandchild in grandchildren {
                self.node_mut(grandchild).parent = Some(root);
            }
        }
    }
}
