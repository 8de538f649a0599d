// SPDX-License-Identifier: MIT OR Apache-2.0

//! Debug and introspection utilities for the R-tree.
//!
//! [`TreeDump`] renders the directory structure as an indented listing,
//! one node per line with its type and extent. Intended for tests and for
//! eyeballing split behavior; the output format is not stable.

use std::fmt;

use crate::RTree;
use crate::geometry::SpatialKey;
use crate::node::{NodeId, NodeKind};

/// Displayable snapshot of an [`RTree`]'s structure.
#[derive(Debug)]
pub struct TreeDump<'a, K, V, const D: usize> {
    tree: &'a RTree<K, V, D>,
}

impl<K: SpatialKey, V, const D: usize> RTree<K, V, D> {
    /// Render the node structure for debugging.
    pub fn dump(&self) -> TreeDump<'_, K, V, D> {
        TreeDump { tree: self }
    }
}

impl<K, V, const D: usize> TreeDump<'_, K, V, D>
where
    K: SpatialKey + fmt::Display,
{
    fn write_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, level: usize) -> fmt::Result {
        let node = self.tree.node(id);
        writeln!(
            f,
            "{:indent$}{}: {}",
            "",
            node.kind.type_name(),
            node.extent,
            indent = level * 4
        )?;

        if let NodeKind::LeafDirectory(children) | NodeKind::NonLeafDirectory(children) =
            &node.kind
        {
            for &child in children {
                self.write_node(f, child, level + 1)?;
            }
        }
        Ok(())
    }
}

impl<K, V, const D: usize> fmt::Display for TreeDump<'_, K, V, D>
where
    K: SpatialKey + fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_node(f, self.tree.root_id(), 0)
    }
}
