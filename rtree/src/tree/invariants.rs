// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structural invariant checks over the whole tree.

use std::fmt::Write as _;

use crate::geometry::SpatialKey;
use crate::node::{NodeId, NodeKind};
use crate::{CheckMode, RTree, RTreeError};

struct Checker<'a, K, V, const D: usize> {
    tree: &'a RTree<K, V, D>,
    mode: CheckMode,
    violations: Vec<String>,
}

impl<K: SpatialKey, V, const D: usize> Checker<'_, K, V, D> {
    /// Record a violation; in fail-fast mode the first one aborts the walk.
    fn report(&mut self, violation: String) -> Result<(), RTreeError> {
        match self.mode {
            CheckMode::FailFast => Err(RTreeError::Integrity {
                violations: vec![violation],
            }),
            CheckMode::Full => {
                self.violations.push(violation);
                Ok(())
            }
        }
    }

    fn descend(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<(), RTreeError> {
        let node = self.tree.node(id);

        if let Some(parent_id) = parent {
            let parent_node = self.tree.node(parent_id);

            if node.parent != Some(parent_id) {
                self.report(format!(
                    "the parent link of a {} node does not point at its real parent",
                    node.kind.type_name()
                ))?;
            }

            if !parent_node.extent.contains(&node.extent) {
                let mut violation = String::new();
                let _ = write!(
                    violation,
                    "child extent {:?} - {:?} escapes its parent extent {:?} - {:?}",
                    node.extent.start.coords,
                    node.extent.end.coords,
                    parent_node.extent.start.coords,
                    parent_node.extent.end.coords,
                );
                self.report(violation)?;
            }

            let relation_ok = match &node.kind {
                NodeKind::LeafDirectory(_) | NodeKind::NonLeafDirectory(_) => {
                    matches!(parent_node.kind, NodeKind::NonLeafDirectory(_))
                }
                NodeKind::Value(_) => matches!(parent_node.kind, NodeKind::LeafDirectory(_)),
            };
            if !relation_ok {
                self.report(format!(
                    "a {} node hangs under a {} node",
                    node.kind.type_name(),
                    parent_node.kind.type_name()
                ))?;
            }
        }

        if node.kind.is_directory() {
            let children = node.kind.children();
            let params = self.tree.params();

            if id == self.tree.root_id() {
                if children.is_empty() && !self.tree.is_empty() {
                    self.report("the root directory is empty in a non-empty tree".into())?;
                }
            } else if children.len() < params.min_node_size
                || children.len() > params.max_node_size
            {
                self.report(format!(
                    "a non-root directory holds {} children, outside [{}, {}]",
                    children.len(),
                    params.min_node_size,
                    params.max_node_size
                ))?;
            }

            if !children.is_empty() {
                let tight = self.tree.extent_union(children);
                if tight != node.extent {
                    self.report(format!(
                        "directory extent {:?} - {:?} is not the tight union of its children",
                        node.extent.start.coords, node.extent.end.coords,
                    ))?;
                }
            }

            for &child in children {
                self.descend(child, Some(id))?;
            }
        }

        Ok(())
    }
}

impl<K: SpatialKey, V, const D: usize> RTree<K, V, D> {
    /// Verify every structural invariant of the tree.
    ///
    /// In [`CheckMode::FailFast`] the first violation aborts the check; in
    /// [`CheckMode::Full`] the walk continues and the returned error lists
    /// every violation found.
    pub fn check_integrity(&self, mode: CheckMode) -> Result<(), RTreeError> {
        let mut checker = Checker {
            tree: self,
            mode,
            violations: Vec::new(),
        };

        let root = self.node(self.root_id());
        if !root.kind.is_directory() {
            checker.report("the root node must be a directory node".into())?;
        }
        if root.parent.is_some() {
            checker.report("the root node must not have a parent".into())?;
        }

        checker.descend(self.root_id(), None)?;

        if checker.violations.is_empty() {
            Ok(())
        } else {
            Err(RTreeError::Integrity {
                violations: checker.violations,
            })
        }
    }
}
