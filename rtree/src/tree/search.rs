// SPDX-License-Identifier: MIT OR Apache-2.0

//! Point, overlap and exact-match searches.

use crate::geometry::{Extent, Point, SpatialKey};
use crate::node::{EntryId, NodeId, NodeKind};
use crate::{RTree, SearchMode};

/// A single search result: the value, its extent and the handle that can
/// be fed back into [`RTree::erase`].
#[derive(Debug)]
pub struct SearchHit<'a, K, V, const D: usize> {
    pub entry: EntryId,
    pub extent: Extent<K, D>,
    pub value: &'a V,
}

impl<K: SpatialKey, V, const D: usize> RTree<K, V, D> {
    /// Collect every value whose extent contains `point`.
    pub fn search_point(&self, point: &Point<K, D>) -> Vec<SearchHit<'_, K, V, D>> {
        let mut hits = Vec::new();
        let mut stack = vec![self.root_id()];

        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if !node.extent.contains_point(point) {
                continue;
            }
            match &node.kind {
                NodeKind::Value(value) => hits.push(SearchHit {
                    entry: EntryId::from(id),
                    extent: node.extent,
                    value,
                }),
                NodeKind::LeafDirectory(children) | NodeKind::NonLeafDirectory(children) => {
                    stack.extend(children.iter().rev());
                }
            }
        }
        hits
    }

    /// Collect values related to `query` per the given [`SearchMode`].
    ///
    /// `Overlap` returns every value whose extent intersects the query box;
    /// `Match` only values whose extent equals it exactly (and descends
    /// only into directories that fully contain the query, since an exact
    /// match cannot live anywhere else).
    pub fn search(&self, query: &Extent<K, D>, mode: SearchMode) -> Vec<SearchHit<'_, K, V, D>> {
        let mut hits = Vec::new();
        let mut stack = vec![self.root_id()];

        while let Some(id) = stack.pop() {
            let node = self.node(id);
            match &node.kind {
                NodeKind::Value(value) => {
                    let keep = match mode {
                        SearchMode::Overlap => node.extent.intersects(query),
                        SearchMode::Match => node.extent == *query,
                    };
                    if keep {
                        hits.push(SearchHit {
                            entry: EntryId::from(id),
                            extent: node.extent,
                            value,
                        });
                    }
                }
                NodeKind::LeafDirectory(children) | NodeKind::NonLeafDirectory(children) => {
                    let descend = match mode {
                        SearchMode::Overlap => node.extent.intersects(query),
                        SearchMode::Match => node.extent.contains(query),
                    };
                    if descend {
                        stack.extend(children.iter().rev());
                    }
                }
            }
        }
        hits
    }

    /// Resolve an entry handle into its extent and value, if still live.
    pub fn get(&self, entry: EntryId) -> Option<SearchHit<'_, K, V, D>> {
        let id = NodeId::from(entry);
        let node = self.arena().get(id.key())?;
        match &node.kind {
            NodeKind::Value(value) => Some(SearchHit {
                entry,
                extent: node.extent,
                value,
            }),
            _ => None,
        }
    }

    /// Iterate over all stored values in depth-first order.
    pub fn values(&self) -> ValuesIter<'_, K, V, D> {
        ValuesIter {
            tree: self,
            stack: vec![self.root_id()],
        }
    }
}

/// Depth-first iterator over every value node of the tree.
///
/// Uses an explicit stack so deep trees never touch the call stack.
#[derive(Debug)]
pub struct ValuesIter<'a, K, V, const D: usize> {
    tree: &'a RTree<K, V, D>,
    stack: Vec<NodeId>,
}

impl<'a, K: SpatialKey, V, const D: usize> Iterator for ValuesIter<'a, K, V, D> {
    type Item = SearchHit<'a, K, V, D>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            let node = self.tree.node(id);
            match &node.kind {
                NodeKind::Value(value) => {
                    return Some(SearchHit {
                        entry: EntryId::from(id),
                        extent: node.extent,
                        value,
                    });
                }
                NodeKind::LeafDirectory(children) | NodeKind::NonLeafDirectory(children) => {
                    self.stack.extend(children.iter().rev());
                }
            }
        }
        None
    }
}
