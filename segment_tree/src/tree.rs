// SPDX-License-Identifier: MIT OR Apache-2.0

//! The segment tree container: insertion buffer, build and stabbing search.

use std::collections::HashMap;

use leaf_chain_tree::{NodeId, TreeNode, TreeStore};
use slab::Slab;

use crate::SegmentTreeError;

/// A buffered segment awaiting (or reflected in) the built tree.
#[derive(Debug, Clone)]
struct SegmentEntry<K, D> {
    /// Monotonic insertion sequence; search results are ordered by it.
    seq: u64,
    begin: K,
    end: K,
    data: D,
}

/// Per-node lists of segment keys. Leaves carry the begin-key chains,
/// non-leaf nodes the coverage labels.
type SegmentKeys = Vec<usize>;

/// A stabbing-query segment tree over half-open intervals `[begin, end)`.
///
/// Segments are appended to an insertion buffer by
/// [`insert`][Self::insert]; [`build_tree`][Self::build_tree] derives the
/// leaf chain from the unique endpoint keys, builds the balanced layer and
/// tags every segment onto the tree. [`search`][Self::search] then answers
/// stabbing queries until the next mutation invalidates the tree.
///
/// The tree never owns anything heavier than the client's `D` values; a
/// cheap `Clone + PartialEq` handle type (an id, an `Rc`, a small enum) is
/// the intended currency.
#[derive(Debug, Clone)]
pub struct SegmentTree<K, D> {
    segments: Slab<SegmentEntry<K, D>>,
    next_seq: u64,
    store: TreeStore<K, SegmentKeys, SegmentKeys>,
    /// For every segment key, the tree nodes that carry its label. Used by
    /// [`remove`][Self::remove] to clear a segment in O(footprint).
    tagged: HashMap<usize, Vec<NodeId>>,
    valid_tree: bool,
}

impl<K, D> SegmentTree<K, D>
where
    K: Copy + Ord,
    D: Clone + PartialEq,
{
    pub fn new() -> Self {
        Self {
            segments: Slab::new(),
            next_seq: 0,
            store: TreeStore::new(),
            tagged: HashMap::new(),
            valid_tree: false,
        }
    }

    /// Whether the tree reflects the current segment buffer.
    pub fn is_tree_valid(&self) -> bool {
        self.valid_tree
    }

    /// Number of live segments in the buffer.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Buffer a segment `[begin, end)` tagged with `data`.
    ///
    /// `begin >= end` is a no-op. Invalidates the tree.
    pub fn insert(&mut self, begin: K, end: K, data: D) {
        if begin >= end {
            return;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.segments.insert(SegmentEntry {
            seq,
            begin,
            end,
            data,
        });
        self.valid_tree = false;
    }

    /// Build (or rebuild) the tree from the segment buffer.
    ///
    /// Collects the unique endpoint keys, rebuilds the leaf chain and the
    /// balanced layer, then tags every segment in insertion order,
    /// repopulating the tagged-node map.
    pub fn build_tree(&mut self) {
        let mut keys: Vec<K> = self
            .segments
            .iter()
            .flat_map(|(_, seg)| [seg.begin, seg.end])
            .collect();
        keys.sort_unstable();
        keys.dedup();

        self.store.clear();
        self.tagged.clear();
        for key in keys {
            self.store.push_leaf_back(key, Vec::new());
        }
        self.store.build_upper_levels(Vec::new);

        if let Some(root) = self.store.root() {
            let mut order: Vec<usize> = self.segments.iter().map(|(key, _)| key).collect();
            order.sort_unstable_by_key(|&key| self.segments[key].seq);

            for seg_key in order {
                let begin = self.segments[seg_key].begin;
                let end = self.segments[seg_key].end;
                let mut marked = Vec::new();
                Self::descend_and_mark(&mut self.store, root, seg_key, begin, end, &mut marked);
                self.tagged.insert(seg_key, marked);
            }
        }

        self.valid_tree = true;
    }

    /// Descend from `id`, tagging the nodes that represent `[begin, end)`.
    ///
    /// A non-leaf fully covered by the segment is labeled and the descent
    /// stops there. At the leaf layer the begin-key leaf is tagged, and the
    /// predecessor of the end-key leaf is tagged unless that predecessor is
    /// the begin leaf itself (which would double-tag a one-span segment).
    fn descend_and_mark(
        store: &mut TreeStore<K, SegmentKeys, SegmentKeys>,
        id: NodeId,
        seg_key: usize,
        begin: K,
        end: K,
        marked: &mut Vec<NodeId>,
    ) {
        match store.node(id) {
            TreeNode::Leaf(leaf) => {
                if leaf.key == begin {
                    store.node_mut(id).leaf_mut().data.push(seg_key);
                    marked.push(id);
                } else if leaf.key == end {
                    let Some(prev) = leaf.prev else {
                        return;
                    };
                    if store.node(prev).leaf().key != begin {
                        store.node_mut(prev).leaf_mut().data.push(seg_key);
                        marked.push(prev);
                    }
                }
            }
            TreeNode::Nonleaf(nonleaf) => {
                if end < nonleaf.low || nonleaf.high <= begin {
                    return;
                }
                if begin <= nonleaf.low && nonleaf.high <= end {
                    // Fully covered: label this node and stop.
                    store.node_mut(id).nonleaf_mut().data.push(seg_key);
                    marked.push(id);
                    return;
                }

                let left = nonleaf.left;
                let right = nonleaf.right;
                Self::descend_and_mark(store, left, seg_key, begin, end, marked);
                if let Some(right) = right {
                    Self::descend_and_mark(store, right, seg_key, begin, end, marked);
                }
            }
        }
    }

    /// Collect the data of every segment containing `point`.
    ///
    /// Results are in segment insertion order with duplicates (by data
    /// equality) removed. Fails with [`SegmentTreeError::TreeNotBuilt`]
    /// when a mutation has invalidated the tree.
    pub fn search(&self, point: K) -> Result<Vec<D>, SegmentTreeError> {
        if !self.valid_tree {
            return Err(SegmentTreeError::TreeNotBuilt);
        }
        let Some(root) = self.store.root() else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<usize> = Vec::new();
        let mut id = root;
        loop {
            match self.store.node(id) {
                TreeNode::Leaf(leaf) => {
                    hits.extend_from_slice(&leaf.data);
                    break;
                }
                TreeNode::Nonleaf(nonleaf) => {
                    if point < nonleaf.low || nonleaf.high <= point {
                        break;
                    }
                    hits.extend_from_slice(&nonleaf.data);

                    // Exactly one child contains the point; a boundary key
                    // belongs to the right child.
                    id = match nonleaf.right {
                        Some(right) if self.store.node(right).low_key() <= point => right,
                        _ => nonleaf.left,
                    };
                }
            }
        }

        hits.sort_unstable_by_key(|&seg_key| self.segments[seg_key].seq);

        let mut results: Vec<D> = Vec::with_capacity(hits.len());
        for seg_key in hits {
            let data = &self.segments[seg_key].data;
            if !results.contains(data) {
                results.push(data.clone());
            }
        }
        Ok(results)
    }

    /// Remove every segment whose data equals `data`.
    ///
    /// Clears the segment's labels from all tagged nodes via the
    /// tagged-node map and drops it from the buffer, so neither further
    /// searches nor a later rebuild will surface it again. Does not
    /// invalidate the tree.
    pub fn remove(&mut self, data: &D) {
        let doomed: Vec<usize> = self
            .segments
            .iter()
            .filter(|(_, seg)| seg.data == *data)
            .map(|(key, _)| key)
            .collect();

        for seg_key in doomed {
            if let Some(nodes) = self.tagged.remove(&seg_key) {
                for id in nodes {
                    match self.store.node_mut(id) {
                        TreeNode::Leaf(leaf) => leaf.data.retain(|&key| key != seg_key),
                        TreeNode::Nonleaf(nonleaf) => nonleaf.data.retain(|&key| key != seg_key),
                    }
                }
            }
            self.segments.remove(seg_key);
        }
    }

    /// The unique endpoint keys the current tree is built over, in order.
    ///
    /// Empty when the tree has not been built. Intended for tests and
    /// debugging dumps.
    pub fn leaf_keys(&self) -> Vec<K> {
        self.store.leaves().map(|(_, leaf)| leaf.key).collect()
    }
}

impl<K, D> Default for SegmentTree<K, D>
where
    K: Copy + Ord,
    D: Clone + PartialEq,
{
    fn default() -> Self {
        Self::new()
    }
}
