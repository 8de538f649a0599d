// SPDX-License-Identifier: MIT OR Apache-2.0

//! The flat segment tree container and its overlay algorithm.

use leaf_chain_tree::{NodeId, TreeNode, TreeStore};

use crate::iter::SegmentIter;
use crate::{FlatSegmentTreeError, SegmentSpan};

/// A piecewise-constant map from `[lo, hi)` to values of type `V`.
///
/// # Representation
///
/// Breakpoints are leaves of a [`TreeStore`] chain. The leftmost leaf always
/// sits at `lo` and the rightmost at `hi`; the rightmost leaf is a sentinel
/// marking the domain end and its value is never returned by a query.
/// Adjacent leaves never carry equal values (except the sentinel, which is
/// exempt), so every leaf is a genuine breakpoint.
///
/// # Tree state
///
/// The non-leaf layer is built on demand by [`build_tree`][Self::build_tree]
/// and tracked by a validity bit. Overlay inserts only touch the chain and
/// flip the bit; they never eagerly rebuild.
#[derive(Debug, Clone)]
pub struct FlatSegmentTree<K, V> {
    store: TreeStore<K, V, ()>,
    lo: K,
    hi: K,
    valid_tree: bool,
}

impl<K, V> FlatSegmentTree<K, V>
where
    K: Copy + Ord,
    V: Clone + PartialEq,
{
    /// Create a map over `[lo, hi)` where every point carries `default`.
    ///
    /// Fails with [`FlatSegmentTreeError::InvalidRange`] when the domain is
    /// empty (`lo >= hi`).
    pub fn new(lo: K, hi: K, default: V) -> Result<Self, FlatSegmentTreeError> {
        if lo >= hi {
            return Err(FlatSegmentTreeError::InvalidRange);
        }

        let mut store = TreeStore::new();
        store.push_leaf_back(lo, default.clone());
        store.push_leaf_back(hi, default);

        Ok(Self {
            store,
            lo,
            hi,
            valid_tree: false,
        })
    }

    /// The inclusive lower bound of the key domain.
    pub fn lo(&self) -> K {
        self.lo
    }

    /// The exclusive upper bound of the key domain.
    pub fn hi(&self) -> K {
        self.hi
    }

    /// The value stored in the sentinel leaf, i.e. the default the tree was
    /// created with.
    pub fn default_value(&self) -> &V {
        let sentinel = self
            .store
            .last_leaf()
            .expect("the chain always holds the two domain leaves");
        &self.store.node(sentinel).leaf().data
    }

    /// Number of breakpoint leaves, the domain sentinels included.
    pub fn leaf_count(&self) -> usize {
        self.store.leaf_count()
    }

    /// Whether the non-leaf layer is in sync with the chain.
    pub fn is_tree_valid(&self) -> bool {
        self.valid_tree
    }

    /// Overlay `value` on `[begin, end)`, scanning for the insertion point
    /// from the front of the chain.
    ///
    /// The segment is clipped to the domain; an empty or fully out-of-domain
    /// segment is a no-op rather than an error. Invalidates the tree.
    pub fn insert_front(&mut self, begin: K, end: K, value: V) {
        self.insert_segment(begin, end, value, false);
    }

    /// Overlay `value` on `[begin, end)`, scanning for the insertion point
    /// from the back of the chain.
    ///
    /// Produces the same map as [`insert_front`][Self::insert_front]; only
    /// the scan origin differs, which matters when the caller knows the
    /// segment lies near the end of the domain.
    pub fn insert_back(&mut self, begin: K, end: K, value: V) {
        self.insert_segment(begin, end, value, true);
    }

    fn insert_segment(&mut self, begin: K, end: K, value: V, backward: bool) {
        if begin >= end {
            return;
        }
        if end <= self.lo || self.hi <= begin {
            return;
        }
        let begin = begin.max(self.lo);
        let end = end.min(self.hi);

        // Leaf with the greatest key <= begin. The lo leaf guarantees a hit.
        let start_id = if backward {
            self.locate_backward(begin)
        } else {
            self.locate_forward(begin)
        };

        // The value in effect at `end` before any mutation; it seeds the new
        // boundary leaf at `end` so the map beyond the overlay is preserved.
        let mut end_anchor = start_id;
        loop {
            let leaf = self.store.node(end_anchor).leaf();
            match leaf.next {
                Some(next) if self.store.node(next).leaf().key <= end => end_anchor = next,
                _ => break,
            }
        }
        let end_value = self.store.node(end_anchor).leaf().data.clone();
        let end_leaf_exists = self.store.node(end_anchor).leaf().key == end;

        // Drop every breakpoint strictly inside the overlay.
        let mut cursor = self.store.node(start_id).leaf().next;
        while let Some(id) = cursor {
            let leaf = self.store.node(id).leaf();
            if leaf.key >= end {
                break;
            }
            cursor = leaf.next;
            self.store.unlink_leaf(id);
        }

        // Boundary leaf at `begin`.
        let begin_id = if self.store.node(start_id).leaf().key == begin {
            self.store.node_mut(start_id).leaf_mut().data = value.clone();
            start_id
        } else {
            self.store.insert_leaf_after(start_id, begin, value.clone())
        };

        // Boundary leaf at `end`. When `end == hi` the sentinel already
        // terminates the overlay.
        let end_id = if end_leaf_exists {
            end_anchor
        } else {
            self.store
                .insert_leaf_after(begin_id, end, end_value.clone())
        };

        // Coalesce: a leaf equal to its left neighbour is not a breakpoint.
        if end < self.hi && end_value == value {
            self.store.unlink_leaf(end_id);
        }
        if let Some(prev) = self.store.node(begin_id).leaf().prev {
            if self.store.node(prev).leaf().data == value {
                self.store.unlink_leaf(begin_id);
            }
        }

        self.valid_tree = false;
    }

    fn locate_forward(&self, key: K) -> NodeId {
        let mut cursor = self
            .store
            .first_leaf()
            .expect("the chain always holds the two domain leaves");
        loop {
            match self.store.node(cursor).leaf().next {
                Some(next) if self.store.node(next).leaf().key <= key => cursor = next,
                _ => return cursor,
            }
        }
    }

    fn locate_backward(&self, key: K) -> NodeId {
        let mut cursor = self
            .store
            .last_leaf()
            .expect("the chain always holds the two domain leaves");
        while self.store.node(cursor).leaf().key > key {
            cursor = self
                .store
                .node(cursor)
                .leaf()
                .prev
                .expect("the lo leaf bounds every backward scan");
        }
        cursor
    }

    /// Linear query: the value at `point` and the maximal constant span
    /// containing it.
    ///
    /// Works regardless of tree validity. Fails with
    /// [`FlatSegmentTreeError::OutOfRange`] when `point` lies outside
    /// `[lo, hi)`.
    pub fn search(&self, point: K) -> Result<SegmentSpan<K, V>, FlatSegmentTreeError> {
        if point < self.lo || self.hi <= point {
            return Err(FlatSegmentTreeError::OutOfRange);
        }

        let id = self.locate_forward(point);
        Ok(self.span_of(id))
    }

    /// Tree query: identical result to [`search`][Self::search], reached by
    /// descending the balanced layer instead of scanning the chain.
    ///
    /// Fails with [`FlatSegmentTreeError::TreeNotBuilt`] when a mutation has
    /// invalidated the tree.
    pub fn search_tree(&self, point: K) -> Result<SegmentSpan<K, V>, FlatSegmentTreeError> {
        if !self.valid_tree {
            return Err(FlatSegmentTreeError::TreeNotBuilt);
        }
        if point < self.lo || self.hi <= point {
            return Err(FlatSegmentTreeError::OutOfRange);
        }

        let mut id = self
            .store
            .root()
            .expect("a valid tree always has a root over >= 2 leaves");
        loop {
            match self.store.node(id) {
                TreeNode::Nonleaf(nonleaf) => {
                    id = match nonleaf.right {
                        Some(right) if self.store.node(right).low_key() <= point => right,
                        _ => nonleaf.left,
                    };
                }
                TreeNode::Leaf(_) => break,
            }
        }

        Ok(self.span_of(id))
    }

    fn span_of(&self, id: NodeId) -> SegmentSpan<K, V> {
        let leaf = self.store.node(id).leaf();
        let next = leaf
            .next
            .expect("an in-domain point never resolves to the sentinel leaf");
        SegmentSpan {
            start: leaf.key,
            end: self.store.node(next).leaf().key,
            value: leaf.data.clone(),
        }
    }

    /// Build the balanced non-leaf layer over the current chain.
    ///
    /// Idempotent; an already valid tree is rebuilt to the same shape.
    pub fn build_tree(&mut self) {
        self.store.build_upper_levels(|| ());
        self.valid_tree = true;
    }

    /// Iterate over the constant-value spans of the map in key order.
    ///
    /// The spans partition `[lo, hi)` exactly.
    pub fn segments(&self) -> SegmentIter<'_, K, V> {
        SegmentIter::new(&self.store)
    }
}

impl<K, V> PartialEq for FlatSegmentTree<K, V>
where
    K: Copy + Ord,
    V: Clone + PartialEq,
{
    /// Two trees are equal when they represent the same function over the
    /// same domain; tree validity is ignored.
    fn eq(&self, other: &Self) -> bool {
        if self.lo != other.lo || self.hi != other.hi {
            return false;
        }
        let mut lhs = self.store.leaves();
        let mut rhs = other.store.leaves();
        loop {
            match (lhs.next(), rhs.next()) {
                (Some((_, a)), Some((_, b))) => {
                    if a.key != b.key || a.data != b.data {
                        return false;
                    }
                }
                (None, None) => return true,
                _ => return false,
            }
        }
    }
}
