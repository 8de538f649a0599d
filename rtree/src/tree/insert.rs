// SPDX-License-Identifier: MIT OR Apache-2.0

//! Insertion: choose-subtree descent and the R* node split.

use std::cmp::Ordering;

use crate::geometry::{Extent, Point, SpatialKey};
use crate::node::{EntryId, NodeId, NodeKind, RTreeNode};
use crate::{RTree, RTreeError};

/// Lexicographic comparison of cost tuples; incomparable components (NaN)
/// count as equal.
fn compare_costs<K: SpatialKey, const N: usize>(a: &[K; N], b: &[K; N]) -> Ordering {
    for (lhs, rhs) in a.iter().zip(b.iter()) {
        match lhs.partial_cmp(rhs).unwrap_or(Ordering::Equal) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

impl<K: SpatialKey, V, const D: usize> RTree<K, V, D> {
    /// Store `value` under the given extent.
    ///
    /// Fails with [`RTreeError::CapacityExceeded`] when the choose-subtree
    /// descent exceeds `max_tree_depth`; the tree is unchanged in that case.
    pub fn insert(&mut self, extent: Extent<K, D>, value: V) -> Result<EntryId, RTreeError> {
        let vid = NodeId::from_slab(self.arena_mut().insert(RTreeNode {
            extent,
            parent: None,
            kind: NodeKind::Value(value),
        }));

        match self.insert_node(vid) {
            Ok(()) => {
                self.set_len(self.len() + 1);
                Ok(EntryId::from(vid))
            }
            Err(err) => {
                self.arena_mut().remove(vid.key());
                Err(err)
            }
        }
    }

    /// Store `value` under a degenerate point extent.
    pub fn insert_point(&mut self, point: Point<K, D>, value: V) -> Result<EntryId, RTreeError> {
        self.insert(Extent::from_point(point), value)
    }

    /// Hook a fresh value node into the tree, honouring the depth cap.
    pub(crate) fn insert_node(&mut self, vid: NodeId) -> Result<(), RTreeError> {
        let extent = self.node(vid).extent;
        let target = self.choose_leaf_directory(&extent)?;
        self.attach_node(vid, target);
        Ok(())
    }

    /// Hook an orphaned value node back into the tree.
    ///
    /// Used by the underflow path of `erase`. Unlike
    /// [`insert_node`][Self::insert_node] this cannot fail: the descent
    /// walks existing child links and therefore terminates at a leaf
    /// directory after at most the current tree height, so no depth cap is
    /// needed and the dissolution never has to be unwound halfway through.
    pub(crate) fn reinsert_node(&mut self, vid: NodeId) {
        let extent = self.node(vid).extent;
        let mut current = self.root_id();
        let target = loop {
            match &self.node(current).kind {
                NodeKind::LeafDirectory(_) => break current,
                NodeKind::NonLeafDirectory(children) => {
                    current = self.best_child(children, &extent);
                }
                NodeKind::Value(_) => unreachable!("descent never reaches value nodes"),
            }
        };
        self.attach_node(vid, target);
    }

    /// Attach a value node to the chosen leaf directory, splitting on
    /// overflow or propagating the enlarged extent otherwise.
    fn attach_node(&mut self, vid: NodeId, target: NodeId) {
        let extent = self.node(vid).extent;
        self.node_mut(vid).parent = Some(target);
        self.node_mut(target).kind.children_mut().push(vid);

        let count = self.node(target).kind.children().len();
        if count > self.params().max_node_size {
            self.split_node(target);
            return;
        }

        if count == 1 {
            self.node_mut(target).extent = extent;
        } else {
            self.node_mut(target).extent.extend_to_fit(&extent);
        }

        // Propagate the enlarged extent up to the root.
        let grown = self.node(target).extent;
        let mut cursor = self.node(target).parent;
        while let Some(id) = cursor {
            self.node_mut(id).extent.extend_to_fit(&grown);
            cursor = self.node(id).parent;
        }
    }

    /// Descend from the root to the leaf directory that should receive a
    /// new extent, failing once the depth cap is exhausted.
    fn choose_leaf_directory(&self, extent: &Extent<K, D>) -> Result<NodeId, RTreeError> {
        let mut current = self.root_id();

        for _ in 0..self.params().max_tree_depth {
            match &self.node(current).kind {
                NodeKind::LeafDirectory(_) => return Ok(current),
                NodeKind::NonLeafDirectory(children) => {
                    current = self.best_child(children, extent);
                }
                NodeKind::Value(_) => unreachable!("descent never reaches value nodes"),
            }
        }

        Err(RTreeError::CapacityExceeded)
    }

    /// The child of a non-leaf directory that should receive a new extent.
    ///
    /// With at least one leaf-directory child the child with the smallest
    /// overlap enlargement wins; otherwise the one with the smallest area
    /// enlargement. Ties fall through to the smaller enlargement and then
    /// the smaller current area.
    fn best_child(&self, children: &[NodeId], extent: &Extent<K, D>) -> NodeId {
        let has_leaf_child = children
            .iter()
            .any(|&child| self.node(child).kind.is_leaf_directory());

        let mut best: Option<(NodeId, [K; 3])> = None;
        for &child in children {
            let child_extent = self.node(child).extent;
            let overlap = if has_leaf_child {
                self.overlap_enlargement(children, child, extent)
            } else {
                K::default()
            };
            let cost = [
                overlap,
                child_extent.area_enlargement(extent),
                child_extent.area(),
            ];

            let better = match &best {
                None => true,
                Some((_, best_cost)) => compare_costs(&cost, best_cost) == Ordering::Less,
            };
            if better {
                best = Some((child, cost));
            }
        }

        best.expect("a non-leaf directory always has children").0
    }

    /// Total overlap the candidate would have with its siblings after
    /// hypothetically growing to accommodate `extent`.
    fn overlap_enlargement(
        &self,
        siblings: &[NodeId],
        candidate: NodeId,
        extent: &Extent<K, D>,
    ) -> K {
        let enlarged = self.node(candidate).extent.union(extent);
        let mut total = K::default();
        for &sibling in siblings {
            if sibling == candidate {
                continue;
            }
            total = total + enlarged.intersection_volume(&self.node(sibling).extent);
        }
        total
    }

    /// Split an overfull directory per the R* heuristics.
    ///
    /// The children are sorted along the axis minimizing the summed half
    /// margins over all legal distributions, then cut at the distribution
    /// with the least intersection between the two groups (ties: least
    /// combined area). Group one stays in place; group two moves into a
    /// fresh sibling. A root split allocates both halves as fresh nodes and
    /// turns the root into a non-leaf directory above them, keeping the
    /// root id stable.
    pub(crate) fn split_node(&mut self, ns: NodeId) {
        debug_assert!(
            self.node(ns).kind.children().len() == self.params().max_node_size + 1,
            "splits happen exactly on overflow"
        );

        let mut children = std::mem::take(self.node_mut(ns).kind.children_mut());
        self.sort_children_by_split_axis(&mut children);
        let split_at = self.pick_split_index(&children);
        let group2 = children.split_off(split_at);

        let is_leaf = self.node(ns).kind.is_leaf_directory();
        let make_kind = |ids: Vec<NodeId>| {
            if is_leaf {
                NodeKind::LeafDirectory(ids)
            } else {
                NodeKind::NonLeafDirectory(ids)
            }
        };

        // Group one stays in the original node.
        *self.node_mut(ns).kind.children_mut() = children;
        self.pack(ns);

        // Group two becomes a fresh sibling.
        let sibling_extent = self.extent_union(&group2);
        let sibling_children = group2.clone();
        let sibling = NodeId::from_slab(self.arena_mut().insert(RTreeNode {
            extent: sibling_extent,
            parent: None,
            kind: make_kind(group2),
        }));
        for child in sibling_children {
            self.node_mut(child).parent = Some(sibling);
        }

        if ns == self.root_id() {
            // Move group one into a fresh node and grow a new root level.
            let group1 = std::mem::take(self.node_mut(ns).kind.children_mut());
            let group1_extent = self.node(ns).extent;
            let group1_children = group1.clone();
            let half = NodeId::from_slab(self.arena_mut().insert(RTreeNode {
                extent: group1_extent,
                parent: Some(ns),
                kind: make_kind(group1),
            }));
            for child in group1_children {
                self.node_mut(child).parent = Some(half);
            }
            self.node_mut(sibling).parent = Some(ns);

            let root = self.node_mut(ns);
            root.kind = NodeKind::NonLeafDirectory(vec![half, sibling]);
            root.extent = group1_extent.union(&sibling_extent);
            return;
        }

        let parent = self
            .node(ns)
            .parent
            .expect("non-root nodes always have a parent");
        self.node_mut(sibling).parent = Some(parent);
        self.node_mut(parent).kind.children_mut().push(sibling);
        let parent_changed = self.pack(parent);

        if self.node(parent).kind.children().len() > self.params().max_node_size {
            // The parent overflowed in turn; keep splitting upward.
            self.split_node(parent);
        } else if parent_changed {
            self.pack_upward(self.node(parent).parent);
        }
    }

    /// Sort `children` along the split axis chosen by the margin metric.
    fn sort_children_by_split_axis(&self, children: &mut [NodeId]) {
        let mut best_dim = 0;
        let mut best_margin: Option<K> = None;

        for dim in 0..D {
            self.sort_children_by_dimension(children, dim);

            let mut margin_sum = K::default();
            for split_at in self.distribution_points(children.len()) {
                let bb1 = self.extent_union(&children[..split_at]);
                let bb2 = self.extent_union(&children[split_at..]);
                margin_sum = margin_sum + bb1.half_margin() + bb2.half_margin();
            }

            let better = match best_margin {
                None => true,
                Some(best) => matches!(margin_sum.partial_cmp(&best), Some(Ordering::Less)),
            };
            if better {
                best_margin = Some(margin_sum);
                best_dim = dim;
            }
        }

        self.sort_children_by_dimension(children, best_dim);
    }

    fn sort_children_by_dimension(&self, children: &mut [NodeId], dim: usize) {
        children.sort_by(|&a, &b| {
            let ea = self.node(a).extent;
            let eb = self.node(b).extent;
            ea.start.coords[dim]
                .partial_cmp(&eb.start.coords[dim])
                .unwrap_or(Ordering::Equal)
                .then(
                    ea.end.coords[dim]
                        .partial_cmp(&eb.end.coords[dim])
                        .unwrap_or(Ordering::Equal),
                )
        });
    }

    /// Split positions for the legal distributions: the first group takes
    /// `min - 1 + k` children for `k = 1 ..= max - 2*min + 2`.
    fn distribution_points(&self, child_count: usize) -> impl Iterator<Item = usize> {
        let min = self.params().min_node_size;
        let max = self.params().max_node_size;
        debug_assert!(child_count == max + 1);
        (1..=max - 2 * min + 2).map(move |k| min - 1 + k)
    }

    /// Cut position minimizing the intersection volume of the two groups,
    /// ties broken by the smaller combined area.
    fn pick_split_index(&self, children: &[NodeId]) -> usize {
        let mut best: Option<(usize, [K; 2])> = None;

        for split_at in self.distribution_points(children.len()) {
            let bb1 = self.extent_union(&children[..split_at]);
            let bb2 = self.extent_union(&children[split_at..]);
            let cost = [bb1.intersection_volume(&bb2), bb1.area() + bb2.area()];

            let better = match &best {
                None => true,
                Some((_, best_cost)) => compare_costs(&cost, best_cost) == Ordering::Less,
            };
            if better {
                best = Some((split_at, cost));
            }
        }

        best.expect("at least one distribution always exists").0
    }
}
