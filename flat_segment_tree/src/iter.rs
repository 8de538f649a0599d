// SPDX-License-Identifier: MIT OR Apache-2.0

//! Iteration over the constant-value spans of the map.

use leaf_chain_tree::{NodeId, TreeStore};

use crate::SegmentSpan;

/// Iterator over the spans of a flat segment tree, in key order.
///
/// Each adjacent pair of breakpoint leaves yields one span; the sentinel
/// leaf terminates the iteration, so the spans partition `[lo, hi)`.
#[derive(Debug)]
pub struct SegmentIter<'a, K, V> {
    store: &'a TreeStore<K, V, ()>,
    cursor: Option<NodeId>,
}

impl<'a, K, V> SegmentIter<'a, K, V> {
    pub(crate) fn new(store: &'a TreeStore<K, V, ()>) -> Self {
        Self {
            store,
            cursor: store.first_leaf(),
        }
    }
}

impl<K, V> Iterator for SegmentIter<'_, K, V>
where
    K: Copy,
    V: Clone,
{
    type Item = SegmentSpan<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let leaf = self.store.node(id).leaf();
        let next = leaf.next?;

        self.cursor = Some(next);
        Some(SegmentSpan {
            start: leaf.key,
            end: self.store.node(next).leaf().key,
            value: leaf.data.clone(),
        })
    }
}
