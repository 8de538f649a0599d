// SPDX-License-Identifier: MIT OR Apache-2.0

//! Segment tree: a stabbing-query structure over half-open key intervals.
//!
//! Segments `[begin, end)` tagged with client data are buffered on insertion
//! and materialized into a balanced tree by
//! [`SegmentTree::build_tree`]. A built tree answers
//! [`SegmentTree::search`]: "which segments contain point `p`", in segment
//! insertion order.
//!
//! # Tagging
//!
//! During the build every segment descends from the root and tags the
//! highest nodes fully covered by it, plus the chain leaves representing its
//! begin key (and the predecessor of its end key when that leaf is distinct
//! from the begin leaf). A per-segment list of tagged nodes — the
//! tagged-node map — makes [`SegmentTree::remove`] proportional to the
//! segment's footprint instead of the tree size.

mod tree;

use thiserror::Error;

pub use tree::SegmentTree;

/// Failures surfaced by the segment tree API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SegmentTreeError {
    /// A mutation invalidated the tree; call `build_tree` before searching.
    #[error("the tree must be rebuilt before searches can run")]
    TreeNotBuilt,
}
