// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flat segment tree: a piecewise-constant map from a totally-ordered key
//! domain `[lo, hi)` to values.
//!
//! The map is represented as a sorted chain of breakpoint leaves; between two
//! adjacent breakpoints the value is the left leaf's value. Overlay inserts
//! ([`FlatSegmentTree::insert_front`] / [`FlatSegmentTree::insert_back`])
//! clip the incoming segment to the domain, replace the covered breakpoints
//! and coalesce redundant boundaries, so the chain is always the canonical
//! representation of the function.
//!
//! # Query paths
//!
//! - [`FlatSegmentTree::search`] walks the leaf chain linearly and works in
//!   any state.
//! - [`FlatSegmentTree::search_tree`] descends a perfectly balanced tree
//!   built over the chain by [`FlatSegmentTree::build_tree`]; mutations
//!   invalidate the tree and tree searches fail with
//!   [`FlatSegmentTreeError::TreeNotBuilt`] until it is rebuilt.
//!
//! Both paths return the same span for the same point.

mod iter;
mod tree;

use thiserror::Error;

pub use iter::SegmentIter;
pub use tree::FlatSegmentTree;

/// A maximal constant-value span `[start, end)` of the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSpan<K, V> {
    pub start: K,
    pub end: K,
    pub value: V,
}

/// Failures surfaced by the flat segment tree API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FlatSegmentTreeError {
    /// The queried point lies outside the tree's key domain.
    #[error("point lies outside the key domain of the tree")]
    OutOfRange,
    /// A mutation invalidated the tree; call `build_tree` before searching it.
    #[error("the tree must be rebuilt before tree searches can run")]
    TreeNotBuilt,
    /// The key range is empty or inverted.
    #[error("invalid key range: begin must be strictly less than end")]
    InvalidRange,
}
