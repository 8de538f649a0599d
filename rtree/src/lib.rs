// SPDX-License-Identifier: MIT OR Apache-2.0

//! R-tree: a bounding-box spatial index with R*-tree heuristics.
//!
//! Values are stored under axis-aligned extents in `D`-dimensional key
//! space. The tree supports insertion with the R* choose-subtree and split
//! heuristics, erasure with orphan reinsertion on directory underflow, and
//! point / overlap / exact-match searches.
//!
//! # Architecture
//!
//! All nodes live in a slab arena and reference each other through stable
//! integer ids:
//!
//! - **Value nodes** own one client value and its extent.
//! - **Leaf directories** group value nodes.
//! - **Non-leaf directories** group other directories.
//!
//! Every directory's extent is the tight union of its children's extents,
//! and every non-root directory keeps between `min_node_size` and
//! `max_node_size` children. [`RTree::check_integrity`] verifies the whole
//! invariant set on demand.
//!
//! # Fan-out and depth
//!
//! [`TreeParams`] fixes the fan-out bounds (`min <= max / 2` is enforced at
//! construction) and the maximum descent depth, which bounds every
//! recursive walk the tree performs.

mod debug;
mod geometry;
mod node;
mod tree;

use thiserror::Error;

pub use debug::TreeDump;
pub use geometry::{Extent, Point, SpatialKey};
pub use node::EntryId;
pub use tree::{NodeProperties, NodeType, RTree, SearchHit, ValuesIter};

/// Fan-out and depth tunables for an [`RTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeParams {
    /// Minimum number of children per non-root directory.
    pub min_node_size: usize,
    /// Maximum number of children per directory.
    pub max_node_size: usize,
    /// Maximum depth of any descent; exceeding it fails the operation with
    /// [`RTreeError::CapacityExceeded`].
    pub max_tree_depth: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            min_node_size: 16,
            max_node_size: 40,
            max_tree_depth: 128,
        }
    }
}

/// Which objects a box search returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Every value whose extent intersects the query box.
    Overlap,
    /// Only values whose extent equals the query box exactly.
    Match,
}

/// Reporting behavior of [`RTree::check_integrity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    /// Fail on the first violation found.
    FailFast,
    /// Collect every violation before failing.
    Full,
}

/// Failures surfaced by the R-tree API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RTreeError {
    /// A descent exceeded `max_tree_depth`.
    #[error("maximum tree depth exceeded during descent")]
    CapacityExceeded,
    /// The entry handle does not refer to a live value node.
    #[error("entry handle does not refer to a live value")]
    InvalidEntry,
    /// One or more structural invariants do not hold.
    #[error("tree integrity violated: {}", violations.join("; "))]
    Integrity {
        /// Human-readable description of each violation found.
        violations: Vec<String>,
    },
}
