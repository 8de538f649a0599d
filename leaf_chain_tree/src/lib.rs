// SPDX-License-Identifier: MIT OR Apache-2.0

//! Arena-backed leaf chain with a balanced bottom-up tree builder.
//!
//! This crate provides the structural primitive shared by the flat segment
//! tree and the stabbing segment tree: a doubly-linked chain of key-sorted
//! leaf nodes, over which a perfectly balanced layer of non-leaf nodes can be
//! built (and torn down) in O(n) by pairing consecutive nodes bottom-up.
//!
//! # Architecture
//!
//! - [`NodeId`]: A lightweight, copyable handle into the node arena.
//!
//! - [`TreeNode`]: A tagged sum of leaf and non-leaf nodes. Leaf nodes carry
//!   a key and a client payload, and are linked into a chain through
//!   `prev`/`next` ids (the horizontal links). Non-leaf nodes carry a
//!   half-open key range `[low, high)`, child ids and a client payload (the
//!   vertical links).
//!
//! - [`TreeStore`]: The arena plus the chain endpoints and the tree root.
//!   All node access goes through the store; nodes never hold references to
//!   each other, only ids, so there is no pointer invalidation to manage and
//!   dropping the store frees every node without recursion.
//!
//! # Range propagation
//!
//! When the upper levels are built, a parent's range is derived from its
//! children: `low` is the key of the leftmost descendant leaf, and `high` is
//! the key of the leaf immediately *after* the rightmost descendant leaf, or
//! that leaf's own key when no such leaf exists. This makes every non-leaf
//! node describe the half-open key span its subtree is responsible for.

mod arena;
mod build;
mod node;
mod store;

pub use arena::NodeId;
pub use node::{LeafNode, NonleafNode, TreeNode};
pub use store::{LeafIdIter, TreeStore};
