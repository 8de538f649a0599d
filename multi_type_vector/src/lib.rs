// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-type vector: a sequence whose positions are partitioned into
//! type-homogeneous contiguous runs ("element blocks").
//!
//! Each position of the container is either empty or holds a value of one
//! of the registered element types. Physically the container is a structure
//! of arrays: parallel vectors of block positions, block sizes and element
//! blocks, where each entry describes one maximal run of a single category.
//! Empty runs store no element block at all.
//!
//! # Architecture
//!
//! - [`CategoryId`] / [`Element`]: The category registry. Every storable
//!   type declares a stable category tag; the standard primitives and
//!   `String` are pre-registered, and clients add their own types by
//!   implementing [`Element`] with a tag at or above
//!   [`CategoryId::USER_START`].
//!
//! - [`BlockOps`] / [`TypedBlock`]: The per-category operation table.
//!   [`TypedBlock`] implements the whole table once, generically, so a new
//!   category costs nothing beyond the [`Element`] impl.
//!
//! - [`MultiTypeVector`]: The container. All mutations maintain the block
//!   invariants (prefix-sum positions, no two adjacent runs of one
//!   category) and report element-block lifecycle transitions to the
//!   [`EventHandler`].
//!
//! # Events
//!
//! The event handler hears about every element-block allocation
//! (`element_block_acquired`) and deallocation (`element_block_released`),
//! including the ones caused by splitting, merging and cross-container
//! transfers. Empty runs never raise events.

mod block;
mod element;
mod event;
mod iter;
mod store;
mod vector;

use thiserror::Error;

pub use block::{BlockOps, TypedBlock};
pub use element::{CategoryId, Element};
pub use event::{EventHandler, NoopEventHandler};
pub use iter::{BlockIter, BlockView, PositionIter, PositionRef};
pub use vector::MultiTypeVector;

/// Failures surfaced by the multi-type vector API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MultiTypeVectorError {
    /// A position beyond the end of the container.
    #[error("position {pos} is out of range for a container of size {size}")]
    OutOfRange { pos: usize, size: usize },
    /// An inverted or overflowing position range.
    #[error("range [{begin}, {end}] is invalid for a container of size {size}")]
    InvalidRange {
        begin: usize,
        end: usize,
        size: usize,
    },
    /// A typed access whose type does not match the stored category.
    #[error("requested category {requested:?} but the position holds {stored:?}")]
    TypeMismatch {
        requested: CategoryId,
        stored: CategoryId,
    },
}
