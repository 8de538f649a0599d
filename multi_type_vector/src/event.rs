// SPDX-License-Identifier: MIT OR Apache-2.0

//! Element-block lifecycle events.

use crate::block::BlockOps;

/// Hooks invoked on element-block lifecycle transitions.
///
/// `element_block_acquired` fires whenever the container starts owning an
/// element-block allocation: a fresh block, the tail of a split, or a block
/// transferred in from another container. `element_block_released` fires
/// whenever that ownership ends: deletion, being absorbed into a neighbour
/// by a merge, or a transfer out. Each allocation sees exactly one acquire
/// and one release over its lifetime; empty runs never raise events.
///
/// The default method bodies are no-ops so implementors can override the
/// hooks they care about.
pub trait EventHandler {
    fn element_block_acquired(&mut self, _block: &dyn BlockOps) {}

    fn element_block_released(&mut self, _block: &dyn BlockOps) {}
}

/// The default handler: ignores every event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopEventHandler;

impl EventHandler for NoopEventHandler {}
