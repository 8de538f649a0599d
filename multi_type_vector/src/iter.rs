// SPDX-License-Identifier: MIT OR Apache-2.0

//! Block-level and position-level iteration.

use crate::block::{BlockOps, TypedBlock};
use crate::element::{CategoryId, Element};
use crate::store::BlockStore;

/// A read-only view of one block of the primary array.
#[derive(Debug, Clone, Copy)]
pub struct BlockView<'a> {
    pub category: CategoryId,
    /// Logical position of the block's first element.
    pub position: usize,
    pub size: usize,
    /// The element block; `None` for an empty run.
    pub block: Option<&'a dyn BlockOps>,
}

impl<'a> BlockView<'a> {
    /// Borrow the block contents as a typed slice, when the category
    /// matches `T`.
    pub fn as_slice<T: Element>(&self) -> Option<&'a [T]> {
        self.block?
            .as_any()
            .downcast_ref::<TypedBlock<T>>()
            .map(TypedBlock::values)
    }
}

/// Iterator over the blocks of the primary array, in position order.
#[derive(Debug)]
pub struct BlockIter<'a> {
    store: &'a BlockStore,
    index: usize,
}

impl<'a> BlockIter<'a> {
    pub(crate) fn new(store: &'a BlockStore) -> Self {
        Self { store, index: 0 }
    }
}

impl<'a> Iterator for BlockIter<'a> {
    type Item = BlockView<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.store.len() {
            return None;
        }
        let index = self.index;
        self.index += 1;
        Some(BlockView {
            category: self.store.category(index),
            position: self.store.positions[index],
            size: self.store.sizes[index],
            block: self.store.block(index),
        })
    }
}

/// A single position seen through the position iterator.
#[derive(Debug, Clone, Copy)]
pub struct PositionRef<'a> {
    pub category: CategoryId,
    block: Option<&'a dyn BlockOps>,
    offset: usize,
}

impl<'a> PositionRef<'a> {
    pub fn is_empty(&self) -> bool {
        self.block.is_none()
    }

    /// Borrow the value at this position as type `T`, when the category
    /// matches.
    pub fn get<T: Element>(&self) -> Option<&'a T> {
        self.block?
            .as_any()
            .downcast_ref::<TypedBlock<T>>()
            .and_then(|block| block.values().get(self.offset))
    }
}

/// Iterator over individual positions.
///
/// The current block is cached, so advancing is O(1) amortized: the block
/// lookup happens once per block, not once per position.
#[derive(Debug)]
pub struct PositionIter<'a> {
    store: &'a BlockStore,
    block_index: usize,
    offset: usize,
}

impl<'a> PositionIter<'a> {
    pub(crate) fn new(store: &'a BlockStore) -> Self {
        Self {
            store,
            block_index: 0,
            offset: 0,
        }
    }
}

impl<'a> Iterator for PositionIter<'a> {
    type Item = PositionRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.block_index >= self.store.len() {
            return None;
        }

        let item = PositionRef {
            category: self.store.category(self.block_index),
            block: self.store.block(self.block_index),
            offset: self.offset,
        };

        self.offset += 1;
        if self.offset == self.store.sizes[self.block_index] {
            self.block_index += 1;
            self.offset = 0;
        }
        Some(item)
    }
}
