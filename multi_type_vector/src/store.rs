// SPDX-License-Identifier: MIT OR Apache-2.0

//! The structure-of-arrays block store.

use crate::block::BlockOps;
use crate::element::CategoryId;

/// One block entry handed to the store: logical size plus the element
/// block, `None` for an empty run.
pub(crate) type BlockEntry = (usize, Option<Box<dyn BlockOps>>);

/// Parallel vectors describing the container's blocks.
///
/// `positions` is the prefix sum of `sizes`; `element_blocks[i]` is `None`
/// exactly when block `i` is an empty run. The store only moves entries
/// around; all event reporting stays with the container.
#[derive(Debug, Default)]
pub(crate) struct BlockStore {
    pub positions: Vec<usize>,
    pub sizes: Vec<usize>,
    pub element_blocks: Vec<Option<Box<dyn BlockOps>>>,
}

impl BlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Category of block `index`; empty runs report [`CategoryId::EMPTY`].
    pub fn category(&self, index: usize) -> CategoryId {
        self.element_blocks[index]
            .as_deref()
            .map_or(CategoryId::EMPTY, BlockOps::category)
    }

    pub fn block(&self, index: usize) -> Option<&dyn BlockOps> {
        self.element_blocks[index].as_deref()
    }

    /// Index of the block containing logical position `pos`.
    ///
    /// `pos` must be below the total size; the leading block always starts
    /// at position zero, so a block is always found.
    pub fn find_block(&self, pos: usize) -> usize {
        debug_assert!(!self.positions.is_empty());
        self.positions.partition_point(|&p| p <= pos) - 1
    }

    /// Recompute `positions` as the prefix sum of `sizes`, starting at
    /// `index`.
    pub fn recalc_from(&mut self, index: usize) {
        for i in index..self.sizes.len() {
            self.positions[i] = if i == 0 {
                0
            } else {
                self.positions[i - 1] + self.sizes[i - 1]
            };
        }
    }

    pub fn push_back(&mut self, size: usize, block: Option<Box<dyn BlockOps>>) {
        let position = match self.sizes.len().checked_sub(1) {
            Some(last) => self.positions[last] + self.sizes[last],
            None => 0,
        };
        self.positions.push(position);
        self.sizes.push(size);
        self.element_blocks.push(block);
    }

    /// Insert one entry before `index`. The caller recomputes positions.
    pub fn insert(&mut self, index: usize, size: usize, block: Option<Box<dyn BlockOps>>) {
        self.positions.insert(index, 0);
        self.sizes.insert(index, size);
        self.element_blocks.insert(index, block);
    }

    /// Remove one entry, returning its size and block. The caller
    /// recomputes positions.
    pub fn remove(&mut self, index: usize) -> BlockEntry {
        self.positions.remove(index);
        (self.sizes.remove(index), self.element_blocks.remove(index))
    }

    /// Replace `count` entries starting at `index` with `entries`. The
    /// caller recomputes positions.
    pub fn splice(&mut self, index: usize, count: usize, entries: Vec<BlockEntry>) {
        let incoming = entries.len();
        self.positions
            .splice(index..index + count, std::iter::repeat(0).take(incoming));

        let mut sizes = Vec::with_capacity(incoming);
        let mut blocks = Vec::with_capacity(incoming);
        for (size, block) in entries {
            sizes.push(size);
            blocks.push(block);
        }
        self.sizes.splice(index..index + count, sizes);
        self.element_blocks.splice(index..index + count, blocks);
    }

    /// Drop every entry. The caller is responsible for having reported the
    /// released blocks beforehand.
    pub fn reset(&mut self) {
        self.positions.clear();
        self.sizes.clear();
        self.element_blocks.clear();
    }
}

impl Clone for BlockStore {
    fn clone(&self) -> Self {
        Self {
            positions: self.positions.clone(),
            sizes: self.sizes.clone(),
            element_blocks: self
                .element_blocks
                .iter()
                .map(|entry| entry.as_ref().map(|block| block.clone_block()))
                .collect(),
        }
    }
}
