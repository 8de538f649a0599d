// SPDX-License-Identifier: MIT OR Apache-2.0

//! The multi-type vector container and its block algebra.
//!
//! Every mutation below reduces to a handful of primitives over the block
//! store: in-place overwrites, boundary pushes into a matching neighbour,
//! block splits, and the splice-and-merge of a covered range. The merge
//! pass after each structural change restores the "no two adjacent blocks
//! of one category" invariant, and all element-block allocation changes are
//! reported to the event handler at the point they happen.

use crate::block::{BlockOps, TypedBlock};
use crate::element::{CategoryId, Element};
use crate::event::{EventHandler, NoopEventHandler};
use crate::iter::{BlockIter, PositionIter};
use crate::store::{BlockEntry, BlockStore};
use crate::MultiTypeVectorError;

/// A replacement entry: logical size, optional element block, and whether
/// the container just acquired the allocation (and must report it).
type FlaggedEntry = (usize, Option<Box<dyn BlockOps>>, bool);

fn typed_block_mut<T: Element>(store: &mut BlockStore, index: usize) -> &mut TypedBlock<T> {
    store.element_blocks[index]
        .as_deref_mut()
        .expect("a data block is present at this index")
        .as_any_mut()
        .downcast_mut()
        .expect("block category matches its element type")
}

fn typed_block_ref<T: Element>(store: &BlockStore, index: usize) -> &TypedBlock<T> {
    store.element_blocks[index]
        .as_deref()
        .expect("a data block is present at this index")
        .as_any()
        .downcast_ref()
        .expect("block category matches its element type")
}

fn new_block<T: Element>(values: Vec<T>) -> Option<Box<dyn BlockOps>> {
    Some(Box::new(TypedBlock::new(values)))
}

/// A sequence container whose positions are partitioned into
/// type-homogeneous element blocks.
///
/// See the [crate-level documentation](crate) for the data model. The
/// handler type parameter defaults to [`NoopEventHandler`]; containers that
/// track block lifecycles supply their own handler at construction.
#[derive(Debug)]
pub struct MultiTypeVector<H: EventHandler = NoopEventHandler> {
    store: BlockStore,
    size: usize,
    handler: H,
}

impl MultiTypeVector<NoopEventHandler> {
    /// An empty container.
    pub fn new() -> Self {
        Self::with_handler(NoopEventHandler)
    }

    /// A container of `size` empty positions.
    pub fn with_size(size: usize) -> Self {
        Self::with_size_and_handler(size, NoopEventHandler)
    }

    /// A container of `size` positions initialized to copies of `value`.
    pub fn with_value<T: Element>(size: usize, value: T) -> Self {
        Self::with_value_and_handler(size, value, NoopEventHandler)
    }

    /// A container initialized from a slice of values.
    pub fn from_values<T: Element>(values: &[T]) -> Self {
        Self::from_values_and_handler(values, NoopEventHandler)
    }
}

impl Default for MultiTypeVector<NoopEventHandler> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: EventHandler> MultiTypeVector<H> {
    /// An empty container with an explicit event handler.
    pub fn with_handler(handler: H) -> Self {
        Self {
            store: BlockStore::new(),
            size: 0,
            handler,
        }
    }

    /// A container of `size` empty positions with an explicit handler.
    ///
    /// No element block is created, so no event fires.
    pub fn with_size_and_handler(size: usize, handler: H) -> Self {
        let mut vector = Self::with_handler(handler);
        if size > 0 {
            vector.store.push_back(size, None);
            vector.size = size;
        }
        vector
    }

    /// A container of `size` copies of `value` with an explicit handler.
    pub fn with_value_and_handler<T: Element>(size: usize, value: T, handler: H) -> Self {
        let mut vector = Self::with_handler(handler);
        if size > 0 {
            vector.store.push_back(size, new_block(vec![value; size]));
            vector.size = size;
            vector.fire_acquired(0);
        }
        vector
    }

    /// A container initialized from a slice of values, with a handler.
    pub fn from_values_and_handler<T: Element>(values: &[T], handler: H) -> Self {
        let mut vector = Self::with_handler(handler);
        if !values.is_empty() {
            vector.store.push_back(values.len(), new_block(values.to_vec()));
            vector.size = values.len();
            vector.fire_acquired(0);
        }
        vector
    }

    /// Current logical size of the container.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of blocks in the primary array, empty runs included.
    pub fn block_size(&self) -> usize {
        self.store.len()
    }

    pub fn event_handler(&self) -> &H {
        &self.handler
    }

    pub fn event_handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Category stored at `pos`; empty positions report
    /// [`CategoryId::EMPTY`].
    pub fn get_type(&self, pos: usize) -> Result<CategoryId, MultiTypeVectorError> {
        self.check_position(pos)?;
        Ok(self.store.category(self.store.find_block(pos)))
    }

    /// Whether `pos` holds no value.
    pub fn is_empty_at(&self, pos: usize) -> Result<bool, MultiTypeVectorError> {
        Ok(self.get_type(pos)?.is_empty_category())
    }

    /// Borrow the value at `pos` as type `T`.
    pub fn get_ref<T: Element>(&self, pos: usize) -> Result<&T, MultiTypeVectorError> {
        self.check_position(pos)?;
        let index = self.store.find_block(pos);
        let stored = self.store.category(index);
        if stored != T::CATEGORY {
            return Err(MultiTypeVectorError::TypeMismatch {
                requested: T::CATEGORY,
                stored,
            });
        }
        let offset = pos - self.store.positions[index];
        Ok(&typed_block_ref::<T>(&self.store, index).values()[offset])
    }

    /// Copy the value at `pos` out as type `T`.
    pub fn get<T: Element>(&self, pos: usize) -> Result<T, MultiTypeVectorError> {
        self.get_ref(pos).cloned()
    }

    /// Set a single value, overwriting whatever the position held.
    ///
    /// The container size never changes; out-of-range positions fail with
    /// [`MultiTypeVectorError::OutOfRange`].
    pub fn set<T: Element>(&mut self, pos: usize, value: T) -> Result<(), MultiTypeVectorError> {
        self.check_position(pos)?;
        debug_assert!(
            !T::CATEGORY.is_empty_category(),
            "element types must not use the empty category"
        );

        let index = self.store.find_block(pos);
        let offset = pos - self.store.positions[index];
        let stored = self.store.category(index);

        if stored == T::CATEGORY {
            typed_block_mut::<T>(&mut self.store, index).values_mut()[offset] = value;
        } else if stored.is_empty_category() {
            self.set_into_empty_block(index, offset, value);
        } else {
            self.set_into_data_block(index, offset, value);
        }
        Ok(())
    }

    /// Set a run of values of one type starting at `pos`.
    ///
    /// Fails with [`MultiTypeVectorError::InvalidRange`] when the run would
    /// extend past the end of the container. An empty slice is a no-op.
    pub fn set_values<T: Element>(
        &mut self,
        pos: usize,
        values: &[T],
    ) -> Result<(), MultiTypeVectorError> {
        if values.is_empty() {
            return Ok(());
        }
        let len = values.len();
        if pos + len > self.size {
            return Err(MultiTypeVectorError::InvalidRange {
                begin: pos,
                end: pos + len - 1,
                size: self.size,
            });
        }

        let index = self.store.find_block(pos);
        let offset = pos - self.store.positions[index];
        if offset + len <= self.store.sizes[index] && self.store.category(index) == T::CATEGORY {
            // The run overwrites part of a block of the same type.
            typed_block_mut::<T>(&mut self.store, index).values_mut()[offset..offset + len]
                .clone_from_slice(values);
            return Ok(());
        }

        self.replace_range(pos, len, vec![(len, new_block(values.to_vec()), true)]);
        Ok(())
    }

    /// Empty the inclusive position range `[begin, end]`.
    pub fn set_empty(&mut self, begin: usize, end: usize) -> Result<(), MultiTypeVectorError> {
        self.check_range(begin, end)?;
        let len = end - begin + 1;
        self.replace_range(begin, len, vec![(len, None, false)]);
        Ok(())
    }

    /// Insert a run of values before `pos`, growing the container.
    ///
    /// `pos == size()` appends. An empty slice is a no-op.
    pub fn insert_values<T: Element>(
        &mut self,
        pos: usize,
        values: &[T],
    ) -> Result<(), MultiTypeVectorError> {
        if pos > self.size {
            return Err(MultiTypeVectorError::OutOfRange {
                pos,
                size: self.size,
            });
        }
        if values.is_empty() {
            return Ok(());
        }
        let n = values.len();

        if pos == self.size {
            self.append_values(values);
            return Ok(());
        }

        let index = self.store.find_block(pos);
        let offset = pos - self.store.positions[index];

        if self.store.category(index) == T::CATEGORY {
            // Splice into the existing block of the same type.
            typed_block_mut::<T>(&mut self.store, index)
                .values_mut()
                .splice(offset..offset, values.iter().cloned());
            self.store.sizes[index] += n;
            self.store.recalc_from(index + 1);
        } else if offset == 0 {
            if index > 0 && self.store.category(index - 1) == T::CATEGORY {
                typed_block_mut::<T>(&mut self.store, index - 1)
                    .values_mut()
                    .extend_from_slice(values);
                self.store.sizes[index - 1] += n;
                self.store.recalc_from(index);
            } else {
                self.store.insert(index, n, new_block(values.to_vec()));
                self.store.recalc_from(index);
                self.fire_acquired(index);
            }
        } else {
            self.split_and_insert(index, offset, n, new_block(values.to_vec()), true);
        }

        self.size += n;
        Ok(())
    }

    /// Insert `len` empty positions before `pos`, growing the container.
    pub fn insert_empty(&mut self, pos: usize, len: usize) -> Result<(), MultiTypeVectorError> {
        if pos > self.size {
            return Err(MultiTypeVectorError::OutOfRange {
                pos,
                size: self.size,
            });
        }
        if len == 0 {
            return Ok(());
        }

        if pos == self.size {
            self.append_empty(len);
            return Ok(());
        }

        let index = self.store.find_block(pos);
        let offset = pos - self.store.positions[index];

        if self.store.category(index).is_empty_category() {
            self.store.sizes[index] += len;
            self.store.recalc_from(index + 1);
        } else if offset == 0 {
            if index > 0 && self.store.category(index - 1).is_empty_category() {
                self.store.sizes[index - 1] += len;
                self.store.recalc_from(index);
            } else {
                self.store.insert(index, len, None);
                self.store.recalc_from(index);
            }
        } else {
            self.split_and_insert(index, offset, len, None, false);
        }

        self.size += len;
        Ok(())
    }

    /// Remove the inclusive position range `[begin, end]`, shifting later
    /// positions down.
    pub fn erase(&mut self, begin: usize, end: usize) -> Result<(), MultiTypeVectorError> {
        self.check_range(begin, end)?;
        let len = end - begin + 1;

        let first = self.store.find_block(begin);
        let last = self.store.find_block(end);
        let prefix_len = begin - self.store.positions[first];
        let suffix_len = self.store.positions[last] + self.store.sizes[last] - (end + 1);

        if first == last {
            if prefix_len == 0 && suffix_len == 0 {
                // The whole block goes; its neighbours may then meet.
                if let Some(block) = self.store.element_blocks[first].take() {
                    self.handler.element_block_released(&*block);
                }
                self.splice_and_merge(first, 1, Vec::new());
            } else {
                // The block shrinks but stays in one piece.
                if let Some(block) = self.store.element_blocks[first].as_deref_mut() {
                    block.erase_range(prefix_len, len);
                }
                self.store.sizes[first] -= len;
                self.store.recalc_from(first + 1);
            }
        } else {
            let mut replacement: Vec<FlaggedEntry> = Vec::new();

            // Keep the uncovered prefix of the first block.
            if prefix_len > 0 {
                let mut block = self.store.element_blocks[first].take();
                if let Some(block) = block.as_deref_mut() {
                    let covered = self.store.sizes[first] - prefix_len;
                    block.erase_range(prefix_len, covered);
                }
                replacement.push((prefix_len, block, false));
            } else if let Some(block) = self.store.element_blocks[first].take() {
                self.handler.element_block_released(&*block);
            }

            // Fully covered middle blocks.
            for index in first + 1..last {
                if let Some(block) = self.store.element_blocks[index].take() {
                    self.handler.element_block_released(&*block);
                }
            }

            // Keep the uncovered suffix of the last block.
            if suffix_len > 0 {
                let mut block = self.store.element_blocks[last].take();
                if let Some(block) = block.as_deref_mut() {
                    let covered = self.store.sizes[last] - suffix_len;
                    block.erase_range(0, covered);
                }
                replacement.push((suffix_len, block, false));
            } else if let Some(block) = self.store.element_blocks[last].take() {
                self.handler.element_block_released(&*block);
            }

            self.splice_and_merge(first, last - first + 1, replacement);
        }

        self.size -= len;
        Ok(())
    }

    /// Resize the container, appending empty positions or truncating.
    pub fn resize(&mut self, new_size: usize) {
        if new_size == self.size {
            return;
        }
        if new_size == 0 {
            self.clear();
            return;
        }
        if new_size > self.size {
            self.append_empty(new_size - self.size);
            return;
        }
        self.erase(new_size, self.size - 1)
            .expect("a shrinking range is always within bounds");
    }

    /// Append one value at the end of the container.
    pub fn push_back<T: Element>(&mut self, value: T) {
        self.append_values(std::slice::from_ref(&value));
    }

    /// Append one empty position at the end of the container.
    pub fn push_back_empty(&mut self) {
        self.append_empty(1);
    }

    /// Remove every position, releasing all element blocks.
    pub fn clear(&mut self) {
        for index in 0..self.store.len() {
            if let Some(block) = self.store.element_blocks[index].take() {
                self.handler.element_block_released(&*block);
            }
        }
        self.store.reset();
        self.size = 0;
    }

    /// Move the inclusive range `[begin, end]` into `dst` starting at
    /// `dst_pos`.
    ///
    /// Whole element blocks move without copying their elements; partially
    /// covered blocks are split first. Afterwards the source range is
    /// empty, and whatever `dst` held in the target range is destroyed.
    /// Events fire on both containers: releases on the source for blocks
    /// that left it, acquisitions on the destination for blocks it gained.
    pub fn transfer<H2: EventHandler>(
        &mut self,
        begin: usize,
        end: usize,
        dst: &mut MultiTypeVector<H2>,
        dst_pos: usize,
    ) -> Result<(), MultiTypeVectorError> {
        self.check_range(begin, end)?;
        let len = end - begin + 1;
        if dst_pos + len > dst.size {
            return Err(MultiTypeVectorError::InvalidRange {
                begin: dst_pos,
                end: dst_pos + len - 1,
                size: dst.size,
            });
        }

        let segments = self.extract_segments(begin, end);
        let flagged = segments
            .into_iter()
            .map(|(size, block)| {
                let is_data = block.is_some();
                (size, block, is_data)
            })
            .collect();
        dst.replace_range(dst_pos, len, flagged);
        Ok(())
    }

    /// Exchange the inclusive range `[begin, end]` with the equally long
    /// range of `dst` starting at `dst_pos`.
    pub fn swap_range<H2: EventHandler>(
        &mut self,
        begin: usize,
        end: usize,
        dst: &mut MultiTypeVector<H2>,
        dst_pos: usize,
    ) -> Result<(), MultiTypeVectorError> {
        self.check_range(begin, end)?;
        let len = end - begin + 1;
        if dst_pos + len > dst.size {
            return Err(MultiTypeVectorError::InvalidRange {
                begin: dst_pos,
                end: dst_pos + len - 1,
                size: dst.size,
            });
        }

        let src_segments = self.extract_segments(begin, end);
        let dst_segments = dst.extract_segments(dst_pos, dst_pos + len - 1);

        let flag = |segments: Vec<BlockEntry>| -> Vec<FlaggedEntry> {
            segments
                .into_iter()
                .map(|(size, block)| {
                    let is_data = block.is_some();
                    (size, block, is_data)
                })
                .collect()
        };
        self.replace_range(begin, len, flag(dst_segments));
        dst.replace_range(dst_pos, len, flag(src_segments));
        Ok(())
    }

    /// Iterate over the blocks of the primary array.
    pub fn blocks(&self) -> BlockIter<'_> {
        BlockIter::new(&self.store)
    }

    /// Iterate over individual positions; O(1) amortized per step thanks to
    /// a cached block cursor.
    pub fn iter(&self) -> PositionIter<'_> {
        PositionIter::new(&self.store)
    }

    /// Verify the block invariants, panicking on any violation.
    ///
    /// A failure means a container bug, not a usage error; the test suites
    /// call this after every mutation.
    pub fn check_integrity(&self) {
        let store = &self.store;
        assert_eq!(store.positions.len(), store.sizes.len());
        assert_eq!(store.positions.len(), store.element_blocks.len());

        let mut expected_position = 0;
        let mut previous: Option<CategoryId> = None;
        for index in 0..store.len() {
            assert_eq!(
                store.positions[index], expected_position,
                "block positions must be the prefix sum of the sizes"
            );
            assert!(store.sizes[index] > 0, "blocks are never empty");
            if let Some(block) = store.block(index) {
                assert_eq!(
                    block.len(),
                    store.sizes[index],
                    "a data block stores exactly its logical size"
                );
                assert!(
                    !block.category().is_empty_category(),
                    "data blocks never carry the empty category"
                );
            }
            let category = store.category(index);
            if let Some(previous) = previous {
                assert_ne!(previous, category, "adjacent blocks never share a category");
            }
            previous = Some(category);
            expected_position += store.sizes[index];
        }
        assert_eq!(expected_position, self.size, "sizes must sum to the container size");
    }

    fn check_position(&self, pos: usize) -> Result<(), MultiTypeVectorError> {
        if pos >= self.size {
            return Err(MultiTypeVectorError::OutOfRange {
                pos,
                size: self.size,
            });
        }
        Ok(())
    }

    fn check_range(&self, begin: usize, end: usize) -> Result<(), MultiTypeVectorError> {
        if begin > end || end >= self.size {
            return Err(MultiTypeVectorError::InvalidRange {
                begin,
                end,
                size: self.size,
            });
        }
        Ok(())
    }

    fn fire_acquired(&mut self, index: usize) {
        if let Some(block) = self.store.element_blocks[index].as_deref() {
            self.handler.element_block_acquired(block);
        }
    }

    /// Set a single value into an empty run.
    fn set_into_empty_block<T: Element>(&mut self, index: usize, offset: usize, value: T) {
        let size = self.store.sizes[index];
        let prev_matches = index > 0 && self.store.category(index - 1) == T::CATEGORY;
        let next_matches =
            index + 1 < self.store.len() && self.store.category(index + 1) == T::CATEGORY;

        if size == 1 {
            match (prev_matches, next_matches) {
                (true, true) => {
                    // The new value bridges the two neighbouring blocks.
                    let (next_size, next_block) = self.store.remove(index + 1);
                    self.store.remove(index);
                    let mut absorbed = next_block.expect("a matching neighbour is a data block");
                    typed_block_mut::<T>(&mut self.store, index - 1)
                        .values_mut()
                        .push(value);
                    self.store.element_blocks[index - 1]
                        .as_deref_mut()
                        .expect("a matching neighbour is a data block")
                        .append_block(&mut *absorbed);
                    self.handler.element_block_released(&*absorbed);
                    self.store.sizes[index - 1] += 1 + next_size;
                    self.store.recalc_from(index - 1);
                }
                (true, false) => {
                    self.store.remove(index);
                    typed_block_mut::<T>(&mut self.store, index - 1)
                        .values_mut()
                        .push(value);
                    self.store.sizes[index - 1] += 1;
                    self.store.recalc_from(index - 1);
                }
                (false, true) => {
                    self.store.remove(index);
                    typed_block_mut::<T>(&mut self.store, index)
                        .values_mut()
                        .insert(0, value);
                    self.store.sizes[index] += 1;
                    self.store.recalc_from(index);
                }
                (false, false) => {
                    self.store.element_blocks[index] = new_block(vec![value]);
                    self.fire_acquired(index);
                }
            }
            return;
        }

        if offset == 0 {
            self.store.sizes[index] -= 1;
            if prev_matches {
                typed_block_mut::<T>(&mut self.store, index - 1)
                    .values_mut()
                    .push(value);
                self.store.sizes[index - 1] += 1;
                self.store.recalc_from(index);
            } else {
                self.store.insert(index, 1, new_block(vec![value]));
                self.store.recalc_from(index);
                self.fire_acquired(index);
            }
        } else if offset == size - 1 {
            self.store.sizes[index] -= 1;
            if next_matches {
                typed_block_mut::<T>(&mut self.store, index + 1)
                    .values_mut()
                    .insert(0, value);
                self.store.sizes[index + 1] += 1;
                self.store.recalc_from(index + 1);
            } else {
                self.store.insert(index + 1, 1, new_block(vec![value]));
                self.store.recalc_from(index + 1);
                self.fire_acquired(index + 1);
            }
        } else {
            // Interior: split the empty run around a one-element block.
            self.store.sizes[index] = offset;
            self.store.insert(index + 1, 1, new_block(vec![value]));
            self.store.insert(index + 2, size - offset - 1, None);
            self.store.recalc_from(index + 1);
            self.fire_acquired(index + 1);
        }
    }

    /// Set a single value into a data block of a different category.
    fn set_into_data_block<T: Element>(&mut self, index: usize, offset: usize, value: T) {
        let size = self.store.sizes[index];
        let prev_matches = index > 0 && self.store.category(index - 1) == T::CATEGORY;
        let next_matches =
            index + 1 < self.store.len() && self.store.category(index + 1) == T::CATEGORY;

        if size == 1 {
            let old = self.store.element_blocks[index]
                .take()
                .expect("a data block is present at this index");
            self.handler.element_block_released(&*old);

            match (prev_matches, next_matches) {
                (true, true) => {
                    let (next_size, next_block) = self.store.remove(index + 1);
                    self.store.remove(index);
                    let mut absorbed = next_block.expect("a matching neighbour is a data block");
                    typed_block_mut::<T>(&mut self.store, index - 1)
                        .values_mut()
                        .push(value);
                    self.store.element_blocks[index - 1]
                        .as_deref_mut()
                        .expect("a matching neighbour is a data block")
                        .append_block(&mut *absorbed);
                    self.handler.element_block_released(&*absorbed);
                    self.store.sizes[index - 1] += 1 + next_size;
                    self.store.recalc_from(index - 1);
                }
                (true, false) => {
                    self.store.remove(index);
                    typed_block_mut::<T>(&mut self.store, index - 1)
                        .values_mut()
                        .push(value);
                    self.store.sizes[index - 1] += 1;
                    self.store.recalc_from(index - 1);
                }
                (false, true) => {
                    self.store.remove(index);
                    typed_block_mut::<T>(&mut self.store, index)
                        .values_mut()
                        .insert(0, value);
                    self.store.sizes[index] += 1;
                    self.store.recalc_from(index);
                }
                (false, false) => {
                    self.store.element_blocks[index] = new_block(vec![value]);
                    self.fire_acquired(index);
                }
            }
            return;
        }

        if offset == 0 {
            self.store.element_blocks[index]
                .as_deref_mut()
                .expect("a data block is present at this index")
                .erase(0);
            self.store.sizes[index] -= 1;
            if prev_matches {
                typed_block_mut::<T>(&mut self.store, index - 1)
                    .values_mut()
                    .push(value);
                self.store.sizes[index - 1] += 1;
                self.store.recalc_from(index);
            } else {
                self.store.insert(index, 1, new_block(vec![value]));
                self.store.recalc_from(index);
                self.fire_acquired(index);
            }
        } else if offset == size - 1 {
            self.store.element_blocks[index]
                .as_deref_mut()
                .expect("a data block is present at this index")
                .erase(offset);
            self.store.sizes[index] -= 1;
            if next_matches {
                typed_block_mut::<T>(&mut self.store, index + 1)
                    .values_mut()
                    .insert(0, value);
                self.store.sizes[index + 1] += 1;
                self.store.recalc_from(index + 1);
            } else {
                self.store.insert(index + 1, 1, new_block(vec![value]));
                self.store.recalc_from(index + 1);
                self.fire_acquired(index + 1);
            }
        } else {
            // Interior: split into head, the new value, and the tail.
            let block = self.store.element_blocks[index]
                .as_deref_mut()
                .expect("a data block is present at this index");
            let tail = block.split_off(offset + 1);
            block.erase(offset);
            self.store.sizes[index] = offset;
            self.store.insert(index + 1, 1, new_block(vec![value]));
            self.store.insert(index + 2, size - offset - 1, Some(tail));
            self.store.recalc_from(index + 1);
            self.fire_acquired(index + 1);
            self.fire_acquired(index + 2);
        }
    }

    /// Append values at the very end of the container.
    fn append_values<T: Element>(&mut self, values: &[T]) {
        let n = values.len();
        match self.store.len().checked_sub(1) {
            Some(last) if self.store.category(last) == T::CATEGORY => {
                typed_block_mut::<T>(&mut self.store, last)
                    .values_mut()
                    .extend_from_slice(values);
                self.store.sizes[last] += n;
            }
            _ => {
                self.store.push_back(n, new_block(values.to_vec()));
                self.fire_acquired(self.store.len() - 1);
            }
        }
        self.size += n;
    }

    /// Append empty positions at the very end of the container.
    fn append_empty(&mut self, len: usize) {
        match self.store.len().checked_sub(1) {
            Some(last) if self.store.category(last).is_empty_category() => {
                self.store.sizes[last] += len;
            }
            _ => self.store.push_back(len, None),
        }
        self.size += len;
    }

    /// Split block `index` at `offset` and insert an entry of `len`
    /// positions in between. `fire` reports the inserted block (splitting a
    /// data block always reports its new tail).
    fn split_and_insert(
        &mut self,
        index: usize,
        offset: usize,
        len: usize,
        block: Option<Box<dyn BlockOps>>,
        fire: bool,
    ) {
        let size = self.store.sizes[index];
        let tail = self.store.element_blocks[index]
            .as_deref_mut()
            .map(|data| data.split_off(offset));
        let tail_is_data = tail.is_some();

        self.store.sizes[index] = offset;
        self.store.insert(index + 1, len, block);
        self.store.insert(index + 2, size - offset, tail);
        self.store.recalc_from(index + 1);
        if fire {
            self.fire_acquired(index + 1);
        }
        if tail_is_data {
            self.fire_acquired(index + 2);
        }
    }

    /// Replace the `len` positions starting at `pos` with the given
    /// entries, destroying whatever the range held. The entry sizes must
    /// sum to `len`, so the container size is unchanged.
    fn replace_range(&mut self, pos: usize, len: usize, entries: Vec<FlaggedEntry>) {
        debug_assert!(len > 0 && pos + len <= self.size);
        debug_assert_eq!(entries.iter().map(|(size, ..)| size).sum::<usize>(), len);

        let first = self.store.find_block(pos);
        let last = self.store.find_block(pos + len - 1);
        let prefix_len = pos - self.store.positions[first];
        let suffix_len = self.store.positions[last] + self.store.sizes[last] - (pos + len);

        let mut replacement: Vec<FlaggedEntry> = Vec::with_capacity(entries.len() + 2);

        if first == last {
            let block = self.store.element_blocks[first].take();
            match block {
                None => {
                    if prefix_len > 0 {
                        replacement.push((prefix_len, None, false));
                    }
                    replacement.extend(entries);
                    if suffix_len > 0 {
                        replacement.push((suffix_len, None, false));
                    }
                }
                Some(mut block) => {
                    if prefix_len == 0 && suffix_len == 0 {
                        self.handler.element_block_released(&*block);
                        replacement.extend(entries);
                    } else if prefix_len > 0 && suffix_len > 0 {
                        let tail = block.split_off(prefix_len + len);
                        block.erase_range(prefix_len, len);
                        replacement.push((prefix_len, Some(block), false));
                        replacement.extend(entries);
                        // The tail is a fresh allocation this container now
                        // owns.
                        replacement.push((suffix_len, Some(tail), true));
                    } else if prefix_len > 0 {
                        block.erase_range(prefix_len, len);
                        replacement.push((prefix_len, Some(block), false));
                        replacement.extend(entries);
                    } else {
                        block.erase_range(0, len);
                        replacement.extend(entries);
                        replacement.push((suffix_len, Some(block), false));
                    }
                }
            }
        } else {
            // Uncovered prefix of the first block.
            let block = self.store.element_blocks[first].take();
            match block {
                None => {
                    if prefix_len > 0 {
                        replacement.push((prefix_len, None, false));
                    }
                }
                Some(mut block) => {
                    if prefix_len == 0 {
                        self.handler.element_block_released(&*block);
                    } else {
                        let covered = self.store.sizes[first] - prefix_len;
                        block.erase_range(prefix_len, covered);
                        replacement.push((prefix_len, Some(block), false));
                    }
                }
            }

            // Fully covered middle blocks.
            for index in first + 1..last {
                if let Some(block) = self.store.element_blocks[index].take() {
                    self.handler.element_block_released(&*block);
                }
            }

            replacement.extend(entries);

            // Uncovered suffix of the last block.
            let block = self.store.element_blocks[last].take();
            match block {
                None => {
                    if suffix_len > 0 {
                        replacement.push((suffix_len, None, false));
                    }
                }
                Some(mut block) => {
                    if suffix_len == 0 {
                        self.handler.element_block_released(&*block);
                    } else {
                        let covered = self.store.sizes[last] - suffix_len;
                        block.erase_range(0, covered);
                        replacement.push((suffix_len, Some(block), false));
                    }
                }
            }
        }

        self.splice_and_merge(first, last - first + 1, replacement);
    }

    /// Move the contents of the inclusive range `[begin, end]` out as block
    /// segments, leaving the range empty. Fully covered blocks move as-is
    /// (released here, to be acquired by whoever receives them); partially
    /// covered blocks surrender a freshly allocated copy-free slice.
    fn extract_segments(&mut self, begin: usize, end: usize) -> Vec<BlockEntry> {
        let first = self.store.find_block(begin);
        let last = self.store.find_block(end);

        let mut segments: Vec<BlockEntry> = Vec::with_capacity(last - first + 1);
        let mut replacement: Vec<FlaggedEntry> = Vec::new();

        for index in first..=last {
            let block_pos = self.store.positions[index];
            let block_size = self.store.sizes[index];
            let lo = begin.max(block_pos) - block_pos;
            let hi = end.min(block_pos + block_size - 1) - block_pos;
            let covered = hi - lo + 1;
            let suffix_len = block_size - hi - 1;

            match self.store.element_blocks[index].take() {
                None => {
                    // The whole run stays empty; only the segment is noted.
                    segments.push((covered, None));
                    replacement.push((block_size, None, false));
                }
                Some(mut block) => {
                    if lo == 0 && suffix_len == 0 {
                        // Whole block leaves this container.
                        self.handler.element_block_released(&*block);
                        segments.push((covered, Some(block)));
                        replacement.push((covered, None, false));
                    } else {
                        let taken = block.take_range(lo, covered);
                        segments.push((covered, Some(taken)));
                        if lo > 0 && suffix_len > 0 {
                            // The remainder splits around the hole; its
                            // tail is a fresh allocation we keep.
                            let tail = block.split_off(lo);
                            replacement.push((lo, Some(block), false));
                            replacement.push((covered, None, false));
                            replacement.push((suffix_len, Some(tail), true));
                        } else if lo > 0 {
                            replacement.push((lo, Some(block), false));
                            replacement.push((covered, None, false));
                        } else {
                            replacement.push((covered, None, false));
                            replacement.push((suffix_len, Some(block), false));
                        }
                    }
                }
            }
        }

        self.splice_and_merge(first, last - first + 1, replacement);
        segments
    }

    /// Splice `replacement` over `count` blocks starting at `first`, report
    /// newly acquired allocations, and restore the adjacency invariant
    /// around the affected window.
    fn splice_and_merge(&mut self, first: usize, count: usize, replacement: Vec<FlaggedEntry>) {
        let flags: Vec<bool> = replacement.iter().map(|(.., flag)| *flag).collect();
        let entries: Vec<BlockEntry> = replacement
            .into_iter()
            .map(|(size, block, _)| (size, block))
            .collect();
        let incoming = entries.len();

        self.store.splice(first, count, entries);
        self.store.recalc_from(first);

        for (i, flagged) in flags.into_iter().enumerate() {
            if flagged {
                self.fire_acquired(first + i);
            }
        }

        let from = first.saturating_sub(1);
        let to = first + incoming;
        self.merge_adjacent_in_window(from, to);
    }

    /// Merge adjacent same-category blocks with indices in `[from, to]`.
    fn merge_adjacent_in_window(&mut self, from: usize, mut to: usize) {
        let mut index = from;
        while index + 1 < self.store.len() && index <= to {
            if self.store.category(index) == self.store.category(index + 1) {
                self.merge_with_next(index);
                to = to.saturating_sub(1);
            } else {
                index += 1;
            }
        }
    }

    /// Fold block `index + 1` into block `index`; both must share a
    /// category.
    fn merge_with_next(&mut self, index: usize) {
        debug_assert_eq!(self.store.category(index), self.store.category(index + 1));

        let (next_size, next_block) = self.store.remove(index + 1);
        self.store.sizes[index] += next_size;
        if let Some(mut absorbed) = next_block {
            self.store.element_blocks[index]
                .as_deref_mut()
                .expect("only data blocks merge with data blocks")
                .append_block(&mut *absorbed);
            self.handler.element_block_released(&*absorbed);
        }
        self.store.recalc_from(index + 1);
    }
}

impl<H: EventHandler + Clone> Clone for MultiTypeVector<H> {
    /// Cloning deep-copies every element block and copies the handler
    /// state as-is; no events fire on either handler.
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            size: self.size,
            handler: self.handler.clone(),
        }
    }
}

impl<H1: EventHandler, H2: EventHandler> PartialEq<MultiTypeVector<H2>> for MultiTypeVector<H1> {
    /// Containers are equal when their logical sequences are equal; the
    /// canonical block structure makes that a block-wise comparison.
    fn eq(&self, other: &MultiTypeVector<H2>) -> bool {
        if self.size != other.size || self.store.len() != other.store.len() {
            return false;
        }
        for index in 0..self.store.len() {
            if self.store.sizes[index] != other.store.sizes[index] {
                return false;
            }
            match (self.store.block(index), other.store.block(index)) {
                (None, None) => {}
                (Some(lhs), Some(rhs)) => {
                    if !lhs.equal_block(rhs) {
                        return false;
                    }
                }
                _ => return false,
            }
        }
        true
    }
}
