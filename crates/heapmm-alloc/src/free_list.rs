//! The address-ordered free list.
//!
//! [`FreeList`] maps block offset to block length in a `BTreeMap`, so list
//! order is address order: the head is the lowest-addressed free block and
//! each block's `next` is the first free block above it. Keeping the list
//! sorted at all times is what makes the merge pass correct: two blocks can
//! only be physically adjacent if they are also list neighbours.

use std::collections::BTreeMap;

use log::trace;

use crate::descriptor::FreeBlock;

/// The set of free blocks, ordered by arena offset.
#[derive(Clone, Debug, Default)]
pub struct FreeList {
    /// Block offset → block length (descriptor included).
    blocks: BTreeMap<usize, usize>,
}

impl FreeList {
    /// Create an empty free list.
    pub fn new() -> Self {
        Self {
            blocks: BTreeMap::new(),
        }
    }

    /// Number of free blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether there are no free blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The lowest-addressed free block.
    pub fn head(&self) -> Option<FreeBlock> {
        self.blocks.first_key_value().map(Self::entry)
    }

    /// The highest-addressed free block.
    pub fn tail(&self) -> Option<FreeBlock> {
        self.blocks.last_key_value().map(Self::entry)
    }

    /// The free block starting exactly at `offset`, if any.
    pub fn get(&self, offset: usize) -> Option<FreeBlock> {
        self.blocks
            .get(&offset)
            .map(|&length| FreeBlock { offset, length })
    }

    /// Iterate over free blocks in list (address) order.
    pub fn iter(&self) -> impl Iterator<Item = FreeBlock> + '_ {
        self.blocks.iter().map(Self::entry)
    }

    /// Total bytes held by free blocks, descriptors included.
    pub fn free_bytes(&self) -> usize {
        self.blocks.values().sum()
    }

    /// Length of the largest free block, or 0 if the list is empty.
    pub fn largest(&self) -> usize {
        self.blocks.values().copied().max().unwrap_or(0)
    }

    /// Put a block on the list at its address position.
    ///
    /// Does not merge; callers run [`coalesce`](Self::coalesce) afterwards
    /// when the block may touch a neighbour.
    pub fn insert(&mut self, block: FreeBlock) {
        let previous = self.blocks.insert(block.offset, block.length);
        debug_assert!(previous.is_none(), "duplicate free block at {:#x}", block.offset);
    }

    /// Unlink the block starting at `offset` and return it.
    pub fn remove(&mut self, offset: usize) -> Option<FreeBlock> {
        self.blocks
            .remove(&offset)
            .map(|length| FreeBlock { offset, length })
    }

    /// First block in list order whose length is at least `needed`.
    pub fn first_fit(&self, needed: usize) -> Option<FreeBlock> {
        self.iter().find(|block| block.length >= needed)
    }

    /// Merge every run of physically contiguous free blocks.
    ///
    /// Walks the list from the head. While the current block's successor
    /// begins exactly at its end, the successor is absorbed and the current
    /// block is examined again, so runs of three or more blocks collapse in
    /// one pass. Returns the number of blocks absorbed.
    pub fn coalesce(&mut self) -> usize {
        let mut absorbed = 0;
        let mut cursor = self.blocks.first_key_value().map(|(&offset, _)| offset);
        while let Some(offset) = cursor {
            let Some(&length) = self.blocks.get(&offset) else {
                break;
            };
            let end = offset + length;
            if let Some(next_length) = self.blocks.remove(&end) {
                trace!("merged free block {end:#x} (+{next_length}) into {offset:#x}");
                self.blocks.insert(offset, length + next_length);
                absorbed += 1;
                continue;
            }
            cursor = self
                .blocks
                .range(end..)
                .next()
                .map(|(&next_offset, _)| next_offset);
        }
        absorbed
    }

    fn entry((&offset, &length): (&usize, &usize)) -> FreeBlock {
        FreeBlock { offset, length }
    }
}
