//! Block descriptors for free and allocated blocks.
//!
//! Both kinds of block share one physical layout: `DESCRIPTOR_SIZE` bytes
//! of header followed by payload. The descriptor values themselves live in
//! side tables keyed by arena offset, not in the header bytes.

use std::fmt;

use heapmm_core::HeapPtr;

use crate::config::DESCRIPTOR_SIZE;

/// A block currently on the free list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FreeBlock {
    /// Arena offset of the block's first byte (its descriptor).
    pub offset: usize,
    /// Total bytes spanned, descriptor included.
    pub length: usize,
}

impl FreeBlock {
    /// One past the block's last byte.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Whether `other` begins exactly where this block ends.
    pub fn is_adjacent_to(&self, other: &FreeBlock) -> bool {
        self.end() == other.offset
    }
}

impl fmt::Display for FreeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "free block [{:#x}, {:#x}) length {}",
            self.offset,
            self.end(),
            self.length
        )
    }
}

/// A block handed out to a caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocatedBlock {
    /// Arena offset of the block's first byte (its descriptor).
    pub offset: usize,
    /// Total bytes spanned, descriptor included.
    pub length: usize,
    /// Payload bytes the caller asked for.
    pub requested: usize,
}

impl AllocatedBlock {
    /// The pointer returned to the caller: one descriptor past the start.
    pub fn ptr(&self) -> HeapPtr {
        HeapPtr(self.offset + DESCRIPTOR_SIZE)
    }

    /// Bytes available to the caller, at least `requested`.
    pub fn payload_capacity(&self) -> usize {
        self.length - DESCRIPTOR_SIZE
    }

    /// One past the block's last byte.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_is_offset_plus_length() {
        let a = FreeBlock {
            offset: 0,
            length: 64,
        };
        let b = FreeBlock {
            offset: 64,
            length: 32,
        };
        let c = FreeBlock {
            offset: 104,
            length: 32,
        };
        assert!(a.is_adjacent_to(&b));
        assert!(!b.is_adjacent_to(&c));
        assert!(!b.is_adjacent_to(&a));
    }

    #[test]
    fn payload_starts_after_descriptor() {
        let block = AllocatedBlock {
            offset: 4096,
            length: 128,
            requested: 100,
        };
        assert_eq!(block.ptr(), HeapPtr(4120));
        assert_eq!(block.payload_capacity(), 104);
        assert_eq!(block.end(), 4224);
    }

    #[test]
    fn free_block_display() {
        let block = FreeBlock {
            offset: 0x40,
            length: 32,
        };
        assert_eq!(block.to_string(), "free block [0x40, 0x60) length 32");
    }
}
