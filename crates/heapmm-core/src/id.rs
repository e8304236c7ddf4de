//! The [`HeapPtr`] payload identifier.

use std::fmt;

use crate::layout::ALIGNMENT;

/// Identifies a live allocation by the arena offset of its first payload byte.
///
/// This is the safe stand-in for a raw pointer: offsets are relative to the
/// arena base, so a `HeapPtr` is meaningful only to the heap that returned
/// it. `Option<HeapPtr>` plays the role of a nullable pointer in the
/// release and resize operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeapPtr(pub usize);

impl HeapPtr {
    /// Arena offset of the first payload byte.
    pub fn offset(self) -> usize {
        self.0
    }

    /// Whether the payload offset is a multiple of [`ALIGNMENT`].
    pub fn is_aligned(self) -> bool {
        self.0 % ALIGNMENT == 0
    }
}

impl fmt::Display for HeapPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<usize> for HeapPtr {
    fn from(v: usize) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_hex_offset() {
        assert_eq!(HeapPtr(4096).to_string(), "0x1000");
    }

    #[test]
    fn alignment_check() {
        assert!(HeapPtr(24).is_aligned());
        assert!(!HeapPtr(12).is_aligned());
    }
}
