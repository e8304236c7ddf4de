//! Error types for the heapmm heap memory manager.
//!
//! The three variants of [`HeapError`] are the complete failure taxonomy of
//! the four public heap operations. Misuse of a pointer (releasing memory
//! the heap never handed out) is outside the contract and has no variant.

use std::error::Error;
use std::fmt;

/// Errors returned by [`HeapAllocator`](crate::HeapAllocator) operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeapError {
    /// The arena cannot supply the memory a request needs.
    ///
    /// Permanent once the heap-full latch is set: every later allocate,
    /// resize, or zero-allocate call fails with this error without asking
    /// the arena again.
    OutOfMemory {
        /// Number of payload bytes the caller asked for.
        requested: usize,
    },
    /// `count * size` overflowed in a zero-initialised allocation.
    InvalidSize {
        /// Element count passed by the caller.
        count: usize,
        /// Element size passed by the caller.
        size: usize,
    },
    /// The allocator detected a defect in its own bookkeeping.
    ///
    /// Raised when a first-fit retry after a successful growth still finds
    /// no block, or when an invariant check fails. Never caused by caller
    /// input.
    InternalInconsistency {
        /// Description of the broken invariant.
        reason: String,
    },
}

impl HeapError {
    /// Whether this error indicates a bug in the allocator rather than a
    /// resource or usage failure.
    pub fn is_defect(&self) -> bool {
        matches!(self, Self::InternalInconsistency { .. })
    }
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory { requested } => {
                write!(f, "out of memory: cannot allocate {requested} bytes")
            }
            Self::InvalidSize { count, size } => {
                write!(f, "invalid size: {count} elements of {size} bytes overflows")
            }
            Self::InternalInconsistency { reason } => {
                write!(f, "internal heap inconsistency: {reason}")
            }
        }
    }
}

impl Error for HeapError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_request() {
        let err = HeapError::OutOfMemory { requested: 128 };
        assert_eq!(err.to_string(), "out of memory: cannot allocate 128 bytes");
    }

    #[test]
    fn only_inconsistency_is_a_defect() {
        assert!(!HeapError::OutOfMemory { requested: 1 }.is_defect());
        assert!(!HeapError::InvalidSize { count: 2, size: 3 }.is_defect());
        assert!(HeapError::InternalInconsistency {
            reason: "adjacent free blocks".into()
        }
        .is_defect());
    }
}
