//! Structural invariant checks for a quiescent heap.

use log::error;

use heapmm_arena::ArenaBacking;
use heapmm_core::{HeapError, ALIGNMENT};

use crate::config::DESCRIPTOR_SIZE;
use crate::heap::FreeListHeap;

/// A block in the managed region, free or live, for the tiling check.
#[derive(Clone, Copy, Debug)]
struct Span {
    offset: usize,
    end: usize,
    free: bool,
}

fn inconsistency(reason: String) -> HeapError {
    error!("heap invariant violated: {reason}");
    HeapError::InternalInconsistency { reason }
}

impl<B: ArenaBacking> FreeListHeap<B> {
    /// Check every structural invariant of the heap.
    ///
    /// - every free block lies in `[heap_start, limit)`, spans at least
    ///   `DESCRIPTOR_SIZE` bytes, and has a length that is a multiple of
    ///   `ALIGNMENT`;
    /// - no two free blocks are physically adjacent;
    /// - every live allocation's payload is aligned and holds its
    ///   requested size;
    /// - free and live blocks together tile `[heap_start, limit)` exactly,
    ///   with no gap and no overlap.
    ///
    /// Violations are defects and are reported as
    /// [`HeapError::InternalInconsistency`].
    pub fn verify(&self) -> Result<(), HeapError> {
        let limit = self.backing.limit();
        let mut previous_free: Option<usize> = None;
        let mut spans = Vec::with_capacity(self.free.len() + self.live.len());

        for block in self.free.iter() {
            if block.offset < self.heap_start || block.end() > limit {
                return Err(inconsistency(format!(
                    "{block} lies outside the managed region [{:#x}, {limit:#x})",
                    self.heap_start
                )));
            }
            if block.length < DESCRIPTOR_SIZE || block.length % ALIGNMENT != 0 {
                return Err(inconsistency(format!("{block} has an invalid length")));
            }
            if previous_free == Some(block.offset) {
                return Err(inconsistency(format!(
                    "{block} is adjacent to the free block before it"
                )));
            }
            previous_free = Some(block.end());
            spans.push(Span {
                offset: block.offset,
                end: block.end(),
                free: true,
            });
        }

        for (&ptr, block) in &self.live {
            if ptr != block.ptr() || !ptr.is_aligned() {
                return Err(inconsistency(format!(
                    "live allocation {ptr} has a misplaced or misaligned payload"
                )));
            }
            if block.requested > block.payload_capacity() {
                return Err(inconsistency(format!(
                    "live allocation {ptr} holds {} bytes but {} were requested",
                    block.payload_capacity(),
                    block.requested
                )));
            }
            spans.push(Span {
                offset: block.offset,
                end: block.end(),
                free: false,
            });
        }

        spans.sort_unstable_by_key(|s| s.offset);
        let mut cursor = self.heap_start;
        for span in &spans {
            if span.offset != cursor {
                let kind = if span.free { "free" } else { "live" };
                return Err(inconsistency(format!(
                    "{kind} block at {:#x} does not start at {cursor:#x} (gap or overlap)",
                    span.offset
                )));
            }
            cursor = span.end;
        }
        if cursor != limit {
            return Err(inconsistency(format!(
                "blocks end at {cursor:#x} but the arena limit is {limit:#x}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use heapmm_core::HeapAllocator;

    use crate::config::HeapConfig;
    use crate::descriptor::FreeBlock;
    use crate::heap::FreeListHeap;

    fn heap() -> FreeListHeap {
        FreeListHeap::new(HeapConfig::with_capacity(64 * 1024)).unwrap()
    }

    #[test]
    fn uninitialised_heap_verifies() {
        assert!(heap().verify().is_ok());
    }

    #[test]
    fn heap_verifies_after_mixed_operations() {
        let mut h = heap();
        let a = h.allocate(100).unwrap();
        let b = h.allocate(3000).unwrap();
        let c = h.allocate(9000).unwrap();
        h.verify().unwrap();
        h.release(Some(b));
        h.verify().unwrap();
        h.resize(Some(a), 20).unwrap();
        h.verify().unwrap();
        h.release(Some(c));
        h.release(Some(a));
        h.verify().unwrap();
    }

    #[test]
    fn adjacent_free_blocks_are_reported() {
        let mut h = heap();
        h.allocate(8).unwrap();
        let head = h.free.head().unwrap();
        // Split the head free block in two without merging.
        h.free.remove(head.offset);
        h.free.insert(FreeBlock {
            offset: head.offset,
            length: 64,
        });
        h.free.insert(FreeBlock {
            offset: head.offset + 64,
            length: head.length - 64,
        });
        let err = h.verify().unwrap_err();
        assert!(err.is_defect());
        assert!(err.to_string().contains("adjacent"));
    }

    #[test]
    fn gap_in_tiling_is_reported() {
        let mut h = heap();
        h.allocate(8).unwrap();
        let tail = h.free.tail().unwrap();
        h.free.remove(tail.offset);
        let err = h.verify().unwrap_err();
        assert!(err.is_defect());
    }

    #[test]
    fn misaligned_length_is_reported() {
        let mut h = heap();
        h.allocate(8).unwrap();
        let tail = h.free.tail().unwrap();
        h.free.remove(tail.offset);
        h.free.insert(FreeBlock {
            offset: tail.offset,
            length: tail.length - 3,
        });
        let err = h.verify().unwrap_err();
        assert!(err.to_string().contains("invalid length"));
    }
}
