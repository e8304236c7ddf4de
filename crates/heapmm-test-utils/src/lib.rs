//! Test utilities and mock types for heapmm development.
//!
//! Provides [`TrackedHeap`], a wrapper over any [`HeapAllocator`] that
//! fills every payload with a per-allocation byte pattern and can check
//! integrity and pairwise no-overlap at any point, plus arena mocks and
//! fixture configs in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::BTreeMap;

use heapmm_core::{HeapAllocator, HeapError, HeapPtr};

pub use fixtures::RefusingArena;

/// The byte expected at `index` of a payload stamped with `tag`.
pub fn pattern_byte(tag: u8, index: usize) -> u8 {
    tag.wrapping_add((index % 251) as u8)
}

#[derive(Clone, Copy, Debug)]
struct Tracked {
    size: usize,
    tag: u8,
}

/// Wraps a heap and remembers what every live payload should contain.
///
/// Every successful allocation is stamped with a fresh tag pattern. A
/// resize checks that the preserved prefix still carries the old pattern
/// before restamping. [`check_integrity`](TrackedHeap::check_integrity)
/// and [`check_no_overlap`](TrackedHeap::check_no_overlap) compare the
/// heap against the record.
pub struct TrackedHeap<H: HeapAllocator> {
    heap: H,
    live: BTreeMap<HeapPtr, Tracked>,
    next_tag: u8,
}

impl<H: HeapAllocator> TrackedHeap<H> {
    pub fn new(heap: H) -> Self {
        Self {
            heap,
            live: BTreeMap::new(),
            next_tag: 1,
        }
    }

    pub fn heap(&self) -> &H {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut H {
        &mut self.heap
    }

    pub fn into_inner(self) -> H {
        self.heap
    }

    /// Number of allocations the wrapper believes are live.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Live pointers in address order.
    pub fn live_pointers(&self) -> Vec<HeapPtr> {
        self.live.keys().copied().collect()
    }

    /// Requested size of a tracked allocation.
    pub fn size_of(&self, ptr: HeapPtr) -> Option<usize> {
        self.live.get(&ptr).map(|t| t.size)
    }

    fn fresh_tag(&mut self) -> u8 {
        let tag = self.next_tag;
        self.next_tag = self.next_tag.wrapping_add(37) | 1;
        tag
    }

    fn stamp(&mut self, ptr: HeapPtr, tag: u8) {
        if let Some(payload) = self.heap.payload_mut(ptr) {
            for (i, byte) in payload.iter_mut().enumerate() {
                *byte = pattern_byte(tag, i);
            }
        }
    }

    pub fn allocate(&mut self, size: usize) -> Result<HeapPtr, HeapError> {
        let ptr = self.heap.allocate(size)?;
        let tag = self.fresh_tag();
        self.stamp(ptr, tag);
        self.live.insert(ptr, Tracked { size, tag });
        Ok(ptr)
    }

    /// Zero-allocate, assert the payload really is zeroed, then stamp it.
    ///
    /// # Panics
    ///
    /// If any payload byte is non-zero.
    pub fn zero_allocate(&mut self, count: usize, size: usize) -> Result<HeapPtr, HeapError> {
        let ptr = self.heap.zero_allocate(count, size)?;
        let payload = self.heap.payload(ptr).unwrap_or(&[]);
        assert!(
            payload.iter().all(|&b| b == 0),
            "zero_allocate({count}, {size}) returned dirty memory at {ptr}"
        );
        let tag = self.fresh_tag();
        self.stamp(ptr, tag);
        self.live.insert(
            ptr,
            Tracked {
                size: count * size,
                tag,
            },
        );
        Ok(ptr)
    }

    pub fn release(&mut self, ptr: HeapPtr) {
        self.live.remove(&ptr);
        self.heap.release(Some(ptr));
    }

    /// Resize a tracked allocation.
    ///
    /// # Panics
    ///
    /// If the bytes that must survive the resize were not preserved, or
    /// if a failed resize disturbed the original payload.
    pub fn resize(&mut self, ptr: HeapPtr, new_size: usize) -> Result<Option<HeapPtr>, HeapError> {
        let Some(old) = self.live.get(&ptr).copied() else {
            return self.heap.resize(Some(ptr), new_size);
        };
        match self.heap.resize(Some(ptr), new_size) {
            Ok(Some(new_ptr)) => {
                let kept = old.size.min(new_size);
                let payload = self.heap.payload(new_ptr).unwrap_or(&[]);
                assert_eq!(payload.len(), new_size, "resized payload has the wrong length");
                for (i, &byte) in payload[..kept].iter().enumerate() {
                    assert_eq!(
                        byte,
                        pattern_byte(old.tag, i),
                        "resize {ptr} -> {new_ptr} lost byte {i}"
                    );
                }
                self.live.remove(&ptr);
                self.stamp(new_ptr, old.tag);
                self.live.insert(
                    new_ptr,
                    Tracked {
                        size: new_size,
                        tag: old.tag,
                    },
                );
                Ok(Some(new_ptr))
            }
            Ok(None) => {
                self.live.remove(&ptr);
                Ok(None)
            }
            Err(e) => {
                if let Err(msg) = self.check_one(ptr, old) {
                    panic!("failed resize corrupted the original block: {msg}");
                }
                Err(e)
            }
        }
    }

    /// Release every tracked allocation.
    pub fn release_all(&mut self) {
        let ptrs = self.live_pointers();
        for ptr in ptrs {
            self.release(ptr);
        }
    }

    fn check_one(&self, ptr: HeapPtr, tracked: Tracked) -> Result<(), String> {
        let payload = self
            .heap
            .payload(ptr)
            .ok_or_else(|| format!("{ptr} is tracked but the heap does not know it"))?;
        if payload.len() != tracked.size {
            return Err(format!(
                "{ptr} payload is {} bytes, expected {}",
                payload.len(),
                tracked.size
            ));
        }
        match payload
            .iter()
            .enumerate()
            .find(|&(i, &b)| b != pattern_byte(tracked.tag, i))
        {
            Some((i, &b)) => Err(format!(
                "{ptr} byte {i} is {b:#04x}, expected {:#04x}",
                pattern_byte(tracked.tag, i)
            )),
            None => Ok(()),
        }
    }

    /// Every live payload still carries its own pattern.
    pub fn check_integrity(&self) -> Result<(), String> {
        self.live
            .iter()
            .try_for_each(|(&ptr, &tracked)| self.check_one(ptr, tracked))
    }

    /// No two live `[ptr, ptr + size)` ranges overlap.
    pub fn check_no_overlap(&self) -> Result<(), String> {
        let mut previous: Option<(HeapPtr, usize)> = None;
        for (&ptr, tracked) in &self.live {
            if let Some((prev, end)) = previous {
                if end > ptr.offset() {
                    return Err(format!("{prev} overlaps {ptr}"));
                }
            }
            previous = Some((ptr, ptr.offset() + tracked.size));
        }
        Ok(())
    }
}
