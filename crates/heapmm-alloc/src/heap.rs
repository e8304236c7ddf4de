//! The free-list heap: allocation, release, resize, and arena growth.
//!
//! [`FreeListHeap`] orchestrates one [`ArenaBacking`] and one [`FreeList`]:
//!
//! ```text
//! FreeListHeap
//! ├── ArenaBacking (limit cursor, grown a page multiple at a time)
//! ├── FreeList (offset → length, address-ordered, eagerly coalesced)
//! └── IndexMap<HeapPtr, AllocatedBlock> (live allocations)
//! ```
//!
//! # Allocation
//!
//! Requests are rounded up to [`ALIGNMENT`] and padded with a descriptor.
//! The free list is searched first-fit from the head. A block with a
//! residual of at least [`MIN_SPLIT_RESIDUAL`] bytes is split; smaller
//! residuals stay with the allocation. When nothing fits, the arena grows
//! by the request rounded up to whole pages, the new block is merged with
//! the tail if they touch, and the search is retried exactly once.
//!
//! # Heap-full latch
//!
//! The first refused growth latches the heap as full. From then on every
//! allocate, resize, and zero-allocate fails with
//! [`HeapError::OutOfMemory`] without asking the arena again. Release
//! keeps working.

use indexmap::IndexMap;
use log::{debug, error, trace, warn};

use heapmm_arena::{Arena, ArenaBacking, ArenaError};
use heapmm_core::{align_up, HeapAllocator, HeapError, HeapPtr, ALIGNMENT};

use crate::config::{ConfigError, HeapConfig, DESCRIPTOR_SIZE, MIN_SPLIT_RESIDUAL};
use crate::descriptor::{AllocatedBlock, FreeBlock};
use crate::free_list::FreeList;
use crate::stats::HeapStats;

/// Lifecycle of the heap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeapState {
    /// No request has been serviced yet; the arena is untouched.
    Uninitialised,
    /// The free list is installed and requests are serviced.
    Available,
    /// A growth was refused. Permanent.
    Full,
}

/// A first-fit, address-ordered free-list heap over a growable arena.
///
/// Single-threaded: every operation takes `&mut self` and runs to
/// completion. Wrap the whole heap in one `Mutex` to share it.
pub struct FreeListHeap<B: ArenaBacking = Arena> {
    pub(crate) backing: B,
    pub(crate) config: HeapConfig,
    pub(crate) free: FreeList,
    pub(crate) live: IndexMap<HeapPtr, AllocatedBlock>,
    pub(crate) state: HeapState,
    /// Arena offset where the managed region begins.
    pub(crate) heap_start: usize,
    /// Number of successful arena growths, initialisation included.
    pub(crate) growth_count: usize,
}

impl FreeListHeap<Arena> {
    /// Create a heap over a fresh [`Arena`].
    ///
    /// The arena is not touched until the first allocation.
    pub fn new(config: HeapConfig) -> Result<Self, ConfigError> {
        let arena = Arena::new(&config.arena)?;
        Self::with_backing(config, arena)
    }
}

impl<B: ArenaBacking> FreeListHeap<B> {
    /// Create a heap over a caller-supplied backing.
    ///
    /// The managed region starts at the backing's current limit.
    pub fn with_backing(config: HeapConfig, backing: B) -> Result<Self, ConfigError> {
        config.validate()?;
        let heap_start = backing.limit();
        Ok(Self {
            backing,
            config,
            free: FreeList::new(),
            live: IndexMap::new(),
            state: HeapState::Uninitialised,
            heap_start,
            growth_count: 0,
        })
    }

    /// The configuration this heap was built with.
    pub fn config(&self) -> &HeapConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> HeapState {
        self.state
    }

    /// Whether the free list has been installed.
    pub fn is_initialised(&self) -> bool {
        self.state != HeapState::Uninitialised
    }

    /// Whether the heap-full latch is set.
    pub fn is_heap_full(&self) -> bool {
        self.state == HeapState::Full
    }

    /// Read-only access to the backing arena.
    pub fn backing(&self) -> &B {
        &self.backing
    }

    /// The lowest-addressed free block.
    pub fn head(&self) -> Option<FreeBlock> {
        self.free.head()
    }

    /// The highest-addressed free block.
    pub fn tail(&self) -> Option<FreeBlock> {
        self.free.tail()
    }

    /// Free blocks in list order.
    pub fn free_blocks(&self) -> impl Iterator<Item = FreeBlock> + '_ {
        self.free.iter()
    }

    /// Live allocations, in no particular but deterministic order.
    pub fn live_allocations(&self) -> impl Iterator<Item = &AllocatedBlock> {
        self.live.values()
    }

    /// Payload capacity of a live allocation (at least its requested size).
    pub fn usable_size(&self, ptr: HeapPtr) -> Option<usize> {
        self.live.get(&ptr).map(AllocatedBlock::payload_capacity)
    }

    /// Snapshot of the heap's occupancy.
    pub fn stats(&self) -> HeapStats {
        HeapStats {
            arena_limit: self.backing.limit(),
            arena_capacity: self.backing.capacity(),
            free_blocks: self.free.len(),
            free_bytes: self.free.free_bytes(),
            largest_free_block: self.free.largest(),
            live_allocations: self.live.len(),
            live_bytes: self.live.values().map(|b| b.requested).sum(),
            growth_count: self.growth_count,
            heap_full: self.is_heap_full(),
        }
    }

    // ── initialisation and growth ──────────────────────────────────

    /// Install the free list on first use, or fail fast once latched.
    fn ensure_available(&mut self, requested: usize) -> Result<(), HeapError> {
        match self.state {
            HeapState::Available => Ok(()),
            HeapState::Full => Err(HeapError::OutOfMemory { requested }),
            HeapState::Uninitialised => self.initialise(requested),
        }
    }

    /// Claim the initial region, then extend it by one page so two pages
    /// (with the default config) are free before the first request.
    fn initialise(&mut self, requested: usize) -> Result<(), HeapError> {
        let initial = self.config.initial_pages * self.config.page_size;
        let page = self.config.page_size;
        let result = self
            .extend(initial)
            .and_then(|start| {
                self.heap_start = start;
                self.extend(page)
            });
        match result {
            Ok(_) => {
                self.state = HeapState::Available;
                debug!(
                    "heap initialised at {:#x} with {} free bytes",
                    self.heap_start,
                    self.free.free_bytes()
                );
                Ok(())
            }
            Err(e) => {
                self.latch_full(&e);
                Err(HeapError::OutOfMemory { requested })
            }
        }
    }

    /// Grow the arena by `bytes`, append the new region to the free list,
    /// and merge it with the old tail if they touch. Returns where the new
    /// region begins.
    fn extend(&mut self, bytes: usize) -> Result<usize, ArenaError> {
        let delta = isize::try_from(bytes).map_err(|_| ArenaError::Exhausted {
            requested: isize::MAX,
            limit: self.backing.limit(),
            capacity: self.backing.capacity(),
        })?;
        let start = self.backing.grow(delta)?;
        self.growth_count += 1;
        self.free.insert(FreeBlock {
            offset: start,
            length: bytes,
        });
        self.free.coalesce();
        debug!("arena grown by {bytes} bytes at {start:#x}");
        Ok(start)
    }

    /// Grow enough whole pages to hold a block of `needed` bytes.
    fn grow_for(&mut self, needed: usize, requested: usize) -> Result<(), HeapError> {
        let Some(bytes) = self.config.growth_for(needed) else {
            return Err(HeapError::OutOfMemory { requested });
        };
        match self.extend(bytes) {
            Ok(_) => Ok(()),
            Err(e) => {
                self.latch_full(&e);
                Err(HeapError::OutOfMemory { requested })
            }
        }
    }

    fn latch_full(&mut self, cause: &ArenaError) {
        warn!("heap full, further allocations will fail: {cause}");
        self.state = HeapState::Full;
    }

    // ── block management ───────────────────────────────────────────

    /// Total block length for a payload of `size` bytes.
    fn block_size_for(size: usize) -> Option<usize> {
        align_up(size, ALIGNMENT)?.checked_add(DESCRIPTOR_SIZE)
    }

    /// Unlink `block` from the free list, splitting off any viable
    /// residual, and record it as live.
    fn take_block(&mut self, block: FreeBlock, needed: usize, requested: usize) -> HeapPtr {
        self.free.remove(block.offset);
        let residual = block.length - needed;
        let length = if residual >= MIN_SPLIT_RESIDUAL {
            trace!("split {block}: {needed} allocated, {residual} left free");
            self.free.insert(FreeBlock {
                offset: block.offset + needed,
                length: residual,
            });
            needed
        } else {
            block.length
        };
        let allocated = AllocatedBlock {
            offset: block.offset,
            length,
            requested,
        };
        let ptr = allocated.ptr();
        self.live.insert(ptr, allocated);
        ptr
    }

    /// Return the tail of a live block to the free list, keeping `needed`
    /// bytes. Residuals below the split threshold stay attached.
    fn shrink_in_place(&mut self, ptr: HeapPtr, block: AllocatedBlock, needed: usize, new_size: usize) {
        let residual = block.length - needed;
        let length = if residual >= MIN_SPLIT_RESIDUAL {
            self.free.insert(FreeBlock {
                offset: block.offset + needed,
                length: residual,
            });
            self.free.coalesce();
            needed
        } else {
            block.length
        };
        self.live.insert(
            ptr,
            AllocatedBlock {
                length,
                requested: new_size,
                ..block
            },
        );
    }

    /// Extend a live block into the free block right after it, if that
    /// neighbour covers the shortfall. Returns whether it did.
    fn grow_in_place(&mut self, ptr: HeapPtr, block: AllocatedBlock, needed: usize, new_size: usize) -> bool {
        let Some(neighbour) = self.free.get(block.end()) else {
            return false;
        };
        let combined = block.length + neighbour.length;
        if combined < needed {
            return false;
        }
        self.free.remove(neighbour.offset);
        let leftover = combined - needed;
        let length = if leftover >= MIN_SPLIT_RESIDUAL {
            self.free.insert(FreeBlock {
                offset: block.offset + needed,
                length: leftover,
            });
            needed
        } else {
            combined
        };
        trace!("grew {ptr} in place into {neighbour}");
        self.live.insert(
            ptr,
            AllocatedBlock {
                length,
                requested: new_size,
                ..block
            },
        );
        true
    }
}

impl<B: ArenaBacking> HeapAllocator for FreeListHeap<B> {
    fn allocate(&mut self, size: usize) -> Result<HeapPtr, HeapError> {
        self.ensure_available(size)?;
        let needed =
            Self::block_size_for(size).ok_or(HeapError::OutOfMemory { requested: size })?;

        let block = match self.free.first_fit(needed) {
            Some(block) => block,
            None => {
                self.grow_for(needed, size)?;
                self.free.first_fit(needed).ok_or_else(|| {
                    error!("no free block of {needed} bytes after successful growth");
                    HeapError::InternalInconsistency {
                        reason: format!(
                            "first-fit found no block of {needed} bytes after growing the arena"
                        ),
                    }
                })?
            }
        };
        let ptr = self.take_block(block, needed, size);
        trace!("allocated {size} bytes at {ptr}");
        Ok(ptr)
    }

    fn release(&mut self, ptr: Option<HeapPtr>) {
        let Some(ptr) = ptr else {
            return;
        };
        let Some(block) = self.live.swap_remove(&ptr) else {
            warn!("release of {ptr}, which is not a live allocation, ignored");
            return;
        };
        self.free.insert(FreeBlock {
            offset: block.offset,
            length: block.length,
        });
        let merged = self.free.coalesce();
        trace!("released {ptr} ({} bytes), {merged} merges", block.length);
    }

    fn resize(
        &mut self,
        ptr: Option<HeapPtr>,
        new_size: usize,
    ) -> Result<Option<HeapPtr>, HeapError> {
        let Some(ptr) = ptr else {
            return self.allocate(new_size).map(Some);
        };
        if new_size == 0 {
            self.release(Some(ptr));
            return Ok(None);
        }
        let Some(&block) = self.live.get(&ptr) else {
            warn!("resize of {ptr}, which is not a live allocation, treated as a fresh allocation");
            return self.allocate(new_size).map(Some);
        };
        if self.is_heap_full() {
            return Err(HeapError::OutOfMemory {
                requested: new_size,
            });
        }
        let needed = Self::block_size_for(new_size).ok_or(HeapError::OutOfMemory {
            requested: new_size,
        })?;

        if needed <= block.length {
            self.shrink_in_place(ptr, block, needed, new_size);
            return Ok(Some(ptr));
        }
        if self.grow_in_place(ptr, block, needed, new_size) {
            return Ok(Some(ptr));
        }

        // The old block stays live until the copy is done, so a failed
        // allocation here leaves it untouched.
        let new_ptr = self.allocate(new_size)?;
        let copy_len = block.payload_capacity().min(new_size);
        self.backing
            .bytes_mut()
            .copy_within(ptr.offset()..ptr.offset() + copy_len, new_ptr.offset());
        self.release(Some(ptr));
        trace!("moved {ptr} to {new_ptr} ({copy_len} bytes copied)");
        Ok(Some(new_ptr))
    }

    fn zero_allocate(&mut self, count: usize, size: usize) -> Result<HeapPtr, HeapError> {
        let total = count
            .checked_mul(size)
            .ok_or(HeapError::InvalidSize { count, size })?;
        let ptr = self.allocate(total)?;
        let capacity = self.live[&ptr].payload_capacity();
        self.backing.bytes_mut()[ptr.offset()..ptr.offset() + capacity].fill(0);
        Ok(ptr)
    }

    fn payload(&self, ptr: HeapPtr) -> Option<&[u8]> {
        let block = self.live.get(&ptr)?;
        self.backing
            .bytes()
            .get(ptr.offset()..ptr.offset() + block.requested)
    }

    fn payload_mut(&mut self, ptr: HeapPtr) -> Option<&mut [u8]> {
        let block = self.live.get(&ptr)?;
        let range = ptr.offset()..ptr.offset() + block.requested;
        self.backing.bytes_mut().get_mut(range)
    }
}

impl Default for FreeListHeap<Arena> {
    fn default() -> Self {
        let backing = Arena::default();
        Self {
            heap_start: backing.limit(),
            backing,
            config: HeapConfig::default(),
            free: FreeList::new(),
            live: IndexMap::new(),
            state: HeapState::Uninitialised,
            growth_count: 0,
        }
    }
}
