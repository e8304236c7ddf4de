//! Occupancy snapshot for a heap.
//!
//! [`HeapStats`] is a point-in-time copy of the heap's bookkeeping,
//! taken between public calls. It replaces dumping the free list when
//! inspecting fragmentation.

/// Occupancy of a heap at one quiescent point.
///
/// All sizes are in bytes. Block counts and byte totals include
/// descriptor overhead except `live_bytes`, which sums the sizes callers
/// asked for.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeapStats {
    /// Current arena limit.
    pub arena_limit: usize,
    /// Fixed arena capacity.
    pub arena_capacity: usize,
    /// Number of blocks on the free list.
    pub free_blocks: usize,
    /// Sum of free block lengths.
    pub free_bytes: usize,
    /// Length of the largest free block, 0 if the list is empty.
    pub largest_free_block: usize,
    /// Number of live allocations.
    pub live_allocations: usize,
    /// Sum of requested payload sizes over live allocations.
    pub live_bytes: usize,
    /// Successful arena growths, initialisation included.
    pub growth_count: usize,
    /// Whether the heap-full latch is set.
    pub heap_full: bool,
}

impl HeapStats {
    /// Fraction of free space not in the largest free block, in `[0, 1]`.
    ///
    /// 0.0 when all free space is one block (or there is none).
    pub fn fragmentation(&self) -> f64 {
        if self.free_bytes == 0 {
            return 0.0;
        }
        1.0 - self.largest_free_block as f64 / self.free_bytes as f64
    }
}
