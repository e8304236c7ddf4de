//! The allocation surface seen by heap collaborators.

use crate::error::HeapError;
use crate::id::HeapPtr;

/// The public operations of a heap memory manager.
///
/// Collaborators (demo programs, stress drivers, test harnesses) use only
/// this trait and never inspect allocator internals. All operations run to
/// completion synchronously; implementations are single-threaded and take
/// `&mut self`, so concurrent use needs one external lock around the whole
/// heap.
///
/// Passing a pointer that this heap did not return, or one that has already
/// been released, is outside the contract. Implementations never report it
/// as an error.
pub trait HeapAllocator {
    /// Allocate at least `size` payload bytes.
    ///
    /// A zero-byte request still yields a distinct, releasable pointer.
    /// The returned pointer is aligned to [`ALIGNMENT`](crate::ALIGNMENT).
    fn allocate(&mut self, size: usize) -> Result<HeapPtr, HeapError>;

    /// Return an allocation to the heap. `None` is a no-op.
    fn release(&mut self, ptr: Option<HeapPtr>);

    /// Change the size of an allocation, preserving its leading bytes.
    ///
    /// `None` behaves as [`allocate`](Self::allocate). A `new_size` of zero
    /// releases the allocation and returns `Ok(None)`. On error the
    /// original allocation is left untouched and still valid.
    fn resize(
        &mut self,
        ptr: Option<HeapPtr>,
        new_size: usize,
    ) -> Result<Option<HeapPtr>, HeapError>;

    /// Allocate `count * size` bytes, all zero.
    ///
    /// Fails with [`HeapError::InvalidSize`] if the product overflows.
    fn zero_allocate(&mut self, count: usize, size: usize) -> Result<HeapPtr, HeapError>;

    /// The caller-owned bytes of a live allocation (exactly the requested size).
    fn payload(&self, ptr: HeapPtr) -> Option<&[u8]>;

    /// Mutable access to the caller-owned bytes of a live allocation.
    fn payload_mut(&mut self, ptr: HeapPtr) -> Option<&mut [u8]>;
}
