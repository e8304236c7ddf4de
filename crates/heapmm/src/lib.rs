//! heapmm: a heap memory manager over a fixed-capacity, growable arena.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! heapmm sub-crates. For most users, adding `heapmm` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use heapmm::prelude::*;
//!
//! let mut heap = FreeListHeap::new(HeapConfig::with_capacity(1 << 20)).unwrap();
//!
//! let p = heap.allocate(100).unwrap();
//! heap.payload_mut(p).unwrap()[..5].copy_from_slice(b"hello");
//!
//! // Shrinking keeps the pointer and the leading bytes.
//! let p = heap.resize(Some(p), 5).unwrap().unwrap();
//! assert_eq!(heap.payload(p).unwrap(), b"hello");
//!
//! let zeros = heap.zero_allocate(16, 8).unwrap();
//! assert!(heap.payload(zeros).unwrap().iter().all(|&b| b == 0));
//!
//! heap.release(Some(p));
//! heap.release(Some(zeros));
//! heap.verify().unwrap();
//! assert_eq!(heap.stats().free_blocks, 1);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `heapmm-core` | `HeapPtr`, `HeapError`, the `HeapAllocator` trait, alignment |
//! | [`arena`] | `heapmm-arena` | The arena, its config, and the `ArenaBacking` growth trait |
//! | [`heap`] | `heapmm-alloc` | The free-list heap, its config, free list, and stats |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and layout arithmetic (`heapmm-core`).
///
/// Contains the [`types::HeapAllocator`] trait implemented by every heap,
/// the [`types::HeapPtr`] payload handle, and the [`types::HeapError`]
/// taxonomy.
pub use heapmm_core as types;

/// The arena manager (`heapmm-arena`).
///
/// [`arena::Arena`] is the default backing; implement
/// [`arena::ArenaBacking`] to supply storage some other way.
pub use heapmm_arena as arena;

/// The free-list allocator (`heapmm-alloc`).
///
/// [`heap::FreeListHeap`] plus its configuration, inspection, and
/// verification types.
pub use heapmm_alloc as heap;

/// Common imports for typical heapmm usage.
///
/// ```rust
/// use heapmm::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use heapmm_core::{HeapAllocator, HeapError, HeapPtr};

    // Arena
    pub use heapmm_arena::{Arena, ArenaBacking, ArenaConfig, ArenaError};

    // Allocator
    pub use heapmm_alloc::{ConfigError, FreeBlock, FreeListHeap, HeapConfig, HeapStats};
}
