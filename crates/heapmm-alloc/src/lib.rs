//! First-fit free-list allocator for the heapmm heap memory manager.
//!
//! [`FreeListHeap`] carves variable-size blocks out of an arena obtained
//! through [`ArenaBacking::grow`](heapmm_arena::ArenaBacking::grow) and
//! implements [`HeapAllocator`](heapmm_core::HeapAllocator).
//!
//! # Block layout
//!
//! ```text
//! block offset          ptr = offset + DESCRIPTOR_SIZE           end
//! ├── descriptor (24) ──┼──────────── payload (8-aligned) ────────┤
//! ```
//!
//! Descriptor bytes are reserved in the arena but the descriptor values
//! live in side tables: free blocks in an address-ordered [`FreeList`],
//! live blocks in an `IndexMap` keyed by [`HeapPtr`](heapmm_core::HeapPtr).
//!
//! # Policies
//!
//! - **Fit:** first-fit from the lowest-addressed free block.
//! - **Split:** only when the residual is at least [`MIN_SPLIT_RESIDUAL`].
//! - **Merge:** after every release, every shrink, and every growth, until
//!   no two free blocks touch.
//! - **Growth:** the request rounded up to whole pages; the first refusal
//!   latches the heap as full.
//!
//! # Concurrency
//!
//! Every operation takes `&mut self`. There is no global state; share a
//! heap between threads by wrapping it in a single `Mutex`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod descriptor;
pub mod free_list;
pub mod heap;
pub mod stats;
pub mod verify;

pub use config::{ConfigError, HeapConfig, DESCRIPTOR_SIZE, MIN_SPLIT_RESIDUAL};
pub use descriptor::{AllocatedBlock, FreeBlock};
pub use free_list::FreeList;
pub use heap::{FreeListHeap, HeapState};
pub use stats::HeapStats;
