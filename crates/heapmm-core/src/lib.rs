//! Core types and traits for the heapmm heap memory manager.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the arena, the allocator, and their callers:
//! the [`HeapPtr`] payload identifier, alignment arithmetic, the
//! [`HeapError`] taxonomy, and the [`HeapAllocator`] trait that is the
//! only surface collaborators are expected to touch.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod layout;
pub mod traits;

pub use error::HeapError;
pub use id::HeapPtr;
pub use layout::{align_up, ALIGNMENT};
pub use traits::HeapAllocator;
