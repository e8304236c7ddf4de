//! Arena Manager for the heapmm heap memory manager.
//!
//! Owns a single contiguous byte region with a fixed capacity and a
//! monotonically advancing `limit` cursor. The only way the allocator
//! obtains fresh storage is [`ArenaBacking::grow`], the safe analogue of
//! `sbrk(2)`: it moves the limit by a signed byte delta and reports where
//! the limit was before the call.
//!
//! ```text
//! offset 0                      limit                 capacity
//! ├─────────── usable ───────────┤┄┄┄┄┄ reserved ┄┄┄┄┄┤
//! ```
//!
//! Bytes past the limit are never materialised, so a large capacity costs
//! nothing until the heap actually grows into it.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod backing;
pub mod config;
pub mod error;

pub use arena::Arena;
pub use backing::ArenaBacking;
pub use config::ArenaConfig;
pub use error::ArenaError;
