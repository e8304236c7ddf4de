//! Heap configuration, layout constants, and validation errors.
//!
//! Every parameter here is fixed when the heap is built. Nothing can be
//! retuned while the heap is live.

use std::error::Error;
use std::fmt;

use heapmm_arena::{ArenaConfig, ArenaError};
use heapmm_core::ALIGNMENT;

/// Bytes reserved at the start of every block for its descriptor.
///
/// Three machine words: length plus the two list links. Payloads begin
/// this many bytes into their block.
pub const DESCRIPTOR_SIZE: usize = 3 * std::mem::size_of::<u64>();

/// Smallest residual worth splitting off as a separate free block.
///
/// A descriptor plus one alignment unit of payload. Anything smaller is
/// left attached to the allocation instead of becoming an unusable
/// fragment.
pub const MIN_SPLIT_RESIDUAL: usize = DESCRIPTOR_SIZE + ALIGNMENT;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected by [`HeapConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Arena configuration is invalid.
    Arena(ArenaError),
    /// Page size is zero or not a power of two.
    PageNotPowerOfTwo {
        /// The configured page size.
        page_size: usize,
    },
    /// Page size is smaller than the minimum block that can hold a descriptor.
    PageTooSmall {
        /// The configured page size.
        page_size: usize,
    },
    /// The initial region must span at least one page.
    ZeroInitialPages,
    /// The initial region plus its extension page does not fit in the arena.
    InitialRegionExceedsCapacity {
        /// Bytes needed at initialisation.
        required: usize,
        /// Arena capacity.
        capacity: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arena(e) => write!(f, "arena: {e}"),
            Self::PageNotPowerOfTwo { page_size } => {
                write!(f, "page_size {page_size} is not a power of two")
            }
            Self::PageTooSmall { page_size } => {
                write!(
                    f,
                    "page_size {page_size} is below the minimum block size of {MIN_SPLIT_RESIDUAL}"
                )
            }
            Self::ZeroInitialPages => write!(f, "initial_pages must be at least 1"),
            Self::InitialRegionExceedsCapacity { required, capacity } => {
                write!(
                    f,
                    "initial region of {required} bytes exceeds arena capacity of {capacity} bytes"
                )
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArenaError> for ConfigError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}

// ── HeapConfig ─────────────────────────────────────────────────────

/// Configuration for a [`FreeListHeap`](crate::FreeListHeap).
///
/// The page size is the growth granularity: every arena extension is a
/// whole number of pages, which also bounds the slack left in the final
/// block of the arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeapConfig {
    /// Backing arena parameters (capacity).
    pub arena: ArenaConfig,
    /// Growth granularity in bytes. Default: 4096.
    pub page_size: usize,
    /// Pages requested for the initial region on first use. Default: 1.
    ///
    /// Initialisation then appends one more page, so the first request
    /// always sees at least `initial_pages + 1` pages of free space.
    pub initial_pages: usize,
}

impl HeapConfig {
    /// Default page size: 4 KiB.
    pub const DEFAULT_PAGE_SIZE: usize = 4096;

    /// Default initial region size in pages.
    pub const DEFAULT_INITIAL_PAGES: usize = 1;

    /// Create a heap config over the given arena config with default paging.
    pub fn new(arena: ArenaConfig) -> Self {
        Self {
            arena,
            page_size: Self::DEFAULT_PAGE_SIZE,
            initial_pages: Self::DEFAULT_INITIAL_PAGES,
        }
    }

    /// Default paging over an arena of `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(ArenaConfig::new(capacity))
    }

    /// Bytes claimed from the arena by lazy initialisation.
    ///
    /// The initial region plus the one extension page.
    pub fn initial_footprint(&self) -> Option<usize> {
        self.initial_pages
            .checked_add(1)?
            .checked_mul(self.page_size)
    }

    /// Growth needed to satisfy a block of `needed` bytes: `needed` rounded
    /// up to a whole number of pages.
    pub fn growth_for(&self, needed: usize) -> Option<usize> {
        needed.div_ceil(self.page_size).checked_mul(self.page_size)
    }

    /// Validate all structural constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.arena.validate()?;
        if !self.page_size.is_power_of_two() {
            return Err(ConfigError::PageNotPowerOfTwo {
                page_size: self.page_size,
            });
        }
        // A power of two this large is also a multiple of ALIGNMENT.
        if self.page_size < MIN_SPLIT_RESIDUAL {
            return Err(ConfigError::PageTooSmall {
                page_size: self.page_size,
            });
        }
        if self.initial_pages == 0 {
            return Err(ConfigError::ZeroInitialPages);
        }
        let capacity = self.arena.capacity;
        match self.initial_footprint() {
            Some(required) if required <= capacity => Ok(()),
            required => Err(ConfigError::InitialRegionExceedsCapacity {
                required: required.unwrap_or(usize::MAX),
                capacity,
            }),
        }
    }
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self::new(ArenaConfig::default())
    }
}
