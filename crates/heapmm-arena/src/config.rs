//! Arena configuration parameters.

use heapmm_core::ALIGNMENT;

use crate::error::ArenaError;

/// Configuration for the arena.
///
/// Set once when the arena is created; the capacity can never change
/// afterwards and bounds the total memory the heap can address for its
/// whole lifetime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Maximum number of bytes the limit may reach.
    ///
    /// Default: 1 GiB. Must be non-zero and a multiple of
    /// [`ALIGNMENT`](heapmm_core::ALIGNMENT).
    pub capacity: usize,
}

impl ArenaConfig {
    /// Default capacity: 1 GiB.
    pub const DEFAULT_CAPACITY: usize = 1024 * 1024 * 1024;

    /// Create a config with the given capacity in bytes.
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Check structural constraints.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.capacity == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "capacity must be non-zero".to_string(),
            });
        }
        if self.capacity % ALIGNMENT != 0 {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "capacity ({}) must be a multiple of {ALIGNMENT}",
                    self.capacity
                ),
            });
        }
        if isize::try_from(self.capacity).is_err() {
            return Err(ArenaError::InvalidConfig {
                reason: format!("capacity ({}) exceeds isize::MAX", self.capacity),
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
