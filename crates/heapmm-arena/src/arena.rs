//! The fixed-capacity byte arena and its limit cursor.

use log::debug;

use crate::backing::ArenaBacking;
use crate::config::ArenaConfig;
use crate::error::ArenaError;

/// A contiguous byte region `[0, capacity)` with a movable limit.
///
/// Only `[0, limit)` is usable. The backing `Vec<u8>` always has exactly
/// `limit` elements, so memory is materialised as the limit advances and
/// freshly exposed bytes read as zero. The arena never moves data and
/// performs no block bookkeeping of its own.
pub struct Arena {
    /// Usable bytes. `data.len()` is the limit.
    data: Vec<u8>,
    /// Fixed ceiling for the limit.
    capacity: usize,
}

impl Arena {
    /// Create an empty arena (limit 0) with the configured capacity.
    pub fn new(config: &ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self {
            data: Vec::new(),
            capacity: config.capacity,
        })
    }

    /// Bytes still available before the capacity is reached.
    pub fn remaining(&self) -> usize {
        self.capacity - self.data.len()
    }
}

impl Default for Arena {
    /// An empty arena with [`ArenaConfig::DEFAULT_CAPACITY`].
    fn default() -> Self {
        Self {
            data: Vec::new(),
            capacity: ArenaConfig::DEFAULT_CAPACITY,
        }
    }
}

impl ArenaBacking for Arena {
    fn grow(&mut self, delta: isize) -> Result<usize, ArenaError> {
        let limit = self.data.len();
        let exhausted = ArenaError::Exhausted {
            requested: delta,
            limit,
            capacity: self.capacity,
        };
        let new_limit = match limit.checked_add_signed(delta) {
            Some(new_limit) if new_limit <= self.capacity => new_limit,
            _ => return Err(exhausted),
        };
        self.data.resize(new_limit, 0);
        debug!("arena limit moved {limit} -> {new_limit} (capacity {})", self.capacity);
        Ok(limit)
    }

    fn limit(&self) -> usize {
        self.data.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn bytes(&self) -> &[u8] {
        &self.data
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}
