//! Reusable arena fixtures.
//!
//! - [`RefusingArena`]: grows normally N times, then refuses every call.
//! - [`SMALL_CAPACITY`] / [`small_arena`]: an arena that fills up after a
//!   handful of page growths, for exhaustion tests.

use heapmm_arena::{Arena, ArenaBacking, ArenaConfig, ArenaError};

/// Capacity of the small fixture arena: four 4 KiB pages.
pub const SMALL_CAPACITY: usize = 16 * 1024;

/// Config for an arena of [`SMALL_CAPACITY`] bytes.
pub fn small_arena_config() -> ArenaConfig {
    ArenaConfig::new(SMALL_CAPACITY)
}

/// A fresh arena of [`SMALL_CAPACITY`] bytes.
pub fn small_arena() -> Arena {
    Arena::new(&small_arena_config()).expect("small arena config is valid")
}

/// An [`ArenaBacking`] that refuses growth after `succeed_count` calls.
///
/// Useful for driving the heap-full latch at an exact point (including
/// during lazy initialisation) independently of the arena's capacity.
pub struct RefusingArena {
    inner: Arena,
    pub succeed_count: usize,
    calls: usize,
}

impl RefusingArena {
    /// Allow `succeed_count` successful growths of a default-capacity arena.
    pub fn new(succeed_count: usize) -> Self {
        Self {
            inner: Arena::default(),
            succeed_count,
            calls: 0,
        }
    }

    /// How many times `grow()` has been called, refused calls included.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl ArenaBacking for RefusingArena {
    fn grow(&mut self, delta: isize) -> Result<usize, ArenaError> {
        self.calls += 1;
        if self.calls > self.succeed_count {
            return Err(ArenaError::Exhausted {
                requested: delta,
                limit: self.inner.limit(),
                capacity: self.inner.capacity(),
            });
        }
        self.inner.grow(delta)
    }

    fn limit(&self) -> usize {
        self.inner.limit()
    }

    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    fn bytes(&self) -> &[u8] {
        self.inner.bytes()
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        self.inner.bytes_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_after_budget() {
        let mut a = RefusingArena::new(2);
        assert_eq!(a.grow(4096).unwrap(), 0);
        assert_eq!(a.grow(4096).unwrap(), 4096);
        assert!(matches!(
            a.grow(4096),
            Err(ArenaError::Exhausted { limit: 8192, .. })
        ));
        assert_eq!(a.calls(), 3);
        assert_eq!(a.limit(), 8192);
    }

    #[test]
    fn zero_budget_refuses_immediately() {
        let mut a = RefusingArena::new(0);
        assert!(a.grow(8).is_err());
        assert_eq!(a.limit(), 0);
    }

    #[test]
    fn small_arena_has_small_capacity() {
        let a = small_arena();
        assert_eq!(a.capacity(), SMALL_CAPACITY);
        assert_eq!(a.limit(), 0);
    }
}
