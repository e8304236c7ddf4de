//! The growth primitive the allocator is written against.

use crate::error::ArenaError;

/// A byte region that can be extended by moving its limit.
///
/// [`Arena`](crate::Arena) is the production implementation. The trait
/// exists so the allocator can be driven against backings that refuse
/// growth on demand when exercising exhaustion paths.
pub trait ArenaBacking {
    /// Move the limit by `delta` bytes and return the limit before the call.
    ///
    /// A positive delta grows the usable region; the returned offset is
    /// where the new bytes begin. Fails with [`ArenaError::Exhausted`] if
    /// the new limit would exceed the capacity or fall below zero, in which
    /// case the limit is unchanged.
    fn grow(&mut self, delta: isize) -> Result<usize, ArenaError>;

    /// Current limit: the number of usable bytes.
    fn limit(&self) -> usize;

    /// Fixed capacity the limit can never exceed.
    fn capacity(&self) -> usize;

    /// The usable region `[0, limit)`.
    fn bytes(&self) -> &[u8];

    /// Mutable view of the usable region `[0, limit)`.
    fn bytes_mut(&mut self) -> &mut [u8];
}
