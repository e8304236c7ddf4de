//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// Moving the limit by the requested delta would leave `[0, capacity]`.
    ///
    /// The capacity is fixed for the arena's lifetime, so this is a hard
    /// ceiling: retrying the same growth can never succeed.
    Exhausted {
        /// The signed byte delta that was refused.
        requested: isize,
        /// The limit at the time of the call.
        limit: usize,
        /// The arena's fixed capacity.
        capacity: usize,
    },
    /// Arena configuration is invalid.
    InvalidConfig {
        /// Description of what is wrong.
        reason: String,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted {
                requested,
                limit,
                capacity,
            } => {
                write!(
                    f,
                    "arena exhausted: cannot move limit {limit} by {requested} bytes, capacity {capacity} bytes"
                )
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid arena config: {reason}")
            }
        }
    }
}

impl Error for ArenaError {}
