//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The reservation does not fit in the remaining capacity.
    ///
    /// The arena stays exhausted until the next clear.
    Exhausted {
        /// Number of elements requested.
        requested: usize,
        /// Total arena capacity.
        capacity: usize,
    },
    /// Write index past the end of a reservation.
    OutOfSpan {
        /// Offending index within the reservation.
        index: usize,
        /// Length of the reservation.
        len: usize,
    },
    /// The reserved cell already holds a value.
    AlreadyWritten {
        /// Index within the reservation.
        index: usize,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "stack allocator exhausted: requested {requested}, capacity {capacity}"
                )
            }
            Self::OutOfSpan { index, len } => {
                write!(f, "index {index} outside reservation of length {len}")
            }
            Self::AlreadyWritten { index } => {
                write!(f, "reservation cell {index} already written")
            }
        }
    }
}

impl Error for ArenaError {}
