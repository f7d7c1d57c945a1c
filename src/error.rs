//! Error types for bit sieve operations.

use thiserror::Error;

/// Error variants for bit sieve operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A checked single-bit operation addressed a position at or past the size.
    #[error("sieve position out of range (size: {size}, position: {position})")]
    PositionOutOfRange {
        /// The offending position.
        position: usize,
        /// The size of the sieve at the time of the call.
        size: usize,
    },

    /// A resize (or construction) asked for more bits than storage backs.
    #[error("cannot resize above sieve capacity (capacity: {capacity}, resize: {requested})")]
    ResizeOutOfRange {
        /// The requested size.
        requested: usize,
        /// The physical capacity of the sieve.
        capacity: usize,
    },

    /// A series operation was given a step of zero.
    #[error("series step must be non-zero")]
    ZeroStep,

    /// A value outside the range covered by a factor table.
    #[error("cannot factorize {value}: factor table covers 1..{limit}")]
    Unfactorable {
        /// The value that was asked for.
        value: usize,
        /// The exclusive upper bound of the table.
        limit: usize,
    },
}

/// A specialized Result type for sieve operations.
pub type Result<T> = std::result::Result<T, Error>;
