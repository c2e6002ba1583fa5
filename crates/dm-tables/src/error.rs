//! Error types for range tables and the table registry.

use crate::links::RoomId;
use crate::registry::TableId;

/// Errors that can occur while editing or loading range tables.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// The start of a range lies after its end.
    #[error("invalid range: {start} is greater than {end}")]
    InvalidRange {
        /// Lower bound as given.
        start: u32,
        /// Upper bound as given.
        end: u32,
    },

    /// A range reaches outside the values the table's dice can produce.
    #[error("range {start}-{end} is outside the table domain {low}-{high}")]
    OutOfDomain {
        /// Lower bound of the rejected range.
        start: u32,
        /// Upper bound of the rejected range.
        end: u32,
        /// Smallest obtainable sum.
        low: u32,
        /// Largest obtainable sum.
        high: u32,
    },

    /// Two stored entries cover the same value.
    #[error("entries {first} and {second} overlap")]
    Overlap {
        /// The earlier of the two overlapping ranges.
        first: String,
        /// The later of the two overlapping ranges.
        second: String,
    },

    /// A dice descriptor such as `2d6` is malformed or out of bounds.
    #[error("invalid dice: {0}")]
    InvalidDice(String),

    /// A range could not be parsed from text.
    #[error("invalid range text: {0:?}")]
    InvalidSpan(String),

    /// No table with this id exists in the registry.
    #[error("table {0} not found")]
    TableNotFound(TableId),

    /// No room with this id exists.
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    /// The room exists but has no tables linked to it.
    #[error("room {0} has no tables")]
    RoomHasNoTables(RoomId),

    /// Every table id up to `u32::MAX` is taken.
    #[error("no table ids left")]
    TableIdsExhausted,

    /// The room has tables, but not this one.
    #[error("table {table} is not linked to room {room}")]
    NotLinked {
        /// The table that was expected to be linked.
        table: TableId,
        /// The room that was inspected.
        room: RoomId,
    },
}

/// Convenience result type for table operations.
pub type TableResult<T> = Result<T, TableError>;
