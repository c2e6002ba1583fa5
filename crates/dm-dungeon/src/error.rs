//! Error types for the dungeon store and session.

use dm_tables::{RoomId, TableError};

use crate::direction::Direction;

/// Result type for dungeon operations.
pub type DungeonResult<T> = Result<T, DungeonError>;

/// Errors that can occur while editing a dungeon or running a session.
#[derive(Debug, thiserror::Error)]
pub enum DungeonError {
    /// The dungeon has no rooms yet.
    #[error("the dungeon has no rooms")]
    NoRooms,

    /// Every room id up to `u32::MAX` has been handed out.
    #[error("no room ids left")]
    RoomIdsExhausted,

    /// No room with this id exists.
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    /// The first room has no path to the second.
    #[error("room {from} is not connected to room {to}")]
    NotConnected {
        /// Room the path would start in.
        from: RoomId,
        /// Room the path would lead to.
        to: RoomId,
    },

    /// The current room has no exit that way.
    #[error("no path {0}")]
    NoPath(Direction),

    /// The current room already has an exit that way.
    #[error("path {0} already exists")]
    PathExists(Direction),

    /// A direction could not be parsed.
    #[error("unknown direction: {0}")]
    UnknownDirection(String),

    /// The room has no notes.
    #[error("room {0} has no notes")]
    NoNotes(RoomId),

    /// A list index does not exist.
    #[error("index {index} out of bounds (have {len})")]
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// Number of items available.
        len: usize,
    },

    /// A number could not be parsed.
    #[error("not a number: {0:?}")]
    InvalidNumber(String),

    /// A command was called with the wrong arguments.
    #[error("usage: {0}")]
    Usage(String),

    /// The command is not known.
    #[error("unrecognized command: {0}")]
    UnknownCommand(String),

    /// A table operation failed.
    #[error(transparent)]
    Table(#[from] TableError),

    /// Reading or writing the document failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid JSON for a dungeon.
    #[error("invalid document: {0}")]
    Json(#[from] serde_json::Error),
}
