//! Dungeon mapping and session engine for Dungeme.
//!
//! Holds the room graph a game master digs out room by room, the notes and
//! descriptions attached to rooms, and the JSON document that persists a
//! dungeon together with its range tables. [`Session`] drives everything
//! from line-based commands.

pub mod config;
pub mod direction;
pub mod document;
pub mod dungeon;
pub mod error;
pub mod session;

pub use config::SessionConfig;
pub use direction::Direction;
pub use document::Document;
pub use dungeon::{Dungeon, Room, SAFEROOM};
pub use error::{DungeonError, DungeonResult};
pub use session::{ENTRANCE, Session};
