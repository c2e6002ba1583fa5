//! Dice range tables for Dungeme.
//!
//! A range table maps spans of dice sums to text outcomes, the way random
//! encounter, loot, and event tables work at the gaming table. This crate
//! provides the table engine (overlap-resolving inserts, free slots, exact
//! odds, rolling, rendering), its persisted form, and a registry that owns
//! tables and links them to dungeon rooms.

pub mod codec;
pub mod dice;
pub mod error;
pub mod links;
pub mod odds;
pub mod registry;
pub mod span;
pub mod table;

pub use codec::TableDocument;
pub use dice::{DiceSpec, MAX_POOL_WORK};
pub use error::{TableError, TableResult};
pub use links::{RoomDirectory, RoomId, RoomLinks};
pub use odds::SumDistribution;
pub use registry::{TableId, TableRegistry};
pub use span::Span;
pub use table::{FreeSlots, RangeTable, RenderOptions, TableRoll, TableRow};
