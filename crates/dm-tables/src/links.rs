//! Links between dungeon rooms and the tables rolled in them.
//!
//! Links do not own anything: a room may list several tables and a table may
//! be listed under several rooms. Rooms themselves live elsewhere and are
//! reached through [`RoomDirectory`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TableError, TableResult};
use crate::registry::TableId;

/// Identifier of a dungeon room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u32);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Answers whether a room exists. Implemented by the room store.
pub trait RoomDirectory {
    /// Whether a room with this id exists.
    fn room_exists(&self, id: RoomId) -> bool;
}

/// Room id to the ordered, duplicate-free list of linked table ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomLinks {
    rooms: BTreeMap<RoomId, Vec<TableId>>,
}

impl RoomLinks {
    /// Create an empty link set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Link a table to a room. Returns false if the link already existed.
    pub fn link(&mut self, room: RoomId, table: TableId) -> bool {
        let tables = self.rooms.entry(room).or_default();
        if tables.contains(&table) {
            return false;
        }
        tables.push(table);
        true
    }

    /// Remove one link.
    ///
    /// Fails with [`TableError::RoomHasNoTables`] if the room lists nothing,
    /// or [`TableError::NotLinked`] if the room lists other tables only.
    pub fn unlink(&mut self, room: RoomId, table: TableId) -> TableResult<()> {
        let tables = self
            .rooms
            .get_mut(&room)
            .filter(|t| !t.is_empty())
            .ok_or(TableError::RoomHasNoTables(room))?;
        let pos = tables
            .iter()
            .position(|t| *t == table)
            .ok_or(TableError::NotLinked { table, room })?;
        tables.remove(pos);
        if tables.is_empty() {
            self.rooms.remove(&room);
        }
        Ok(())
    }

    /// Tables linked to a room, in link order.
    pub fn tables_for(&self, room: RoomId) -> &[TableId] {
        self.rooms.get(&room).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rooms a table is linked to.
    pub fn rooms_for(&self, table: TableId) -> Vec<RoomId> {
        self.rooms
            .iter()
            .filter(|(_, tables)| tables.contains(&table))
            .map(|(room, _)| *room)
            .collect()
    }

    /// Remove every link to `table`. Returns how many rooms lost it.
    pub fn forget_table(&mut self, table: TableId) -> usize {
        let mut removed = 0;
        for tables in self.rooms.values_mut() {
            let before = tables.len();
            tables.retain(|t| *t != table);
            removed += before - tables.len();
        }
        self.rooms.retain(|_, tables| !tables.is_empty());
        removed
    }

    /// Remove a room's links entirely, returning what it listed.
    pub fn drop_room(&mut self, room: RoomId) -> Vec<TableId> {
        self.rooms.remove(&room).unwrap_or_default()
    }

    /// Keep only links whose table satisfies `keep`.
    pub(crate) fn retain_tables(&mut self, mut keep: impl FnMut(TableId) -> bool) {
        for tables in self.rooms.values_mut() {
            tables.retain(|t| keep(*t));
        }
        self.rooms.retain(|_, tables| !tables.is_empty());
    }

    /// Drop the links of every room `rooms` does not know. Returns the rooms
    /// dropped.
    pub fn retain_rooms(&mut self, rooms: &impl RoomDirectory) -> Vec<RoomId> {
        let stale: Vec<RoomId> = self
            .rooms
            .keys()
            .copied()
            .filter(|room| !rooms.room_exists(*room))
            .collect();
        for room in &stale {
            self.rooms.remove(room);
        }
        stale
    }

    /// All rooms with at least one link, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (RoomId, &[TableId])> {
        self.rooms
            .iter()
            .map(|(room, tables)| (*room, tables.as_slice()))
    }

    /// Whether no room has any link.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const R1: RoomId = RoomId(1);
    const R2: RoomId = RoomId(2);
    const T1: TableId = TableId(1);
    const T2: TableId = TableId(2);

    #[test]
    fn link_is_idempotent_and_ordered() {
        let mut links = RoomLinks::new();
        assert!(links.link(R1, T2));
        assert!(links.link(R1, T1));
        assert!(!links.link(R1, T2));
        assert_eq!(links.tables_for(R1), &[T2, T1]);
    }

    #[test]
    fn unlink_reasons() {
        let mut links = RoomLinks::new();
        assert_eq!(links.unlink(R1, T1), Err(TableError::RoomHasNoTables(R1)));
        links.link(R1, T1);
        assert_eq!(
            links.unlink(R1, T2),
            Err(TableError::NotLinked { table: T2, room: R1 })
        );
        assert_eq!(links.unlink(R1, T1), Ok(()));
        assert!(links.tables_for(R1).is_empty());
        assert!(links.is_empty());
    }

    #[test]
    fn forget_table_everywhere() {
        let mut links = RoomLinks::new();
        links.link(R1, T1);
        links.link(R1, T2);
        links.link(R2, T1);
        assert_eq!(links.forget_table(T1), 2);
        assert_eq!(links.tables_for(R1), &[T2]);
        assert!(links.tables_for(R2).is_empty());
        assert_eq!(links.rooms_for(T1), Vec::<RoomId>::new());
    }

    #[test]
    fn drop_room_keeps_others() {
        let mut links = RoomLinks::new();
        links.link(R1, T1);
        links.link(R2, T1);
        assert_eq!(links.drop_room(R1), vec![T1]);
        assert_eq!(links.rooms_for(T1), vec![R2]);
        assert!(links.drop_room(R1).is_empty());
    }

    #[test]
    fn serializes_as_string_keyed_map() {
        let mut links = RoomLinks::new();
        links.link(R2, T1);
        links.link(R2, T2);
        let json = serde_json::to_value(&links).unwrap();
        assert_eq!(json, serde_json::json!({"2": [1, 2]}));
        let back: RoomLinks = serde_json::from_value(json).unwrap();
        assert_eq!(back, links);
    }
}
