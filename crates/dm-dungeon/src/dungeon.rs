//! The dungeon: rooms, the exits between them, and where the explorer is.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use dm_tables::{RoomDirectory, RoomId};

use crate::direction::Direction;
use crate::error::{DungeonError, DungeonResult};

/// Name given to the room created when the last one is deleted.
pub const SAFEROOM: &str = "Saferoom";

/// A single room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Room id.
    pub id: RoomId,
    /// Short name shown when looking around.
    pub name: String,
    /// Longer description, if one was written.
    #[serde(default)]
    pub description: Option<String>,
    /// Free-form notes, oldest first.
    #[serde(default)]
    pub notes: Vec<String>,
}

/// Rooms and directed exits.
///
/// Exits are one-way; digging creates a matching pair. A room may have
/// several exits leading to the same neighbour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dungeon {
    #[serde(default = "first_id")]
    next_room: u32,
    #[serde(default)]
    current_room: Option<RoomId>,
    #[serde(default)]
    rooms: BTreeMap<RoomId, Room>,
    #[serde(default)]
    edges: BTreeMap<RoomId, BTreeMap<RoomId, Vec<Direction>>>,
}

fn first_id() -> u32 {
    1
}

impl Default for Dungeon {
    fn default() -> Self {
        Self {
            next_room: first_id(),
            current_room: None,
            rooms: BTreeMap::new(),
            edges: BTreeMap::new(),
        }
    }
}

impl RoomDirectory for Dungeon {
    fn room_exists(&self, id: RoomId) -> bool {
        self.rooms.contains_key(&id)
    }
}

impl Dungeon {
    /// Create an empty dungeon.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Rooms
    // -----------------------------------------------------------------------

    /// Create a room. The first room ever created becomes the current one.
    pub fn create(&mut self, name: impl Into<String>) -> DungeonResult<RoomId> {
        let id = RoomId(self.next_room);
        self.next_room = self
            .next_room
            .checked_add(1)
            .ok_or(DungeonError::RoomIdsExhausted)?;
        Ok(self.insert_room(id, name.into()))
    }

    fn insert_room(&mut self, id: RoomId, name: String) -> RoomId {
        tracing::debug!(room = %id, name = %name, "created room");
        let room = Room {
            id,
            name,
            description: None,
            notes: Vec::new(),
        };
        self.rooms.insert(id, room);
        self.edges.insert(id, BTreeMap::new());
        if self.current_room.is_none() {
            self.current_room = Some(id);
        }
        id
    }

    /// Number an empty dungeon from scratch and stand in its first room.
    fn restart(&mut self, name: &str) -> RoomId {
        let first = first_id();
        self.current_room = None;
        self.next_room = first + 1;
        self.insert_room(RoomId(first), name.to_string())
    }

    /// Look up a room.
    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(&id)
    }

    /// Look up a room or fail with [`DungeonError::RoomNotFound`].
    pub fn require(&self, id: RoomId) -> DungeonResult<&Room> {
        self.rooms.get(&id).ok_or(DungeonError::RoomNotFound(id))
    }

    fn require_mut(&mut self, id: RoomId) -> DungeonResult<&mut Room> {
        self.rooms.get_mut(&id).ok_or(DungeonError::RoomNotFound(id))
    }

    /// All rooms in id order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Number of rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether there are no rooms.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Id of the room the explorer stands in.
    pub fn current_id(&self) -> DungeonResult<RoomId> {
        self.current_room
            .filter(|id| self.rooms.contains_key(id))
            .ok_or(DungeonError::NoRooms)
    }

    /// The room the explorer stands in.
    pub fn current(&self) -> DungeonResult<&Room> {
        self.require(self.current_id()?)
    }

    /// Make sure there is a valid current room. An empty dungeon restarts
    /// numbering at 1 with a room called `name`.
    pub fn ensure_current(&mut self, name: &str) -> RoomId {
        if let Ok(id) = self.current_id() {
            return id;
        }
        let first = self.rooms.keys().next().copied();
        match first {
            Some(id) => {
                self.current_room = Some(id);
                id
            }
            None => self.restart(name),
        }
    }

    /// Move to another room.
    pub fn move_to(&mut self, id: RoomId) -> DungeonResult<()> {
        self.require(id)?;
        self.current_room = Some(id);
        Ok(())
    }

    /// Delete a room and every exit touching it.
    ///
    /// Deleting the current room first walks out through its first exit.
    /// Without exits the explorer lands in the lowest-numbered remaining
    /// room, or in a fresh [`SAFEROOM`] if none remain.
    pub fn delete_room(&mut self, id: RoomId) -> DungeonResult<Room> {
        self.require(id)?;
        let way_out = if self.current_room == Some(id) {
            self.exits(id).first().copied()
        } else {
            None
        };
        if let Some(dir) = way_out {
            self.follow(dir)?;
        }

        self.free(id)?;
        self.edges.remove(&id);
        let room = self.rooms.remove(&id).ok_or(DungeonError::RoomNotFound(id))?;
        tracing::debug!(room = %id, "deleted room");

        if self.current_room == Some(id) {
            match self.rooms.keys().next().copied() {
                Some(next) => self.current_room = Some(next),
                None => {
                    self.restart(SAFEROOM);
                }
            }
        }
        Ok(room)
    }

    // -----------------------------------------------------------------------
    // Exits
    // -----------------------------------------------------------------------

    /// Directions leading out of a room, in canonical order.
    pub fn exits(&self, id: RoomId) -> Vec<Direction> {
        let mut dirs: Vec<Direction> = self
            .edges
            .get(&id)
            .into_iter()
            .flat_map(|targets| targets.values().flatten().copied())
            .collect();
        dirs.sort();
        dirs.dedup();
        dirs
    }

    /// Every exit out of a room as `(target, direction)`.
    pub fn edges_from(&self, id: RoomId) -> Vec<(RoomId, Direction)> {
        self.edges
            .get(&id)
            .into_iter()
            .flat_map(|targets| {
                targets
                    .iter()
                    .flat_map(|(to, dirs)| dirs.iter().map(move |d| (*to, *d)))
            })
            .collect()
    }

    /// Add a one-way exit from `from` to `to`.
    pub fn connect(&mut self, from: RoomId, to: RoomId, dir: Direction) -> DungeonResult<()> {
        self.require(from)?;
        self.require(to)?;
        let dirs = self
            .edges
            .entry(from)
            .or_default()
            .entry(to)
            .or_default();
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
        tracing::debug!(%from, %to, %dir, "connected rooms");
        Ok(())
    }

    /// Remove every exit from `from` to `to`.
    pub fn disconnect(&mut self, from: RoomId, to: RoomId) -> DungeonResult<()> {
        self.require(from)?;
        let removed = self
            .edges
            .get_mut(&from)
            .and_then(|targets| targets.remove(&to));
        if removed.is_none() {
            return Err(DungeonError::NotConnected { from, to });
        }
        tracing::debug!(%from, %to, "disconnected rooms");
        Ok(())
    }

    /// Remove every exit into and out of a room.
    pub fn free(&mut self, id: RoomId) -> DungeonResult<()> {
        self.require(id)?;
        if let Some(targets) = self.edges.get_mut(&id) {
            targets.clear();
        }
        for targets in self.edges.values_mut() {
            targets.remove(&id);
        }
        Ok(())
    }

    /// Walk out of the current room. Returns the room arrived in.
    pub fn follow(&mut self, dir: Direction) -> DungeonResult<RoomId> {
        let here = self.current_id()?;
        let target = self
            .edges_from(here)
            .into_iter()
            .find(|(_, d)| *d == dir)
            .map(|(to, _)| to)
            .ok_or(DungeonError::NoPath(dir))?;
        self.move_to(target)?;
        Ok(target)
    }

    /// Create a new room beyond a new exit, link it both ways, and walk in.
    pub fn dig(&mut self, dir: Direction, name: impl Into<String>) -> DungeonResult<RoomId> {
        let here = self.current_id()?;
        if self.exits(here).contains(&dir) {
            return Err(DungeonError::PathExists(dir));
        }
        let there = self.create(name)?;
        self.connect(here, there, dir)?;
        self.connect(there, here, dir.opposite())?;
        self.move_to(there)?;
        Ok(there)
    }

    // -----------------------------------------------------------------------
    // Notes and descriptions
    // -----------------------------------------------------------------------

    /// Append a note to a room.
    pub fn add_note(&mut self, id: RoomId, text: impl Into<String>) -> DungeonResult<()> {
        self.require_mut(id)?.notes.push(text.into());
        Ok(())
    }

    /// A room's notes, oldest first.
    pub fn notes(&self, id: RoomId) -> DungeonResult<&[String]> {
        Ok(&self.require(id)?.notes)
    }

    /// Delete a note by index and return it.
    pub fn delete_note(&mut self, id: RoomId, index: usize) -> DungeonResult<String> {
        let room = self.require_mut(id)?;
        if room.notes.is_empty() {
            return Err(DungeonError::NoNotes(id));
        }
        if index >= room.notes.len() {
            return Err(DungeonError::IndexOutOfBounds {
                index,
                len: room.notes.len(),
            });
        }
        Ok(room.notes.remove(index))
    }

    /// Replace a room's description.
    pub fn set_description(&mut self, id: RoomId, text: impl Into<String>) -> DungeonResult<()> {
        self.require_mut(id)?.description = Some(text.into());
        Ok(())
    }

    /// Name, id, and exits of the current room.
    pub fn look(&self) -> DungeonResult<String> {
        let room = self.current()?;
        let exits = self.exits(room.id);
        let exits = if exits.is_empty() {
            "No exits".to_string()
        } else {
            exits
                .iter()
                .map(|d| d.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        Ok(format!("{} : {}\n{}", room.name, room.id, exits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_rooms() -> (Dungeon, RoomId, RoomId) {
        let mut d = Dungeon::new();
        let a = d.create("Hall").unwrap();
        let b = d.dig(Direction::N, "Crypt").unwrap();
        (d, a, b)
    }

    #[test]
    fn first_room_becomes_current() {
        let mut d = Dungeon::new();
        assert!(matches!(d.current(), Err(DungeonError::NoRooms)));
        let a = d.create("Hall").unwrap();
        d.create("Kitchen").unwrap();
        assert_eq!(d.current_id().unwrap(), a);
        assert_eq!(a, RoomId(1));
    }

    #[test]
    fn dig_links_both_ways_and_moves() {
        let (d, a, b) = two_rooms();
        assert_eq!(d.current_id().unwrap(), b);
        assert_eq!(d.exits(a), vec![Direction::N]);
        assert_eq!(d.exits(b), vec![Direction::S]);
    }

    #[test]
    fn dig_refuses_existing_exit() {
        let (mut d, a, _) = two_rooms();
        d.move_to(a).unwrap();
        assert!(matches!(
            d.dig(Direction::N, "Again"),
            Err(DungeonError::PathExists(Direction::N))
        ));
        assert_eq!(d.len(), 2);
    }

    #[test]
    fn follow_and_no_path() {
        let (mut d, a, _) = two_rooms();
        assert_eq!(d.follow(Direction::S).unwrap(), a);
        assert!(matches!(
            d.follow(Direction::E),
            Err(DungeonError::NoPath(Direction::E))
        ));
    }

    #[test]
    fn exits_are_in_canonical_order() {
        let mut d = Dungeon::new();
        let a = d.create("Hub").unwrap();
        let b = d.create("Other").unwrap();
        d.connect(a, b, Direction::Down).unwrap();
        d.connect(a, b, Direction::W).unwrap();
        d.connect(a, b, Direction::N).unwrap();
        d.connect(a, b, Direction::N).unwrap();
        assert_eq!(d.exits(a), vec![Direction::N, Direction::W, Direction::Down]);
    }

    #[test]
    fn connect_requires_rooms() {
        let mut d = Dungeon::new();
        let a = d.create("Hall").unwrap();
        assert!(matches!(
            d.connect(a, RoomId(9), Direction::N),
            Err(DungeonError::RoomNotFound(RoomId(9)))
        ));
    }

    #[test]
    fn disconnect_one_way() {
        let (mut d, a, b) = two_rooms();
        d.disconnect(a, b).unwrap();
        assert!(d.exits(a).is_empty());
        assert_eq!(d.exits(b), vec![Direction::S]);
        assert!(matches!(
            d.disconnect(a, b),
            Err(DungeonError::NotConnected { .. })
        ));
    }

    #[test]
    fn free_clears_both_directions() {
        let (mut d, a, b) = two_rooms();
        d.free(b).unwrap();
        assert!(d.exits(a).is_empty());
        assert!(d.exits(b).is_empty());
    }

    #[test]
    fn delete_current_room_walks_out() {
        let (mut d, a, b) = two_rooms();
        let removed = d.delete_room(b).unwrap();
        assert_eq!(removed.name, "Crypt");
        assert_eq!(d.current_id().unwrap(), a);
        assert!(d.exits(a).is_empty());
        assert!(!d.room_exists(b));
    }

    #[test]
    fn delete_isolated_current_room_picks_another() {
        let mut d = Dungeon::new();
        let a = d.create("Hall").unwrap();
        let b = d.create("Vault").unwrap();
        d.delete_room(a).unwrap();
        assert_eq!(d.current_id().unwrap(), b);
    }

    #[test]
    fn delete_last_room_recreates_saferoom() {
        let mut d = Dungeon::new();
        d.create("Hall").unwrap();
        d.create("Vault").unwrap();
        d.delete_room(RoomId(2)).unwrap();
        d.delete_room(RoomId(1)).unwrap();
        let here = d.current().unwrap();
        assert_eq!(here.name, SAFEROOM);
        assert_eq!(here.id, RoomId(1));
    }

    #[test]
    fn delete_other_room_keeps_position() {
        let (mut d, a, b) = two_rooms();
        d.move_to(b).unwrap();
        d.delete_room(a).unwrap();
        assert_eq!(d.current_id().unwrap(), b);
        assert!(matches!(
            d.delete_room(a),
            Err(DungeonError::RoomNotFound(_))
        ));
    }

    #[test]
    fn notes() {
        let mut d = Dungeon::new();
        let a = d.create("Hall").unwrap();
        assert!(matches!(d.delete_note(a, 0), Err(DungeonError::NoNotes(_))));
        d.add_note(a, "Smells of sulphur").unwrap();
        d.add_note(a, "Lever on north wall").unwrap();
        assert!(matches!(
            d.delete_note(a, 2),
            Err(DungeonError::IndexOutOfBounds { index: 2, len: 2 })
        ));
        assert_eq!(d.delete_note(a, 0).unwrap(), "Smells of sulphur");
        assert_eq!(d.notes(a).unwrap(), &["Lever on north wall".to_string()]);
    }

    #[test]
    fn look_lists_exits() {
        let (d, _, _) = two_rooms();
        assert_eq!(d.look().unwrap(), "Crypt : 2\ns");
        let mut lonely = Dungeon::new();
        lonely.create("Cell").unwrap();
        assert_eq!(lonely.look().unwrap(), "Cell : 1\nNo exits");
    }

    #[test]
    fn room_ids_run_out_at_u32_max() {
        let json = serde_json::json!({
            "next_room": u32::MAX,
            "current_room": 7,
            "rooms": {"7": {"id": 7, "name": "Hall"}}
        });
        let mut d: Dungeon = serde_json::from_value(json).unwrap();
        assert!(matches!(d.create("Late"), Err(DungeonError::RoomIdsExhausted)));
        assert!(matches!(
            d.dig(Direction::N, "Late"),
            Err(DungeonError::RoomIdsExhausted)
        ));
        assert_eq!(d.len(), 1);
        assert!(d.exits(RoomId(7)).is_empty());

        d.delete_room(RoomId(7)).unwrap();
        assert_eq!(d.current().unwrap().name, SAFEROOM);
        assert_eq!(d.create("Next").unwrap(), RoomId(2));
    }

    #[test]
    fn ensure_current_repairs_dangling_pointer() {
        let mut d = Dungeon::new();
        assert_eq!(d.ensure_current("Entrance"), RoomId(1));
        assert_eq!(d.current().unwrap().name, "Entrance");

        let json = serde_json::json!({
            "next_room": 4,
            "current_room": 9,
            "rooms": {"3": {"id": 3, "name": "Pit"}}
        });
        let mut loaded: Dungeon = serde_json::from_value(json).unwrap();
        assert_eq!(loaded.ensure_current("Entrance"), RoomId(3));
    }

    #[test]
    fn serde_round_trip() {
        let (mut d, a, _) = two_rooms();
        d.add_note(a, "note").unwrap();
        d.set_description(a, "A long hall.").unwrap();
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["edges"]["1"]["2"], serde_json::json!(["n"]));
        let back: Dungeon = serde_json::from_value(json).unwrap();
        assert_eq!(back, d);
    }
}
