//! Registry of range tables and their room links.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TableError, TableResult};
use crate::links::{RoomDirectory, RoomId, RoomLinks};
use crate::table::RangeTable;

/// Identifier of a table inside a [`TableRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(pub u32);

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owns every table of a dungeon together with the room links.
///
/// Ids are handed out as one more than the largest id in use, so an id only
/// comes back after the table holding the current maximum is deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RegistryDocument")]
pub struct TableRegistry {
    tables: BTreeMap<TableId, RangeTable>,
    rooms: RoomLinks,
}

#[derive(Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    tables: BTreeMap<TableId, RangeTable>,
    #[serde(default)]
    rooms: RoomLinks,
}

impl From<RegistryDocument> for TableRegistry {
    fn from(doc: RegistryDocument) -> Self {
        let RegistryDocument { tables, mut rooms } = doc;
        rooms.retain_tables(|id| {
            let known = tables.contains_key(&id);
            if !known {
                tracing::warn!(table = %id, "dropping link to missing table");
            }
            known
        });
        Self { tables, rooms }
    }
}

fn id_after_last(tables: &BTreeMap<TableId, RangeTable>) -> Option<TableId> {
    match tables.keys().next_back() {
        Some(last) => last.0.checked_add(1).map(TableId),
        None => Some(TableId(1)),
    }
}

impl TableRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next added table will get, or `None` once the largest id
    /// in use is `u32::MAX`.
    pub fn next_id(&self) -> Option<TableId> {
        id_after_last(&self.tables)
    }

    /// Add a table under a fresh id.
    pub fn add(&mut self, table: RangeTable) -> TableResult<TableId> {
        let id = self.next_id().ok_or(TableError::TableIdsExhausted)?;
        tracing::debug!(table = %id, name = table.name(), "added table");
        self.tables.insert(id, table);
        Ok(id)
    }

    /// Look up a table.
    pub fn get(&self, id: TableId) -> Option<&RangeTable> {
        self.tables.get(&id)
    }

    /// Look up a table for editing.
    pub fn get_mut(&mut self, id: TableId) -> Option<&mut RangeTable> {
        self.tables.get_mut(&id)
    }

    /// Look up a table or fail with [`TableError::TableNotFound`].
    pub fn require(&self, id: TableId) -> TableResult<&RangeTable> {
        self.get(id).ok_or(TableError::TableNotFound(id))
    }

    /// Look up a table for editing or fail with [`TableError::TableNotFound`].
    pub fn require_mut(&mut self, id: TableId) -> TableResult<&mut RangeTable> {
        self.get_mut(id).ok_or(TableError::TableNotFound(id))
    }

    /// Whether a table with this id exists.
    pub fn contains(&self, id: TableId) -> bool {
        self.tables.contains_key(&id)
    }

    /// All tables in id order.
    pub fn iter(&self) -> impl Iterator<Item = (TableId, &RangeTable)> {
        self.tables.iter().map(|(id, table)| (*id, table))
    }

    /// Number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the registry holds no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// The room links.
    pub fn links(&self) -> &RoomLinks {
        &self.rooms
    }

    /// Tables linked to a room, in link order.
    pub fn tables_for_room(&self, room: RoomId) -> &[TableId] {
        self.rooms.tables_for(room)
    }

    /// Link a table to a room. Linking twice is not an error.
    pub fn associate(
        &mut self,
        table: TableId,
        room: RoomId,
        rooms: &impl RoomDirectory,
    ) -> TableResult<()> {
        if !rooms.room_exists(room) {
            return Err(TableError::RoomNotFound(room));
        }
        if !self.contains(table) {
            return Err(TableError::TableNotFound(table));
        }
        if self.rooms.link(room, table) {
            tracing::debug!(%table, %room, "linked table to room");
        }
        Ok(())
    }

    /// Remove the link between a table and a room.
    ///
    /// Failure reasons are checked in order: unknown room, unknown table,
    /// room without links, link not present.
    pub fn dissociate(
        &mut self,
        table: TableId,
        room: RoomId,
        rooms: &impl RoomDirectory,
    ) -> TableResult<()> {
        if !rooms.room_exists(room) {
            return Err(TableError::RoomNotFound(room));
        }
        if !self.contains(table) {
            return Err(TableError::TableNotFound(table));
        }
        self.rooms.unlink(room, table)?;
        tracing::debug!(%table, %room, "unlinked table from room");
        Ok(())
    }

    /// Delete a table and every link to it.
    pub fn delete(&mut self, id: TableId) -> TableResult<RangeTable> {
        if !self.contains(id) {
            return Err(TableError::TableNotFound(id));
        }
        let unlinked = self.rooms.forget_table(id);
        let table = self
            .tables
            .remove(&id)
            .ok_or(TableError::TableNotFound(id))?;
        tracing::debug!(table = %id, unlinked, "deleted table");
        Ok(table)
    }

    /// Forget a room's links. Its tables stay in the registry.
    pub fn drop_room(&mut self, room: RoomId) {
        let dropped = self.rooms.drop_room(room);
        if !dropped.is_empty() {
            tracing::debug!(%room, links = dropped.len(), "dropped room links");
        }
    }

    /// Forget links to rooms `rooms` does not know, such as rooms deleted
    /// outside this registry.
    pub fn prune_rooms(&mut self, rooms: &impl RoomDirectory) {
        for room in self.rooms.retain_rooms(rooms) {
            tracing::warn!(%room, "dropping links of missing room");
        }
    }

    /// Copy in every table of `other` that is not already here.
    ///
    /// A table counts as already here when one with the same name and the
    /// same dice exists; entries are not compared. Ids and room links of
    /// `other` are not carried over. Returns the ids given to added tables.
    /// If ids run out, nothing is merged.
    pub fn merge_from(&mut self, other: &TableRegistry) -> TableResult<Vec<TableId>> {
        let mut merged = self.tables.clone();
        let mut added = Vec::new();
        for (source_id, table) in other.iter() {
            let duplicate = merged
                .values()
                .any(|t| t.name() == table.name() && t.dice() == table.dice());
            if duplicate {
                tracing::debug!(source = %source_id, name = table.name(), "skipped duplicate table");
                continue;
            }
            let id = id_after_last(&merged).ok_or(TableError::TableIdsExhausted)?;
            merged.insert(id, table.clone());
            added.push(id);
        }
        self.tables = merged;
        tracing::info!(added = added.len(), offered = other.len(), "merged tables");
        Ok(added)
    }
}
