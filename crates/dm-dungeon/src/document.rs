//! The persisted document: one JSON file holding a whole dungeon.
//!
//! ```json
//! {
//!   "dungeon": {"next_room": 3, "current_room": 1, "rooms": {...}, "edges": {...}},
//!   "catalog": {"tables": {"1": {...}}, "rooms": {"1": [1]}}
//! }
//! ```
//!
//! The file is read and written whole. Missing sections load as empty.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use dm_tables::{RoomId, TableRegistry};

use crate::dungeon::Dungeon;
use crate::error::DungeonResult;

/// Everything a session edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Rooms and exits.
    #[serde(default)]
    pub dungeon: Dungeon,
    /// Range tables and their room links.
    #[serde(default)]
    pub catalog: TableRegistry,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a document. A missing file yields an empty document. Table links
    /// to rooms the dungeon does not hold are dropped.
    pub fn load(path: &Path) -> DungeonResult<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no document yet, starting empty");
                return Ok(Self::new());
            }
            Err(e) => return Err(e.into()),
        };
        let mut doc: Self = serde_json::from_str(&text)?;
        doc.catalog.prune_rooms(&doc.dungeon);
        tracing::info!(
            path = %path.display(),
            rooms = doc.dungeon.len(),
            tables = doc.catalog.len(),
            "loaded document"
        );
        Ok(doc)
    }

    /// Write the document as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> DungeonResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        tracing::info!(path = %path.display(), "saved document");
        Ok(())
    }

    /// Delete a room and forget its table links.
    pub fn delete_room(&mut self, id: RoomId) -> DungeonResult<()> {
        self.dungeon.delete_room(id)?;
        self.catalog.drop_room(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dm_tables::{DiceSpec, RangeTable};
    use tempfile::TempDir;

    fn sample() -> Document {
        let mut doc = Document::new();
        let hall = doc.dungeon.create("Hall").unwrap();
        let mut table = RangeTable::new(DiceSpec::new(2, 6).unwrap(), "Wandering");
        table.assign(2, 4, "Goblins").unwrap();
        table.assign(5, 12, "").unwrap();
        let id = doc.catalog.add(table).unwrap();
        doc.catalog.associate(id, hall, &doc.dungeon).unwrap();
        doc
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let doc = Document::load(&dir.path().join("none.json")).unwrap();
        assert_eq!(doc, Document::new());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dungeon.json");
        let doc = sample();
        doc.save(&path).unwrap();
        assert_eq!(Document::load(&path).unwrap(), doc);
    }

    #[test]
    fn empty_object_loads() {
        let doc: Document = serde_json::from_str("{}").unwrap();
        assert!(doc.dungeon.is_empty());
        assert!(doc.catalog.is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{\"catalog\": {\"tables\": {\"1\": {\"dice\": 1}}}}").unwrap();
        assert!(Document::load(&path).is_err());
    }

    #[test]
    fn load_drops_links_to_missing_rooms() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stale.json");
        let json = serde_json::json!({
            "dungeon": {"next_room": 2, "current_room": 1,
                        "rooms": {"1": {"id": 1, "name": "Hall"}}},
            "catalog": {
                "tables": {"1": {"dice": 1, "sides": 6, "name": "T"}},
                "rooms": {"1": [1], "5": [1]}
            }
        });
        fs::write(&path, json.to_string()).unwrap();
        let doc = Document::load(&path).unwrap();
        assert_eq!(doc.catalog.tables_for_room(RoomId(1)), &[dm_tables::TableId(1)]);
        assert!(doc.catalog.tables_for_room(RoomId(5)).is_empty());
    }

    #[test]
    fn emptied_dungeon_does_not_inherit_stale_links() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stale.json");
        let json = serde_json::json!({
            "catalog": {
                "tables": {"1": {"dice": 1, "sides": 6, "name": "T"}},
                "rooms": {"1": [1]}
            }
        });
        fs::write(&path, json.to_string()).unwrap();
        let mut doc = Document::load(&path).unwrap();
        let entrance = doc.dungeon.ensure_current("Entrance");
        assert_eq!(entrance, RoomId(1));
        assert!(doc.catalog.tables_for_room(entrance).is_empty());
    }

    #[test]
    fn delete_room_drops_links() {
        let mut doc = sample();
        let hall = doc.dungeon.current_id().unwrap();
        doc.delete_room(hall).unwrap();
        assert!(doc.catalog.tables_for_room(hall).is_empty());
        assert_eq!(doc.catalog.len(), 1);
    }
}
