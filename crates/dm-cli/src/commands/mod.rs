pub mod merge;
pub mod play;
pub mod roll;
pub mod show;
pub mod tables;

use std::path::Path;

use dm_dungeon::Document;

/// Load a dungeon file that must already exist.
fn load_existing(file: &Path) -> Result<Document, String> {
    if !file.exists() {
        return Err(format!("no such dungeon file: {}", file.display()));
    }
    Document::load(file).map_err(|e| format!("failed to read {}: {e}", file.display()))
}
