use std::path::Path;

use colored::Colorize;

use dm_tables::{RenderOptions, TableId};

pub fn run(file: &Path, id: u32, show_free: bool, show_probabilities: bool) -> Result<(), String> {
    let doc = super::load_existing(file)?;
    let table = doc.catalog.require(TableId(id)).map_err(|e| e.to_string())?;

    let rendered = table.render(RenderOptions {
        show_probabilities,
        show_free,
    });
    print!("{rendered}");

    let rooms = doc.catalog.links().rooms_for(TableId(id));
    if !rooms.is_empty() {
        let names: Vec<String> = rooms
            .iter()
            .map(|room| match doc.dungeon.room(*room) {
                Some(r) => format!("{} ({room})", r.name),
                None => room.to_string(),
            })
            .collect();
        println!();
        println!("  {} {}", "Rolled in:".dimmed(), names.join(", "));
    }

    Ok(())
}
