use std::path::Path;

use comfy_table::{ContentArrangement, Table};

pub fn run(file: &Path) -> Result<(), String> {
    let doc = super::load_existing(file)?;
    let catalog = &doc.catalog;

    if catalog.is_empty() {
        println!("  No tables.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Name", "Dice", "Entries", "Free", "Rooms"]);

    for (id, range_table) in catalog.iter() {
        let rooms = catalog.links().rooms_for(id);
        let rooms = if rooms.is_empty() {
            "—".to_string()
        } else {
            rooms
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        table.add_row(vec![
            id.to_string(),
            range_table.name().to_string(),
            range_table.dice().to_string(),
            range_table.len().to_string(),
            range_table.free_slots().count().to_string(),
            rooms,
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} tables", catalog.len());

    Ok(())
}
