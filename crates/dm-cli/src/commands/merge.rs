use std::path::Path;

pub fn run(file: &Path, other: &Path) -> Result<(), String> {
    let mut doc = super::load_existing(file)?;
    let source = super::load_existing(other)?;

    let added = doc
        .catalog
        .merge_from(&source.catalog)
        .map_err(|e| e.to_string())?;
    if added.is_empty() {
        println!("  No new tables.");
        return Ok(());
    }

    doc.save(file)
        .map_err(|e| format!("failed to save {}: {e}", file.display()))?;

    for id in &added {
        if let Some(table) = doc.catalog.get(*id) {
            println!("  + {id}: {} ({})", table.name(), table.dice());
        }
    }
    println!();
    println!("  {} tables added", added.len());

    Ok(())
}
