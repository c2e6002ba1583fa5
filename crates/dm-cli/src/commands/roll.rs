use std::path::Path;

use colored::Colorize;
use rand::SeedableRng;
use rand::rngs::StdRng;

use dm_tables::TableId;

pub fn run(file: &Path, id: u32, times: u32, seed: Option<u64>, sum: bool) -> Result<(), String> {
    let doc = super::load_existing(file)?;
    let table = doc.catalog.require(TableId(id)).map_err(|e| e.to_string())?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    println!("  {} ({})", table.name().bold(), table.dice());
    for _ in 0..times {
        let roll = if sum {
            table.roll_dice(&mut rng)
        } else {
            table.roll(&mut rng)
        };
        match roll.text {
            Some(text) => println!("  {:>4}  {text}", roll.value),
            None => println!("  {:>4}  {}", roll.value, "(nothing)".dimmed()),
        }
    }

    Ok(())
}
