use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;

use dm_dungeon::{Session, SessionConfig};

pub fn run(
    file: &Path,
    seed: Option<u64>,
    show_free: bool,
    show_probabilities: bool,
    autosave: bool,
) -> Result<(), String> {
    let mut config = SessionConfig::default()
        .with_free_slots(show_free)
        .with_probabilities(show_probabilities)
        .with_autosave(autosave);
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }

    let mut session =
        Session::open(file, config).map_err(|e| format!("failed to open {}: {e}", file.display()))?;

    println!("  {} {}", "Dungeme".bold(), file.display());
    println!("  Type 'help' for commands, 'quit' to exit.\n");
    if let Ok(look) = session.execute("look") {
        println!("{look}\n");
    }

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match session.execute(input) {
            Ok(output) => {
                if !output.is_empty() {
                    println!("{output}\n");
                }
                if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("q") {
                    break;
                }
            }
            Err(e) => {
                println!("{}\n", e.to_string().yellow());
            }
        }
    }

    if session.config().autosave {
        session
            .save()
            .map_err(|e| format!("failed to save {}: {e}", file.display()))?;
    }
    Ok(())
}
