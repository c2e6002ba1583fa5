//! CLI frontend for Dungeme, a dungeon and random table builder.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "dungeme",
    about = "Dungeme: dig dungeons and roll on range tables",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log engine activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session on a dungeon file
    Play {
        /// Dungeon file (created on first save if missing)
        file: PathBuf,

        /// RNG seed for reproducible rolls
        #[arg(short, long)]
        seed: Option<u64>,

        /// List free slots when showing tables
        #[arg(long)]
        free: bool,

        /// Hide entry probabilities when showing tables
        #[arg(long)]
        no_probabilities: bool,

        /// Only save on an explicit `save`
        #[arg(long)]
        no_autosave: bool,
    },

    /// List the tables in a dungeon file
    Tables {
        /// Dungeon file
        file: PathBuf,
    },

    /// Print one table
    Show {
        /// Dungeon file
        file: PathBuf,

        /// Table id
        id: u32,

        /// Also list free slots
        #[arg(long)]
        free: bool,

        /// Hide entry probabilities
        #[arg(long)]
        no_probabilities: bool,
    },

    /// Roll on a table
    Roll {
        /// Dungeon file
        file: PathBuf,

        /// Table id
        id: u32,

        /// Number of rolls
        #[arg(short = 'n', long, default_value = "1")]
        times: u32,

        /// RNG seed for reproducible rolls
        #[arg(short, long)]
        seed: Option<u64>,

        /// Sum physical dice instead of drawing evenly from the range
        #[arg(long)]
        sum: bool,
    },

    /// Copy tables from another dungeon file, skipping ones already present
    Merge {
        /// Dungeon file to merge into
        file: PathBuf,

        /// Dungeon file to take tables from
        other: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Play {
            file,
            seed,
            free,
            no_probabilities,
            no_autosave,
        } => commands::play::run(&file, seed, free, !no_probabilities, !no_autosave),
        Commands::Tables { file } => commands::tables::run(&file),
        Commands::Show {
            file,
            id,
            free,
            no_probabilities,
        } => commands::show::run(&file, id, free, !no_probabilities),
        Commands::Roll {
            file,
            id,
            times,
            seed,
            sum,
        } => commands::roll::run(&file, id, times, seed, sum),
        Commands::Merge { file, other } => commands::merge::run(&file, &other),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
