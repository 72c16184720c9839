//! Mezze CLI - catalog seeding and validation tools.
//!
//! # Usage
//!
//! ```bash
//! # Write a fresh starter catalog document
//! mezze-cli seed --data-file data/catalog.json
//!
//! # Validate a catalog document and its image directory
//! mezze-cli check --data-file data/catalog.json --image-dir data/images
//! ```
//!
//! # Commands
//!
//! - `seed` - Write the default starter catalog
//! - `check` - Validate a catalog document against its invariants

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mezze-cli")]
#[command(author, version, about = "Mezze CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default starter catalog document
    Seed {
        /// Path to the catalog JSON document
        #[arg(long, default_value = "data/catalog.json")]
        data_file: PathBuf,

        /// Overwrite an existing document
        #[arg(long)]
        force: bool,
    },
    /// Validate a catalog document and report problems
    Check {
        /// Path to the catalog JSON document
        #[arg(long, default_value = "data/catalog.json")]
        data_file: PathBuf,

        /// Image directory (default: `images` next to the document)
        #[arg(long)]
        image_dir: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli);

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Seed { data_file, force } => commands::seed::run(&data_file, force)?,
        Commands::Check {
            data_file,
            image_dir,
        } => {
            let image_dir = image_dir.unwrap_or_else(|| {
                data_file
                    .parent()
                    .map_or_else(|| PathBuf::from("images"), |dir| dir.join("images"))
            });
            commands::check::run(&data_file, &image_dir)?;
        }
    }
    Ok(())
}
