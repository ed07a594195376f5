//! Punchcard CLI - Seed-file management tools.
//!
//! # Usage
//!
//! ```bash
//! # Validate a customer seed file before pointing the server at it
//! punchcard-cli seed validate customers.json
//!
//! # Print the built-in sample seed as JSON (a starting point for edits)
//! punchcard-cli seed sample
//! ```
//!
//! # Commands
//!
//! - `seed validate` - Parse a seed file and report problems
//! - `seed sample` - Print the built-in sample customers

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "punchcard-cli")]
#[command(author, version, about = "Punchcard CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage customer seed files
    Seed {
        #[command(subcommand)]
        action: SeedAction,
    },
}

#[derive(Subcommand)]
enum SeedAction {
    /// Validate a JSON seed file
    Validate {
        /// Path to the seed file
        path: String,
    },
    /// Print the built-in sample seed as JSON
    Sample,
}

fn main() {
    // Initialize tracing
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
        Commands::Seed { action } => match action {
            SeedAction::Validate { path } => commands::seed::validate(&path)?,
            SeedAction::Sample => commands::seed::sample()?,
        },
    }
    Ok(())
}
