//! Seed-file commands.
//!
//! The server reads its customer collection from a JSON seed file when
//! `PUNCHCARD_SEED_PATH` is set. These commands let an operator check a
//! file before deploying it and produce a starting template.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use punchcard_core::store::seed;

/// Errors that can occur during seed-file operations.
#[derive(Debug, Error)]
pub enum SeedCommandError {
    /// The given path does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// The file could not be read or parsed as a seed.
    #[error(transparent)]
    Seed(#[from] seed::SeedError),

    /// The sample seed could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Validate a JSON seed file.
///
/// # Errors
///
/// Returns an error if the file does not exist, cannot be parsed, or
/// contains duplicate customer ids.
pub fn validate(file_path: &str) -> Result<(), SeedCommandError> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedCommandError::FileNotFound(file_path.to_string()));
    }

    let customers = seed::load_file(path)?;

    info!(
        path = %file_path,
        customers = customers.len(),
        total_points = customers.iter().map(|c| u64::from(c.points)).sum::<u64>(),
        "Seed file is valid"
    );
    Ok(())
}

/// Print the built-in sample seed as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
#[allow(clippy::print_stdout)]
pub fn sample() -> Result<(), SeedCommandError> {
    let json = serde_json::to_string_pretty(&seed::sample_customers())?;
    println!("{json}");
    Ok(())
}
