//! CLI subcommands.

pub mod catalog;

use std::io::Write;

use thiserror::Error;

use bazaar_storefront::db::RepositoryError;
use bazaar_storefront::error::AppError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Embedded catalog failed to load.
    #[error("Seed catalog error: {0}")]
    Seed(#[from] RepositoryError),

    /// Invalid listing options.
    #[error("{}", .0.message())]
    InvalidQuery(#[from] AppError),

    /// Output could not be written.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    /// Output could not be serialized.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write `value` to stdout as JSON.
pub fn print_json(value: &serde_json::Value, pretty: bool) -> Result<(), CommandError> {
    let mut stdout = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut stdout, value)?;
    } else {
        serde_json::to_writer(&mut stdout, value)?;
    }
    writeln!(stdout)?;
    Ok(())
}
