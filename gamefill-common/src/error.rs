//! Errors shared by the gamefill crates

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures outside a single lookup
///
/// Lookup failures never surface here; the enricher turns them into
/// not-found markers. These are the errors that end a run.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading or writing the dataset failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Config or log file could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unparsable TOML or a setting outside its allowed range
    #[error("Configuration error: {0}")]
    Config(String),

    /// Dataset file does not exist (it is never created implicitly)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Target cell holding something other than a number or a blank
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Tracing subscriber could not be installed
    #[error("Internal error: {0}")]
    Internal(String),
}
