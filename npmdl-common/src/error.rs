//! Errors raised while bootstrapping a run
//!
//! Everything here is fatal: a store that cannot be opened or a config that
//! cannot be read stops the process before any network work.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// SQLite open, pragma or DDL failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem failure on a specific path
    #[error("Cannot prepare {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file unreadable or unparsable, or a setting out of range
    #[error("Configuration error: {0}")]
    Config(String),
}
