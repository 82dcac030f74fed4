//! # npmdl Common Library
//!
//! Shared code for the npm downloads ingest tooling:
//! - Error type shared by the storage and configuration layers
//! - TOML bootstrap configuration and path resolution
//! - SQLite database initialization (`downloads` table)
//! - Timestamp and calendar-day helpers

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
