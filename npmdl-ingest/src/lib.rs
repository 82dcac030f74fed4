//! npmdl-ingest library interface
//!
//! Fetches daily npm download counts for explicit package names and registry
//! search results, and upserts them into SQLite with bounded concurrency.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

pub use crate::error::{ErrorKind, IngestError, IngestResult};
