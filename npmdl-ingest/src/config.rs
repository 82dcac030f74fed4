//! Run settings for npmdl-ingest
//!
//! Command-line flags override the TOML config, which overrides built-in
//! defaults. The merged values are validated once, before any work starts.

use crate::cli::Args;
use crate::db::downloads::MAX_RECORDS_PER_STATEMENT;
use crate::models::{Period, SearchWeights};
use npmdl_common::config::{resolve_database_path, TomlConfig, DATABASE_ENV_VAR};
use npmdl_common::{Error, Result};
use std::path::PathBuf;

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub period: Period,
    /// Records per upsert statement
    pub insert_batch_size: usize,
    pub fetch_concurrency: usize,
    pub insert_concurrency: usize,
    pub downloads_api_root: String,
    pub registry_api_root: String,
    pub weights: SearchWeights,
    pub fail_on_errors: bool,
    pub database_path: PathBuf,
}

impl IngestSettings {
    /// Merge flags over the TOML config and validate the result
    pub fn resolve(args: &Args, toml_config: &TomlConfig) -> Result<Self> {
        let mut merged = toml_config.clone();

        if let Some(period) = &args.period {
            merged.period = period.clone();
        }
        if let Some(size) = args.batch_size {
            merged.insert_batch_size = size;
        }
        if let Some(n) = args.fetch_concurrency {
            merged.fetch_concurrency = n;
        }
        if let Some(n) = args.insert_concurrency {
            merged.insert_concurrency = n;
        }
        if let Some(root) = &args.downloads_api {
            merged.downloads_api_root = root.clone();
        }
        if let Some(root) = &args.registry_api {
            merged.registry_api_root = root.clone();
        }
        if let Some(w) = args.quality {
            merged.search.quality = w;
        }
        if let Some(w) = args.popularity {
            merged.search.popularity = w;
        }
        if let Some(w) = args.maintenance {
            merged.search.maintenance = w;
        }
        merged.fail_on_errors |= args.fail_on_errors;

        merged.validate()?;
        if merged.insert_batch_size > MAX_RECORDS_PER_STATEMENT {
            return Err(Error::Config(format!(
                "insert_batch_size {} exceeds {} records per statement",
                merged.insert_batch_size, MAX_RECORDS_PER_STATEMENT
            )));
        }

        let database_path =
            resolve_database_path(args.database.as_deref(), DATABASE_ENV_VAR, &merged);

        Ok(Self {
            period: Period::new(merged.period),
            insert_batch_size: merged.insert_batch_size,
            fetch_concurrency: merged.fetch_concurrency,
            insert_concurrency: merged.insert_concurrency,
            downloads_api_root: merged.downloads_api_root,
            registry_api_root: merged.registry_api_root,
            weights: merged.search.into(),
            fail_on_errors: merged.fail_on_errors,
            database_path,
        })
    }
}
