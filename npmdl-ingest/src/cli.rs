//! Command-line arguments for npmdl-ingest

use crate::models::{SearchQuery, SearchWeights};
use clap::Parser;
use npmdl_common::config::CONFIG_ENV_VAR;
use std::path::PathBuf;

/// Fetch npm daily download counts and store them in SQLite
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "npmdl-ingest")]
#[command(about = "Fetch npm daily download counts into SQLite")]
#[command(version)]
pub struct Args {
    /// Package names to fetch, in addition to search results
    pub packages: Vec<String>,

    /// Downloads period: last-day, last-week, last-month, last-year or START:END
    #[arg(short, long)]
    pub period: Option<String>,

    /// Records per upsert statement
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Maximum concurrent HTTP requests per stage
    #[arg(long)]
    pub fetch_concurrency: Option<usize>,

    /// Maximum concurrent upsert statements
    #[arg(long)]
    pub insert_concurrency: Option<usize>,

    /// Add every package by this author
    #[arg(long)]
    pub author: Vec<String>,

    /// Add every package in this scope
    #[arg(long)]
    pub scope: Vec<String>,

    /// Add every package with this maintainer
    #[arg(long)]
    pub maintainer: Vec<String>,

    /// Add every package with this keyword
    #[arg(long)]
    pub keyword: Vec<String>,

    /// Add every package matching this free-text registry search
    #[arg(long)]
    pub search: Vec<String>,

    /// Search quality weight
    #[arg(long)]
    pub quality: Option<f64>,

    /// Search popularity weight
    #[arg(long)]
    pub popularity: Option<f64>,

    /// Search maintenance weight
    #[arg(long)]
    pub maintenance: Option<f64>,

    /// SQLite database file (overrides NPMDL_DATABASE and the config file)
    #[arg(short, long)]
    pub database: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    pub config: Option<PathBuf>,

    /// Downloads API root URL
    #[arg(long)]
    pub downloads_api: Option<String>,

    /// Registry API root URL
    #[arg(long)]
    pub registry_api: Option<String>,

    /// Exit with status 2 if any failure was recorded
    #[arg(long)]
    pub fail_on_errors: bool,
}

impl Args {
    /// Registry searches requested by the modifiers, in flag order
    pub fn search_queries(&self, weights: SearchWeights) -> Vec<SearchQuery> {
        let mut queries = Vec::new();
        queries.extend(self.author.iter().map(|a| SearchQuery::author(a, weights)));
        queries.extend(self.scope.iter().map(|s| SearchQuery::scope(s, weights)));
        queries.extend(self.maintainer.iter().map(|m| SearchQuery::maintainer(m, weights)));
        queries.extend(self.keyword.iter().map(|k| SearchQuery::keyword(k, weights)));
        queries.extend(self.search.iter().map(|t| SearchQuery::new(t.as_str(), weights)));
        queries
    }
}
