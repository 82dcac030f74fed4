//! Ingest run orchestrator
//!
//! One run goes through three phases:
//! 1. Expand registry searches into package names (deduplicated, sorted)
//! 2. Partition names into fetch batches
//! 3. Fetch every batch and upsert each series as it arrives
//!
//! All error streams are drained by the single consumer loop in
//! [`IngestPipeline::run`], which owns the run's failure counter. Recovered
//! errors never end the run early.

use crate::config::IngestSettings;
use crate::error::IngestResult;
use crate::models::{RunSummary, SearchQuery, MAX_BATCH_SIZE};
use crate::services::{
    partition, spawn_fetch_stage, spawn_search_stage, DownloadsClient, RegistryClient,
    UpsertScheduler,
};
use crate::utils::await_completion;
use sqlx::SqlitePool;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub struct IngestPipeline {
    settings: IngestSettings,
    downloads: Arc<DownloadsClient>,
    registry: Arc<RegistryClient>,
    pool: SqlitePool,
    cancel: CancellationToken,
}

impl IngestPipeline {
    pub fn new(settings: IngestSettings, pool: SqlitePool) -> IngestResult<Self> {
        let downloads = Arc::new(DownloadsClient::new(settings.downloads_api_root.as_str())?);
        let registry = Arc::new(RegistryClient::new(settings.registry_api_root.as_str())?);

        Ok(Self {
            settings,
            downloads,
            registry,
            pool,
            cancel: CancellationToken::new(),
        })
    }

    /// Use an externally owned token, e.g. one fired by Ctrl+C
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the whole ingest and report what happened
    pub async fn run(&self, explicit_names: &[String], queries: Vec<SearchQuery>) -> RunSummary {
        let mut summary = RunSummary::start();
        info!(
            run_id = %summary.run_id,
            period = %self.settings.period,
            explicit = explicit_names.len(),
            queries = queries.len(),
            "Starting ingest run"
        );

        let mut names: BTreeSet<String> = explicit_names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect();

        // Phase 1: search expansion
        if !queries.is_empty() {
            let searched = spawn_search_stage(
                Arc::clone(&self.registry),
                queries,
                self.settings.fetch_concurrency,
                self.cancel.clone(),
            )
            .collect()
            .await;

            summary.search_hits = searched.results.len();
            for err in &searched.errors {
                summary.record_failure(err);
            }
            summary.record_panics(searched.report.panicked);

            names.extend(searched.results.into_iter().map(|hit| hit.package.name));
            info!(hits = summary.search_hits, packages = names.len(), "Search expansion complete");
        }

        // Phase 2: partition
        summary.packages_requested = names.len();
        if names.is_empty() {
            warn!(run_id = %summary.run_id, "No packages to fetch");
        }
        let batches = partition(&self.settings.period, names, MAX_BATCH_SIZE);
        summary.batches = batches.len();

        // Phase 3: fetch and upsert
        let mut fetch = spawn_fetch_stage(
            Arc::clone(&self.downloads),
            batches,
            self.settings.fetch_concurrency,
            self.cancel.clone(),
        );
        let (mut upserts, mut upsert_errors) = UpsertScheduler::new(
            self.pool.clone(),
            self.settings.insert_concurrency,
            self.cancel.clone(),
        );
        let last_updated_at = summary.started_at;

        let mut results_open = true;
        let mut errors_open = true;
        while results_open || errors_open {
            tokio::select! {
                series = fetch.results.recv(), if results_open => match series {
                    Some(series) => {
                        summary.series_received += 1;
                        upserts.submit_series(&series, last_updated_at, self.settings.insert_batch_size);
                    }
                    None => results_open = false,
                },
                err = fetch.errors.recv(), if errors_open => match err {
                    Some(err) => summary.record_failure(&err),
                    None => errors_open = false,
                },
                Some(err) = upsert_errors.recv() => summary.record_failure(&err),
            }
        }

        let fetch_report = await_completion(fetch.completion).await;
        summary.record_panics(fetch_report.panicked);

        // The upsert error stream closes once close() has joined every statement
        let upsert_report = upserts.close().await;
        while let Some(err) = upsert_errors.recv().await {
            summary.record_failure(&err);
        }
        summary.record_panics(upsert_report.join.panicked);

        summary.statements_executed = upsert_report.statements_succeeded;
        summary.records_written = upsert_report.rows_written;

        let summary = summary.finish();
        info!(
            run_id = %summary.run_id,
            packages = summary.packages_requested,
            batches = summary.batches,
            series = summary.series_received,
            statements = summary.statements_executed,
            records_written = summary.records_written,
            failures = summary.failures,
            "Ingest run complete"
        );
        if summary.has_failures() {
            warn!(run_id = %summary.run_id, by_kind = ?summary.failures_by_kind, "Run finished with failures");
        }

        summary
    }
}
