//! Run completion summary
//!
//! The failure counter lives here and is only ever mutated by the single
//! draining loop of the orchestrator.

use crate::error::{ErrorKind, IngestError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    /// Also used as `last_updated_at` for every record of the run
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Distinct names after search expansion and deduplication
    pub packages_requested: usize,
    pub batches: usize,
    pub search_hits: usize,
    pub series_received: usize,
    pub statements_executed: usize,
    /// Rows inserted or updated; ties and decreases are not counted
    pub records_written: u64,
    pub failures: usize,
    pub failures_by_kind: BTreeMap<String, usize>,
}

impl RunSummary {
    pub fn start() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: npmdl_common::time::now(),
            finished_at: None,
            packages_requested: 0,
            batches: 0,
            search_hits: 0,
            series_received: 0,
            statements_executed: 0,
            records_written: 0,
            failures: 0,
            failures_by_kind: BTreeMap::new(),
        }
    }

    /// Log and count one recovered error
    pub fn record_failure(&mut self, err: &IngestError) {
        tracing::warn!(
            run_id = %self.run_id,
            kind = %err.kind(),
            error = %err,
            "Recovered failure"
        );
        self.count(err.kind(), 1);
    }

    /// Count tasks that panicked instead of reporting
    pub fn record_panics(&mut self, panicked: usize) {
        if panicked > 0 {
            tracing::error!(run_id = %self.run_id, panicked, "Tasks panicked");
            self.count(ErrorKind::Internal, panicked);
        }
    }

    fn count(&mut self, kind: ErrorKind, n: usize) {
        self.failures += n;
        *self
            .failures_by_kind
            .entry(kind.as_str().to_string())
            .or_insert(0) += n;
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(npmdl_common::time::now());
        self
    }

    pub fn has_failures(&self) -> bool {
        self.failures > 0
    }
}
