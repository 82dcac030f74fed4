//! Bounded upsert scheduler
//!
//! One upsert statement per sub-batch, admitted through the same counting
//! gate as the fetch stages. The default limit of one in-flight statement
//! matches SQLite's single writer; engines with concurrent writers can run
//! with a higher limit. A failed statement is reported on the error stream
//! and does not stop other sub-batches.

use crate::db::downloads::upsert_downloads;
use crate::error::IngestError;
use crate::models::{DownloadRecord, PackageSeries};
use crate::services::record_transformer::transform;
use crate::utils::bounded::{BoundedTasks, JoinReport};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

/// Totals reported once every statement has finished
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertReport {
    pub statements_submitted: usize,
    pub statements_succeeded: usize,
    pub rows_written: u64,
    pub join: JoinReport,
}

pub struct UpsertScheduler {
    pool: SqlitePool,
    tasks: BoundedTasks,
    errors_tx: UnboundedSender<IngestError>,
    succeeded: Arc<AtomicUsize>,
    rows_written: Arc<AtomicU64>,
}

impl UpsertScheduler {
    /// Create the scheduler and its error stream
    ///
    /// The stream closes once [`UpsertScheduler::close`] has waited for every
    /// submitted statement.
    pub fn new(
        pool: SqlitePool,
        concurrency: usize,
        cancel: CancellationToken,
    ) -> (Self, UnboundedReceiver<IngestError>) {
        let (errors_tx, errors_rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            pool,
            tasks: BoundedTasks::new(concurrency, cancel),
            errors_tx,
            succeeded: Arc::new(AtomicUsize::new(0)),
            rows_written: Arc::new(AtomicU64::new(0)),
        };
        (scheduler, errors_rx)
    }

    /// Transform a series and submit one statement per sub-batch
    ///
    /// Points with an unparsable day are reported on the error stream.
    pub fn submit_series(
        &mut self,
        series: &PackageSeries,
        last_updated_at: DateTime<Utc>,
        sub_batch_size: usize,
    ) {
        let output = transform(&series.package, last_updated_at, &series.points, sub_batch_size);

        tracing::debug!(
            package = %series.package,
            records = output.record_count(),
            sub_batches = output.batches.len(),
            "Inserting records"
        );

        for err in output.errors {
            let _ = self.errors_tx.send(err);
        }
        for batch in output.batches {
            self.submit(&series.package, batch);
        }
    }

    /// Submit one sub-batch
    pub fn submit(&mut self, package: &str, records: Vec<DownloadRecord>) {
        if records.is_empty() {
            return;
        }

        let pool = self.pool.clone();
        let errors_tx = self.errors_tx.clone();
        let succeeded = Arc::clone(&self.succeeded);
        let rows_written = Arc::clone(&self.rows_written);
        let package = package.to_string();
        let label = format!("upsert of {} records for {}", records.len(), package);

        self.tasks.spawn(label, &self.errors_tx, async move {
            match upsert_downloads(&pool, &records).await {
                Ok(rows) => {
                    tracing::debug!(package = %package, rows = records.len(), written = rows, "BATCH execute");
                    succeeded.fetch_add(1, Ordering::Relaxed);
                    rows_written.fetch_add(rows, Ordering::Relaxed);
                }
                Err(source) => {
                    let _ = errors_tx.send(IngestError::Storage {
                        package,
                        rows: records.len(),
                        source,
                    });
                }
            }
        });
    }

    /// Wait for every submitted statement, then close the error stream
    pub async fn close(self) -> UpsertReport {
        let statements_submitted = self.tasks.spawned();
        let join = self.tasks.join().await;
        // Dropping the last sender closes the error stream
        drop(self.errors_tx);

        UpsertReport {
            statements_submitted,
            statements_succeeded: self.succeeded.load(Ordering::Relaxed),
            rows_written: self.rows_written.load(Ordering::Relaxed),
            join,
        }
    }
}
