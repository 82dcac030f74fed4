//! Concurrent downloads fetch stage
//!
//! Every batch gets its own task immediately; at most `concurrency` of them
//! hold a request open at a time. Series and errors stream out as soon as
//! each batch answers, in completion order.

use crate::models::{FetchBatch, PackageSeries};
use crate::services::downloads_client::DownloadsClient;
use crate::utils::bounded::StageOutput;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Launch one fetch task per batch
///
/// # Panics
/// If `concurrency` is zero.
pub fn spawn_fetch_stage(
    client: Arc<DownloadsClient>,
    batches: Vec<FetchBatch>,
    concurrency: usize,
    cancel: CancellationToken,
) -> StageOutput<PackageSeries> {
    tracing::info!(
        batches = batches.len(),
        concurrency,
        "Starting downloads fetch"
    );

    StageOutput::drive(concurrency, cancel, move |tasks, results, errors| {
        for batch in batches {
            let client = Arc::clone(&client);
            let results = results.clone();
            let errors_tx = errors.clone();

            tasks.spawn(batch.describe(), errors, async move {
                let outcomes = client.fetch_batch(&batch).await;
                let (mut ok, mut failed) = (0usize, 0usize);

                for outcome in outcomes {
                    match outcome {
                        Ok(series) => {
                            ok += 1;
                            let _ = results.send(series);
                        }
                        Err(e) => {
                            failed += 1;
                            let _ = errors_tx.send(e);
                        }
                    }
                }

                tracing::debug!(batch = %batch.describe(), ok, failed, "Batch fetched");
            });
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use crate::models::Period;

    #[tokio::test]
    async fn test_cancelled_run_reports_every_batch() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        // Nothing listens here; no request may be attempted after cancellation
        let client = Arc::new(DownloadsClient::new("http://127.0.0.1:9").unwrap());
        let batches = vec![
            FetchBatch::new(Period::default(), vec!["a".into(), "b".into()]),
            FetchBatch::new(Period::default(), vec!["@s/c".into()]),
        ];

        let collected = spawn_fetch_stage(client, batches, 1, cancel).collect().await;

        assert!(collected.results.is_empty());
        assert_eq!(collected.errors.len(), 2);
        assert!(collected
            .errors
            .iter()
            .all(|e| matches!(e, IngestError::Cancelled { .. })));
    }

    #[tokio::test]
    async fn test_no_batches_closes_immediately() {
        let client = Arc::new(DownloadsClient::new("http://127.0.0.1:9").unwrap());

        let collected = spawn_fetch_stage(client, Vec::new(), 4, CancellationToken::new())
            .collect()
            .await;

        assert!(collected.results.is_empty());
        assert!(collected.errors.is_empty());
        assert_eq!(collected.report.completed, 0);
    }
}
