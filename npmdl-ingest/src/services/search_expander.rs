//! Registry search expansion
//!
//! Each query pages through `/-/v1/search` in `PAGE_SIZE` steps until a page
//! comes back short. One gate permit covers a query's whole pagination, so
//! `concurrency` bounds the number of queries in flight. A failed page ends
//! that query only; hits from earlier pages are kept. Cancellation between
//! pages ends the query with a `Cancelled` error naming the next offset.

use crate::error::IngestError;
use crate::models::{SearchHit, SearchQuery};
use crate::services::registry_client::{RegistryClient, PAGE_SIZE};
use crate::utils::bounded::StageOutput;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Launch one paging task per query
///
/// # Panics
/// If `concurrency` is zero.
pub fn spawn_search_stage(
    client: Arc<RegistryClient>,
    queries: Vec<SearchQuery>,
    concurrency: usize,
    cancel: CancellationToken,
) -> StageOutput<SearchHit> {
    if !queries.is_empty() {
        tracing::info!(queries = queries.len(), concurrency, "Starting registry search");
    }

    StageOutput::drive(concurrency, cancel.clone(), move |tasks, results, errors| {
        for query in queries {
            let client = Arc::clone(&client);
            let results = results.clone();
            let errors_tx = errors.clone();
            let cancel = cancel.clone();
            let label = format!("search {:?}", query.text);

            tasks.spawn(label, errors, async move {
                let mut from = 0;

                loop {
                    if cancel.is_cancelled() {
                        let _ = errors_tx.send(IngestError::Cancelled {
                            task: format!("search {:?} from {}", query.text, from),
                        });
                        break;
                    }

                    let page = match client.search_page(&query, PAGE_SIZE, from).await {
                        Ok(page) => page,
                        Err(e) => {
                            let _ = errors_tx.send(e);
                            break;
                        }
                    };

                    let received = page.objects.len();
                    tracing::debug!(query = %query.text, from, received, total = page.total, "Search page");

                    for hit in page.objects {
                        let _ = results.send(hit);
                    }

                    if received < PAGE_SIZE {
                        break;
                    }
                    from += PAGE_SIZE;
                }
            });
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchWeights;

    #[tokio::test]
    async fn test_no_queries_yields_nothing() {
        let client = Arc::new(RegistryClient::new("http://127.0.0.1:9").unwrap());

        let collected = spawn_search_stage(client, Vec::new(), 2, CancellationToken::new())
            .collect()
            .await;

        assert!(collected.results.is_empty());
        assert!(collected.errors.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_queries_reported() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let client = Arc::new(RegistryClient::new("http://127.0.0.1:9").unwrap());
        let queries = vec![
            SearchQuery::author("someone", SearchWeights::default()),
            SearchQuery::keyword("cli", SearchWeights::default()),
        ];

        let collected = spawn_search_stage(client, queries, 1, cancel).collect().await;

        assert_eq!(collected.errors.len(), 2);
        assert!(matches!(collected.errors[0], IngestError::Cancelled { .. }));
    }
}
