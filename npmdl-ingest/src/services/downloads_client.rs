//! npm downloads API client
//!
//! `GET {root}/downloads/range/{period}/{name[,name...]}`

use crate::error::{IngestError, IngestResult};
use crate::models::{DownloadsResponse, FetchBatch, PackageDownloads, PackageSeries};
use crate::services::http_json::{build_http_client, fetch_raw, get_json};
use std::collections::BTreeMap;

/// Downloads API client
pub struct DownloadsClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl DownloadsClient {
    pub fn new(base_url: impl Into<String>) -> IngestResult<Self> {
        Ok(Self {
            http_client: build_http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Range endpoint for a batch
    pub fn range_url(&self, batch: &FetchBatch) -> String {
        format!(
            "{}/downloads/range/{}/{}",
            self.base_url,
            batch.period,
            batch.joined_names()
        )
    }

    /// Fetch one batch and normalize it into one outcome per name
    ///
    /// A transport or decode failure yields a single batch-level error.
    pub async fn fetch_batch(&self, batch: &FetchBatch) -> Vec<IngestResult<PackageSeries>> {
        let response = match batch.len() {
            0 => return Vec::new(),
            1 => self.fetch_single(batch).await,
            _ => self.fetch_many(batch).await,
        };

        match response {
            Ok(response) => response.into_outcomes(batch),
            Err(e) => vec![Err(e)],
        }
    }

    async fn fetch_single(&self, batch: &FetchBatch) -> IngestResult<DownloadsResponse> {
        let url = self.range_url(batch);

        let raw = fetch_raw(&self.http_client, &url, &[]).await?;

        // Unknown packages come back as 404 with an in-band error body
        if raw.status == 404 {
            return match raw.decode::<PackageDownloads>() {
                Ok(response) if response.error.is_some() => Ok(DownloadsResponse::Single(response)),
                _ => Err(IngestError::status(raw.url, 404, &raw.body)),
            };
        }

        raw.into_json().map(DownloadsResponse::Single)
    }

    async fn fetch_many(&self, batch: &FetchBatch) -> IngestResult<DownloadsResponse> {
        let url = self.range_url(batch);
        let entries: BTreeMap<String, Option<PackageDownloads>> =
            get_json(&self.http_client, &url, &[]).await?;
        Ok(DownloadsResponse::Multi(entries))
    }
}
