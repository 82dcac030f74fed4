//! npm registry search client
//!
//! `GET {root}/-/v1/search?text=&size=&from=&quality=&popularity=&maintenance=`

use crate::error::IngestResult;
use crate::models::{SearchQuery, SearchResponse};
use crate::services::http_json::{build_http_client, get_json};

/// Hits requested per search page
pub const PAGE_SIZE: usize = 250;

/// Registry search client
pub struct RegistryClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl RegistryClient {
    pub fn new(base_url: impl Into<String>) -> IngestResult<Self> {
        Ok(Self {
            http_client: build_http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn search_url(&self) -> String {
        format!("{}/-/v1/search", self.base_url)
    }

    /// Fetch one page of `size` hits starting at offset `from`
    pub async fn search_page(
        &self,
        query: &SearchQuery,
        size: usize,
        from: usize,
    ) -> IngestResult<SearchResponse> {
        let params = search_params(query, size, from);
        get_json(&self.http_client, &self.search_url(), &params).await
    }
}

fn search_params(query: &SearchQuery, size: usize, from: usize) -> Vec<(&'static str, String)> {
    vec![
        ("text", query.text.clone()),
        ("size", size.to_string()),
        ("from", from.to_string()),
        ("quality", query.weights.quality.to_string()),
        ("popularity", query.weights.popularity.to_string()),
        ("maintenance", query.weights.maintenance.to_string()),
    ]
}
