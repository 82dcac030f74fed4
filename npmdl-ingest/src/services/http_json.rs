//! JSON-over-HTTP helper shared by the API clients
//!
//! Fails on transport errors, non-2xx statuses and bodies that do not decode
//! into `T` (including unknown fields when `T` denies them). Callers that
//! need a non-2xx body intact use [`fetch_raw`] and decode themselves.

use crate::error::{IngestError, IngestResult};
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_AGENT: &str = concat!("npmdl/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the HTTP client used by both API clients
pub fn build_http_client() -> IngestResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| IngestError::Transport {
            url: String::new(),
            message: format!("Failed to build HTTP client: {}", e),
        })
}

/// Response read in full, before any status check
#[derive(Debug)]
pub struct RawResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    /// Decode a 2xx body into `T`; other statuses become `Status` errors
    pub fn into_json<T: DeserializeOwned>(self) -> IngestResult<T> {
        if !(200..300).contains(&self.status) {
            return Err(IngestError::status(self.url, self.status, &self.body));
        }
        self.decode()
    }

    /// Decode the body regardless of status
    pub fn decode<T: DeserializeOwned>(&self) -> IngestResult<T> {
        serde_json::from_str(&self.body).map_err(|e| IngestError::Decode {
            url: self.url.clone(),
            message: e.to_string(),
        })
    }
}

/// GET `url` with `query` parameters and decode the JSON body
pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
) -> IngestResult<T> {
    fetch_raw(client, url, query).await?.into_json()
}

/// GET `url` with `query` parameters and read the whole body
pub async fn fetch_raw(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
) -> IngestResult<RawResponse> {
    let request = client
        .get(url)
        .query(query)
        .build()
        .map_err(|e| IngestError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;
    let full_url = request.url().to_string();

    tracing::debug!(url = %full_url, "FETCH");

    let response = client
        .execute(request)
        .await
        .map_err(|e| IngestError::Transport {
            url: full_url.clone(),
            message: e.to_string(),
        })?;

    let status = response.status().as_u16();
    let body = response.text().await.map_err(|e| IngestError::Transport {
        url: full_url.clone(),
        message: e.to_string(),
    })?;

    Ok(RawResponse {
        url: full_url,
        status,
        body,
    })
}
