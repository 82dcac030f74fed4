//! Downloads API response shapes
//!
//! `GET /downloads/range/{period}/{names}` answers with a single package
//! object when one name is queried and with a name-keyed map otherwise. The
//! shape is chosen from the batch cardinality before decoding
//! ([`DownloadsResponse`]), then normalized into one outcome per name.

use crate::error::IngestError;
use crate::models::FetchBatch;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One day of downloads, as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DailyPoint {
    /// Calendar day, `YYYY-MM-DD`
    pub day: String,
    pub downloads: u64,
}

impl DailyPoint {
    pub fn new(day: impl Into<String>, downloads: u64) -> Self {
        Self {
            day: day.into(),
            downloads,
        }
    }
}

/// Per-package range response
///
/// All fields default so that an error-only body (`{"error": "..."}`)
/// decodes too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PackageDownloads {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub downloads: Vec<DailyPoint>,
}

impl PackageDownloads {
    /// In-band error message, if any
    fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

/// Normalized time series for one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSeries {
    pub package: String,
    pub start: String,
    pub end: String,
    pub points: Vec<DailyPoint>,
}

impl PackageSeries {
    fn from_response(queried: &str, response: PackageDownloads) -> Self {
        let package = if response.package.is_empty() {
            queried.to_string()
        } else {
            response.package
        };
        Self {
            package,
            start: response.start,
            end: response.end,
            points: response.downloads,
        }
    }
}

/// Decoded downloads response, resolved by batch cardinality
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadsResponse {
    /// Exactly one name was queried
    Single(PackageDownloads),
    /// Two or more names were queried; `null` entries mean unknown packages
    Multi(BTreeMap<String, Option<PackageDownloads>>),
}

impl DownloadsResponse {
    /// Normalize into one outcome per queried name
    ///
    /// Single: an in-band error becomes `NotFound`, anything else is a series
    /// (possibly with no points). Multi: an entry with an empty `package`
    /// field, a `null` entry, or a missing key becomes `NotFound` for that
    /// name. Keys that were not queried are kept if they carry data.
    pub fn into_outcomes(self, batch: &FetchBatch) -> Vec<Result<PackageSeries, IngestError>> {
        match self {
            DownloadsResponse::Single(response) => {
                let queried = batch
                    .packages
                    .first()
                    .map(String::as_str)
                    .unwrap_or(response.package.as_str())
                    .to_string();
                let outcome = match response.error_message() {
                    Some(message) => Err(IngestError::not_found(queried, message)),
                    None => Ok(PackageSeries::from_response(&queried, response)),
                };
                vec![outcome]
            }
            DownloadsResponse::Multi(mut entries) => {
                let mut outcomes = Vec::with_capacity(batch.len().max(entries.len()));

                for name in &batch.packages {
                    let outcome = match entries.remove(name) {
                        Some(entry) => multi_entry_outcome(name, entry),
                        None => Err(IngestError::not_found(name, "missing from bulk response")),
                    };
                    outcomes.push(outcome);
                }

                for (key, entry) in entries {
                    tracing::debug!(package = %key, "Bulk response carried an unrequested key");
                    outcomes.push(multi_entry_outcome(&key, entry));
                }

                outcomes
            }
        }
    }
}

fn multi_entry_outcome(
    key: &str,
    entry: Option<PackageDownloads>,
) -> Result<PackageSeries, IngestError> {
    match entry {
        None => Err(IngestError::not_found(key, "null entry in bulk response")),
        Some(response) => {
            if let Some(message) = response.error_message() {
                Err(IngestError::not_found(key, message))
            } else if response.package.is_empty() {
                Err(IngestError::not_found(key, "empty package field in bulk response"))
            } else {
                Ok(PackageSeries::from_response(key, response))
            }
        }
    }
}
