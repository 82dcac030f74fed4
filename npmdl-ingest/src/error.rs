//! Error types for npmdl-ingest
//!
//! Every variant is recovered at a task boundary: it is sent on a stage's
//! error stream, logged and counted, and never aborts sibling tasks or the
//! run. Bootstrap failures use `npmdl_common::Error` instead.

use std::fmt;
use thiserror::Error;

/// Longest response body kept in a `Status` error
const MAX_BODY_CHARS: usize = 512;

/// Ingest pipeline error
#[derive(Debug, Error)]
pub enum IngestError {
    /// Connection failure, timeout, or unreadable response body
    #[error("Network error for {url}: {message}")]
    Transport { url: String, message: String },

    /// Non-2xx HTTP status
    #[error("API error {status} for {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// Malformed or unexpected response body
    #[error("Parse error for {url}: {message}")]
    Decode { url: String, message: String },

    /// Package absent from the response or reported with an error field
    #[error("Package {package} not found: {reason}")]
    NotFound { package: String, reason: String },

    /// Upstream day did not match `YYYY-MM-DD`
    #[error("Invalid day {day:?} for package {package}: {source}")]
    DateParse {
        package: String,
        day: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Upstream count does not fit a signed 64-bit column
    #[error("Count {downloads} on {day} for package {package} exceeds storage range")]
    CountOutOfRange {
        package: String,
        day: String,
        downloads: u64,
    },

    /// Upsert statement failed
    #[error("Upsert of {rows} records for {package} failed: {source}")]
    Storage {
        package: String,
        rows: usize,
        #[source]
        source: sqlx::Error,
    },

    /// Run was cancelled before this task was admitted
    #[error("Cancelled before start: {task}")]
    Cancelled { task: String },
}

impl IngestError {
    pub fn status(url: impl Into<String>, status: u16, body: &str) -> Self {
        let body = if body.chars().count() > MAX_BODY_CHARS {
            let truncated: String = body.chars().take(MAX_BODY_CHARS).collect();
            format!("{}...", truncated)
        } else {
            body.to_string()
        };
        IngestError::Status {
            url: url.into(),
            status,
            body,
        }
    }

    pub fn not_found(package: impl Into<String>, reason: impl Into<String>) -> Self {
        IngestError::NotFound {
            package: package.into(),
            reason: reason.into(),
        }
    }

    /// Taxonomy bucket used in run summaries
    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestError::Transport { .. } | IngestError::Status { .. } => ErrorKind::Transport,
            IngestError::Decode { .. } | IngestError::CountOutOfRange { .. } => ErrorKind::Decode,
            IngestError::NotFound { .. } => ErrorKind::NotFound,
            IngestError::DateParse { .. } => ErrorKind::DateParse,
            IngestError::Storage { .. } => ErrorKind::Storage,
            IngestError::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }
}

/// Error category, stable across message changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    Transport,
    Decode,
    NotFound,
    DateParse,
    Storage,
    Cancelled,
    /// Task panic
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Decode => "decode",
            ErrorKind::NotFound => "not_found",
            ErrorKind::DateParse => "date_parse",
            ErrorKind::Storage => "storage",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type for ingest operations
pub type IngestResult<T> = Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_body_truncated() {
        let body = "x".repeat(2000);
        let err = IngestError::status("http://example.test", 500, &body);
        match err {
            IngestError::Status { body, status, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body.len(), MAX_BODY_CHARS + 3);
                assert!(body.ends_with("..."));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            IngestError::status("u", 404, "").kind(),
            ErrorKind::Transport
        );
        assert_eq!(IngestError::not_found("b", "missing").kind(), ErrorKind::NotFound);
        assert_eq!(
            IngestError::Cancelled { task: "t".into() }.kind(),
            ErrorKind::Cancelled
        );
    }

    #[test]
    fn test_not_found_message_names_package() {
        let err = IngestError::not_found("b", "empty package field");
        assert_eq!(err.to_string(), "Package b not found: empty package field");
    }
}
