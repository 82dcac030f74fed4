//! Fetch batches for the downloads range endpoint

use crate::models::Period;

/// Prefix marking a scoped package name (`@scope/name`)
pub const SCOPED_PACKAGE_PREFIX: &str = "@";

/// Most names the downloads API accepts in one bulk query
pub const MAX_BATCH_SIZE: usize = 128;

/// Scoped names cannot be combined in a bulk query
pub fn is_scoped_package_name(name: &str) -> bool {
    name.starts_with(SCOPED_PACKAGE_PREFIX)
}

/// One downloads request: a period and 1..=MAX_BATCH_SIZE package names
///
/// A batch with two or more names never contains a scoped name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchBatch {
    pub period: Period,
    pub packages: Vec<String>,
}

impl FetchBatch {
    pub fn new(period: Period, packages: Vec<String>) -> Self {
        Self { period, packages }
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Comma-joined names, as they appear in the request path
    pub fn joined_names(&self) -> String {
        self.packages.join(",")
    }

    /// Short label for logs and cancellation errors
    pub fn describe(&self) -> String {
        match self.packages.as_slice() {
            [] => "empty batch".to_string(),
            [only] => format!("batch [{}]", only),
            [first, .., last] => format!(
                "batch of {} [{} .. {}]",
                self.packages.len(),
                first,
                last
            ),
        }
    }
}
