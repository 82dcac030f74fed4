//! Downloads period token

use serde::{Deserialize, Serialize};
use std::fmt;

/// Period understood by the downloads API
///
/// Passed through to the URL unvalidated. Besides the named windows below the
/// API accepts `YYYY-MM-DD` and `YYYY-MM-DD:YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Period(String);

impl Period {
    pub const LAST_DAY: &'static str = "last-day";
    pub const LAST_WEEK: &'static str = "last-week";
    pub const LAST_MONTH: &'static str = "last-month";
    pub const LAST_YEAR: &'static str = "last-year";

    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Period {
    fn default() -> Self {
        Self::new(Self::LAST_DAY)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Period {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}
