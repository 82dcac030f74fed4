//! Stored download record

use chrono::{DateTime, NaiveDate, Utc};

/// One row of the `downloads` table
///
/// Unique on `(name, date_year, date_month, date_day)`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct DownloadRecord {
    pub name: String,
    pub count: i64,
    pub date: NaiveDate,
    /// Run timestamp, constant for every record of a run
    pub last_updated_at: DateTime<Utc>,
    pub date_year: i32,
    pub date_month: u32,
    pub date_day: u32,
    /// Sunday = 0 ... Saturday = 6
    pub date_day_of_week: u32,
}
