//! Timestamp and calendar-day utilities

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Calendar day format used by the npm downloads API (`2023-03-15`)
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Parse a calendar day in the strict `YYYY-MM-DD` form
pub fn parse_day(day: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(day, DAY_FORMAT)
}

/// Decomposed calendar day, as stored next to each download count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayParts {
    pub year: i32,
    /// 1..=12
    pub month: u32,
    /// 1..=31
    pub day: u32,
    /// Sunday = 0 ... Saturday = 6
    pub day_of_week: u32,
}

impl DayParts {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
            day_of_week: date.weekday().num_days_from_sunday(),
        }
    }
}
