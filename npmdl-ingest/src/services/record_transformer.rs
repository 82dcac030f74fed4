//! Record transformer
//!
//! Turns a package's daily points into `downloads` rows with the calendar day
//! decomposed, grouped into fixed-size sub-batches so that a single upsert
//! statement stays well under SQLite's bound-parameter limit.

use crate::error::IngestError;
use crate::models::{DailyPoint, DownloadRecord};
use chrono::{DateTime, Utc};
use npmdl_common::time::{parse_day, DayParts};

/// Default records per upsert statement
pub const DEFAULT_SUB_BATCH_SIZE: usize = 100;

/// Rows ready to upsert plus the points that could not be converted
#[derive(Debug, Default)]
pub struct TransformOutput {
    pub batches: Vec<Vec<DownloadRecord>>,
    pub errors: Vec<IngestError>,
}

impl TransformOutput {
    pub fn record_count(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }
}

/// Convert one point
///
/// The day format is fixed by the API; anything else is a contract
/// violation reported as `DateParse`. A count beyond `i64::MAX` cannot be
/// stored and is reported rather than clamped.
pub fn to_record(
    package: &str,
    last_updated_at: DateTime<Utc>,
    point: &DailyPoint,
) -> Result<DownloadRecord, IngestError> {
    let date = parse_day(&point.day).map_err(|source| IngestError::DateParse {
        package: package.to_string(),
        day: point.day.clone(),
        source,
    })?;
    let count = i64::try_from(point.downloads).map_err(|_| IngestError::CountOutOfRange {
        package: package.to_string(),
        day: point.day.clone(),
        downloads: point.downloads,
    })?;
    let parts = DayParts::from_date(date);

    Ok(DownloadRecord {
        name: package.to_string(),
        count,
        date,
        last_updated_at,
        date_year: parts.year,
        date_month: parts.month,
        date_day: parts.day,
        date_day_of_week: parts.day_of_week,
    })
}

/// Convert all points of a package and chunk them into sub-batches
///
/// # Panics
/// If `sub_batch_size` is zero.
pub fn transform(
    package: &str,
    last_updated_at: DateTime<Utc>,
    points: &[DailyPoint],
    sub_batch_size: usize,
) -> TransformOutput {
    assert!(sub_batch_size >= 1, "sub_batch_size must be at least 1");

    let mut records = Vec::with_capacity(points.len());
    let mut errors = Vec::new();

    for point in points {
        match to_record(package, last_updated_at, point) {
            Ok(record) => records.push(record),
            Err(e) => errors.push(e),
        }
    }

    let batches = records
        .chunks(sub_batch_size)
        .map(<[DownloadRecord]>::to_vec)
        .collect();

    TransformOutput { batches, errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate, TimeZone};

    fn run_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 3, 16, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_date_decomposition() {
        let record = to_record("left-pad", run_time(), &DailyPoint::new("2023-03-15", 42)).unwrap();

        assert_eq!(record.name, "left-pad");
        assert_eq!(record.count, 42);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2023, 3, 15).unwrap());
        assert_eq!(record.last_updated_at, run_time());
        assert_eq!(record.date_year, 2023);
        assert_eq!(record.date_month, 3);
        assert_eq!(record.date_day, 15);
        assert_eq!(record.date_day_of_week, 3); // Wednesday
    }

    #[test]
    fn test_sub_batches() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let points: Vec<DailyPoint> = (0..250)
            .map(|i| {
                let day = start + chrono::Days::new(i);
                DailyPoint::new(day.format("%Y-%m-%d").to_string(), i)
            })
            .collect();

        let output = transform("pkg", run_time(), &points, DEFAULT_SUB_BATCH_SIZE);

        let sizes: Vec<usize> = output.batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![100, 100, 50]);
        assert!(output.errors.is_empty());
        assert_eq!(output.record_count(), 250);
        assert_eq!(output.batches[2][49].date.year(), 2023);
    }

    #[test]
    fn test_bad_day_surfaced_not_skipped() {
        let points = vec![
            DailyPoint::new("2023-03-14", 1),
            DailyPoint::new("14/03/2023", 2),
            DailyPoint::new("2023-03-15", 3),
        ];

        let output = transform("pkg", run_time(), &points, 100);

        assert_eq!(output.record_count(), 2);
        assert_eq!(output.errors.len(), 1);
        match &output.errors[0] {
            IngestError::DateParse { package, day, .. } => {
                assert_eq!(package, "pkg");
                assert_eq!(day, "14/03/2023");
            }
            other => panic!("expected DateParse, got {other:?}"),
        }
    }

    #[test]
    fn test_unstorable_count_reported() {
        let points = vec![
            DailyPoint::new("2023-03-14", i64::MAX as u64),
            DailyPoint::new("2023-03-15", u64::MAX),
        ];

        let output = transform("pkg", run_time(), &points, 100);

        assert_eq!(output.record_count(), 1);
        assert_eq!(output.batches[0][0].count, i64::MAX);
        match &output.errors[..] {
            [IngestError::CountOutOfRange { package, day, downloads }] => {
                assert_eq!(package, "pkg");
                assert_eq!(day, "2023-03-15");
                assert_eq!(*downloads, u64::MAX);
            }
            other => panic!("expected one CountOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_points() {
        let output = transform("pkg", run_time(), &[], 100);
        assert!(output.batches.is_empty());
        assert!(output.errors.is_empty());
    }
}
