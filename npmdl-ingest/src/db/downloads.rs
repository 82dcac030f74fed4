//! Downloads table operations

use crate::models::DownloadRecord;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

/// Bound parameters per record in the multi-row upsert
pub const PARAMS_PER_RECORD: usize = 8;

/// SQLite's host parameter ceiling (`SQLITE_MAX_VARIABLE_NUMBER`, 3.32+)
pub const SQLITE_MAX_BIND_PARAMS: usize = 32766;

/// Largest sub-batch one upsert statement can bind
pub const MAX_RECORDS_PER_STATEMENT: usize = SQLITE_MAX_BIND_PARAMS / PARAMS_PER_RECORD;

/// Upsert a sub-batch of records in one statement
///
/// On a `(name, date_year, date_month, date_day)` conflict the stored row is
/// updated only when the incoming count is strictly greater. Ties and
/// decreases are silent no-ops. Returns the number of rows inserted or
/// updated.
pub async fn upsert_downloads(
    pool: &SqlitePool,
    records: &[DownloadRecord],
) -> Result<u64, sqlx::Error> {
    if records.is_empty() {
        return Ok(0);
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "INSERT INTO downloads (name, count, date, last_updated_at, \
         date_year, date_month, date_day, date_day_of_week) ",
    );

    builder.push_values(records, |mut row, record| {
        row.push_bind(record.name.clone())
            .push_bind(record.count)
            .push_bind(record.date)
            .push_bind(record.last_updated_at)
            .push_bind(record.date_year)
            .push_bind(record.date_month)
            .push_bind(record.date_day)
            .push_bind(record.date_day_of_week);
    });

    builder.push(
        " ON CONFLICT(name, date_year, date_month, date_day) DO UPDATE SET \
         count = excluded.count, \
         last_updated_at = excluded.last_updated_at \
         WHERE excluded.count > downloads.count",
    );

    let result = builder.build().execute(pool).await?;

    Ok(result.rows_affected())
}

/// Load all stored days of a package, oldest first
pub async fn load_downloads(
    pool: &SqlitePool,
    name: &str,
) -> Result<Vec<DownloadRecord>, sqlx::Error> {
    sqlx::query_as::<_, DownloadRecord>(
        r#"
        SELECT name, count, date, last_updated_at,
               date_year, date_month, date_day, date_day_of_week
        FROM downloads
        WHERE name = ?
        ORDER BY date_year, date_month, date_day
        "#,
    )
    .bind(name)
    .fetch_all(pool)
    .await
}

/// Number of stored rows
pub async fn count_downloads(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM downloads")
        .fetch_one(pool)
        .await
}
