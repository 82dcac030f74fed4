//! Integration tests for database initialization
//!
//! Covers automatic creation of the store, re-opening an existing store and
//! the shape of the `downloads` table.

use npmdl_common::db::init::{init_database, init_memory_database};
use npmdl_common::Error;
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Column information from PRAGMA table_info
#[derive(Debug, sqlx::FromRow)]
struct ColumnInfo {
    name: String,
    r#type: String,
    notnull: i32,
}

async fn downloads_columns(pool: &SqlitePool) -> Vec<ColumnInfo> {
    sqlx::query_as::<_, ColumnInfo>("SELECT name, type, \"notnull\" FROM pragma_table_info('downloads')")
        .fetch_all(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("storage.sqlite3");

    assert!(!db_path.exists());

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());

    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("storage.sqlite3");

    let pool1 = init_database(&db_path).await.unwrap();
    sqlx::query(
        "INSERT INTO downloads (name, count, date, last_updated_at, date_year, date_month, date_day, date_day_of_week)
         VALUES ('left-pad', 10, '2023-03-15', '2023-03-16T00:00:00Z', 2023, 3, 15, 3)",
    )
    .execute(&pool1)
    .await
    .unwrap();
    pool1.close().await;

    // Re-initializing must not drop or recreate the table
    let pool2 = init_database(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM downloads")
        .fetch_one(&pool2)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_downloads_table_columns() {
    let pool = init_memory_database().await.unwrap();
    let columns = downloads_columns(&pool).await;

    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "id",
            "name",
            "count",
            "date",
            "last_updated_at",
            "date_year",
            "date_month",
            "date_day",
            "date_day_of_week",
        ]
    );

    let count = columns.iter().find(|c| c.name == "count").unwrap();
    assert_eq!(count.r#type, "INTEGER");
    assert_eq!(count.notnull, 1);
}

#[tokio::test]
async fn test_unique_key_rejects_duplicate_day() {
    let pool = init_memory_database().await.unwrap();

    let insert = "INSERT INTO downloads (name, count, date, last_updated_at, date_year, date_month, date_day, date_day_of_week)
                  VALUES ('left-pad', ?, '2023-03-15', '2023-03-16T00:00:00Z', 2023, 3, 15, 3)";

    sqlx::query(insert).bind(1_i64).execute(&pool).await.unwrap();
    let duplicate = sqlx::query(insert).bind(2_i64).execute(&pool).await;

    assert!(duplicate.is_err(), "UNIQUE(name, date_year, date_month, date_day) not enforced");
}

#[tokio::test]
async fn test_memory_databases_are_isolated() {
    let pool_a = init_memory_database().await.unwrap();
    let pool_b = init_memory_database().await.unwrap();

    sqlx::query(
        "INSERT INTO downloads (name, count, date, last_updated_at, date_year, date_month, date_day, date_day_of_week)
         VALUES ('a', 1, '2023-03-15', '2023-03-16T00:00:00Z', 2023, 3, 15, 3)",
    )
    .execute(&pool_a)
    .await
    .unwrap();

    let count_b: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM downloads")
        .fetch_one(&pool_b)
        .await
        .unwrap();
    assert_eq!(count_b, 0);
}

#[tokio::test]
async fn test_unusable_parent_directory_names_path() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();

    let result = init_database(&blocker.join("storage.sqlite3")).await;

    match result {
        Err(Error::Io { path, .. }) => assert_eq!(path, blocker),
        other => panic!("expected Io error, got {other:?}"),
    }
}
