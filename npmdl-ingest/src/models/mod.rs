//! Data models for npmdl-ingest
//!
//! Wire shapes of the two npm APIs, the value objects passed between
//! pipeline stages, and the run summary.

pub mod batch;
pub mod downloads;
pub mod period;
pub mod record;
pub mod run_summary;
pub mod search;

pub use batch::{is_scoped_package_name, FetchBatch, MAX_BATCH_SIZE, SCOPED_PACKAGE_PREFIX};
pub use downloads::{DailyPoint, DownloadsResponse, PackageDownloads, PackageSeries};
pub use period::Period;
pub use record::DownloadRecord;
pub use run_summary::RunSummary;
pub use search::{SearchHit, SearchPackage, SearchQuery, SearchResponse, SearchWeights};
