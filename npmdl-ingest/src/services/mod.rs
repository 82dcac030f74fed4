//! Service modules for the ingest pipeline
//!
//! API clients, batch partitioning, the bounded fetch/search/upsert stages
//! and the record transformer.

pub mod batch_partitioner;
pub mod downloads_client;
pub mod fetch_scheduler;
pub mod http_json;
pub mod record_transformer;
pub mod registry_client;
pub mod search_expander;
pub mod upsert_scheduler;

pub use batch_partitioner::partition;
pub use downloads_client::DownloadsClient;
pub use fetch_scheduler::spawn_fetch_stage;
pub use record_transformer::{transform, TransformOutput, DEFAULT_SUB_BATCH_SIZE};
pub use registry_client::{RegistryClient, PAGE_SIZE};
pub use search_expander::spawn_search_stage;
pub use upsert_scheduler::{UpsertReport, UpsertScheduler};
