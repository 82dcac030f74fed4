//! Run orchestration
//!
//! Search expansion, partitioning, fetching and upserting wired into one run.

pub mod pipeline;

pub use pipeline::IngestPipeline;
