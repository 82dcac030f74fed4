//! Utility modules for npmdl-ingest

pub mod bounded;

pub use bounded::{await_completion, BoundedTasks, JoinReport, StageCollected, StageOutput};
