//! Database access for npmdl-ingest
//!
//! Schema creation lives in `npmdl_common::db`; this module holds the
//! statements the pipeline runs against the `downloads` table.

pub mod downloads;

pub use npmdl_common::db::{init_database, init_memory_database};
