//! Batch partitioner
//!
//! Splits package names into downloads-API batches: non-scoped names are
//! chunked by count, scoped names each get their own batch because the
//! bulk endpoint cannot carry them.

use crate::models::{is_scoped_package_name, FetchBatch, Period};

/// Partition `names` into request batches of at most `max_batch_size`
///
/// Output order: the non-scoped chunks first (input order kept), then one
/// singleton batch per scoped name.
///
/// # Panics
/// If `max_batch_size` is zero.
pub fn partition<I, S>(period: &Period, names: I, max_batch_size: usize) -> Vec<FetchBatch>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    assert!(max_batch_size >= 1, "max_batch_size must be at least 1");

    let (scoped, non_scoped): (Vec<String>, Vec<String>) = names
        .into_iter()
        .map(Into::into)
        .partition(|name| is_scoped_package_name(name));

    let mut batches: Vec<FetchBatch> = non_scoped
        .chunks(max_batch_size)
        .map(|chunk| FetchBatch::new(period.clone(), chunk.to_vec()))
        .collect();

    batches.extend(
        scoped
            .into_iter()
            .map(|name| FetchBatch::new(period.clone(), vec![name])),
    );

    batches
}
