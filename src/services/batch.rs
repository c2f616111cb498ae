//! Partitioning of the record list into size-bounded batches.

use chrono::Utc;

use crate::models::telemetry::{Batch, TelemetryRecord};

/// Partition records into consecutive batches of at most `max_per_batch`
/// records, preserving order. Zero records produce zero batches. Slicing is
/// index-based over the immutable record list; the input stays intact.
///
/// Each batch is stamped with the epoch time at which it was formed.
pub fn into_batches(records: &[TelemetryRecord], max_per_batch: usize) -> Vec<Batch> {
    assert!(max_per_batch > 0, "batch size must be positive");

    records
        .chunks(max_per_batch)
        .map(|chunk| Batch {
            records: chunk.to_vec(),
            timestamp: Utc::now().timestamp(),
        })
        .collect()
}
