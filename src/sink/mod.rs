//! Destinations for validated record batches.
//!
//! A [`RecordSink`] receives one batch per call and reports how many rows the destination
//! affected. [`upload`] drives a sink over all batches of a file: sequentially, without retries,
//! and without letting one failed batch stop the rest.

mod http;
mod memory;

use std::path::Path;

use crate::error::{severity_for_error, PipelineResult, Severity};
use crate::ingestion::{BatchInfo, PipelineObserver};
use crate::processing::{batch_count, batches};
use crate::types::CanonicalRecord;

pub use http::{HttpSink, InsertResponse};
pub use memory::{MemorySink, RecordKey};

/// A destination that accepts batches of canonical records.
pub trait RecordSink {
    /// Transmit one batch. Returns the number of rows the destination reports as inserted or
    /// updated.
    fn send_batch(&mut self, batch: &[CanonicalRecord]) -> PipelineResult<u64>;
}

impl<T: RecordSink + ?Sized> RecordSink for &mut T {
    fn send_batch(&mut self, batch: &[CanonicalRecord]) -> PipelineResult<u64> {
        (**self).send_batch(batch)
    }
}

impl<T: RecordSink + ?Sized> RecordSink for Box<T> {
    fn send_batch(&mut self, batch: &[CanonicalRecord]) -> PipelineResult<u64> {
        (**self).send_batch(batch)
    }
}

/// Totals for one file's upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    /// Batches attempted.
    pub batches: usize,
    /// Batches that failed (transport error or non-success response).
    pub failed_batches: usize,
    /// Sum of the inserted counts reported for successful batches.
    pub inserted: u64,
    /// Records in failed batches.
    pub failed_records: usize,
}

/// Send `records` to `sink` in batches of `batch_size`.
///
/// Failures are reported to `observer` (and escalated to `on_alert` at or above
/// `alert_at_or_above`) and then skipped. `path` only labels the events.
pub fn upload<S: RecordSink + ?Sized>(
    sink: &mut S,
    records: &[CanonicalRecord],
    batch_size: usize,
    path: &Path,
    observer: Option<&dyn PipelineObserver>,
    alert_at_or_above: Severity,
) -> UploadSummary {
    let total = batch_count(records.len(), batch_size);
    let mut summary = UploadSummary::default();

    for (idx, batch) in batches(records, batch_size).enumerate() {
        let info = BatchInfo {
            number: idx + 1,
            of: total,
            size: batch.len(),
        };
        summary.batches += 1;

        match sink.send_batch(batch) {
            Ok(inserted) => {
                summary.inserted += inserted;
                if let Some(obs) = observer {
                    obs.on_batch_uploaded(path, info, inserted);
                }
            }
            Err(e) => {
                summary.failed_batches += 1;
                summary.failed_records += batch.len();
                if let Some(obs) = observer {
                    let sev = severity_for_error(&e);
                    obs.on_batch_failed(path, info, sev, &e);
                    if sev >= alert_at_or_above {
                        obs.on_alert(path, sev, &e);
                    }
                }
            }
        }
    }

    summary
}
