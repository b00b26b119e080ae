//! Validation and batching of normalized records.

use crate::types::CanonicalRecord;

/// Outcome of [`validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    /// Records eligible for transmission, in input order.
    pub valid: Vec<CanonicalRecord>,
    /// Number of records dropped for a missing or empty indicator name.
    pub dropped: usize,
}

/// Drop records whose `indicator_name` is missing or empty.
pub fn validate(records: Vec<CanonicalRecord>) -> Validated {
    let total = records.len();
    let valid: Vec<CanonicalRecord> = records
        .into_iter()
        .filter(CanonicalRecord::has_indicator_name)
        .collect();
    let dropped = total - valid.len();
    Validated { valid, dropped }
}

/// Split `records` into consecutive batches of at most `batch_size`, preserving order.
///
/// # Panics
///
/// Panics if `batch_size` is 0; [`crate::config::PipelineConfig::validate`] rejects that.
pub fn batches(records: &[CanonicalRecord], batch_size: usize) -> std::slice::Chunks<'_, CanonicalRecord> {
    records.chunks(batch_size)
}

/// Number of batches [`batches`] yields for `len` records.
pub fn batch_count(len: usize, batch_size: usize) -> usize {
    len.div_ceil(batch_size)
}
