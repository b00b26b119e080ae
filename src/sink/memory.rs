use std::collections::{BTreeMap, BTreeSet};

use crate::error::{PipelineError, PipelineResult};
use crate::types::CanonicalRecord;

use super::RecordSink;

/// Upsert key used by the relational store: (sdg_goal, state, indicator_name, year).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    pub sdg_goal: Option<u32>,
    pub state: Option<String>,
    pub indicator_name: Option<String>,
    pub year: i32,
}

impl RecordKey {
    pub fn of(record: &CanonicalRecord) -> Self {
        Self {
            sdg_goal: record.sdg_goal,
            state: record.state.clone(),
            indicator_name: record.indicator_name.clone(),
            year: record.year,
        }
    }
}

/// In-process sink with the ingestion API's upsert semantics.
///
/// A new key inserts the record; an existing key overwrites `indicator_value` and
/// `data_source` and keeps the other stored fields. Every record in a batch counts as an
/// affected row. A batch that repeats a key is rejected as a whole and stores nothing, like a
/// single `INSERT ... ON CONFLICT DO UPDATE` statement. Used for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    rows: BTreeMap<RecordKey, CanonicalRecord>,
    batches: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored rows, ordered by key.
    pub fn rows(&self) -> impl Iterator<Item = &CanonicalRecord> {
        self.rows.values()
    }

    pub fn get(&self, key: &RecordKey) -> Option<&CanonicalRecord> {
        self.rows.get(key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of batches received.
    pub fn batches_received(&self) -> usize {
        self.batches
    }
}

impl RecordSink for MemorySink {
    fn send_batch(&mut self, batch: &[CanonicalRecord]) -> PipelineResult<u64> {
        self.batches += 1;

        let mut seen = BTreeSet::new();
        for record in batch {
            let key = RecordKey::of(record);
            if !seen.insert(key.clone()) {
                return Err(PipelineError::Rejected {
                    message: format!("key {key:?} appears more than once in the batch"),
                });
            }
        }

        for record in batch {
            self.rows
                .entry(RecordKey::of(record))
                .and_modify(|stored| {
                    stored.indicator_value = record.indicator_value;
                    stored.data_source = record.data_source.clone();
                })
                .or_insert_with(|| record.clone());
        }
        Ok(batch.len() as u64)
    }
}
