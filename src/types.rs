//! Core data model types for the normalization pipeline.
//!
//! Every input file, whatever its layout, is reduced to a list of [`CanonicalRecord`]s. The
//! per-file facts needed to build them (year, goal, delimiter, layout) live in a
//! [`FileIdentity`] that is computed once and discarded after the file is processed.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Goal name used when neither the file name nor the headers identify a goal.
pub const UNKNOWN_GOAL: &str = "Unknown Goal";

/// Default provenance URL stamped on every record.
pub const DEFAULT_SOURCE_URL: &str = "https://ik.imagekit.io/sdg/";

/// Default data-source label stamped on every record.
pub const DEFAULT_DATA_SOURCE: &str = "NITI Aayog";

/// One normalized measurement, in the shape accepted by the ingestion API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub sdg_goal: Option<u32>,
    pub sdg_name: String,
    pub state: Option<String>,
    /// Mandatory for transmission; see [`crate::processing::validate`].
    pub indicator_name: Option<String>,
    pub indicator_value: f64,
    pub year: i32,
    pub source_url: String,
    pub data_source: String,
}

impl CanonicalRecord {
    /// Returns `true` if the record carries a non-empty indicator name.
    pub fn has_indicator_name(&self) -> bool {
        self.indicator_name.as_deref().is_some_and(|n| !n.is_empty())
    }
}

/// Constant provenance tags stamped onto every emitted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub source_url: String,
    pub data_source: String,
}

impl Default for Provenance {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            data_source: DEFAULT_DATA_SOURCE.to_string(),
        }
    }
}

/// SDG goal attribution for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Goal {
    /// Goal number, `None` when undetectable.
    pub number: Option<u32>,
    /// Human-readable goal label.
    pub name: String,
}

impl Goal {
    /// Create a known goal.
    pub fn new(number: u32, name: impl Into<String>) -> Self {
        Self {
            number: Some(number),
            name: name.into(),
        }
    }

    /// The fallback attribution: no number, `"Unknown Goal"`.
    pub fn unknown() -> Self {
        Self {
            number: None,
            name: UNKNOWN_GOAL.to_string(),
        }
    }

    pub fn is_known(&self) -> bool {
        self.number.is_some()
    }
}

/// Table shape of a parsed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One row per state + indicator.
    Narrow,
    /// One row per state, one column per indicator.
    Wide,
}

/// Per-file facts computed before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct FileIdentity {
    /// The file as found in the staging directory.
    pub raw_path: PathBuf,
    /// The delimited text actually read (a converted sibling for spreadsheets).
    pub csv_path: PathBuf,
    pub delimiter: u8,
    pub year: i32,
    pub goal: Goal,
    pub layout: Layout,
}

/// A parsed data row: `(header, cell)` pairs in column order.
///
/// Original header order and casing are kept; the wide layout depends on both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    /// Create a row from `(header, cell)` pairs.
    pub fn new(cells: Vec<(String, String)>) -> Self {
        Self { cells }
    }

    /// Build a row by zipping headers with cells. Missing trailing cells are omitted.
    pub fn from_parts<'a>(
        headers: impl IntoIterator<Item = &'a str>,
        cells: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let cells = headers
            .into_iter()
            .zip(cells)
            .map(|(h, c)| (h.to_string(), c.to_string()))
            .collect();
        Self { cells }
    }

    /// Exact (case-sensitive) lookup. A repeated header resolves to its last cell.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .rev()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    /// Lookup on the lower-cased, trimmed header.
    ///
    /// `key` must already be lower-case. When several headers collapse to the same key, the
    /// last one wins, like building a map from the row.
    pub fn get_normalized(&self, key: &str) -> Option<&str> {
        self.cells
            .iter()
            .rev()
            .find(|(h, _)| h.trim().to_lowercase() == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
