//! Normalization of parsed rows into [`CanonicalRecord`]s.
//!
//! - [`classify_layout`]: wide vs narrow, from the header row
//! - [`narrow`]: one record per row, aliases for indicator/state/value columns
//! - [`wide`]: one record per numeric indicator cell
//! - [`validate()`] / [`batches`]: drop nameless records, chunk for upload
//!
//! ## Example
//!
//! ```rust
//! use std::path::PathBuf;
//!
//! use sdg_ingest::processing::{classify_layout, normalize, validate};
//! use sdg_ingest::types::{FileIdentity, Goal, Provenance, Row};
//!
//! let headers = vec!["Area".to_string(), "Indicator".to_string(), "Value".to_string()];
//! let rows = vec![
//!     Row::from_parts(["Area", "Indicator", "Value"], ["Bihar", "Dropout Rate", "12.5"]),
//!     Row::from_parts(["Area", "Indicator", "Value"], ["Kerala", "", "3"]),
//! ];
//! let identity = FileIdentity {
//!     raw_path: PathBuf::from("sdg_4_quality-education.csv"),
//!     csv_path: PathBuf::from("sdg_4_quality-education.csv"),
//!     delimiter: b',',
//!     year: 2023,
//!     goal: Goal::new(4, "Quality Education"),
//!     layout: classify_layout(&headers),
//! };
//!
//! let records = normalize(rows.into_iter().map(Ok), &headers, &identity, &Provenance::default())?;
//! assert_eq!(records.len(), 2);
//!
//! let out = validate(records);
//! assert_eq!(out.valid.len(), 1);
//! assert_eq!(out.dropped, 1);
//! # Ok::<(), sdg_ingest::PipelineError>(())
//! ```

pub mod layout;
pub mod narrow;
pub mod numeric;
pub mod validate;
pub mod wide;

use crate::error::PipelineResult;
use crate::types::{CanonicalRecord, FileIdentity, Layout, Provenance, Row};

pub use layout::classify_layout;
pub use narrow::normalize_narrow_row;
pub use numeric::parse_leading_float;
pub use validate::{batch_count, batches, validate, Validated};
pub use wide::{indicator_columns, normalize_wide_row};

/// Normalize a row sequence according to `identity.layout`.
///
/// Rows are consumed lazily; the first read error aborts normalization of the file.
pub fn normalize<I, S>(
    rows: I,
    headers: &[S],
    identity: &FileIdentity,
    provenance: &Provenance,
) -> PipelineResult<Vec<CanonicalRecord>>
where
    I: IntoIterator<Item = PipelineResult<Row>>,
    S: AsRef<str>,
{
    let mut out = Vec::new();
    match identity.layout {
        Layout::Narrow => {
            for row in rows {
                out.push(normalize_narrow_row(&row?, identity, provenance));
            }
        }
        Layout::Wide => {
            let cols = indicator_columns(headers);
            for row in rows {
                out.extend(normalize_wide_row(&row?, &cols, identity, provenance));
            }
        }
    }
    Ok(out)
}
