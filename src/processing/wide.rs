//! Wide layout: one row per state, one column per indicator.

use crate::types::{CanonicalRecord, FileIdentity, Provenance, Row};

use super::numeric::parse_leading_float;

/// Structural (non-indicator) columns, compared lower-cased.
pub const STRUCTURAL_COLUMNS: &[&str] = &["sno", "area", "state", "ut", "district"];

/// State headers, exact case, in priority order.
const STATE_KEYS: &[&str] = &["Area", "State", "UT"];

/// Headers that carry indicator values: everything outside [`STRUCTURAL_COLUMNS`].
pub fn indicator_columns<S: AsRef<str>>(headers: &[S]) -> Vec<&str> {
    headers
        .iter()
        .map(|h| h.as_ref())
        .filter(|h| !STRUCTURAL_COLUMNS.contains(&h.to_lowercase().as_str()))
        .collect()
}

/// Pivot one wide-layout row into one record per numeric indicator cell.
///
/// A cell that does not parse to a finite number is skipped (no record), unlike the narrow
/// layout's zero default. The indicator name is the trimmed column header.
pub fn normalize_wide_row(
    row: &Row,
    indicator_columns: &[&str],
    identity: &FileIdentity,
    provenance: &Provenance,
) -> Vec<CanonicalRecord> {
    let state = STATE_KEYS
        .iter()
        .filter_map(|k| row.get(k))
        .find(|v| !v.is_empty())
        .map(str::to_string);

    indicator_columns
        .iter()
        .filter_map(|&col| {
            let value = parse_leading_float(row.get(col).unwrap_or(""));
            value.is_finite().then(|| CanonicalRecord {
                sdg_goal: identity.goal.number,
                sdg_name: identity.goal.name.clone(),
                state: state.clone(),
                indicator_name: Some(col.trim().to_string()),
                indicator_value: value,
                year: identity.year,
                source_url: provenance.source_url.clone(),
                data_source: provenance.data_source.clone(),
            })
        })
        .collect()
}
