//! Narrow layout: one row per state + indicator.

use crate::types::{CanonicalRecord, FileIdentity, Provenance, Row};

use super::numeric::parse_leading_float;

/// Accepted indicator-name headers, in priority order (lower-cased, trimmed).
pub const INDICATOR_ALIASES: &[&str] = &[
    "indicator",
    "indicator name",
    "indicator_name",
    "name of indicator",
    "indicators",
];

/// Accepted state headers, in priority order.
pub const STATE_ALIASES: &[&str] = &["area", "state", "ut"];

/// Accepted value headers, in priority order.
pub const VALUE_ALIASES: &[&str] = &["value", "indicator value"];

/// Normalize one narrow-layout row. Always emits exactly one record.
///
/// Headers are matched lower-cased and trimmed; the first alias with a non-empty cell wins. A
/// missing or empty value defaults to `"0"`, and a value that does not parse as a number
/// becomes `0.0`. The indicator name may be absent; validation drops such records later.
pub fn normalize_narrow_row(row: &Row, identity: &FileIdentity, provenance: &Provenance) -> CanonicalRecord {
    let indicator_name = first_non_empty(row, INDICATOR_ALIASES).map(str::to_string);
    let state = first_non_empty(row, STATE_ALIASES).map(str::to_string);
    let raw_value = first_non_empty(row, VALUE_ALIASES).unwrap_or("0");

    let parsed = parse_leading_float(raw_value);
    let indicator_value = if parsed.is_nan() { 0.0 } else { parsed };

    CanonicalRecord {
        sdg_goal: identity.goal.number,
        sdg_name: identity.goal.name.clone(),
        state,
        indicator_name,
        indicator_value,
        year: identity.year,
        source_url: provenance.source_url.clone(),
        data_source: provenance.data_source.clone(),
    }
}

fn first_non_empty<'r>(row: &'r Row, aliases: &[&str]) -> Option<&'r str> {
    aliases
        .iter()
        .filter_map(|alias| row.get_normalized(alias))
        .find(|v| !v.is_empty())
}
