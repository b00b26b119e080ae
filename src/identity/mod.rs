//! Goal & year resolution for a staging file.
//!
//! File names are tried first (`sdg_<n>_<slug>`, `YYYY-YY`); header content is the fallback for
//! the goal, the current calendar year the fallback for the year. Resolution is pure apart from
//! the caller having read the headers.

mod goal;
mod year;

use std::path::Path;

use crate::ingestion::PreparedSource;
use crate::processing::classify_layout;
use crate::types::{FileIdentity, Goal};

pub use goal::{goal_from_file_name, goal_from_headers, GOAL_PHRASES};
pub use year::{current_year, year_from_file_name};

/// Goal for a file: file name first, headers second.
pub fn resolve_goal<S: AsRef<str>>(raw_path: &Path, headers: &[S]) -> Goal {
    file_name(raw_path)
        .and_then(goal_from_file_name)
        .unwrap_or_else(|| goal_from_headers(headers))
}

/// Year for a file: `YYYY-YY` in the file name, else `fallback_year`.
pub fn resolve_year(raw_path: &Path, fallback_year: i32) -> i32 {
    file_name(raw_path)
        .and_then(year_from_file_name)
        .unwrap_or(fallback_year)
}

/// Build the [`FileIdentity`] of a prepared source from its header row.
///
/// Names are taken from the raw (pre-conversion) path.
pub fn resolve_identity<S: AsRef<str>>(
    source: &PreparedSource,
    headers: &[S],
    fallback_year: i32,
) -> FileIdentity {
    FileIdentity {
        raw_path: source.raw_path.clone(),
        csv_path: source.csv_path.clone(),
        delimiter: source.delimiter,
        year: resolve_year(&source.raw_path, fallback_year),
        goal: resolve_goal(&source.raw_path, headers),
        layout: classify_layout(headers),
    }
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}
