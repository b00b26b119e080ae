use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;

static FISCAL_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})-\d{2}").expect("valid fiscal-year regex"));

/// Reporting year from a `YYYY-YY` segment in a file name (`data_2022-23.csv` → 2022).
///
/// Only the first match counts. Returns `None` when the name carries no such segment.
pub fn year_from_file_name(file_name: &str) -> Option<i32> {
    FISCAL_YEAR
        .captures(file_name)
        .and_then(|caps| caps[1].parse().ok())
}

/// The current calendar year (local time), used when a file name has no year.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}
