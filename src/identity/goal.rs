//! SDG goal attribution from file names and header content.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::Goal;

/// Header phrases that identify a goal, tested in declaration order.
///
/// Order matters: for a given header, the first phrase that matches wins. Phrases are matched
/// against lower-cased headers as written here, so entries with capitals only match headers
/// that keep those capitals after lower-casing (i.e. never).
pub const GOAL_PHRASES: &[(&str, u32, &str)] = &[
    ("kachha houses", 1, "No Poverty"),
    ("poverty index", 1, "No Poverty"),
    ("poverty line", 1, "No Poverty"),
    ("underweight", 2, "Zero Hunger"),
    ("stunted", 2, "Zero Hunger"),
    ("rice", 2, "Zero Hunger"),
    ("maternal mortality", 3, "Good Health and Well-being"),
    ("(GPI)", 4, "Quality Education"),
    ("dropout", 4, "Quality Education"),
    ("literate", 4, "Quality Education"),
    ("(LFPR)", 5, "Gender Equality"),
    ("sex ratio", 5, "Gender Equality"),
    ("(PWS)", 6, "Clean Water and Sanitation"),
    ("over-exploited", 6, "Clean Water and Sanitation"),
    ("electrified", 7, "Affordable and Clean Energy"),
    ("LPG", 7, "Affordable and Clean Energy"),
    ("PNG", 7, "Affordable and Clean Energy"),
];

static FILE_NAME_GOAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)sdg_(\d+)_([\w-]+)").expect("valid goal file-name regex"));

/// Goal from a `sdg_<number>_<slug>` file name, e.g. `sdg_3_good-health.csv` → 3, "Good Health".
///
/// Returns `None` when the pattern is absent, or when the number is 0 or does not fit in a
/// `u32`.
pub fn goal_from_file_name(file_name: &str) -> Option<Goal> {
    let caps = FILE_NAME_GOAL.captures(file_name)?;
    let number: u32 = caps[1].parse().ok().filter(|n| *n != 0)?;
    Some(Goal::new(number, humanize_slug(&caps[2])))
}

/// Goal from header content: first header, then first phrase in [`GOAL_PHRASES`].
///
/// Returns [`Goal::unknown`] when there are no headers or nothing matches.
pub fn goal_from_headers<S: AsRef<str>>(headers: &[S]) -> Goal {
    headers
        .iter()
        .map(|h| h.as_ref().to_lowercase())
        .find_map(|header| {
            GOAL_PHRASES
                .iter()
                .find(|(phrase, _, _)| header.contains(phrase))
                .map(|&(_, number, name)| Goal::new(number, name))
        })
        .unwrap_or_else(Goal::unknown)
}

/// `good-health` / `good_health` → `Good Health`.
fn humanize_slug(slug: &str) -> String {
    slug.split(['_', '-'])
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
