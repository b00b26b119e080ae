use crate::types::Layout;

/// Classify a header row as [`Layout::Wide`] or [`Layout::Narrow`].
///
/// Wide when no header mentions "indicator" (case-insensitive) and there are more than three
/// headers. This is a heuristic; the result is final for the file.
pub fn classify_layout<S: AsRef<str>>(headers: &[S]) -> Layout {
    let has_indicator_column = headers
        .iter()
        .any(|h| h.as_ref().to_lowercase().contains("indicator"));

    if !has_indicator_column && headers.len() > 3 {
        Layout::Wide
    } else {
        Layout::Narrow
    }
}
