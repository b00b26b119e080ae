//! Format detection for staging files.
//!
//! Spreadsheets are converted to a delimited sibling file first; everything downstream reads
//! delimited text only.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[cfg(not(feature = "excel"))]
use crate::error::PipelineError;
use crate::error::PipelineResult;

/// Supported raw file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimited text (comma, semicolon or tab).
    Csv,
    /// Spreadsheet/workbook containers (conversion requires the `excel` feature).
    Excel,
}

impl SourceFormat {
    /// Parse a source format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }

    /// Format of `path` by extension, if recognised.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|s| s.to_str())
            .and_then(Self::from_extension)
    }
}

/// A staging file ready to be read as delimited text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSource {
    /// The file as found in the staging directory.
    pub raw_path: PathBuf,
    /// The delimited text to read. Equals `raw_path` unless the raw file was a spreadsheet.
    pub csv_path: PathBuf,
    /// Field separator sniffed from the first line.
    pub delimiter: u8,
}

impl PreparedSource {
    /// `true` when `csv_path` is a converted sibling of a spreadsheet.
    pub fn was_converted(&self) -> bool {
        self.raw_path != self.csv_path
    }
}

/// Convert (if needed) and sniff the delimiter of a staging file.
///
/// Files with an unrecognised extension are read as delimited text.
pub fn prepare_source(path: impl AsRef<Path>) -> PipelineResult<PreparedSource> {
    let raw_path = path.as_ref().to_path_buf();
    let csv_path = match SourceFormat::from_path(&raw_path) {
        Some(SourceFormat::Excel) => convert_spreadsheet(&raw_path)?,
        Some(SourceFormat::Csv) | None => raw_path.clone(),
    };
    let delimiter = detect_delimiter(&csv_path)?;

    Ok(PreparedSource {
        raw_path,
        csv_path,
        delimiter,
    })
}

/// Sniff the field separator from the first line of `path`.
///
/// Tab wins over semicolon, semicolon over comma. Empty files yield a comma.
pub fn detect_delimiter(path: impl AsRef<Path>) -> PipelineResult<u8> {
    let mut rdr = BufReader::new(File::open(path)?);
    let mut first_line = Vec::new();
    rdr.read_until(b'\n', &mut first_line)?;
    Ok(delimiter_for_line(&first_line))
}

/// Delimiter choice for a single header line.
pub fn delimiter_for_line(line: &[u8]) -> u8 {
    if line.contains(&b'\t') {
        b'\t'
    } else if line.contains(&b';') {
        b';'
    } else {
        b','
    }
}

fn convert_spreadsheet(path: &Path) -> PipelineResult<PathBuf> {
    #[cfg(feature = "excel")]
    {
        super::excel::convert_first_sheet_to_csv(path)
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(PipelineError::Unsupported {
            message: format!(
                "spreadsheet conversion not enabled (enable cargo feature 'excel'): {}",
                path.display()
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_detection_is_case_insensitive() {
        assert_eq!(SourceFormat::from_extension("CSV"), Some(SourceFormat::Csv));
        assert_eq!(SourceFormat::from_extension("Xlsx"), Some(SourceFormat::Excel));
        assert_eq!(SourceFormat::from_extension("json"), None);
        assert_eq!(
            SourceFormat::from_path(Path::new("data/sdg_goal_1_2023-24.csv")),
            Some(SourceFormat::Csv)
        );
        assert_eq!(SourceFormat::from_path(Path::new("README")), None);
    }

    #[test]
    fn delimiter_precedence() {
        assert_eq!(delimiter_for_line(b"a;b\tc\n"), b'\t');
        assert_eq!(delimiter_for_line(b"a;b,c\n"), b';');
        assert_eq!(delimiter_for_line(b"a,b,c\n"), b',');
        assert_eq!(delimiter_for_line(b"single\n"), b',');
        assert_eq!(delimiter_for_line(b""), b',');
    }

    #[test]
    fn only_the_first_line_counts() {
        assert_eq!(delimiter_for_line(b"a,b"), b',');
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.csv");
        std::fs::write(&path, "Area,Value\nBihar;12\tx\n").unwrap();
        assert_eq!(detect_delimiter(&path).unwrap(), b',');
    }
}
