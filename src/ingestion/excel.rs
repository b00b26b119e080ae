#![cfg(feature = "excel")]

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::error::{PipelineError, PipelineResult};

/// Convert the first sheet of a workbook (`.xlsx`, `.xls`, `.ods`, etc.) into a comma-delimited
/// sibling file and return its path.
///
/// Behavior:
/// - The sibling has the same stem and directory, with a `.csv` extension; an existing file of
///   that name is overwritten
/// - Every cell of the sheet's used range is written, anchored at `A1` (leading empty rows and
///   columns are kept as empty fields)
/// - Cells are serialized as text; see [`cell_to_text`]
pub fn convert_first_sheet_to_csv(path: impl AsRef<Path>) -> PipelineResult<PathBuf> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)?;

    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| PipelineError::Unsupported {
            message: format!("workbook has no sheets ({})", path.display()),
        })?;
    let range = workbook.worksheet_range(&first)?;

    let out_path = path.with_extension("csv");
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(&out_path)?;
    write_range(&mut wtr, &range)?;
    wtr.flush()?;

    Ok(out_path)
}

fn write_range<W: std::io::Write>(wtr: &mut csv::Writer<W>, range: &Range<Data>) -> PipelineResult<()> {
    let (row0, col0) = match range.start() {
        Some((r, c)) => (r as usize, c as usize),
        // Empty sheet: nothing to write, downstream sees an empty file.
        None => return Ok(()),
    };
    let width = col0 + range.width();

    for _ in 0..row0 {
        wtr.write_record(std::iter::repeat_n("", width.max(1)))?;
    }
    for row in range.rows() {
        let mut fields: Vec<String> = Vec::with_capacity(width);
        fields.extend(std::iter::repeat_n(String::new(), col0));
        fields.extend(row.iter().map(cell_to_text));
        wtr.write_record(&fields)?;
    }
    Ok(())
}

/// Textual form of a cell.
///
/// Integral floats lose their fractional part (`3.0` → `3`), so numbers typed in Excel look
/// the same as in a CSV export. Error cells keep their error code (`#DIV/0!`), which later
/// fails numeric parsing like any other text.
pub fn cell_to_text(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(d) => d.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
        Data::Empty => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_serialize_like_a_csv_export() {
        assert_eq!(cell_to_text(&Data::Float(3.0)), "3");
        assert_eq!(cell_to_text(&Data::Float(12.5)), "12.5");
        assert_eq!(cell_to_text(&Data::Int(7)), "7");
        assert_eq!(cell_to_text(&Data::Bool(true)), "true");
        assert_eq!(cell_to_text(&Data::String("Bihar".to_string())), "Bihar");
        assert_eq!(cell_to_text(&Data::Empty), "");
    }

    #[test]
    fn malformed_workbook_is_an_excel_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"definitely not a zip archive").unwrap();

        let err = convert_first_sheet_to_csv(&path).unwrap_err();
        assert!(matches!(err, PipelineError::Excel(_)));
        assert!(!dir.path().join("broken.csv").exists());
    }
}
