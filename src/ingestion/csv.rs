//! Lazy row reading over delimited text.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::PipelineResult;
use crate::types::Row;

/// A finite, lazy sequence of [`Row`]s.
///
/// Headers are read eagerly when the sequence is created; data rows are read one at a time as
/// the iterator is advanced. A read error is yielded once, after which the sequence ends.
///
/// Rules:
///
/// - The first line is the header row. An empty input has no headers and no rows.
/// - Cells are not trimmed.
/// - Rows may be shorter or longer than the header row; extra cells are dropped, missing ones
///   are simply absent from the [`Row`].
/// - Invalid UTF-8 is replaced rather than rejected.
pub struct CsvRows<R> {
    rdr: csv::Reader<R>,
    headers: Vec<String>,
    record: csv::ByteRecord,
    done: bool,
}

/// Open `path` as delimited text with the given separator.
pub fn open_rows(path: impl AsRef<Path>, delimiter: u8) -> PipelineResult<CsvRows<File>> {
    let file = File::open(path)?;
    rows_from_reader(file, delimiter)
}

/// Build a row sequence over any reader.
pub fn rows_from_reader<R: Read>(reader: R, delimiter: u8) -> PipelineResult<CsvRows<R>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect::<Vec<_>>();
    // A blank input reports a single empty header.
    let headers = if headers.len() == 1 && headers[0].is_empty() {
        Vec::new()
    } else {
        headers
    };

    Ok(CsvRows {
        rdr,
        headers,
        record: csv::ByteRecord::new(),
        done: false,
    })
}

impl<R: Read> CsvRows<R> {
    /// Header row in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    fn to_row(&self) -> Row {
        let cells = self
            .headers
            .iter()
            .zip(self.record.iter())
            .map(|(h, c)| (h.clone(), String::from_utf8_lossy(c).into_owned()))
            .collect();
        Row::new(cells)
    }
}

impl<R: Read> Iterator for CsvRows<R> {
    type Item = PipelineResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.rdr.read_byte_record(&mut self.record) {
            Ok(true) => Some(Ok(self.to_row())),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
        }
    }
}
