//! Reading raw staging files.
//!
//! - [`format`]: extension-based format detection, spreadsheet conversion dispatch and delimiter
//!   sniffing ([`prepare_source`])
//! - [`csv`]: a lazy row sequence over delimited text ([`CsvRows`])
//! - [`excel`]: first-sheet → CSV conversion (feature `excel`)
//! - [`observability`]: observer hooks used throughout a pipeline run

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod format;
pub mod observability;

pub use self::csv::{open_rows, rows_from_reader, CsvRows};
pub use format::{detect_delimiter, prepare_source, PreparedSource, SourceFormat};
pub use observability::{
    BatchInfo, CompositeObserver, FileObserver, PipelineObserver, TracingObserver,
};
