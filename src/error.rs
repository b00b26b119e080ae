use std::error::Error as StdError;

use thiserror::Error;

/// Convenience result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error type returned by pipeline functions.
///
/// One enum is shared by format detection, row reading, upload and the orchestrator. Most
/// record-level problems (unknown goal, non-numeric cells, missing indicator names) are not
/// errors at all; they are absorbed by the normalizer and surfaced as counts.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading or writing error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "excel")]
    /// Spreadsheet container could not be opened or read (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// Transport-level failure talking to the ingestion API.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The ingestion API answered with a non-success status.
    #[error("ingestion api returned {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// JSON encoding/decoding error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The sink refused a batch as a whole.
    #[error("batch rejected: {message}")]
    Rejected { message: String },

    /// Invalid configuration value.
    #[error("invalid configuration: {message}")]
    Config { message: String },

    /// The input cannot be handled by this build (e.g. spreadsheet without the `excel` feature).
    #[error("unsupported input: {message}")]
    Unsupported { message: String },
}

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

/// Maps an error to the severity reported to observers.
pub fn severity_for_error(e: &PipelineError) -> Severity {
    match e {
        PipelineError::Io(_) => Severity::Critical,
        PipelineError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => Severity::Critical,
            _ => Severity::Error,
        },
        #[cfg(feature = "excel")]
        PipelineError::Excel(err) => {
            if error_chain_contains_io(err) {
                Severity::Critical
            } else {
                Severity::Error
            }
        }
        PipelineError::Http(_) | PipelineError::HttpStatus { .. } | PipelineError::Rejected { .. } => {
            Severity::Error
        }
        PipelineError::Json(_) => Severity::Error,
        PipelineError::Config { .. } | PipelineError::Unsupported { .. } => Severity::Error,
    }
}

#[cfg_attr(not(feature = "excel"), allow(dead_code))]
fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}
