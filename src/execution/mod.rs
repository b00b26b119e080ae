//! Run orchestration over the staging directory.
//!
//! A [`Pipeline`] owns its [`PipelineConfig`] and a [`RecordSink`]. [`Pipeline::run`] lists the
//! staging files once, processes them strictly one after another, then drains the staging
//! directory. A file that fails is recorded and skipped unless
//! [`PipelineConfig::fail_fast`] is set.

mod report;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use crate::config::PipelineConfig;
use crate::error::{severity_for_error, PipelineError, PipelineResult};
use crate::identity::{current_year, resolve_identity};
use crate::ingestion::{open_rows, prepare_source, PipelineObserver};
use crate::processing::{normalize, validate, Validated};
use crate::sink::{upload, RecordSink};

pub use report::{CleanupSummary, FileFailure, FileReport, RunReport};

/// The normalization pipeline bound to one staging directory and one sink.
pub struct Pipeline<S> {
    config: PipelineConfig,
    sink: S,
    observer: Option<Arc<dyn PipelineObserver>>,
    fallback_year: Option<i32>,
}

impl<S: RecordSink> Pipeline<S> {
    /// Create a pipeline. Fails if `config` does not pass [`PipelineConfig::validate`].
    pub fn new(config: PipelineConfig, sink: S) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            sink,
            observer: None,
            fallback_year: None,
        })
    }

    /// Report progress and failures to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Year used for files whose name has no `YYYY-YY` segment. Defaults to the current year.
    pub fn with_fallback_year(mut self, year: i32) -> Self {
        self.fallback_year = Some(year);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// CSV and `.xlsx` files directly inside the staging directory, sorted by file name.
    ///
    /// Symlinks to regular files count as files.
    pub fn staging_files(&self) -> PipelineResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.config.staging_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.path().is_file() && is_staging_candidate(entry.path()) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    /// Process every staging file, then drain the staging directory.
    ///
    /// Listing the staging directory is the only failure that prevents the run from starting.
    /// With `fail_fast`, the first file error stops processing; cleanup still runs and the error
    /// is returned afterwards.
    pub fn run(&mut self) -> PipelineResult<RunReport> {
        let files = self.staging_files()?;
        let mut report = RunReport::default();
        let mut fatal: Option<PipelineError> = None;

        for path in files {
            match self.process_file(&path) {
                Ok(file_report) => report.files.push(file_report),
                Err(e) => {
                    report.failures.push(FileFailure {
                        path: path.clone(),
                        severity: severity_for_error(&e),
                        message: e.to_string(),
                    });
                    if self.config.fail_fast {
                        fatal = Some(e);
                        break;
                    }
                }
            }
        }

        if self.config.cleanup {
            report.cleanup = Some(self.cleanup_staging());
        }
        if let Some(obs) = self.observer.as_deref() {
            obs.on_run_finished(&report);
        }

        match fatal {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }

    /// Detect, resolve, normalize, validate and upload one file.
    ///
    /// Failed batches are part of the returned report, not errors. Errors (unreadable file,
    /// malformed spreadsheet, broken row stream) are also reported to the observer.
    pub fn process_file(&mut self, path: impl AsRef<Path>) -> PipelineResult<FileReport> {
        let path = path.as_ref();
        if let Some(obs) = self.observer.as_deref() {
            obs.on_file_started(path);
        }

        let result = self.process_file_inner(path);
        if let (Err(e), Some(obs)) = (&result, self.observer.as_deref()) {
            let sev = severity_for_error(e);
            obs.on_file_failed(path, sev, e);
            if sev >= self.config.alert_at_or_above {
                obs.on_alert(path, sev, e);
            }
        }
        result
    }

    fn process_file_inner(&mut self, path: &Path) -> PipelineResult<FileReport> {
        let source = prepare_source(path)?;
        let rows = open_rows(&source.csv_path, source.delimiter)?;
        let headers = rows.headers().to_vec();

        let fallback_year = self.fallback_year.unwrap_or_else(current_year);
        let identity = resolve_identity(&source, headers.as_slice(), fallback_year);
        if let Some(obs) = self.observer.as_deref() {
            obs.on_file_resolved(&identity);
        }

        let records = normalize(rows, headers.as_slice(), &identity, &self.config.provenance)?;
        let emitted = records.len();
        let Validated { valid, dropped } = validate(records);
        if dropped > 0 {
            if let Some(obs) = self.observer.as_deref() {
                obs.on_records_skipped(path, dropped, emitted);
            }
        }

        let summary = upload(
            &mut self.sink,
            &valid,
            self.config.batch_size,
            path,
            self.observer.as_deref(),
            self.config.alert_at_or_above,
        );

        let report = FileReport {
            path: path.to_path_buf(),
            identity,
            emitted,
            skipped: dropped,
            upload: summary,
        };
        if let Some(obs) = self.observer.as_deref() {
            obs.on_file_finished(&report);
        }
        Ok(report)
    }

    /// Delete every file currently in the staging directory, processed or not.
    ///
    /// Subdirectories are left alone. Individual failures are reported and counted.
    pub fn cleanup_staging(&self) -> CleanupSummary {
        let mut summary = CleanupSummary::default();
        let dir = &self.config.staging_dir;

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(dir.as_path()).to_path_buf();
                    self.report_cleanup_failure(&path, &std::io::Error::from(e));
                    summary.failed += 1;
                    continue;
                }
            };
            if entry.file_type().is_dir() {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => summary.deleted += 1,
                Err(e) => {
                    self.report_cleanup_failure(entry.path(), &e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    fn report_cleanup_failure(&self, path: &Path, error: &std::io::Error) {
        if let Some(obs) = self.observer.as_deref() {
            obs.on_cleanup_failed(path, error);
        }
    }
}

/// `.csv` or `.xlsx`, case-insensitive.
fn is_staging_candidate(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "csv" | "xlsx"))
}
