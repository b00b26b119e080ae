use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{PipelineError, Severity};
use crate::execution::{FileReport, RunReport};
use crate::types::{FileIdentity, Layout};

/// Position of a batch within one file's upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchInfo {
    /// 1-based batch number.
    pub number: usize,
    /// Total number of batches for the file.
    pub of: usize,
    /// Records in this batch.
    pub size: usize,
}

/// Observer interface for pipeline progress and failures.
///
/// Every hook has a no-op default. Implementors can record metrics, logs, or trigger alerts.
pub trait PipelineObserver: Send + Sync {
    /// A file is about to be processed.
    fn on_file_started(&self, _path: &Path) {}

    /// Goal, year, delimiter and layout have been resolved for a file.
    fn on_file_resolved(&self, _identity: &FileIdentity) {}

    /// Records without an indicator name were dropped before upload.
    fn on_records_skipped(&self, _path: &Path, _skipped: usize, _total: usize) {}

    /// A batch was accepted by the sink.
    fn on_batch_uploaded(&self, _path: &Path, _batch: BatchInfo, _inserted: u64) {}

    /// A batch was rejected or could not be sent. The upload continues with the next batch.
    fn on_batch_failed(&self, _path: &Path, _batch: BatchInfo, _severity: Severity, _error: &PipelineError) {}

    /// A file was fully processed (possibly with failed batches).
    fn on_file_finished(&self, _report: &FileReport) {}

    /// A file could not be processed.
    fn on_file_failed(&self, _path: &Path, _severity: Severity, _error: &PipelineError) {}

    /// A staging file could not be deleted during cleanup.
    fn on_cleanup_failed(&self, _path: &Path, _error: &std::io::Error) {}

    /// The run (including cleanup) has finished.
    fn on_run_finished(&self, _report: &RunReport) {}

    /// Called in addition to the failure hook when a failure meets the alert threshold.
    fn on_alert(&self, _path: &Path, _severity: Severity, _error: &PipelineError) {}
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn PipelineObserver>>) -> Self {
        Self { observers }
    }

    pub fn push(&mut self, observer: Arc<dyn PipelineObserver>) {
        self.observers.push(observer);
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl PipelineObserver for CompositeObserver {
    fn on_file_started(&self, path: &Path) {
        for o in &self.observers {
            o.on_file_started(path);
        }
    }

    fn on_file_resolved(&self, identity: &FileIdentity) {
        for o in &self.observers {
            o.on_file_resolved(identity);
        }
    }

    fn on_records_skipped(&self, path: &Path, skipped: usize, total: usize) {
        for o in &self.observers {
            o.on_records_skipped(path, skipped, total);
        }
    }

    fn on_batch_uploaded(&self, path: &Path, batch: BatchInfo, inserted: u64) {
        for o in &self.observers {
            o.on_batch_uploaded(path, batch, inserted);
        }
    }

    fn on_batch_failed(&self, path: &Path, batch: BatchInfo, severity: Severity, error: &PipelineError) {
        for o in &self.observers {
            o.on_batch_failed(path, batch, severity, error);
        }
    }

    fn on_file_finished(&self, report: &FileReport) {
        for o in &self.observers {
            o.on_file_finished(report);
        }
    }

    fn on_file_failed(&self, path: &Path, severity: Severity, error: &PipelineError) {
        for o in &self.observers {
            o.on_file_failed(path, severity, error);
        }
    }

    fn on_cleanup_failed(&self, path: &Path, error: &std::io::Error) {
        for o in &self.observers {
            o.on_cleanup_failed(path, error);
        }
    }

    fn on_run_finished(&self, report: &RunReport) {
        for o in &self.observers {
            o.on_run_finished(report);
        }
    }

    fn on_alert(&self, path: &Path, severity: Severity, error: &PipelineError) {
        for o in &self.observers {
            o.on_alert(path, severity, error);
        }
    }
}

/// Emits pipeline events as `tracing` events under the `sdg_ingest` target.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_file_started(&self, path: &Path) {
        tracing::info!(target: "sdg_ingest", path = %path.display(), "processing file");
    }

    fn on_file_resolved(&self, identity: &FileIdentity) {
        tracing::info!(
            target: "sdg_ingest",
            path = %identity.raw_path.display(),
            delimiter = %char::from(identity.delimiter).escape_default(),
            year = identity.year,
            goal = ?identity.goal.number,
            goal_name = %identity.goal.name,
            layout = layout_label(identity.layout),
            "file resolved"
        );
        if !identity.goal.is_known() {
            tracing::warn!(
                target: "sdg_ingest",
                path = %identity.raw_path.display(),
                "could not determine SDG goal"
            );
        }
    }

    fn on_records_skipped(&self, path: &Path, skipped: usize, total: usize) {
        tracing::warn!(
            target: "sdg_ingest",
            path = %path.display(),
            skipped,
            total,
            "skipped records missing indicator_name"
        );
    }

    fn on_batch_uploaded(&self, path: &Path, batch: BatchInfo, inserted: u64) {
        tracing::info!(
            target: "sdg_ingest",
            path = %path.display(),
            batch = batch.number,
            of = batch.of,
            size = batch.size,
            inserted,
            "uploaded batch"
        );
    }

    fn on_batch_failed(&self, path: &Path, batch: BatchInfo, severity: Severity, error: &PipelineError) {
        tracing::error!(
            target: "sdg_ingest",
            path = %path.display(),
            batch = batch.number,
            of = batch.of,
            size = batch.size,
            ?severity,
            %error,
            "failed to upload batch"
        );
    }

    fn on_file_finished(&self, report: &FileReport) {
        tracing::info!(target: "sdg_ingest", "{report}");
    }

    fn on_file_failed(&self, path: &Path, severity: Severity, error: &PipelineError) {
        tracing::error!(
            target: "sdg_ingest",
            path = %path.display(),
            ?severity,
            %error,
            "file failed"
        );
    }

    fn on_cleanup_failed(&self, path: &Path, error: &std::io::Error) {
        tracing::error!(
            target: "sdg_ingest",
            path = %path.display(),
            %error,
            "could not delete staging file"
        );
    }

    fn on_run_finished(&self, report: &RunReport) {
        tracing::info!(target: "sdg_ingest", "{report}");
    }

    fn on_alert(&self, path: &Path, severity: Severity, error: &PipelineError) {
        tracing::error!(
            target: "sdg_ingest",
            alert = true,
            path = %path.display(),
            ?severity,
            %error,
            "ALERT"
        );
    }
}

/// Appends pipeline events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{} {line}", timestamp());
        }
    }
}

impl PipelineObserver for FileObserver {
    fn on_file_resolved(&self, identity: &FileIdentity) {
        self.append_line(&format!(
            "resolved path={} year={} goal={:?} name={:?} layout={}",
            identity.raw_path.display(),
            identity.year,
            identity.goal.number,
            identity.goal.name,
            layout_label(identity.layout)
        ));
    }

    fn on_records_skipped(&self, path: &Path, skipped: usize, total: usize) {
        self.append_line(&format!(
            "skipped path={} skipped={skipped} total={total}",
            path.display()
        ));
    }

    fn on_batch_failed(&self, path: &Path, batch: BatchInfo, severity: Severity, error: &PipelineError) {
        self.append_line(&format!(
            "batch-fail severity={:?} path={} batch={}/{} size={} err={}",
            severity,
            path.display(),
            batch.number,
            batch.of,
            batch.size,
            error
        ));
    }

    fn on_file_finished(&self, report: &FileReport) {
        self.append_line(&format!("ok {report}"));
    }

    fn on_file_failed(&self, path: &Path, severity: Severity, error: &PipelineError) {
        self.append_line(&format!(
            "fail severity={:?} path={} err={}",
            severity,
            path.display(),
            error
        ));
    }

    fn on_cleanup_failed(&self, path: &Path, error: &std::io::Error) {
        self.append_line(&format!("cleanup-fail path={} err={}", path.display(), error));
    }

    fn on_run_finished(&self, report: &RunReport) {
        self.append_line(&format!("run {report}"));
    }

    fn on_alert(&self, path: &Path, severity: Severity, error: &PipelineError) {
        self.append_line(&format!(
            "ALERT severity={:?} path={} err={}",
            severity,
            path.display(),
            error
        ));
    }
}

fn layout_label(layout: Layout) -> &'static str {
    match layout {
        Layout::Narrow => "narrow",
        Layout::Wide => "wide",
    }
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
