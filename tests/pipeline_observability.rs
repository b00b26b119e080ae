use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use sdg_ingest::config::PipelineConfig;
use sdg_ingest::execution::{FileReport, Pipeline, RunReport};
use sdg_ingest::ingestion::{BatchInfo, CompositeObserver, FileObserver, PipelineObserver};
use sdg_ingest::sink::{MemorySink, RecordSink};
use sdg_ingest::types::{CanonicalRecord, FileIdentity};
use sdg_ingest::{PipelineError, PipelineResult, Severity};

#[derive(Default)]
struct RecordingObserver {
    started: Mutex<Vec<PathBuf>>,
    resolved: Mutex<Vec<Option<u32>>>,
    skipped: Mutex<Vec<(usize, usize)>>,
    batches_ok: Mutex<Vec<BatchInfo>>,
    batches_failed: Mutex<Vec<Severity>>,
    finished: Mutex<usize>,
    failures: Mutex<Vec<Severity>>,
    alerts: Mutex<Vec<Severity>>,
    runs: Mutex<usize>,
}

impl PipelineObserver for RecordingObserver {
    fn on_file_started(&self, path: &Path) {
        self.started.lock().unwrap().push(path.to_path_buf());
    }

    fn on_file_resolved(&self, identity: &FileIdentity) {
        self.resolved.lock().unwrap().push(identity.goal.number);
    }

    fn on_records_skipped(&self, _path: &Path, skipped: usize, total: usize) {
        self.skipped.lock().unwrap().push((skipped, total));
    }

    fn on_batch_uploaded(&self, _path: &Path, batch: BatchInfo, _inserted: u64) {
        self.batches_ok.lock().unwrap().push(batch);
    }

    fn on_batch_failed(&self, _path: &Path, _batch: BatchInfo, severity: Severity, _error: &PipelineError) {
        self.batches_failed.lock().unwrap().push(severity);
    }

    fn on_file_finished(&self, _report: &FileReport) {
        *self.finished.lock().unwrap() += 1;
    }

    fn on_file_failed(&self, _path: &Path, severity: Severity, _error: &PipelineError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_run_finished(&self, _report: &RunReport) {
        *self.runs.lock().unwrap() += 1;
    }

    fn on_alert(&self, _path: &Path, severity: Severity, _error: &PipelineError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

/// Rejects every batch with a server error.
struct RejectingSink;

impl RecordSink for RejectingSink {
    fn send_batch(&mut self, _batch: &[CanonicalRecord]) -> PipelineResult<u64> {
        Err(PipelineError::HttpStatus {
            status: 503,
            body: "maintenance".to_string(),
        })
    }
}

fn staging_with(name: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::copy(Path::new("tests/fixtures").join(name), dir.path().join(name)).unwrap();
    dir
}

#[test]
fn observer_sees_each_stage_of_a_file() {
    let dir = staging_with("sdg_4_quality-education.csv");
    let obs = Arc::new(RecordingObserver::default());

    let mut config = PipelineConfig::new("http://127.0.0.1:9/unused", dir.path());
    config.batch_size = 1;
    Pipeline::new(config, MemorySink::new())
        .unwrap()
        .with_observer(obs.clone())
        .run()
        .unwrap();

    assert_eq!(obs.started.lock().unwrap().len(), 1);
    assert_eq!(*obs.resolved.lock().unwrap(), vec![Some(4)]);
    assert_eq!(*obs.skipped.lock().unwrap(), vec![(1, 3)]);

    let batches = obs.batches_ok.lock().unwrap().clone();
    assert_eq!(batches.len(), 2);
    assert_eq!((batches[1].number, batches[1].of, batches[1].size), (2, 2, 1));

    assert_eq!(*obs.finished.lock().unwrap(), 1);
    assert_eq!(*obs.runs.lock().unwrap(), 1);
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn missing_file_is_a_critical_failure_and_alerts() {
    let dir = tempfile::tempdir().unwrap();
    let obs = Arc::new(RecordingObserver::default());

    let mut pipeline = Pipeline::new(
        PipelineConfig::new("http://127.0.0.1:9/unused", dir.path()),
        MemorySink::new(),
    )
    .unwrap()
    .with_observer(obs.clone());

    let err = pipeline.process_file(dir.path().join("gone.csv")).unwrap_err();
    assert!(matches!(err, PipelineError::Io(_)));
    assert_eq!(*obs.failures.lock().unwrap(), vec![Severity::Critical]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![Severity::Critical]);
}

#[test]
fn rejected_batches_alert_only_at_the_configured_threshold() {
    for (threshold, expected_alerts) in [(Severity::Critical, 0), (Severity::Error, 1)] {
        let dir = staging_with("sdg_6_clean-water_2020-21.csv");
        let obs = Arc::new(RecordingObserver::default());

        let mut config = PipelineConfig::new("http://127.0.0.1:9/unused", dir.path());
        config.alert_at_or_above = threshold;
        let report = Pipeline::new(config, RejectingSink)
            .unwrap()
            .with_observer(obs.clone())
            .run()
            .unwrap();

        assert_eq!(report.failed_batches(), 1);
        assert_eq!(*obs.batches_failed.lock().unwrap(), vec![Severity::Error]);
        assert_eq!(obs.alerts.lock().unwrap().len(), expected_alerts);
    }
}

#[test]
fn file_observer_appends_timestamped_lines() {
    let dir = staging_with("sdg_4_quality-education.csv");
    let log_dir = tempfile::tempdir().unwrap();
    let log_path = log_dir.path().join("pipeline.log");

    let file_observer: Arc<dyn PipelineObserver> = Arc::new(FileObserver::new(&log_path));
    let recorder: Arc<dyn PipelineObserver> = Arc::new(RecordingObserver::default());
    let composite = CompositeObserver::new(vec![file_observer, recorder]);
    Pipeline::new(
        PipelineConfig::new("http://127.0.0.1:9/unused", dir.path()),
        MemorySink::new(),
    )
    .unwrap()
    .with_observer(Arc::new(composite))
    .run()
    .unwrap();

    let log = fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert!(lines.iter().any(|l| l.contains("resolved path=") && l.contains("goal=Some(4)")));
    assert!(lines.iter().any(|l| l.contains("skipped path=") && l.contains("skipped=1 total=3")));
    assert!(lines.last().unwrap().contains(" run files=1"));
    // RFC 3339 timestamp prefix, e.g. 2024-05-01T10:00:00Z
    assert!(lines.iter().all(|l| l.split(' ').next().unwrap().ends_with('Z')));
}
