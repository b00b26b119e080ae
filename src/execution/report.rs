use std::fmt;
use std::path::PathBuf;

use crate::error::Severity;
use crate::sink::UploadSummary;
use crate::types::{FileIdentity, Layout};

/// Outcome of processing one staging file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub path: PathBuf,
    pub identity: FileIdentity,
    /// Records produced by the normalizer.
    pub emitted: usize,
    /// Records dropped for a missing indicator name.
    pub skipped: usize,
    pub upload: UploadSummary,
}

impl FileReport {
    /// Records that passed validation.
    pub fn valid(&self) -> usize {
        self.emitted - self.skipped
    }
}

impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let goal = match self.identity.goal.number {
            Some(n) => n.to_string(),
            None => "?".to_string(),
        };
        let layout = match self.identity.layout {
            Layout::Narrow => "narrow",
            Layout::Wide => "wide",
        };
        write!(
            f,
            "file={} goal={} ({}) year={} layout={} emitted={} skipped={} batches={}/{} inserted={}",
            self.path.display(),
            goal,
            self.identity.goal.name,
            self.identity.year,
            layout,
            self.emitted,
            self.skipped,
            self.upload.batches - self.upload.failed_batches,
            self.upload.batches,
            self.upload.inserted
        )
    }
}

/// A file that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub severity: Severity,
    pub message: String,
}

/// Result of draining the staging directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    pub deleted: usize,
    pub failed: usize,
}

/// Outcome of a full run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Files processed, in processing order.
    pub files: Vec<FileReport>,
    /// Files that failed before or during normalization.
    pub failures: Vec<FileFailure>,
    /// `None` when cleanup is disabled.
    pub cleanup: Option<CleanupSummary>,
}

impl RunReport {
    pub fn total_emitted(&self) -> usize {
        self.files.iter().map(|f| f.emitted).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.files.iter().map(|f| f.skipped).sum()
    }

    pub fn total_inserted(&self) -> u64 {
        self.files.iter().map(|f| f.upload.inserted).sum()
    }

    pub fn failed_batches(&self) -> usize {
        self.files.iter().map(|f| f.upload.failed_batches).sum()
    }

    /// `true` when every file and every batch went through.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.failed_batches() == 0
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "files={} failed_files={} emitted={} skipped={} inserted={} failed_batches={}",
            self.files.len(),
            self.failures.len(),
            self.total_emitted(),
            self.total_skipped(),
            self.total_inserted(),
            self.failed_batches()
        )?;
        match self.cleanup {
            Some(c) => write!(f, " cleanup_deleted={} cleanup_failed={}", c.deleted, c.failed),
            None => write!(f, " cleanup=skipped"),
        }
    }
}
