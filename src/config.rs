//! Pipeline configuration.
//!
//! [`PipelineConfig`] is passed to [`crate::execution::Pipeline`] at construction. Use
//! [`Default`] for local runs, or [`PipelineConfig::from_env`] to overlay environment
//! variables (and a `.env` file, if present).

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{PipelineError, PipelineResult, Severity};
use crate::types::Provenance;

/// Default ingestion API endpoint.
pub const DEFAULT_INGESTION_ENDPOINT: &str = "http://localhost:5000/api/sdg/upload";

/// Default staging directory, relative to the working directory.
pub const DEFAULT_STAGING_DIR: &str = "data";

/// Default number of records per upload request.
pub const DEFAULT_BATCH_SIZE: usize = 1_000;

/// Options controlling a pipeline run.
#[derive(Clone, PartialEq)]
pub struct PipelineConfig {
    /// URL the record batches are POSTed to.
    pub ingestion_endpoint: String,
    /// Directory holding the raw files; drained after every run.
    pub staging_dir: PathBuf,
    /// Records per upload request.
    pub batch_size: usize,
    /// Provenance tags stamped on every record.
    pub provenance: Provenance,
    /// Per-request timeout for the HTTP sink. `None` leaves the transport default.
    pub request_timeout: Option<Duration>,
    /// Stop at the first file-level failure instead of continuing with the next file.
    ///
    /// Cleanup still runs before the error is returned.
    pub fail_fast: bool,
    /// Delete every file in the staging directory after the run.
    pub cleanup: bool,
    /// Severity threshold at which observers receive `on_alert`.
    pub alert_at_or_above: Severity,
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("ingestion_endpoint", &self.ingestion_endpoint)
            .field("staging_dir", &self.staging_dir)
            .field("batch_size", &self.batch_size)
            .field("source_url", &self.provenance.source_url)
            .field("data_source", &self.provenance.data_source)
            .field("request_timeout", &self.request_timeout)
            .field("fail_fast", &self.fail_fast)
            .field("cleanup", &self.cleanup)
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ingestion_endpoint: DEFAULT_INGESTION_ENDPOINT.to_string(),
            staging_dir: PathBuf::from(DEFAULT_STAGING_DIR),
            batch_size: DEFAULT_BATCH_SIZE,
            provenance: Provenance::default(),
            request_timeout: None,
            fail_fast: false,
            cleanup: true,
            alert_at_or_above: Severity::Critical,
        }
    }
}

impl PipelineConfig {
    /// Start from defaults with an explicit endpoint and staging directory.
    pub fn new(ingestion_endpoint: impl Into<String>, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            ingestion_endpoint: ingestion_endpoint.into(),
            staging_dir: staging_dir.into(),
            ..Default::default()
        }
    }

    /// Defaults overlaid with environment variables.
    ///
    /// A `.env` file in the working directory (or a parent) is loaded first; variables already
    /// set in the process environment take precedence over it.
    ///
    /// | variable | field |
    /// |---|---|
    /// | `SDG_INGESTION_ENDPOINT` | `ingestion_endpoint` |
    /// | `SDG_STAGING_DIR` (or `DATA_DIR`) | `staging_dir` |
    /// | `SDG_BATCH_SIZE` | `batch_size` |
    /// | `SDG_SOURCE_URL` / `SDG_DATA_SOURCE` | `provenance` |
    /// | `SDG_REQUEST_TIMEOUT_SECS` | `request_timeout` |
    /// | `SDG_FAIL_FAST` | `fail_fast` |
    /// | `SDG_SKIP_CLEANUP` | disables `cleanup` |
    pub fn from_env() -> PipelineResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`], reading variables through `lookup` (no `.env` loading).
    pub fn from_lookup<F>(lookup: F) -> PipelineResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("SDG_INGESTION_ENDPOINT") {
            cfg.ingestion_endpoint = v.trim().to_string();
        }
        if let Some(v) = get("SDG_STAGING_DIR").or_else(|| get("DATA_DIR")) {
            cfg.staging_dir = PathBuf::from(v);
        }
        if let Some(v) = get("SDG_BATCH_SIZE") {
            cfg.batch_size = parse_number("SDG_BATCH_SIZE", &v)?;
        }
        if let Some(v) = get("SDG_SOURCE_URL") {
            cfg.provenance.source_url = v;
        }
        if let Some(v) = get("SDG_DATA_SOURCE") {
            cfg.provenance.data_source = v;
        }
        if let Some(v) = get("SDG_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = parse_number("SDG_REQUEST_TIMEOUT_SECS", &v)?;
            cfg.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(v) = get("SDG_FAIL_FAST") {
            cfg.fail_fast = parse_flag("SDG_FAIL_FAST", &v)?;
        }
        if let Some(v) = get("SDG_SKIP_CLEANUP") {
            cfg.cleanup = !parse_flag("SDG_SKIP_CLEANUP", &v)?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks invariants the pipeline relies on.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.batch_size == 0 {
            return Err(PipelineError::Config {
                message: "batch_size must be at least 1".to_string(),
            });
        }
        let endpoint = self.ingestion_endpoint.trim();
        if endpoint.is_empty() {
            return Err(PipelineError::Config {
                message: "ingestion_endpoint is empty".to_string(),
            });
        }
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(PipelineError::Config {
                message: format!("ingestion_endpoint must be an http(s) URL (got '{endpoint}')"),
            });
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> PipelineResult<T>
where
    T::Err: fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| PipelineError::Config {
        message: format!("{key}: {e} (raw='{raw}')"),
    })
}

fn parse_flag(key: &str, raw: &str) -> PipelineResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        _ => Err(PipelineError::Config {
            message: format!("{key}: expected bool (true/false/1/0/yes/no) (raw='{raw}')"),
        }),
    }
}
