//! `sdg-ingest` normalizes SDG India Index exports into canonical indicator records and uploads
//! them to an ingestion API.
//!
//! The staging directory holds raw files dropped by an acquisition agent: per-goal exports
//! (`sdg_goal_<N>_<year>.csv`), indicator catalogues (`indicator_list_<year>.csv`) and ad hoc
//! `.csv`/`.xlsx` files. Their layouts vary; the pipeline makes them uniform.
//!
//! ## Pipeline
//!
//! For each staging file, in order:
//!
//! 1. **Format & delimiter** ([`ingestion::prepare_source`]): spreadsheets are converted to a
//!    `.csv` sibling; the delimiter is sniffed from the first line (tab > semicolon > comma).
//! 2. **Goal & year** ([`identity`]): `sdg_<n>_<slug>` and `YYYY-YY` in the file name, with
//!    header phrases and the current year as fallbacks.
//! 3. **Layout** ([`processing::classify_layout`]): wide (one column per indicator) or narrow
//!    (one row per indicator).
//! 4. **Normalization** ([`processing::normalize`]): rows become [`types::CanonicalRecord`]s.
//! 5. **Validation & batching** ([`processing::validate()`], [`processing::batches`]): records
//!    without an indicator name are dropped; the rest are chunked (1000 per batch by default).
//! 6. **Upload** ([`sink::upload`]): one request per batch; failed batches are logged and
//!    skipped.
//!
//! [`execution::Pipeline::run`] drives all files sequentially and then deletes every file in the
//! staging directory.
//!
//! ## Quick example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sdg_ingest::config::PipelineConfig;
//! use sdg_ingest::execution::Pipeline;
//! use sdg_ingest::ingestion::TracingObserver;
//! use sdg_ingest::sink::HttpSink;
//!
//! # fn main() -> Result<(), sdg_ingest::PipelineError> {
//! let config = PipelineConfig::new("http://localhost:5000/api/sdg/upload", "data");
//! let sink = HttpSink::with_timeout(&config.ingestion_endpoint, config.request_timeout)?;
//! let mut pipeline = Pipeline::new(config, sink)?.with_observer(Arc::new(TracingObserver));
//!
//! let report = pipeline.run()?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`config`]: run configuration ([`config::PipelineConfig`])
//! - [`ingestion`]: format detection, spreadsheet conversion, lazy CSV rows, observers
//! - [`identity`]: goal & year resolution
//! - [`processing`]: layout classification, normalization, validation, batching
//! - [`sink`]: upload destinations (HTTP, in-memory)
//! - [`execution`]: the run orchestrator and its reports
//! - [`types`]: records and per-file identity
//! - [`error`]: error and severity types

pub mod config;
pub mod error;
pub mod execution;
pub mod identity;
pub mod ingestion;
pub mod processing;
pub mod sink;
pub mod types;

pub use error::{PipelineError, PipelineResult, Severity};
