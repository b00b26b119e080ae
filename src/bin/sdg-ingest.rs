//! Normalize the staging directory and upload it to the ingestion API.
//!
//! Usage:
//!   cargo run -- --staging-dir data --endpoint http://localhost:5000/api/sdg/upload
//!
//!   # Parse and normalize everything without uploading or deleting files
//!   cargo run -- --dry-run
//!
//! Flags override the environment (`SDG_*` variables and `.env`), which overrides defaults.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sdg_ingest::config::PipelineConfig;
use sdg_ingest::execution::{Pipeline, RunReport};
use sdg_ingest::ingestion::{CompositeObserver, FileObserver, PipelineObserver, TracingObserver};
use sdg_ingest::sink::{HttpSink, MemorySink, RecordSink};
use sdg_ingest::PipelineResult;

#[derive(Parser, Debug)]
#[command(name = "sdg-ingest")]
#[command(about = "Normalize SDG India Index exports and upload them to the ingestion API")]
struct Args {
    /// Directory holding the raw CSV/XLSX files
    #[arg(long, short = 'd')]
    staging_dir: Option<PathBuf>,

    /// Ingestion API URL the batches are POSTed to
    #[arg(long, short = 'e')]
    endpoint: Option<String>,

    /// Records per upload request
    #[arg(long, short = 'b')]
    batch_size: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Stop at the first file that cannot be processed
    #[arg(long)]
    fail_fast: bool,

    /// Leave the staging directory untouched after the run
    #[arg(long)]
    keep_files: bool,

    /// Normalize into memory instead of uploading; implies --keep-files
    #[arg(long, short = 'n')]
    dry_run: bool,

    /// Also append pipeline events to this file
    #[arg(long, env = "SDG_LOG_FILE")]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("sdg-ingest: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> PipelineResult<RunReport> {
    let config = build_config(&args)?;
    let observer = build_observer(&args);

    if args.dry_run {
        tracing::info!(target: "sdg_ingest", staging_dir = %config.staging_dir.display(), "dry run");
        let (report, sink) = run_with(config, MemorySink::new(), observer)?;
        tracing::info!(
            target: "sdg_ingest",
            rows = sink.len(),
            batches = sink.batches_received(),
            "dry run finished"
        );
        Ok(report)
    } else {
        let sink = HttpSink::with_timeout(&config.ingestion_endpoint, config.request_timeout)?;
        run_with(config, sink, observer).map(|(report, _)| report)
    }
}

fn run_with<S: RecordSink>(
    config: PipelineConfig,
    sink: S,
    observer: Arc<dyn PipelineObserver>,
) -> PipelineResult<(RunReport, S)> {
    let mut pipeline = Pipeline::new(config, sink)?.with_observer(observer);
    let report = pipeline.run()?;
    Ok((report, pipeline.into_sink()))
}

fn build_config(args: &Args) -> PipelineResult<PipelineConfig> {
    let config = apply_args(PipelineConfig::from_env()?, args)?;
    tracing::debug!(target: "sdg_ingest", ?config, "configuration");
    Ok(config)
}

/// Overlay command-line flags on `config`.
fn apply_args(mut config: PipelineConfig, args: &Args) -> PipelineResult<PipelineConfig> {
    if let Some(dir) = &args.staging_dir {
        config.staging_dir = dir.clone();
    }
    if let Some(endpoint) = &args.endpoint {
        config.ingestion_endpoint = endpoint.clone();
    }
    if let Some(size) = args.batch_size {
        config.batch_size = size;
    }
    if let Some(secs) = args.timeout_secs {
        config.request_timeout = Some(Duration::from_secs(secs));
    }
    config.fail_fast |= args.fail_fast;
    // A dry run never deletes staging files.
    if args.keep_files || args.dry_run {
        config.cleanup = false;
    }
    config.validate()?;
    Ok(config)
}

fn build_observer(args: &Args) -> Arc<dyn PipelineObserver> {
    let mut observer = CompositeObserver::default();
    observer.push(Arc::new(TracingObserver));
    if let Some(path) = &args.log_file {
        observer.push(Arc::new(FileObserver::new(path)));
    }
    Arc::new(observer)
}
