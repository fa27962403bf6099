use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{RunPaths, TelemetryLevel};

pub struct LoggingGuard {
    _guard: WorkerGuard,
    pub telemetry_path: PathBuf,
}

/// Installs a JSON subscriber writing to the run's `telemetry.jsonl`.
///
/// The level comes from the config unless `RUST_LOG` is set. Returns `None`
/// when the config asks for no telemetry.
pub fn init_logging(
    telemetry: Option<TelemetryLevel>,
    paths: &RunPaths,
    run_id: &str,
) -> Result<Option<LoggingGuard>> {
    let Some(level) = telemetry.map(TelemetryLevel::level) else {
        return Ok(None);
    };

    fs::create_dir_all(&paths.dir)
        .with_context(|| format!("creating run directory at {}", paths.dir.display()))?;

    let telemetry_path = paths.telemetry.clone();
    let file = File::create(&telemetry_path)
        .with_context(|| format!("creating telemetry file at {}", telemetry_path.display()))?;

    let (writer, guard) = non_blocking::NonBlockingBuilder::default()
        .lossy(false)
        .finish(file);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .json()
        .with_current_span(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .finish();

    // A global subscriber may already be set, e.g. by another test in this process.
    let _ = tracing::subscriber::set_global_default(subscriber);

    tracing::info!(target: "baloot_bench::run", run_id, "structured logging enabled");

    Ok(Some(LoggingGuard {
        _guard: guard,
        telemetry_path,
    }))
}
