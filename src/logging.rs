//! Structured logging configuration
//!
//! Provides:
//! - JSON output for machine consumption
//! - Pretty formatting for interactive use
//! - Console, daily rolling file, or both
//! - A per-run span carrying a run id
//!
//! Console output goes to stderr so report output on stdout stays clean.

use crate::config::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::Span;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use uuid::Uuid;

pub const LOG_FILE_NAME: &str = "keyspaces-estimate.log";

/// Initialize the logging system based on configuration
///
/// The returned guard flushes buffered file output when dropped, so `main`
/// must hold it for the life of the process.
pub fn init_logging(config: &Config) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("error"));
    let format = config.logging.format.as_str();
    let log_dir = config.paths.log_directory.as_path();

    match config.logging.output.as_str() {
        "file" => init_file_logging(env_filter, format, log_dir).map(Some),
        "both" => init_combined_logging(env_filter, format, log_dir).map(Some),
        _ => {
            init_console_logging(env_filter, format)?;
            Ok(None)
        }
    }
}

fn init_console_logging(filter: EnvFilter, format: &str) -> Result<()> {
    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        "json" => subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        _ => subscriber
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_ansi(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .pretty(),
            )
            .try_init(),
    }
    .context("Failed to install console logger")
}

fn file_writer(log_dir: &Path) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
    Ok(tracing_appender::non_blocking(file_appender))
}

fn init_file_logging(filter: EnvFilter, format: &str, log_dir: &Path) -> Result<WorkerGuard> {
    let (non_blocking, guard) = file_writer(log_dir)?;
    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        "json" => subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init(),
        _ => subscriber
            .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
            .try_init(),
    }
    .context("Failed to install file logger")?;

    Ok(guard)
}

fn init_combined_logging(filter: EnvFilter, format: &str, log_dir: &Path) -> Result<WorkerGuard> {
    let (non_blocking, guard) = file_writer(log_dir)?;
    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        "json" => subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(fmt::layer().json().with_writer(non_blocking))
            .try_init(),
        _ => subscriber
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .try_init(),
    }
    .context("Failed to install combined logger")?;

    Ok(guard)
}

/// Span covering one estimate run, tagged with a fresh run id
pub fn run_span(operation: &'static str) -> Span {
    tracing::info_span!("estimate_run", operation, run_id = %Uuid::new_v4())
}
