//! Tracing setup for the host process.
//!
//! Stdout carries the JSON protocol, so human-readable output goes to
//! stderr. A daily rolling file under [`app_dirs::logs_dir`] keeps a copy
//! for bug reports.

use crate::app_dirs;
use crate::error::{JaculatoriaError, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt};

/// Log files kept before the appender deletes the oldest.
pub const MAX_LOG_FILES: usize = 7;

const LOG_PREFIX: &str = "jaculatoria";
const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber writing to stderr and the default logs
/// directory. Keep the returned guard alive until exit so buffered file
/// records are flushed.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or a global
/// subscriber is already installed.
pub fn init() -> Result<WorkerGuard> {
    init_in(&app_dirs::logs_dir())
}

/// Like [`init`], with an explicit log directory.
///
/// # Errors
///
/// See [`init`].
pub fn init_in(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_PREFIX)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)
        .map_err(|e| JaculatoriaError::Config(format!("cannot open log file: {e}")))?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter());
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer)
        .with_filter(env_filter());

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| JaculatoriaError::Config(format!("cannot install logger: {e}")))?;
    Ok(guard)
}

/// `RUST_LOG` when set and valid, `info` otherwise.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
