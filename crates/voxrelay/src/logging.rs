//! Log subscriber setup: human-readable stderr plus a daily-rotated JSON file.

use crate::{AppError, AppResult};

use std::{panic::Location, path::Path};

use error_location::ErrorLocation;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
pub(crate) const DEFAULT_FILTER: &str = "voxrelay=debug,voxrelay_core=debug";

/// File name prefix inside the log directory; the date is appended.
pub(crate) const LOG_FILE_PREFIX: &str = "voxrelay.log";

/// Filter from `RUST_LOG`, or [`DEFAULT_FILTER`] when unset or invalid.
pub(crate) fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer when dropped and must be held
/// until the process exits.
#[track_caller]
pub(crate) fn init(log_dir: &Path) -> AppResult<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().json().with_writer(file_writer))
        .try_init()
        .map_err(|e| AppError::LoggingError {
            reason: format!("Failed to install subscriber: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    Ok(guard)
}

/// Stderr-only subscriber for when the log directory is unavailable.
pub(crate) fn init_stderr_only() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .try_init();
}
