use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{HeartbeatError, Result, config::LogFormat};

const DAYS_TO_KEEP: usize = 7;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize tracing for the application
///
/// Sets up structured logging with info level by default.
/// Uses RUST_LOG environment variable if set, otherwise defaults to "info".
///
/// # Errors
/// Returns error if a global subscriber is already installed
pub fn init(format: LogFormat) -> Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter());

    let result = match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_level(true))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(true).with_level(true))
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .try_init(),
    };

    result.map_err(|e| HeartbeatError::Tracing(e.to_string()))
}

/// Initialize tracing with file output
///
/// Like [`init`], but also writes compact, uncolored logs to a daily-rotated
/// file in `log_dir`. The returned guard flushes the file writer when
/// dropped and must be kept alive for the life of the process.
///
/// # Errors
/// Returns error if the appender cannot be created or a global subscriber
/// is already installed
pub fn init_with_file(format: LogFormat, log_dir: &Path) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .max_log_files(DAYS_TO_KEEP)
        .filename_prefix("heartbeats")
        .filename_suffix("log")
        .build(log_dir)
        .map_err(|e| HeartbeatError::Tracing(e.to_string()))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_level(true)
        .with_writer(non_blocking)
        .with_ansi(false);

    let registry = tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer);

    let result = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stdout),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stdout),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_writer(std::io::stdout),
            )
            .try_init(),
    };

    result.map_err(|e| HeartbeatError::Tracing(e.to_string()))?;
    Ok(guard)
}
