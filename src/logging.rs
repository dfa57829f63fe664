//! Logging setup for exohab.
//!
//! Logs go to the console and, when the platform data directory is usable, to
//! a daily-rolling file under `<data_dir>/exohab/logs`.
//!
//! ```no_run
//! exohab::logging::init(false).expect("Failed to initialize logging");
//! tracing::info!("Pipeline started");
//! ```

use anyhow::{Context as _, Result};
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// Gets the log directory path based on platform conventions
///
/// Returns:
/// - Windows: `%APPDATA%/exohab/logs`
/// - macOS: `~/Library/Application Support/exohab/logs`
/// - Linux: `~/.local/share/exohab/logs`
pub fn get_log_dir() -> Result<PathBuf> {
    let base_dir = dirs::data_dir().context("Failed to determine data directory")?;
    let log_dir = base_dir.join("exohab").join("logs");

    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    }

    Ok(log_dir)
}

/// Initializes console logging and, unless `console_only`, a rolling log file.
///
/// Defaults to `info`; override with `RUST_LOG`.
///
/// # Errors
///
/// Returns error if the filter cannot be built or a subscriber is already set.
pub fn init(console_only: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to create env filter")?;

    // Console logs go to stderr so stdout carries only the accuracy report
    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, file_error) = if console_only {
        (None, None)
    } else {
        match build_file_appender() {
            Ok(appender) => (
                Some(
                    fmt::layer()
                        .with_target(true)
                        .with_line_number(true)
                        .with_file(true)
                        .with_ansi(false)
                        .with_writer(appender),
                ),
                None,
            ),
            Err(e) => (None, Some(e)),
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    // Reported only now that the console layer is listening
    if let Some(e) = file_error {
        tracing::warn!("File logging disabled: {e:#}");
    }

    Ok(())
}

fn build_file_appender() -> Result<RollingFileAppender> {
    let log_dir = get_log_dir()?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(10)
        .filename_prefix("exohab")
        .filename_suffix("log")
        .build(&log_dir)
        .context("Failed to create file appender")
}
