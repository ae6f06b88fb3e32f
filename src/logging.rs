use std::fs;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::AppConfig;

const LOG_FILE_NAME: &str = "library-tracker.log";

/// Install the global subscriber. Output goes to a file because the terminal
/// UI owns stdout; keep the returned guard alive until exit so buffered
/// events get flushed.
pub fn init_logging(config: &AppConfig) -> Result<WorkerGuard> {
    fs::create_dir_all(&config.log_directory).context("failed to create log directory")?;

    let appender = tracing_appender::rolling::never(&config.log_directory, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("library_tracker={}", config.log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(guard)
}
