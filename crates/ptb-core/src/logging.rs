use std::io;

use tracing::level_filters::LevelFilter;
use tracing_appender::{
    non_blocking::{NonBlockingBuilder, WorkerGuard},
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{
    config::{Config, LoggingChannel},
    errors::Error,
    Result,
};

/// Owns the log writer for the lifetime of the process.
///
/// Dropping the guard flushes any lines still queued for the file writer, so
/// `main` keeps it alive until shutdown.
#[must_use = "dropping the guard stops the file writer"]
pub struct LogGuard {
    _worker: Option<WorkerGuard>,
}

/// Map the numeric `LOGGING_LEVEL` onto a tracing level.
pub fn level_filter(level: u8) -> LevelFilter {
    match level {
        0 => LevelFilter::OFF,
        1 => LevelFilter::ERROR,
        2 => LevelFilter::WARN,
        3 => LevelFilter::INFO,
        4 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Initialize tracing for the bot.
///
/// `RUST_LOG` still overrides the configured level.
pub fn init(cfg: &Config) -> Result<LogGuard> {
    let filter = EnvFilter::builder()
        .with_default_directive(level_filter(cfg.logging_level).into())
        .from_env_lossy();

    match &cfg.logging_channel {
        LoggingChannel::Stdout => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(io::stdout).with_target(false))
                .try_init()
                .map_err(|e| Error::External(format!("logging init failed: {e}")))?;
            Ok(LogGuard { _worker: None })
        }
        LoggingChannel::File(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_suffix("txt")
                .build(dir)
                .map_err(|e| Error::External(format!("log file init failed: {e}")))?;
            // Block instead of dropping lines when the writer falls behind.
            let (writer, guard) = NonBlockingBuilder::default().lossy(false).finish(appender);

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_current_span(false),
                )
                .try_init()
                .map_err(|e| Error::External(format!("logging init failed: {e}")))?;

            tracing::info!(dir = %dir.display(), "logging to file");
            Ok(LogGuard {
                _worker: Some(guard),
            })
        }
    }
}
