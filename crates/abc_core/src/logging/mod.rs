//! Logging infrastructure for Audacity Batch Cleaner.
//!
//! This module provides:
//! - Per-project loggers with file + console dual output
//! - Compact mode that keeps editor replies in a tail buffer
//! - Integration with the `tracing` ecosystem
//!
//! # Example
//!
//! ```no_run
//! use abc_core::logging::{JobLogger, LogConfig};
//!
//! let logger = JobLogger::new("track1", ".logs", LogConfig::default(), None).unwrap();
//!
//! logger.phase("NoiseProfile");
//! logger.script("SelectTime: Start=\"0\" End=\"5\"");
//! logger.reply_line("BatchCommand finished: OK");
//! logger.success("Noise profile captured");
//! ```

mod job_logger;
mod types;

pub use job_logger::JobLogger;
pub use types::{ConsoleCallback, LogConfig, LogLevel, MessagePrefix};

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name of the application-wide log inside the logs folder.
pub const APP_LOG_FILE: &str = "audacity-batch.log";

/// Initialize global tracing subscriber for application-wide logging.
///
/// Respects `RUST_LOG`, falling back to `default_level`, and writes to
/// stderr. Call once at startup.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

/// Initialize tracing to stderr plus `<logs_dir>/audacity-batch.log`.
///
/// The returned guard flushes the file writer on drop and must be kept
/// alive for the duration of the program.
pub fn init_tracing_with_file(default_level: LogLevel, logs_dir: &Path) -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()));

    let file_appender = tracing_appender::rolling::never(logs_dir, APP_LOG_FILE);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_to_filter_works() {
        assert_eq!(LogLevel::Debug.as_filter_str(), "debug");
        assert_eq!(LogLevel::Info.as_filter_str(), "info");
    }
}
