//! Logging service

use crate::models::LogLevel;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Crate targets whose events are emitted
const LOG_TARGETS: [&str; 2] = ["homework_bot_core", "homework_bot"];

fn filter_directives(level: LogLevel) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level.as_str()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Build the subscriber: stderr always, plus `log_file` in append mode when given.
///
/// Lines carry timestamp, level, source file and line, and message.
fn build_subscriber(
    level: LogLevel,
    log_file: Option<&Path>,
) -> Result<
    impl tracing::Subscriber + Send + Sync + 'static,
    Box<dyn std::error::Error + Send + Sync>,
> {
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true);

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_file(true)
                    .with_line_number(true),
            )
        }
        None => None,
    };

    Ok(tracing_subscriber::registry()
        .with(EnvFilter::new(filter_directives(level)))
        .with(console)
        .with(file_layer))
}

/// Install the logging subscriber globally. Fails if the log file cannot be opened or a
/// subscriber is already installed.
pub fn init_logging(
    level: LogLevel,
    log_file: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    build_subscriber(level, log_file)?.try_init()?;
    Ok(())
}
