//! Logging setup for the validator binary.
//!
//! Every event goes to stdout as `LEVEL message` and to the run's log file.
//! `RUST_LOG` overrides the configured level.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{AuditError, AuditResult};

/// Installs the global subscriber.
///
/// The log file is opened in append mode and created if missing. Fails if a
/// global subscriber is already set.
pub fn init_logging(config: &LoggingConfig, log_file: &Path) -> AuditResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let file = Arc::new(OpenOptions::new().create(true).append(true).open(log_file)?);

    let stdout_layer = fmt::layer()
        .without_time()
        .with_target(false)
        .with_writer(io::stdout);

    let file_text_layer = (!config.json).then(|| {
        fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(file.clone())
    });

    let file_json_layer = config.json.then(|| {
        fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(file.clone())
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_text_layer)
        .with(file_json_layer)
        .try_init()
        .map_err(|e| AuditError::configuration("logging", e.to_string()))
}
