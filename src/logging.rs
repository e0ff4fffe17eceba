//! Logging setup for roomcast.
//!
//! Log lines go to stdout and, when a file is configured, are appended to
//! it as well. `RUST_LOG` directives are honored on top of the configured
//! level.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::Result;

/// Map a configured level name to a tracing level.
///
/// Unknown names fall back to INFO.
fn level_from_name(name: &str) -> Level {
    if name.eq_ignore_ascii_case("warning") {
        return Level::WARN;
    }
    name.parse().unwrap_or(Level::INFO)
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::from_default_env().add_directive(level_from_name(level).into())
}

/// Open the log file for appending, creating missing parent directories.
fn open_log_file(path: &str) -> Result<File> {
    let path = Path::new(path);
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Install the global subscriber from configuration.
///
/// Fails if the log file cannot be opened; callers usually fall back to
/// [`init_console_only`].
pub fn init(config: &LoggingConfig) -> Result<()> {
    let log_file = Arc::new(open_log_file(&config.file)?);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout.and(log_file))
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true),
        )
        .with(env_filter(&config.level))
        .init();

    Ok(())
}

/// Install a stdout-only subscriber.
pub fn init_console_only(level: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(env_filter(level))
        .init();
}
