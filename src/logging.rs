//! Logging setup using `tracing` + `tracing-subscriber`
//!
//! Level priority:
//! 1. explicit level (the CLI's `--log-level`)
//! 2. `SNAPDIFF_LOG` environment variable (e.g. "info", "debug")
//! 3. `warn`
//!
//! Logs go to stderr so stdout carries only command output.

use crate::{Error, Result};
use tracing_subscriber::fmt;

/// Environment variable consulted when no level is given
pub const LOG_ENV: &str = "SNAPDIFF_LOG";

/// Log level as exposed on the CLI
#[derive(Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(level: Option<LogLevel>) -> Result<()> {
    let level = resolve_level(level, std::env::var(LOG_ENV).ok().as_deref());

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}

fn resolve_level(explicit: Option<LogLevel>, env: Option<&str>) -> tracing::Level {
    explicit
        .map(tracing::Level::from)
        .or_else(|| env.and_then(parse_level_str))
        .unwrap_or(tracing::Level::WARN)
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
