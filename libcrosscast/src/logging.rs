//! Logging setup shared by the Crosscast binaries
//!
//! Diagnostics always go to stderr so stdout carries only the post outcome.
//! Per-platform failures are logged at `warn`, which is the default level.
//!
//! # Examples
//!
//! ```no_run
//! use libcrosscast::logging::{LogFormat, LoggingConfig};
//!
//! LoggingConfig::new(LogFormat::Json, "info".to_string(), false).init();
//!
//! // Or honour CROSSCAST_LOG_FORMAT / CROSSCAST_LOG_LEVEL
//! libcrosscast::logging::init_default();
//! ```

use std::fmt;
use std::str::FromStr;

use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable text output (no colors, for piping)
    Text,
    /// One JSON object per line
    Json,
    /// Pretty-printed with colors (for development)
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                s
            )),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
        })
    }
}

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
    pub verbose: bool,
}

impl LoggingConfig {
    /// * `format` - Log output format
    /// * `level` - Minimum level directive (error, warn, info, debug, trace)
    /// * `verbose` - Use debug level regardless of `level`
    pub fn new(format: LogFormat, level: String, verbose: bool) -> Self {
        Self {
            format,
            level,
            verbose,
        }
    }

    /// Read format and level from `CROSSCAST_LOG_FORMAT` and `CROSSCAST_LOG_LEVEL`
    ///
    /// Unset or unparsable values fall back to text output at warn level.
    pub fn from_env(verbose: bool) -> Self {
        let format = std::env::var("CROSSCAST_LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(LogFormat::Text);

        let level = std::env::var("CROSSCAST_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());

        Self::new(format, level, verbose)
    }

    /// Level directive in effect; `RUST_LOG` wins over both settings
    fn filter(&self) -> EnvFilter {
        let fallback = if self.verbose { "debug" } else { self.level.as_str() };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    }

    /// Install the global subscriber
    ///
    /// # Panics
    ///
    /// Panics if a global subscriber is already installed
    pub fn init(&self) {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(self.filter())
            .with_writer(std::io::stderr);

        match self.format {
            LogFormat::Json => builder
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_target(true)
                .init(),
            LogFormat::Pretty => builder
                .pretty()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .init(),
            LogFormat::Text => builder.with_target(false).with_ansi(false).init(),
        }
    }
}

/// Initialize logging from the environment with default settings
pub fn init_default() {
    LoggingConfig::from_env(false).init();
}
