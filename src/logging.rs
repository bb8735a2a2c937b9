// ABOUTME: Logging configuration and structured tracing setup for the CLI and batch runs
// ABOUTME: Selects level, output format and metadata from the environment and installs the subscriber
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

//! Structured logging setup
//!
//! Logs always go to stderr so a report printed on stdout can be piped into
//! other tools untouched.

use std::env;
use std::error::Error as StdError;
use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde_json::json;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Service name reported in startup logs
pub const SERVICE_NAME: &str = "aquametric";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Include thread information
    pub include_thread: bool,
    /// Emit span open/close events
    pub include_spans: bool,
    /// Service name for structured logging
    pub service_name: String,
    /// Service version
    pub service_version: String,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` lines for log shipping
    Json,
    /// Multi-field human format
    Pretty,
    /// One line per event
    Compact,
}

impl LogFormat {
    /// Lowercase name as accepted by `LOG_FORMAT`
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
            Self::Compact => "compact",
        }
    }

    /// Parse a format name; anything unrecognized is `Pretty`
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Compact,
            include_location: false,
            include_thread: false,
            include_spans: false,
            service_name: SERVICE_NAME.into(),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
        let format = env::var("LOG_FORMAT")
            .map_or(LogFormat::Compact, |name| LogFormat::from_name(&name));

        Self {
            level,
            format,
            include_location: env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_thread: env::var("LOG_INCLUDE_THREAD").is_ok(),
            include_spans: env::var("LOG_INCLUDE_SPANS").is_ok(),
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| SERVICE_NAME.into()),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }

    /// Override the level, e.g. from a `--verbose` flag
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Build the filter: `RUST_LOG` verbatim if set, else our crates at the
    /// configured level and everything else at `warn`
    fn env_filter(&self) -> EnvFilter {
        if let Ok(directive) = env::var("RUST_LOG") {
            return EnvFilter::new(directive);
        }

        ["aquametric", "aquametric_analysis", "aquametric_core"]
            .into_iter()
            .fold(EnvFilter::new("warn"), |filter, target| {
                filter.add_directive(
                    format!("{target}={}", self.level)
                        .parse()
                        .unwrap_or_else(|_| Level::INFO.into()),
                )
            })
    }

    const fn span_events(&self) -> FmtSpan {
        if self.include_spans {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    /// Initialize the global tracing subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());

        match self.format {
            LogFormat::Json => {
                let json_layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_thread_ids(self.include_thread)
                    .with_thread_names(self.include_thread)
                    .with_target(true)
                    .with_writer(io::stderr)
                    .with_span_events(self.span_events())
                    .json();

                registry.with(json_layer).try_init()?;
            }
            LogFormat::Pretty => {
                let pretty_layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_thread_ids(self.include_thread)
                    .with_thread_names(self.include_thread)
                    .with_target(true)
                    .with_writer(io::stderr)
                    .with_span_events(self.span_events());

                registry.with(pretty_layer).try_init()?;
            }
            LogFormat::Compact => {
                let compact_layer = fmt::layer()
                    .compact()
                    .with_file(false)
                    .with_line_number(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_target(false)
                    .with_writer(io::stderr)
                    .with_span_events(FmtSpan::NONE);

                registry.with(compact_layer).try_init()?;
            }
        }

        self.log_startup_info();
        Ok(())
    }

    fn log_startup_info(&self) {
        let config_summary = json!({
            "service": {
                "name": self.service_name,
                "version": self.service_version,
            },
            "logging": {
                "level": self.level,
                "format": self.format.name(),
                "location": self.include_location,
                "thread": self.include_thread,
                "spans": self.include_spans,
            }
        });

        debug!(
            service.name = %self.service_name,
            service.version = %self.service_version,
            log.level = %self.level,
            log.format = self.format.name(),
            "logging initialized: {config_summary}"
        );
    }
}

/// Application-specific logging helpers with consistent field names
pub struct AppLogger;

impl AppLogger {
    /// Log a completed session analysis
    pub fn log_analysis(source: &Path, laps: usize, duration_sec: f64, elapsed: Duration) {
        info!(
            analysis.source = %source.display(),
            analysis.laps = laps,
            analysis.duration_sec = duration_sec,
            analysis.elapsed_ms = elapsed.as_millis(),
            "Session analysis completed"
        );
    }

    /// Log a recording that could not be analyzed
    pub fn log_analysis_failure(source: &Path, error: &dyn StdError) {
        warn!(
            analysis.source = %source.display(),
            analysis.error = %error,
            "Session analysis failed"
        );
    }

    /// Log the outcome of a directory batch
    pub fn log_batch_summary(directory: &Path, succeeded: usize, failed: usize, elapsed: Duration) {
        info!(
            batch.directory = %directory.display(),
            batch.succeeded = succeeded,
            batch.failed = failed,
            batch.elapsed_ms = elapsed.as_millis(),
            "Batch analysis completed"
        );
    }
}
