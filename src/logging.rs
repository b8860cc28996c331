// ABOUTME: Logging configuration and structured logging setup for the aggregation service and CLI
// ABOUTME: Configures level filters, output format, and noise reduction for HTTP client internals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Structured logging built on `tracing-subscriber`

use serde_json::json;
use std::env;
use std::io;
use tracing::{info, Level};
use tracing_subscriber::fmt::{self, format::FmtSpan};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use squad_core::errors::{AppError, AppResult};

/// Service name reported in startup logs
pub const SERVICE_NAME: &str = "squad-stats";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Include span enter/exit events
    pub include_spans: bool,
    /// Service name for structured logging
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Environment (development, staging, production)
    pub environment: String,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` lines for log shippers
    Json,
    /// Multi-line human readable output
    Pretty,
    /// One line per event
    Compact,
}

impl LogFormat {
    /// Parse `json`, `pretty` or `compact`; anything else is `Pretty`
    #[must_use]
    pub fn from_str_or_default(value: &str) -> Self {
        match value.to_lowercase().as_str() {
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
            format: LogFormat::Pretty,
            include_location: false,
            include_spans: false,
            service_name: SERVICE_NAME.into(),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment: "development".into(),
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_production = environment == "production";

        Self {
            level: env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
            format: env::var("LOG_FORMAT")
                .map_or(LogFormat::Pretty, |value| LogFormat::from_str_or_default(&value)),
            include_location: is_production || env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_spans: env::var("LOG_INCLUDE_SPANS").is_ok(),
            service_name: SERVICE_NAME.into(),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment,
        }
    }

    /// CLI preset: compact output on stderr-friendly defaults, `debug` when verbose
    #[must_use]
    pub fn for_cli(verbose: bool) -> Self {
        let mut config = Self::from_env();
        if verbose {
            "debug".clone_into(&mut config.level);
        }
        if env::var("LOG_FORMAT").is_err() {
            config.format = LogFormat::Compact;
        }
        config
    }

    /// Level filter with noise reduction for HTTP client internals
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        let directive =
            |raw: &str, fallback: Level| raw.parse().unwrap_or_else(|_| fallback.into());

        EnvFilter::new(&self.level)
            .add_directive(directive("hyper=warn", Level::WARN))
            .add_directive(directive("hyper_util=warn", Level::WARN))
            .add_directive(directive("reqwest=warn", Level::WARN))
            .add_directive(directive("rustls=warn", Level::WARN))
    }

    /// Initialize the global tracing subscriber
    ///
    /// Logs go to stderr so JSON printed by the CLI on stdout stays parseable.
    ///
    /// # Errors
    ///
    /// Returns a config error if a global subscriber is already installed
    pub fn init(&self) -> AppResult<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());
        let span_events = if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let result = match self.format {
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .with_file(self.include_location)
                        .with_line_number(self.include_location)
                        .with_target(true)
                        .with_writer(io::stderr)
                        .with_span_events(span_events)
                        .json(),
                )
                .try_init(),
            LogFormat::Pretty => registry
                .with(
                    fmt::layer()
                        .with_file(self.include_location)
                        .with_line_number(self.include_location)
                        .with_target(true)
                        .with_writer(io::stderr)
                        .with_span_events(span_events),
                )
                .try_init(),
            LogFormat::Compact => registry
                .with(
                    fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_writer(io::stderr)
                        .with_span_events(FmtSpan::NONE),
                )
                .try_init(),
        };
        result.map_err(|e| AppError::config(format!("failed to initialize logging: {e}")))?;

        self.log_startup_info();
        Ok(())
    }

    fn log_startup_info(&self) {
        let summary = json!({
            "service": {
                "name": self.service_name,
                "version": self.service_version,
                "environment": self.environment
            },
            "logging": {
                "level": self.level,
                "format": format!("{:?}", self.format),
                "location": self.include_location,
                "spans": self.include_spans
            }
        });
        info!(
            service.name = %self.service_name,
            service.version = %self.service_version,
            environment = %self.environment,
            "logging initialized: {summary}"
        );
    }
}

/// Initialize logging from environment
///
/// # Errors
///
/// Returns an error if logging initialization fails
pub fn init_from_env() -> AppResult<()> {
    LoggingConfig::from_env().init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::from_str_or_default("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_str_or_default("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::from_str_or_default("fancy"), LogFormat::Pretty);
    }

    #[test]
    fn test_env_filter_accepts_configured_level() {
        let config = LoggingConfig {
            level: "squad_stats=debug,warn".into(),
            ..LoggingConfig::default()
        };
        let rendered = config.env_filter().to_string();
        assert!(rendered.contains("squad_stats=debug"));
        assert!(rendered.contains("reqwest=warn"));
    }
}
