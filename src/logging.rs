use clap::{Args, ValueEnum};
use nasctl_derive::Overlay;
use serde::Deserialize;
use thiserror::Error;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    #[error("failed to install global subscriber: {0}")]
    Init(String),
}

#[derive(Default, Copy, Clone, Debug, ValueEnum, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

#[derive(Default, Copy, Clone, Debug, ValueEnum, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Logger {
    pub log_format: LogFormat,
    pub log_level: LogLevel,
}

#[derive(Args, Debug, Clone, Default, Deserialize, Overlay)]
#[serde(rename_all = "kebab-case")]
#[nasctl(try_into = "Logger")]
pub struct LoggerArgs {
    /// Log output format
    #[arg(long, env = "NASCTL_LOG_FORMAT", value_enum)]
    #[nasctl(default = LogFormat::Text)]
    pub log_format: Option<LogFormat>,

    /// Minimum log level
    #[arg(long, env = "NASCTL_LOG_LEVEL", value_enum)]
    #[nasctl(default = LogLevel::Info)]
    pub log_level: Option<LogLevel>,
}

impl Logger {
    /// Installs the global subscriber. Logs are written to stderr.
    ///
    /// `RUST_LOG`, when set, takes precedence over the configured level.
    pub fn init(&self) -> Result<(), LoggingError> {
        let filter = match std::env::var("RUST_LOG") {
            Ok(directives) if !directives.is_empty() => {
                EnvFilter::try_new(&directives).map_err(|e| LoggingError::Filter {
                    filter: directives.clone(),
                    reason: e.to_string(),
                })?
            }
            _ => EnvFilter::new(self.log_level.as_filter()),
        };

        let installed = match self.log_format {
            LogFormat::Json => tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_current_span(false)
                        .with_writer(std::io::stderr),
                )
                .try_init(),
            LogFormat::Text => tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .try_init(),
        };
        installed.map_err(|e| LoggingError::Init(e.to_string()))
    }
}
