//! Logging setup shared by the calmerge binaries.
//!
//! ```ignore
//! use calmerge_core::tracing::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::default())?;
//! ```
//!
//! `RUST_LOG` overrides the configured level unless an explicit filter is set.

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::Layered, prelude::*};

/// Target prefix covering every calmerge crate.
const TARGET_PREFIX: &str = "calmerge";

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// Output format for log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// Single-line human-readable output (default)
    #[default]
    Compact,
    /// Multi-line output with field breakdown
    Pretty,
    /// One JSON object per line, for long-running sync loops
    Json,
}

/// Configuration for tracing initialization
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level applied to calmerge targets when no filter is given
    pub default_level: Level,
    pub output_format: TracingOutputFormat,
    /// Include file and line number
    pub include_location: bool,
    pub include_timestamp: bool,
    /// Explicit filter directive; wins over `RUST_LOG`
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: Level::WARN,
            output_format: TracingOutputFormat::Compact,
            include_location: false,
            include_timestamp: false,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// Verbose single-line logs for `--debug`.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            default_level: Level::DEBUG,
            include_location: true,
            ..Self::default()
        }
    }

    /// Timestamped JSON logs for the periodic sync loop.
    #[must_use]
    pub fn daemon() -> Self {
        Self {
            default_level: Level::INFO,
            output_format: TracingOutputFormat::Json,
            include_location: true,
            include_timestamp: true,
            env_filter: None,
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.output_format = format;
        self
    }

    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// The filter directive used when neither an explicit filter nor
    /// `RUST_LOG` is present.
    pub fn default_directive(&self) -> String {
        format!("{}={}", TARGET_PREFIX, self.default_level)
    }

    fn build_filter(&self) -> Result<EnvFilter, TracingError> {
        match self.env_filter {
            Some(ref filter) => Ok(EnvFilter::try_new(filter)?),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.default_directive()))),
        }
    }

    fn build_layer(&self) -> Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync> {
        let location = self.include_location;
        match self.output_format {
            TracingOutputFormat::Compact => {
                let layer = fmt::layer()
                    .compact()
                    .with_file(location)
                    .with_line_number(location);
                if self.include_timestamp {
                    layer.boxed()
                } else {
                    layer.without_time().boxed()
                }
            }
            TracingOutputFormat::Pretty => {
                let layer = fmt::layer()
                    .pretty()
                    .with_file(location)
                    .with_line_number(location);
                if self.include_timestamp {
                    layer.boxed()
                } else {
                    layer.without_time().boxed()
                }
            }
            TracingOutputFormat::Json => fmt::layer()
                .json()
                .with_file(location)
                .with_line_number(location)
                .boxed(),
        }
    }
}

/// Installs the global subscriber. Call once at startup.
///
/// # Errors
///
/// Fails if a global subscriber is already installed or the explicit filter
/// directive does not parse.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.build_filter()?;
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(config.build_layer());
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
