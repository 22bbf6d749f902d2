use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Output shape of the fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = ParseLogFormatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(ParseLogFormatError {
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown log format: {value} (expected compact or json)")]
pub struct ParseLogFormatError {
    pub value: String,
}

/// Installs the global subscriber. `RUST_LOG` wins over `level` when set.
pub fn tracing_init(level: &str, format: LogFormat) -> Result<(), TracingInitError> {
    let filter = build_filter(level)?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json().flatten_event(true)).try_init(),
    };

    result.map_err(|source| TracingInitError::SetGlobalDefault { source })
}

fn build_filter(level: &str) -> Result<EnvFilter, TracingInitError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|source| TracingInitError::InvalidFilter { source })
}

#[derive(Debug, Error)]
pub enum TracingInitError {
    #[error("Invalid filter config: {source}")]
    InvalidFilter {
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("Failed to set global default subscriber: {source}")]
    SetGlobalDefault {
        #[source]
        source: tracing_subscriber::util::TryInitError,
    },
}
