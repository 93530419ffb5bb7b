//! Structured logging initialization.
//!
//! The filter and output format come from the `[log]` section of the
//! application config. `RUST_LOG`, when set, replaces the configured filter.

use crate::error::{TelemetryError, TelemetryResult};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    /// One JSON object per event, with span context.
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directives. Default: `info,tdex=debug`.
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_filter() -> String {
    "info,tdex=debug".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            format: LogFormat::default(),
        }
    }
}

/// `RUST_LOG` directives when present, the configured ones otherwise.
fn resolve_filter(from_env: Option<String>, configured: &str) -> TelemetryResult<EnvFilter> {
    let directives = from_env.filter(|d| !d.trim().is_empty());
    let directives = directives.as_deref().unwrap_or(configured);
    EnvFilter::try_new(directives)
        .map_err(|e| TelemetryError::LoggingInit(format!("invalid filter `{directives}`: {e}")))
}

/// Install the global subscriber.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
/// Fails if the filter does not parse or a subscriber is already set.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    let env_filter = resolve_filter(std::env::var("RUST_LOG").ok(), &config.filter)?;
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init(),
    };

    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}
