//! Prometheus metrics and structured logging for the TDEX swap router.
//!
//! - Prometheus counters and gauges for discovery and negotiation
//! - Structured logging with tracing, pretty or JSON per config

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, LogConfig, LogFormat};
pub use metrics::Metrics;
