//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Core error: {0}")]
    Core(#[from] tdex_core::CoreError),

    #[error("Registry error: {0}")]
    Registry(#[from] tdex_registry::RegistryError),

    #[error("Routing error: {0}")]
    Router(#[from] tdex_router::RouterError),

    #[error("Negotiation error: {0}")]
    Negotiation(#[from] tdex_negotiator::NegotiationError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] tdex_telemetry::TelemetryError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
