//! Error types for tdex-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Decimal parse error: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

/// A provider payload that failed structural validation.
///
/// Raised only at the network boundary. Callers decide whether a shape
/// failure drops a single element or fails the whole response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed {kind}: {reason}")]
pub struct ShapeError {
    /// Name of the record being validated (e.g. "market", "preview").
    pub kind: &'static str,
    /// First violated constraint.
    pub reason: String,
}

impl ShapeError {
    pub fn new(kind: &'static str, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
