//! Registry error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Registry unavailable: {0}")]
    RegistryUnavailable(String),

    #[error("Provider {endpoint} unreachable: {reason}")]
    ProviderUnreachable { endpoint: String, reason: String },

    #[error("No TDEX provider found")]
    NoProvidersFound,

    #[error("No TDEX market found")]
    NoMarketsFound,

    #[error("Discovery superseded by a newer request")]
    Stale,

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl RegistryError {
    /// Builds a `ProviderUnreachable` for `endpoint`.
    pub fn unreachable(endpoint: &str, reason: impl Into<String>) -> Self {
        Self::ProviderUnreachable {
            endpoint: endpoint.to_string(),
            reason: reason.into(),
        }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;
