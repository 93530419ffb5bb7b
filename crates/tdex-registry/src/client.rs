//! HTTP client for the provider registry.
//!
//! The registry is a static JSON array of `{name, endpoint}` entries, one
//! file per network.

use crate::error::{RegistryError, RegistryResult};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use tdex_core::validate::validate_provider;
use tdex_core::{Network, Provider};
use tdex_telemetry::Metrics;
use tracing::{debug, info, warn};

/// Default timeout for provider and registry requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Mainnet provider registry.
pub const DEFAULT_LIQUID_REGISTRY_URL: &str =
    "https://raw.githubusercontent.com/tdex-network/tdex-registry/v2/registry.json";

/// Testnet provider registry.
pub const DEFAULT_TESTNET_REGISTRY_URL: &str =
    "https://raw.githubusercontent.com/tdex-network/tdex-registry/v2-testnet/registry.json";

/// Build the shared HTTP client. Every provider call is bounded by `timeout`
/// so one silent provider cannot stall aggregation.
pub(crate) fn build_http_client(timeout: Duration) -> RegistryResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| RegistryError::HttpClient(format!("Failed to create HTTP client: {e}")))
}

/// Client for the per-network provider registry.
pub struct RegistryClient {
    /// HTTP client.
    client: Client,
    /// Registry URL for Liquid mainnet.
    liquid_url: String,
    /// Registry URL for testnet.
    testnet_url: String,
}

impl RegistryClient {
    /// Create a registry client with the default request timeout.
    pub fn new(
        liquid_url: impl Into<String>,
        testnet_url: impl Into<String>,
    ) -> RegistryResult<Self> {
        Self::with_timeout(liquid_url, testnet_url, DEFAULT_TIMEOUT)
    }

    /// Create a registry client with a custom request timeout.
    pub fn with_timeout(
        liquid_url: impl Into<String>,
        testnet_url: impl Into<String>,
        timeout: Duration,
    ) -> RegistryResult<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            liquid_url: liquid_url.into(),
            testnet_url: testnet_url.into(),
        })
    }

    /// Registry URL used for `network`.
    pub fn registry_url(&self, network: Network) -> &str {
        match network {
            Network::Liquid => &self.liquid_url,
            Network::Testnet => &self.testnet_url,
        }
    }

    /// Fetch the providers listed for `network`.
    ///
    /// # Errors
    /// `RegistryUnavailable` when the registry cannot be reached, answers
    /// with a non-success status, or serves something other than a JSON
    /// array. An empty array is not an error.
    pub async fn fetch_providers(&self, network: Network) -> RegistryResult<Vec<Provider>> {
        let url = self.registry_url(network);
        info!(%network, url = %url, "Fetching providers from registry");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RegistryError::RegistryUnavailable(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::RegistryUnavailable(format!(
                "HTTP {status}: {body}"
            )));
        }

        // Served as text/plain by some hosts, so parse the body ourselves.
        let text = response
            .text()
            .await
            .map_err(|e| RegistryError::RegistryUnavailable(format!("Failed to read body: {e}")))?;
        let body: Value = serde_json::from_str(&text)
            .map_err(|e| RegistryError::RegistryUnavailable(format!("Invalid JSON: {e}")))?;

        let providers = parse_registry(&body)?;
        info!(%network, provider_count = providers.len(), "Fetched providers");
        Ok(providers)
    }
}

/// Turn a registry payload into providers.
///
/// Entries without a non-empty `name` and `endpoint` are dropped. Providers
/// are keyed by endpoint; later duplicates are dropped.
pub fn parse_registry(body: &Value) -> RegistryResult<Vec<Provider>> {
    let entries = body.as_array().ok_or_else(|| {
        RegistryError::RegistryUnavailable("registry payload is not an array".to_string())
    })?;

    let mut seen = HashSet::new();
    let mut providers = Vec::with_capacity(entries.len());

    for (idx, entry) in entries.iter().enumerate() {
        match validate_provider(entry) {
            Ok(provider) => {
                if seen.insert(provider.endpoint.clone()) {
                    providers.push(provider);
                } else {
                    debug!(idx, endpoint = %provider.endpoint, "Skipping duplicate provider");
                }
            }
            Err(e) => {
                warn!(idx, error = %e, "Skipping invalid registry entry");
                Metrics::malformed_dropped(e.kind);
            }
        }
    }

    Ok(providers)
}
