//! Market and price fetching from individual providers.

use crate::client::{build_http_client, DEFAULT_TIMEOUT};
use crate::error::{RegistryError, RegistryResult};
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tdex_core::validate::{validate_market_entry, validate_market_price};
use tdex_core::wire::MarketPriceRequest;
use tdex_core::{Market, MarketPrice, Provider};
use tdex_telemetry::Metrics;
use tracing::{debug, warn};

const MARKETS_PATH: &str = "/v2/markets";
const MARKET_PRICE_PATH: &str = "/v2/market/price";

/// Fetches markets and prices from TDEX v2 providers.
pub struct MarketFetcher {
    client: Client,
}

impl MarketFetcher {
    /// Create a fetcher with the default request timeout.
    pub fn new() -> RegistryResult<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a fetcher with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> RegistryResult<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
        })
    }

    /// POST `body` as JSON and return the parsed response body.
    async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<Value, String> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("HTTP request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("HTTP {status}: {body}"));
        }

        response
            .json()
            .await
            .map_err(|e| format!("Failed to parse response: {e}"))
    }

    /// Fetch the markets offered by `provider`.
    ///
    /// # Errors
    /// `ProviderUnreachable` when the call fails or `markets` is not an
    /// array. Individual malformed markets are dropped, not errors.
    pub async fn fetch_markets(&self, provider: &Provider) -> RegistryResult<Vec<Market>> {
        let url = provider.url(MARKETS_PATH);
        debug!(provider = %provider.endpoint, "Fetching markets");

        let body = self
            .post(&url, &json!({}))
            .await
            .map_err(|reason| RegistryError::unreachable(&provider.endpoint, reason))?;

        let markets = parse_markets(&body, provider)?;
        debug!(
            provider = %provider.endpoint,
            market_count = markets.len(),
            "Fetched markets"
        );
        Ok(markets)
    }

    /// Fetch the current price of `market`.
    ///
    /// Returns `None` on any failure, including a payload that fails
    /// validation. An unpriced market is unusable for ranking but never
    /// fails discovery.
    pub async fn fetch_market_price(&self, market: &Market) -> Option<MarketPrice> {
        let url = market.provider.url(MARKET_PRICE_PATH);
        let request = MarketPriceRequest {
            market: market.descriptor(),
        };

        let body = match self.post(&url, &request).await {
            Ok(body) => body,
            Err(reason) => {
                warn!(market = %market, %reason, "Market price fetch failed");
                return None;
            }
        };

        match validate_market_price(&body) {
            Ok(price) => Some(price),
            Err(e) => {
                warn!(market = %market, error = %e, "Discarding malformed market price");
                Metrics::malformed_dropped(e.kind);
                None
            }
        }
    }
}

/// Turn a `/v2/markets` payload into markets of `provider`.
///
/// # Errors
/// `ProviderUnreachable` when `markets` is missing or not an array.
pub fn parse_markets(body: &Value, provider: &Provider) -> RegistryResult<Vec<Market>> {
    let entries = body
        .get("markets")
        .and_then(Value::as_array)
        .ok_or_else(|| RegistryError::unreachable(&provider.endpoint, "Invalid markets response"))?;

    let markets = entries
        .iter()
        .filter_map(|entry| match validate_market_entry(entry, provider) {
            Ok(market) => Some(market),
            Err(e) => {
                debug!(provider = %provider.endpoint, error = %e, "Dropping malformed market");
                Metrics::malformed_dropped(e.kind);
                None
            }
        })
        .collect();

    Ok(markets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> Provider {
        Provider::new("test", "https://provider.example")
    }

    fn entry(base: &str, quote: &str) -> Value {
        json!({
            "market": {"baseAsset": base, "quoteAsset": quote},
            "fee": {
                "percentageFee": {"baseAsset": "25", "quoteAsset": "25"},
                "fixedFee": {"baseAsset": "0", "quoteAsset": "0"}
            }
        })
    }

    #[test]
    fn test_parse_markets_keeps_valid_drops_malformed() {
        let body = json!({"markets": [entry("lbtc", "usdt"), {"market": {"baseAsset": "x"}}]});
        let markets = parse_markets(&body, &provider()).unwrap();
        assert_eq!(markets.len(), 1);
        assert_eq!(markets[0].base_asset, "lbtc");
        assert_eq!(markets[0].provider, provider());
    }

    #[test]
    fn test_parse_markets_not_array_is_unreachable() {
        let body = json!({"markets": {"lbtc": "usdt"}});
        assert!(matches!(
            parse_markets(&body, &provider()),
            Err(RegistryError::ProviderUnreachable { endpoint, .. }) if endpoint == "https://provider.example"
        ));
        assert!(matches!(
            parse_markets(&json!([]), &provider()),
            Err(RegistryError::ProviderUnreachable { .. })
        ));
    }

    #[test]
    fn test_parse_markets_empty_array() {
        let markets = parse_markets(&json!({"markets": []}), &provider()).unwrap();
        assert!(markets.is_empty());
    }
}
