//! Market aggregation across providers.

use crate::error::{RegistryError, RegistryResult};
use crate::source::{MarketSource, ProviderSource};
use futures_util::future::join_all;
use std::time::Instant;
use tdex_core::{CoinPair, Market, Network, Provider};
use tdex_telemetry::Metrics;
use tracing::{debug, info, warn};

/// Result of one discovery cycle.
#[derive(Debug, Clone)]
pub struct Discovery {
    pub network: Network,
    pub providers: Vec<Provider>,
    /// Aggregated markets, in provider order then provider-returned order.
    pub markets: Vec<Market>,
}

impl Discovery {
    /// Markets carrying a price snapshot.
    pub fn priced_count(&self) -> usize {
        self.markets.iter().filter(|m| m.price.is_some()).count()
    }

    /// Markets trading the pair's two assets, in either orientation.
    pub fn markets_for_pair<'a>(&'a self, pair: &'a CoinPair) -> impl Iterator<Item = &'a Market> + 'a {
        self.markets
            .iter()
            .filter(move |m| pair.matches_assets(&m.base_asset, &m.quote_asset))
    }

    /// Markets offered by the provider at `endpoint`.
    pub fn markets_of<'a>(&'a self, endpoint: &'a str) -> impl Iterator<Item = &'a Market> + 'a {
        self.markets
            .iter()
            .filter(move |m| m.provider.endpoint == endpoint)
    }
}

/// Run one discovery cycle for `network`.
///
/// Fetches providers, then every provider's markets concurrently, then every
/// market's price concurrently. An unreachable provider contributes no
/// markets and a failed price leaves its market unpriced.
///
/// # Errors
/// - Registry failures are propagated unchanged
/// - `NoProvidersFound` when the registry lists nobody
/// - `NoMarketsFound` when no provider returned a market
pub async fn discover_markets<P, M>(
    providers: &P,
    source: &M,
    network: Network,
) -> RegistryResult<Discovery>
where
    P: ProviderSource + ?Sized,
    M: MarketSource + ?Sized,
{
    let started = Instant::now();

    let providers = providers.providers(network).await?;
    if providers.is_empty() {
        warn!(%network, "Registry returned no providers");
        return Err(RegistryError::NoProvidersFound);
    }

    let per_provider = join_all(providers.iter().map(|p| source.markets(p))).await;

    let mut unpriced = Vec::new();
    for (provider, result) in providers.iter().zip(per_provider) {
        match result {
            Ok(markets) => {
                debug!(provider = %provider.endpoint, count = markets.len(), "Provider markets");
                unpriced.extend(markets);
            }
            Err(e) => {
                warn!(provider = %provider.endpoint, error = %e, "Provider skipped");
                Metrics::provider_failed(&provider.endpoint);
            }
        }
    }

    if unpriced.is_empty() {
        warn!(%network, providers = providers.len(), "No markets found");
        return Err(RegistryError::NoMarketsFound);
    }

    let prices = join_all(unpriced.iter().map(|m| source.price(m))).await;

    let markets: Vec<Market> = unpriced
        .into_iter()
        .zip(prices)
        .map(|(market, price)| {
            if price.is_none() {
                Metrics::price_missing(&market.provider.endpoint);
            }
            market.with_price(price)
        })
        .collect();

    let discovery = Discovery {
        network,
        providers,
        markets,
    };

    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    Metrics::discovery_completed(
        network.as_str(),
        discovery.providers.len(),
        discovery.markets.len(),
        discovery.priced_count(),
    );
    Metrics::discovery_duration(network.as_str(), elapsed_ms);

    info!(
        %network,
        providers = discovery.providers.len(),
        markets = discovery.markets.len(),
        priced = discovery.priced_count(),
        elapsed_ms,
        "Discovery completed"
    );

    Ok(discovery)
}
