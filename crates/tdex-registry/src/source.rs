//! Source traits for providers and markets.
//!
//! Discovery is written against these traits so the HTTP clients can be
//! swapped for in-memory sources in tests.

use crate::client::RegistryClient;
use crate::error::RegistryResult;
use crate::market::MarketFetcher;
use futures_util::future::BoxFuture;
use tdex_core::{Market, MarketPrice, Network, Provider};

/// Where providers come from.
pub trait ProviderSource: Send + Sync {
    /// Providers listed for `network`.
    fn providers(&self, network: Network) -> BoxFuture<'_, RegistryResult<Vec<Provider>>>;
}

/// Where markets and prices come from.
pub trait MarketSource: Send + Sync {
    /// Markets offered by `provider`.
    fn markets<'a>(&'a self, provider: &'a Provider) -> BoxFuture<'a, RegistryResult<Vec<Market>>>;

    /// Price snapshot for `market`, `None` when unavailable.
    fn price<'a>(&'a self, market: &'a Market) -> BoxFuture<'a, Option<MarketPrice>>;
}

impl ProviderSource for RegistryClient {
    fn providers(&self, network: Network) -> BoxFuture<'_, RegistryResult<Vec<Provider>>> {
        Box::pin(self.fetch_providers(network))
    }
}

impl MarketSource for MarketFetcher {
    fn markets<'a>(&'a self, provider: &'a Provider) -> BoxFuture<'a, RegistryResult<Vec<Market>>> {
        Box::pin(self.fetch_markets(provider))
    }

    fn price<'a>(&'a self, market: &'a Market) -> BoxFuture<'a, Option<MarketPrice>> {
        Box::pin(self.fetch_market_price(market))
    }
}

impl<T: ProviderSource + ?Sized> ProviderSource for Box<T> {
    fn providers(&self, network: Network) -> BoxFuture<'_, RegistryResult<Vec<Provider>>> {
        (**self).providers(network)
    }
}

impl<T: MarketSource + ?Sized> MarketSource for Box<T> {
    fn markets<'a>(&'a self, provider: &'a Provider) -> BoxFuture<'a, RegistryResult<Vec<Market>>> {
        (**self).markets(provider)
    }

    fn price<'a>(&'a self, market: &'a Market) -> BoxFuture<'a, Option<MarketPrice>> {
        (**self).price(market)
    }
}

/// A fixed provider list, regardless of network.
///
/// Used when the trade is pinned to a single provider.
#[derive(Debug, Clone, Default)]
pub struct StaticProviders(pub Vec<Provider>);

impl StaticProviders {
    pub fn new(providers: Vec<Provider>) -> Self {
        Self(providers)
    }
}

impl ProviderSource for StaticProviders {
    fn providers(&self, _network: Network) -> BoxFuture<'_, RegistryResult<Vec<Provider>>> {
        let providers = self.0.clone();
        Box::pin(async move { Ok(providers) })
    }
}
