//! Application wiring.
//!
//! Owns the discovery service, the trade transport and the notifier, and
//! exposes the three CLI flows: list providers, list markets, quote a swap.

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tdex_core::{
    Coin, CoinPair, Market, Network, PreviewTradeResponse, Provider, TradeStatusMessage, TradeType,
};
use tdex_negotiator::{
    trade_preview, DynNotifier, DynTransport, DynWallet, HttpTransport, LogNotifier, Negotiation,
};
use tdex_registry::{
    Discovery, DiscoveryService, MarketFetcher, ProviderSource, RegistryClient, StaticProviders,
};
use tdex_router::{get_trade_type, route};
use tracing::info;

/// Best market and its preview for a requested swap.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuote {
    pub provider: Provider,
    pub base_asset: String,
    pub quote_asset: String,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    pub preview: PreviewTradeResponse,
}

pub struct Application {
    network: Network,
    pinned: Option<Provider>,
    discovery: DiscoveryService<Box<dyn ProviderSource>, MarketFetcher>,
    transport: DynTransport,
    notifier: DynNotifier,
}

impl Application {
    /// Create an application from config.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let timeout = config.http.timeout();
        let pinned = config.pinned_provider();

        let providers: Box<dyn ProviderSource> = match &pinned {
            Some(provider) => {
                info!(provider = %provider.endpoint, "Trades pinned to provider");
                Box::new(StaticProviders::new(vec![provider.clone()]))
            }
            None => Box::new(RegistryClient::with_timeout(
                config.registry.liquid_url.clone(),
                config.registry.testnet_url.clone(),
                timeout,
            )?),
        };
        let markets = MarketFetcher::with_timeout(timeout)?;
        let transport: DynTransport = Arc::new(HttpTransport::with_timeout(timeout)?);

        Ok(Self {
            network: config.network,
            pinned,
            discovery: DiscoveryService::new(providers, markets),
            transport,
            notifier: Arc::new(LogNotifier),
        })
    }

    /// Replace the notifier provider messages are sent to.
    pub fn with_notifier(mut self, notifier: DynNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Switch network. Published and in-flight discoveries are discarded.
    pub fn set_network(&mut self, network: Network) {
        if network != self.network {
            info!(from = %self.network, to = %network, "Switching network");
            self.network = network;
            self.discovery.book().invalidate();
        }
    }

    /// Providers for the current network.
    pub async fn providers(&self) -> AppResult<Vec<Provider>> {
        Ok(self.discovery.providers().providers(self.network).await?)
    }

    /// Run a fresh discovery for the current network.
    pub async fn refresh(&self) -> AppResult<Arc<Discovery>> {
        Ok(self.discovery.refresh(self.network).await?)
    }

    /// Latest discovery, running one if none is published.
    pub async fn discovery(&self) -> AppResult<Arc<Discovery>> {
        match self.discovery.book().snapshot() {
            Some(snapshot) if snapshot.network == self.network => Ok(snapshot),
            _ => self.refresh().await,
        }
    }

    /// Best market for `pair`, restricted to `provider` or the pinned one.
    pub async fn best_market(
        &self,
        pair: &CoinPair,
        provider: Option<&Provider>,
    ) -> AppResult<Market> {
        let discovery = self.discovery().await?;
        let use_provider = provider.or(self.pinned.as_ref());
        let market = route(&discovery.markets, pair, use_provider)?;
        info!(
            market = %market,
            trade_type = %get_trade_type(&market, pair),
            "Selected market"
        );
        Ok(market)
    }

    /// Select the best market for `pair` and preview the trade.
    ///
    /// The side carrying a nonzero amount is the one priced.
    pub async fn quote(&self, pair: &CoinPair, provider: Option<&Provider>) -> AppResult<SwapQuote> {
        let (amount, coin) = fixed_side(pair)?;
        let market = self.best_market(pair, provider).await?;

        let preview = trade_preview(
            self.transport.as_ref(),
            self.notifier.as_ref(),
            amount,
            coin,
            &market,
            pair,
        )
        .await?;

        Ok(SwapQuote {
            trade_type: get_trade_type(&market, pair),
            provider: market.provider,
            base_asset: market.base_asset,
            quote_asset: market.quote_asset,
            preview,
        })
    }

    /// Start a negotiation on `market` signed by `wallet`.
    pub fn negotiation(&self, market: Market, pair: CoinPair, wallet: DynWallet) -> Negotiation {
        Negotiation::new(
            market,
            pair,
            self.network,
            Arc::clone(&self.transport),
            wallet,
            Arc::clone(&self.notifier),
        )
    }
}

/// The side of `pair` whose amount the user fixed: `from` when set,
/// otherwise `dest`.
fn fixed_side(pair: &CoinPair) -> AppResult<(Decimal, &Coin)> {
    [&pair.from, &pair.dest]
        .into_iter()
        .find_map(|coin| match coin.amount {
            Some(amount) if amount > Decimal::ZERO => Some((amount, coin)),
            _ => None,
        })
        .ok_or_else(|| AppError::InvalidRequest(TradeStatusMessage::EnterAmount.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fixed_side_prefers_from() {
        let pair = CoinPair::new(
            Coin::new("a").with_amount(dec!(1)),
            Coin::new("b").with_amount(dec!(2)),
        );
        let (amount, coin) = fixed_side(&pair).unwrap();
        assert_eq!(amount, dec!(1));
        assert_eq!(coin.asset_hash, "a");
    }

    #[test]
    fn test_fixed_side_falls_back_to_dest() {
        let pair = CoinPair::new(Coin::new("a"), Coin::new("b").with_amount(dec!(2)));
        let (_, coin) = fixed_side(&pair).unwrap();
        assert_eq!(coin.asset_hash, "b");
    }

    #[test]
    fn test_fixed_side_requires_amount() {
        let pair = CoinPair::new(Coin::new("a").with_amount(dec!(0)), Coin::new("b"));
        assert!(matches!(fixed_side(&pair), Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_set_network_invalidates_book() {
        let mut app = Application::new(AppConfig::default()).unwrap();
        let book = app.discovery.book();
        let epoch = book.begin();
        app.set_network(Network::Testnet);
        assert_eq!(app.network(), Network::Testnet);
        assert!(!book.is_current(epoch));
    }
}
