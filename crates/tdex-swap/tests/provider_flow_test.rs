//! Provider flow integration tests.
//!
//! Runs discovery, selection and negotiation over HTTP against mock
//! providers:
//! - Registry parsing and market fetching
//! - Absorbed provider failures
//! - Preview error codes
//! - Propose/complete round

mod integration;
use integration::common::mock_provider::MockProvider;

use axum::http::StatusCode;
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::Arc;
use tdex_core::{Coin, CoinPair, Market, Network, Provider, TradeType};
use tdex_negotiator::{
    trade_preview, HttpTransport, MockWallet, NegotiationError, RecordingNotifier, TradeDraft,
    TradeStatus,
};
use tdex_registry::{MarketFetcher, RegistryClient, RegistryError};
use tdex_swap::config::{RegistryConfig, TradeConfig};
use tdex_swap::{AppConfig, AppError, Application};

const LBTC: &str = "144c654344aa716d6f3abcc1ca90e5641e4e2a7f633bc09fe3baf64585819a49";
const USDT: &str = "f3d1ec678811398cd2ae277cbe3849c6f6dbd72c74bc542f7c4b11ff0e820958";

fn preview_body(amount: &str, asset: &str) -> serde_json::Value {
    json!({"previews": [{
        "amount": amount,
        "asset": asset,
        "fee": {
            "percentageFee": {"baseAsset": "25", "quoteAsset": "25"},
            "fixedFee": {"baseAsset": "0", "quoteAsset": "0"}
        },
        "feeAmount": "62",
        "feeAsset": USDT,
        "price": {"basePrice": 0.00004, "quotePrice": 25000.0}
    }]})
}

fn app_config(registry_url: String) -> AppConfig {
    AppConfig {
        network: Network::Testnet,
        registry: RegistryConfig {
            liquid_url: registry_url.clone(),
            testnet_url: registry_url,
        },
        ..Default::default()
    }
}

fn sell(amount: rust_decimal::Decimal) -> CoinPair {
    CoinPair::new(Coin::new(LBTC).with_amount(amount), Coin::new(USDT))
}

#[tokio::test]
async fn test_registry_fetch_drops_invalid_and_duplicates() {
    let server = MockProvider::start().await;
    server.ok(
        "/registry.json",
        json!([
            {"name": "Alpha", "endpoint": "https://alpha.example"},
            {"name": "Alpha again", "endpoint": "https://alpha.example/"},
            {"name": "Broken"},
            {"name": "Beta", "endpoint": "https://beta.example"}
        ]),
    );

    let client = RegistryClient::new("unused", format!("{}/registry.json", server.url())).unwrap();
    let providers = client.fetch_providers(Network::Testnet).await.unwrap();

    let endpoints: Vec<&str> = providers.iter().map(|p| p.endpoint.as_str()).collect();
    assert_eq!(endpoints, vec!["https://alpha.example", "https://beta.example"]);
}

#[tokio::test]
async fn test_registry_not_array_is_unavailable() {
    let server = MockProvider::start().await;
    server.ok("/registry.json", json!({"providers": []}));

    let client = RegistryClient::new(format!("{}/registry.json", server.url()), "unused").unwrap();
    let result = client.fetch_providers(Network::Liquid).await;
    assert!(matches!(result, Err(RegistryError::RegistryUnavailable(_))));
}

#[tokio::test]
async fn test_fetch_markets_not_array_is_unreachable() {
    let server = MockProvider::start().await;
    server.ok("/v2/markets", json!({"markets": "none"}));
    let provider = Provider::new("mock", server.url());

    let result = MarketFetcher::new().unwrap().fetch_markets(&provider).await;
    assert!(matches!(result, Err(RegistryError::ProviderUnreachable { .. })));
}

#[tokio::test]
async fn test_fetch_markets_drops_malformed() {
    let server = MockProvider::start().await;
    server.ok(
        "/v2/markets",
        json!({"markets": [
            {
                "market": {"baseAsset": LBTC, "quoteAsset": USDT},
                "fee": {
                    "percentageFee": {"baseAsset": "25", "quoteAsset": "25"},
                    "fixedFee": {"baseAsset": "0", "quoteAsset": "0"}
                }
            },
            {"market": {"baseAsset": LBTC}}
        ]}),
    );
    let provider = Provider::new("mock", server.url());

    let markets = MarketFetcher::new().unwrap().fetch_markets(&provider).await.unwrap();
    assert_eq!(markets.len(), 1);
    assert_eq!(markets[0].percentage_fee.unwrap().base_asset, dec!(25));

    let requests = server.requests("/v2/markets");
    assert_eq!(requests, vec![json!({})]);
}

#[tokio::test]
async fn test_fetch_market_price() {
    let server = MockProvider::start().await;
    server.price(LBTC, 25000.0, "100000000", "5000000000000");
    server.ok("/v2/market/price:other", json!({"spotPrice": "25000"}));
    let fetcher = MarketFetcher::new().unwrap();
    let provider = Provider::new("mock", server.url());

    let price = fetcher
        .fetch_market_price(&Market::new(provider.clone(), LBTC, USDT))
        .await
        .unwrap();
    assert_eq!(price.spot_price, 25000.0);
    assert_eq!(price.balance.unwrap().base_amount, dec!(100000000));
    assert_eq!(
        server.requests("/v2/market/price")[0],
        json!({"market": {"baseAsset": LBTC, "quoteAsset": USDT}})
    );

    // Non-numeric spot price fails validation.
    let missing = fetcher
        .fetch_market_price(&Market::new(provider, "other", USDT))
        .await;
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_quote_selects_best_provider_and_absorbs_failures() {
    let registry = MockProvider::start().await;
    let cheap = MockProvider::start().await;
    let better = MockProvider::start().await;
    let broken = MockProvider::start().await;

    registry.ok(
        "/registry.json",
        json!([
            {"name": "cheap", "endpoint": cheap.url()},
            {"name": "better", "endpoint": better.url()},
            {"name": "broken", "endpoint": broken.url()}
        ]),
    );
    cheap.markets(&[(LBTC, USDT)], "25", "0");
    cheap.price(LBTC, 20000.0, "100000000", "5000000000000");
    better.markets(&[(LBTC, USDT)], "25", "0");
    better.price(LBTC, 25000.0, "100000000", "5000000000000");
    better.ok("/v2/trade/preview", preview_body("2500000", USDT));
    broken.set("/v2/markets", StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "down"}));

    let app = Application::new(app_config(format!("{}/registry.json", registry.url()))).unwrap();

    let discovery = app.refresh().await.unwrap();
    assert_eq!(discovery.providers.len(), 3);
    assert_eq!(discovery.markets.len(), 2);
    assert_eq!(discovery.priced_count(), 2);

    let quote = app.quote(&sell(dec!(100)), None).await.unwrap();
    assert_eq!(quote.provider.endpoint, better.url());
    assert_eq!(quote.trade_type, TradeType::Sell);
    assert_eq!(quote.preview.amount, "2500000");

    assert_eq!(
        better.requests("/v2/trade/preview")[0],
        json!({
            "market": {"baseAsset": LBTC, "quoteAsset": USDT},
            "type": 1,
            "amount": "100",
            "asset": LBTC,
            "feeAsset": USDT
        })
    );
    assert!(cheap.requests("/v2/trade/preview").is_empty());
}

#[tokio::test]
async fn test_pinned_provider_skips_registry() {
    let provider = MockProvider::start().await;
    provider.markets(&[(LBTC, USDT)], "0", "0");
    provider.price(LBTC, 25000.0, "100000000", "5000000000000");

    let config = AppConfig {
        trade: TradeConfig {
            provider: Some(provider.url()),
        },
        ..app_config("http://127.0.0.1:9/unreachable".to_string())
    };
    let app = Application::new(config).unwrap();

    let providers = app.providers().await.unwrap();
    assert_eq!(providers.len(), 1);
    let market = app.best_market(&sell(dec!(1)), None).await.unwrap();
    assert_eq!(market.provider.endpoint, provider.url());
}

#[tokio::test]
async fn test_requested_provider_with_trailing_slash() {
    let registry = MockProvider::start().await;
    let first = MockProvider::start().await;
    let second = MockProvider::start().await;
    registry.ok(
        "/registry.json",
        json!([
            {"name": "first", "endpoint": first.url()},
            {"name": "second", "endpoint": second.url()}
        ]),
    );
    for server in [&first, &second] {
        server.markets(&[(LBTC, USDT)], "0", "0");
        server.price(LBTC, 25000.0, "100000000", "5000000000000");
    }

    let app = Application::new(app_config(format!("{}/registry.json", registry.url()))).unwrap();

    let requested = Provider::from_endpoint(&format!("{}/", second.url())).unwrap();
    let market = app.best_market(&sell(dec!(1)), Some(&requested)).await.unwrap();
    assert_eq!(market.provider.endpoint, second.url());
}

#[tokio::test]
async fn test_quote_without_liquidity() {
    let registry = MockProvider::start().await;
    let shallow = MockProvider::start().await;
    registry.ok("/registry.json", json!([{"name": "shallow", "endpoint": shallow.url()}]));
    shallow.markets(&[(LBTC, USDT)], "0", "0");
    shallow.price(LBTC, 25000.0, "0", "0");

    let app = Application::new(app_config(format!("{}/registry.json", registry.url()))).unwrap();

    // Receiving 10 USDT needs quote-side balance on a SELL.
    let pair = CoinPair::new(Coin::new(LBTC), Coin::new(USDT).with_amount(dec!(10)));
    let result = app.quote(&pair, None).await;
    assert!(matches!(
        result,
        Err(AppError::Router(tdex_router::RouterError::InsufficientLiquidity))
    ));
}

#[tokio::test]
async fn test_empty_registry() {
    let registry = MockProvider::start().await;
    registry.ok("/registry.json", json!([]));

    let app = Application::new(app_config(format!("{}/registry.json", registry.url()))).unwrap();
    let result = app.refresh().await;
    assert!(matches!(
        result,
        Err(AppError::Registry(RegistryError::NoProvidersFound))
    ));
}

#[tokio::test]
async fn test_preview_error_codes() {
    let server = MockProvider::start().await;
    let market = Market::new(Provider::new("mock", server.url()), LBTC, USDT);
    let pair = sell(dec!(1000));
    let transport = HttpTransport::new().unwrap();
    let notifier = RecordingNotifier::new();

    server.set(
        "/v2/trade/preview",
        StatusCode::BAD_REQUEST,
        json!({"code": 2, "message": "amount exceeds balance"}),
    );
    let err = trade_preview(&transport, &notifier, dec!(1000), &pair.from, &market, &pair)
        .await
        .unwrap_err();
    assert!(matches!(err, NegotiationError::AmountTooLarge));

    server.set(
        "/v2/trade/preview",
        StatusCode::BAD_REQUEST,
        json!({"code": 3, "message": "market closed"}),
    );
    let err = trade_preview(&transport, &notifier, dec!(1000), &pair.from, &market, &pair)
        .await
        .unwrap_err();
    assert!(matches!(err, NegotiationError::PreviewUnavailable));

    assert_eq!(
        notifier.messages(),
        vec!["amount exceeds balance", "market closed"]
    );
}

#[tokio::test]
async fn test_propose_and_complete() {
    let server = MockProvider::start().await;
    server.markets(&[(LBTC, USDT)], "25", "0");
    server.price(LBTC, 25000.0, "100000000", "5000000000000");
    server.ok("/v2/trade/preview", preview_body("24937500", USDT));
    server.ok(
        "/v2/trade/propose",
        json!({
            "swapAccept": {
                "id": "accept-7",
                "requestId": "req-7",
                "transaction": "cHNldP8BAgAAAA==",
                "unblindedInputs": []
            },
            "swapFail": null,
            "expiryTimeUnix": (unix_now() + 300).to_string()
        }),
    );
    server.ok("/v2/trade/complete", json!({"txid": "a1b2c3"}));

    let config = AppConfig {
        trade: TradeConfig {
            provider: Some(server.url()),
        },
        ..app_config("http://127.0.0.1:9/unreachable".to_string())
    };
    let app = Application::new(config).unwrap();
    let pair = sell(dec!(1000));
    let market = app.best_market(&pair, None).await.unwrap();

    let wallet = Arc::new(MockWallet::new(Network::Testnet));
    let mut negotiation = app.negotiation(market, pair.clone(), wallet);

    negotiation.preview(dec!(1000), &pair.from).await.unwrap();
    negotiation
        .propose(TradeDraft {
            transaction: "cHNldP8BdXNlcg==".to_string(),
            unblinded_inputs: vec![],
        })
        .await
        .unwrap();
    assert_eq!(negotiation.status(), Some(TradeStatus::Confirm));

    let txid = negotiation.complete().await.unwrap();
    assert_eq!(txid, "a1b2c3");
    assert_eq!(negotiation.status(), Some(TradeStatus::Completed));

    let propose = &server.requests("/v2/trade/propose")[0];
    assert_eq!(propose["swapRequest"]["amountP"], "1000");
    assert_eq!(propose["swapRequest"]["amountR"], "24937500");
    assert_eq!(propose["swapRequest"]["transaction"], "signed:cHNldP8BdXNlcg==");
    assert_eq!(
        server.requests("/v2/trade/complete")[0],
        json!({"swapComplete": {"acceptId": "accept-7", "transaction": "signed:cHNldP8BAgAAAA=="}})
    );
}

#[tokio::test]
async fn test_propose_provider_error_surfaces_code() {
    let server = MockProvider::start().await;
    server.markets(&[(LBTC, USDT)], "0", "0");
    server.price(LBTC, 25000.0, "100000000", "5000000000000");
    server.ok("/v2/trade/preview", preview_body("25000000", USDT));
    server.set(
        "/v2/trade/propose",
        StatusCode::BAD_REQUEST,
        json!({"code": 11, "message": "invalid transaction"}),
    );

    let config = AppConfig {
        trade: TradeConfig {
            provider: Some(server.url()),
        },
        ..app_config("http://127.0.0.1:9/unreachable".to_string())
    };
    let notifier = Arc::new(RecordingNotifier::new());
    let app = Application::new(config).unwrap().with_notifier(notifier.clone());
    let pair = sell(dec!(1000));
    let market = app.best_market(&pair, None).await.unwrap();

    let mut negotiation =
        app.negotiation(market, pair.clone(), Arc::new(MockWallet::new(Network::Testnet)));
    negotiation.preview(dec!(1000), &pair.from).await.unwrap();
    let err = negotiation
        .propose(TradeDraft {
            transaction: "cHNldP8B".to_string(),
            unblinded_inputs: vec![],
        })
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some(11));
    assert_eq!(err.user_message(), "invalid transaction");
    assert_eq!(negotiation.status(), Some(TradeStatus::Error));
    assert_eq!(notifier.messages(), vec!["invalid transaction"]);
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}
