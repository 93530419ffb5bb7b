//! Trade preview.

use crate::client::{TradeTransport, TransportError, PREVIEW_PATH};
use crate::error::{NegotiationError, NegotiationResult, AMOUNT_TOO_LARGE_CODE};
use crate::notifier::Notifier;
use rust_decimal::Decimal;
use serde_json::Value;
use tdex_core::validate::validate_preview_response;
use tdex_core::wire::PreviewTradeRequest;
use tdex_core::{Coin, CoinPair, Market, PreviewTradeResponse};
use tdex_router::get_trade_type;
use tdex_telemetry::Metrics;
use tracing::{debug, warn};

/// Ask `market`'s provider to price `amount` of `coin`.
///
/// `coin` is the side of `pair` whose amount is fixed; fees are charged in
/// the other side. Returns the first well-formed preview.
///
/// # Errors
/// - `AmountTooLarge` when the provider rejects with code 2
/// - `PreviewUnavailable` for any other rejection, transport failure, or
///   when no preview survives validation
pub async fn trade_preview(
    transport: &dyn TradeTransport,
    notifier: &dyn Notifier,
    amount: Decimal,
    coin: &Coin,
    market: &Market,
    pair: &CoinPair,
) -> NegotiationResult<PreviewTradeResponse> {
    let result = fetch_preview(transport, notifier, amount, coin, market, pair).await;
    Metrics::negotiation("preview", if result.is_ok() { "ok" } else { "error" });
    result
}

async fn fetch_preview(
    transport: &dyn TradeTransport,
    notifier: &dyn Notifier,
    amount: Decimal,
    coin: &Coin,
    market: &Market,
    pair: &CoinPair,
) -> NegotiationResult<PreviewTradeResponse> {
    let other = pair.other_side(&coin.asset_hash);
    let trade_type = get_trade_type(market, pair);
    let request = PreviewTradeRequest {
        market: market.descriptor(),
        trade_type,
        amount: amount.to_string(),
        asset: coin.asset_hash.clone(),
        fee_asset: other.asset_hash.clone(),
    };
    debug!(%market, %trade_type, %amount, asset = %coin.asset_hash, "Requesting trade preview");

    let body = serde_json::to_value(&request)
        .map_err(|e| NegotiationError::HttpClient(format!("Failed to encode preview: {e}")))?;

    let response = match transport.post(&market.provider, PREVIEW_PATH, body).await {
        Ok(response) => response,
        Err(TransportError::Rejected(error)) => {
            warn!(%market, code = error.code, message = %error.message, "Preview rejected");
            notifier.notify(&error.message);
            return Err(if error.code == AMOUNT_TOO_LARGE_CODE {
                NegotiationError::AmountTooLarge
            } else {
                NegotiationError::PreviewUnavailable
            });
        }
        Err(TransportError::Unreachable(reason)) => {
            warn!(%market, %reason, "Preview request failed");
            return Err(NegotiationError::PreviewUnavailable);
        }
    };

    let Some(previews) = response.get("previews").and_then(Value::as_array) else {
        warn!(%market, "Invalid trade/preview response");
        return Err(NegotiationError::PreviewUnavailable);
    };

    previews
        .iter()
        .find_map(|p| match validate_preview_response(p) {
            Ok(preview) => Some(preview),
            Err(e) => {
                debug!(%market, error = %e, "Dropping malformed preview");
                Metrics::malformed_dropped(e.kind);
                None
            }
        })
        .ok_or(NegotiationError::PreviewUnavailable)
}
