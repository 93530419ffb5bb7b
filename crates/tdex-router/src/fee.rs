//! Trade direction and market fee calculation.
//!
//! Fees are computed in `Decimal`: `fixed + amount * percentage / 10_000`,
//! reading the side of the schedule the trade pays in.

use rust_decimal::Decimal;
use tdex_core::{CoinPair, Market, TradeType, BPS_DIVISOR};
use tracing::warn;

/// Direction of `pair` relative to `market`.
///
/// SELL when the user pays the market's base asset, BUY otherwise. Every
/// stage derives direction through this function.
#[inline]
pub fn get_trade_type(market: &Market, pair: &CoinPair) -> TradeType {
    if market.base_asset == pair.from.asset_hash {
        TradeType::Sell
    } else {
        TradeType::Buy
    }
}

/// Total fee `market` charges to trade `pair.from.amount`.
///
/// `None` when either fee schedule is missing, or when the schedule
/// overflows `Decimal`. A missing amount counts as zero, leaving only the
/// fixed fee.
pub fn total_market_fees(market: &Market, pair: &CoinPair) -> Option<Decimal> {
    let percentage = market.percentage_fee.as_ref()?;
    let fixed = market.fixed_fee.as_ref()?;
    let trade_type = get_trade_type(market, pair);

    let amount = pair.from.amount_or_zero();
    let total = amount
        .checked_mul(percentage.for_trade(trade_type))
        .and_then(|v| v.checked_div(BPS_DIVISOR))
        .and_then(|variable| fixed.for_trade(trade_type).checked_add(variable));

    if total.is_none() {
        warn!(market = %market, %amount, "Fee schedule overflows, ignoring fees");
    }
    total
}
