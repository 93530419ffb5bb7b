//! Best-market selection.
//!
//! Candidates are filtered by provider, pair and liquidity, then ranked by
//! what the user would receive net of fees. The ranking is a stable fold:
//! a later market replaces the best so far only if strictly better, so
//! ties go to the first market seen.

use crate::error::{RouterError, RouterResult};
use crate::fee::{get_trade_type, total_market_fees};
use rust_decimal::prelude::ToPrimitive;
use tdex_core::{CoinPair, Market, Provider, TradeType};
use tracing::debug;

/// What the user would receive from `market`, net of fees.
///
/// BUY: `from / spot - fees`. SELL: `from * spot - fees`. Missing amount,
/// price and fees count as zero, as do fees that overflow. The result is
/// not clamped: a BUY against a spot price of zero gives `+inf`, which
/// outranks every finite market, and a `NaN` never replaces the best so
/// far.
pub fn net_proceeds(market: &Market, pair: &CoinPair, trade_type: TradeType) -> f64 {
    let from = pair.from.amount_or_zero().to_f64().unwrap_or(0.0);
    let spot = market.price.as_ref().map_or(0.0, |p| p.spot_price);
    let fees = total_market_fees(market, pair)
        .and_then(|f| f.to_f64())
        .unwrap_or(0.0);

    let gross = match trade_type {
        TradeType::Buy => from / spot,
        TradeType::Sell => from * spot,
    };
    gross - fees
}

/// Whether `market` holds enough of the destination asset.
///
/// A market without a price snapshot or balance is never liquid.
fn has_liquidity(market: &Market, pair: &CoinPair, trade_type: TradeType) -> bool {
    let Some(balance) = market.balance() else {
        return false;
    };
    let wanted = pair.dest.amount_or_zero();
    match trade_type {
        TradeType::Buy => balance.base_amount >= wanted,
        TradeType::Sell => balance.quote_amount >= wanted,
    }
}

/// Outcome of filtering, before ranking.
struct Candidates<'a> {
    trade_type: TradeType,
    /// Markets of the requested provider trading the pair.
    matching: usize,
    /// Matching markets with enough liquidity.
    liquid: Vec<&'a Market>,
}

fn candidates<'a>(
    markets: &'a [Market],
    pair: &CoinPair,
    use_provider: Option<&Provider>,
) -> Option<Candidates<'a>> {
    // Direction comes from the first market only. Mixed orientations in
    // `markets` get the first market's direction.
    let trade_type = get_trade_type(markets.first()?, pair);

    let mut matching = 0;
    let liquid = markets
        .iter()
        .filter(|m| use_provider.map_or(true, |p| m.provider.endpoint == p.endpoint))
        .filter(|m| pair.matches_assets(&m.base_asset, &m.quote_asset))
        .inspect(|_| matching += 1)
        .filter(|m| has_liquidity(m, pair, trade_type))
        .collect();

    Some(Candidates {
        trade_type,
        matching,
        liquid,
    })
}

/// Stable fold keeping the first market with the highest net proceeds.
fn best_of<'a>(liquid: &[&'a Market], pair: &CoinPair, trade_type: TradeType) -> Option<&'a Market> {
    let (first, rest) = liquid.split_first()?;
    if rest.is_empty() {
        return Some(*first);
    }

    let mut best = *first;
    let mut best_proceeds = net_proceeds(best, pair, trade_type);
    for market in rest {
        let proceeds = net_proceeds(market, pair, trade_type);
        if proceeds > best_proceeds {
            best = *market;
            best_proceeds = proceeds;
        }
    }

    debug!(market = %best, proceeds = best_proceeds, %trade_type, "Best market selected");
    Some(best)
}

/// The market giving the user the most for `pair`.
///
/// `use_provider` restricts candidates to one provider. Markets without fee
/// schedules rank as fee-free.
pub fn get_best_market(
    markets: &[Market],
    pair: &CoinPair,
    use_provider: Option<&Provider>,
) -> Option<Market> {
    let c = candidates(markets, pair, use_provider)?;
    best_of(&c.liquid, pair, c.trade_type).cloned()
}

/// Like [`get_best_market`], but says why nothing was selected.
pub fn route(
    markets: &[Market],
    pair: &CoinPair,
    use_provider: Option<&Provider>,
) -> RouterResult<Market> {
    let c = candidates(markets, pair, use_provider).ok_or(RouterError::NoMarkets)?;
    if c.matching == 0 {
        return Err(RouterError::PairNotSupported);
    }
    best_of(&c.liquid, pair, c.trade_type)
        .cloned()
        .ok_or(RouterError::InsufficientLiquidity)
}
