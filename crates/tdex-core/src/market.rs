//! Provider and market types.
//!
//! A market is a base/quote asset pair offered by one provider, with its
//! fee schedule and (once fetched) a price snapshot.

use crate::wire::MarketDescriptor;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Percentage fees are expressed in basis points.
pub const BPS_DIVISOR: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// A liquidity provider exposing the TDEX v2 HTTP API.
///
/// Identity is the endpoint; two providers with the same endpoint are the
/// same provider regardless of name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,
    pub endpoint: String,
}

impl Provider {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Provider named after its endpoint, as given by a user. Surrounding
    /// whitespace and trailing `/` are dropped; `None` when nothing is left.
    pub fn from_endpoint(endpoint: &str) -> Option<Self> {
        let endpoint = endpoint.trim().trim_end_matches('/');
        (!endpoint.is_empty()).then(|| Self::new(endpoint, endpoint))
    }

    /// Full URL of an API path on this provider.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), path)
    }
}

impl PartialEq for Provider {
    fn eq(&self, other: &Self) -> bool {
        self.endpoint == other.endpoint
    }
}

impl Eq for Provider {}

impl std::hash::Hash for Provider {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.endpoint.hash(state);
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.endpoint)
    }
}

/// A value per market side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeePair {
    pub base_asset: Decimal,
    pub quote_asset: Decimal,
}

impl FeePair {
    pub fn new(base_asset: Decimal, quote_asset: Decimal) -> Self {
        Self {
            base_asset,
            quote_asset,
        }
    }

    /// Value for the side charged by a trade of the given direction.
    ///
    /// BUY pays quote, so quote-side fees apply; SELL pays base.
    #[inline]
    pub fn for_trade(&self, trade_type: TradeType) -> Decimal {
        match trade_type {
            TradeType::Buy => self.quote_asset,
            TradeType::Sell => self.base_asset,
        }
    }
}

/// Provider inventory for a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub base_amount: Decimal,
    pub quote_amount: Decimal,
}

/// Price snapshot for a market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketPrice {
    /// Base-per-quote exchange rate at query time.
    pub spot_price: f64,
    pub min_tradable_amount: String,
    /// Liquidity ceiling; `None` when the provider omitted or garbled it.
    pub balance: Option<Balance>,
}

/// Trade direction relative to a market.
///
/// Serialized as the integer the TDEX v2 API expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeType {
    /// User acquires the market's base asset, paying quote.
    Buy = 0,
    /// User pays the market's base asset, receiving quote.
    Sell = 1,
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

impl Serialize for TradeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for TradeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(Self::Buy),
            1 => Ok(Self::Sell),
            other => Err(serde::de::Error::custom(format!(
                "invalid trade type {other}"
            ))),
        }
    }
}

/// A tradable pair offered by one provider.
///
/// Identity is `(provider endpoint, base_asset, quote_asset)`. Built by the
/// market fetcher, enriched once with `price`, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub provider: Provider,
    pub base_asset: String,
    pub quote_asset: String,
    pub percentage_fee: Option<FeePair>,
    pub fixed_fee: Option<FeePair>,
    pub price: Option<MarketPrice>,
}

impl Market {
    pub fn new(
        provider: Provider,
        base_asset: impl Into<String>,
        quote_asset: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            base_asset: base_asset.into(),
            quote_asset: quote_asset.into(),
            percentage_fee: None,
            fixed_fee: None,
            price: None,
        }
    }

    /// Builder-style fee schedule setter.
    pub fn with_fees(mut self, percentage_fee: FeePair, fixed_fee: FeePair) -> Self {
        self.percentage_fee = Some(percentage_fee);
        self.fixed_fee = Some(fixed_fee);
        self
    }

    /// Returns the market enriched with a price snapshot.
    pub fn with_price(mut self, price: Option<MarketPrice>) -> Self {
        self.price = price;
        self
    }

    /// The `{baseAsset, quoteAsset}` record providers expect in requests.
    pub fn descriptor(&self) -> MarketDescriptor {
        MarketDescriptor {
            base_asset: self.base_asset.clone(),
            quote_asset: self.quote_asset.clone(),
        }
    }

    /// Whether both markets denote the same provider and asset pair.
    pub fn same_identity(&self, other: &Market) -> bool {
        self.provider == other.provider
            && self.base_asset == other.base_asset
            && self.quote_asset == other.quote_asset
    }

    /// Provider balance, if a price snapshot carrying one was fetched.
    pub fn balance(&self) -> Option<&Balance> {
        self.price.as_ref().and_then(|p| p.balance.as_ref())
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}@{}",
            short_hash(&self.base_asset),
            short_hash(&self.quote_asset),
            self.provider.endpoint
        )
    }
}

fn short_hash(hash: &str) -> &str {
    hash.get(..8).unwrap_or(hash)
}
