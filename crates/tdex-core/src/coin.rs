//! User-side swap description.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An asset the user holds or wants, with an optional target amount.
///
/// Only `asset_hash` and `amount` take part in routing; the rest is
/// display metadata owned by the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    pub asset_hash: String,
    #[serde(default)]
    pub ticker: String,
    #[serde(default = "default_precision")]
    pub precision: u8,
    #[serde(default)]
    pub amount: Option<Decimal>,
}

fn default_precision() -> u8 {
    8
}

impl Coin {
    pub fn new(asset_hash: impl Into<String>) -> Self {
        Self {
            asset_hash: asset_hash.into(),
            ticker: String::new(),
            precision: default_precision(),
            amount: None,
        }
    }

    /// Builder-style amount setter.
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Amount, treating "not set" as zero.
    #[inline]
    pub fn amount_or_zero(&self) -> Decimal {
        self.amount.unwrap_or(Decimal::ZERO)
    }
}

/// The swap a user wants to make: pay `from`, receive `dest`.
///
/// At selection time exactly one side carries a nonzero amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinPair {
    pub from: Coin,
    pub dest: Coin,
}

impl CoinPair {
    pub fn new(from: Coin, dest: Coin) -> Self {
        Self { from, dest }
    }

    /// Swap direction toggle: what was received is now paid.
    pub fn flipped(&self) -> Self {
        Self {
            from: self.dest.clone(),
            dest: self.from.clone(),
        }
    }

    /// Whether the pair's two assets are exactly `a` and `b`, in either order.
    pub fn matches_assets(&self, a: &str, b: &str) -> bool {
        (self.from.asset_hash == a && self.dest.asset_hash == b)
            || (self.from.asset_hash == b && self.dest.asset_hash == a)
    }

    /// The side of the pair that is not `asset_hash`.
    pub fn other_side(&self, asset_hash: &str) -> &Coin {
        if self.from.asset_hash == asset_hash {
            &self.dest
        } else {
            &self.from
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pair() -> CoinPair {
        CoinPair::new(
            Coin::new("lbtc").with_amount(dec!(100)),
            Coin::new("usdt"),
        )
    }

    #[test]
    fn test_flipped_swaps_sides() {
        let flipped = pair().flipped();
        assert_eq!(flipped.from.asset_hash, "usdt");
        assert_eq!(flipped.dest.asset_hash, "lbtc");
        assert_eq!(flipped.dest.amount, Some(dec!(100)));
    }

    #[test]
    fn test_matches_assets_either_order() {
        let p = pair();
        assert!(p.matches_assets("lbtc", "usdt"));
        assert!(p.matches_assets("usdt", "lbtc"));
        assert!(!p.matches_assets("lbtc", "lcad"));
    }

    #[test]
    fn test_other_side() {
        let p = pair();
        assert_eq!(p.other_side("lbtc").asset_hash, "usdt");
        assert_eq!(p.other_side("usdt").asset_hash, "lbtc");
    }

    #[test]
    fn test_amount_or_zero() {
        assert_eq!(Coin::new("x").amount_or_zero(), Decimal::ZERO);
        assert_eq!(pair().from.amount_or_zero(), dec!(100));
    }
}
