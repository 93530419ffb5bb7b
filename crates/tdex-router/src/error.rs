//! Router error types.

use tdex_core::TradeStatusMessage;
use thiserror::Error;

/// Why no market was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("No TDEX market found")]
    NoMarkets,

    #[error("Pair not supported")]
    PairNotSupported,

    #[error("Not enough liquidity")]
    InsufficientLiquidity,
}

impl RouterError {
    /// Status message to show the user.
    pub fn status(&self) -> TradeStatusMessage {
        match self {
            Self::NoMarkets => TradeStatusMessage::NoMarkets,
            Self::PairNotSupported => TradeStatusMessage::InvalidPair,
            Self::InsufficientLiquidity => TradeStatusMessage::NoBalance,
        }
    }
}

pub type RouterResult<T> = Result<T, RouterError>;
