//! Core domain types for the TDEX swap router.
//!
//! This crate provides the types shared by every stage of a swap:
//! - `Provider`, `Market`, `MarketPrice`: liquidity discovered from providers
//! - `Coin`, `CoinPair`: the user's desired swap
//! - `TradeType`: trade direction relative to a market
//! - Wire records exchanged with a provider during negotiation
//! - `validate`: structural checks applied to every provider response

pub mod coin;
pub mod error;
pub mod market;
pub mod network;
pub mod status;
pub mod validate;
pub mod wire;

pub use coin::{Coin, CoinPair};
pub use error::{CoreError, Result, ShapeError};
pub use market::{Balance, FeePair, Market, MarketPrice, Provider, TradeType, BPS_DIVISOR};
pub use network::Network;
pub use status::TradeStatusMessage;

// Wire records
pub use wire::{
    CompleteTradeRequest, CompleteTradeResponse, MarketDescriptor, PreviewFee, PreviewPrice,
    PreviewTradeRequest, PreviewTradeResponse, ProposeTradeRequest, ProposeTradeResponse,
    ProviderErrorBody, SwapAccept, SwapComplete, SwapFail, TradeRequest, UnblindedInput,
    WireFeePair,
};
