//! Negotiation error types.

use tdex_core::{Network, ShapeError, TradeStatusMessage};
use thiserror::Error;

/// Provider error code for a trade larger than the market can fill.
pub const AMOUNT_TOO_LARGE_CODE: i64 = 2;

#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("Amount too large")]
    AmountTooLarge,

    #[error("Preview not available")]
    PreviewUnavailable,

    #[error("Negotiation failed ({code}): {message}")]
    NegotiationFailed { code: i64, message: String },

    #[error("Malformed provider response: {0}")]
    Malformed(#[from] ShapeError),

    #[error("Provider {endpoint} unreachable: {reason}")]
    ProviderUnreachable { endpoint: String, reason: String },

    #[error("Error signing: {0}")]
    Signing(String),

    #[error("Wallet is on {wallet}, trade is on {expected}")]
    NetworkMismatch { expected: Network, wallet: Network },

    #[error("TDEX swap expired")]
    Expired,

    #[error("Cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl NegotiationError {
    /// Provider error code, when the provider sent one.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::AmountTooLarge => Some(AMOUNT_TOO_LARGE_CODE),
            Self::NegotiationFailed { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Generic status for this error.
    pub fn status(&self) -> TradeStatusMessage {
        match self {
            Self::AmountTooLarge => TradeStatusMessage::AmountTooLarge,
            Self::PreviewUnavailable => TradeStatusMessage::ErrorPreview,
            Self::NegotiationFailed { .. } => TradeStatusMessage::SwapNotAccepted,
            Self::Signing(_) => TradeStatusMessage::ErrorSigning,
            Self::NetworkMismatch { .. } => TradeStatusMessage::ConnectWallet,
            Self::Expired => TradeStatusMessage::SwapExpired,
            Self::Malformed(_)
            | Self::ProviderUnreachable { .. }
            | Self::InvalidState { .. }
            | Self::HttpClient(_) => TradeStatusMessage::ErrorCompleting,
        }
    }

    /// Text to show the user: the provider's own message when it sent
    /// one, otherwise the generic status.
    pub fn user_message(&self) -> String {
        match self {
            Self::NegotiationFailed { message, .. } if !message.trim().is_empty() => {
                message.clone()
            }
            _ => self.status().to_string(),
        }
    }
}

pub type NegotiationResult<T> = Result<T, NegotiationError>;
