//! User-facing trade status messages.

use std::fmt;

/// Messages shown to the user when a trade cannot proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeStatusMessage {
    AmountTooLarge,
    ConnectWallet,
    EnterAmount,
    ErrorCompleting,
    ErrorPreview,
    ErrorSigning,
    InvalidPair,
    NoBalance,
    NoMarkets,
    NoProviders,
    SwapExpired,
    SwapNotAccepted,
    Trade,
}

impl TradeStatusMessage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AmountTooLarge => "Amount too large",
            Self::ConnectWallet => "Connect wallet",
            Self::EnterAmount => "Enter an amount",
            Self::ErrorCompleting => "Error completing trade",
            Self::ErrorPreview => "Preview not available",
            Self::ErrorSigning => "Error signing",
            Self::InvalidPair => "Pair not supported",
            Self::NoBalance => "Not enough liquidity",
            Self::NoMarkets => "No TDEX market found",
            Self::NoProviders => "No TDEX provider found",
            Self::SwapExpired => "TDEX swap expired",
            Self::SwapNotAccepted => "TDEX swap not accepted",
            Self::Trade => "Trade",
        }
    }
}

impl fmt::Display for TradeStatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
