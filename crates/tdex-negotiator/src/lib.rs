//! Trade negotiation with a TDEX provider.
//!
//! A swap takes three sequential calls against the selected market's
//! provider:
//! 1. Preview: price a fixed amount of one side of the pair
//! 2. Propose: send a signed swap request built from the preview
//! 3. Complete: countersign the provider's accepted transaction
//!
//! The wallet and the user-facing notifier are collaborators behind traits.
//! Blinded transaction material is passed through verbatim.

pub mod client;
pub mod error;
pub mod negotiation;
pub mod notifier;
pub mod preview;
pub mod wallet;

pub use client::{
    DynTransport, HttpTransport, MockTransport, TradeTransport, TransportError, COMPLETE_PATH,
    DEFAULT_TIMEOUT, PREVIEW_PATH, PROPOSE_PATH,
};
pub use error::{NegotiationError, NegotiationResult, AMOUNT_TOO_LARGE_CODE};
pub use negotiation::{Negotiation, NegotiationState, Quote, TradeDraft, TradeStatus};
pub use notifier::{DynNotifier, LogNotifier, Notifier, RecordingNotifier};
pub use preview::trade_preview;
pub use wallet::{DynWallet, MockWallet, Wallet, WalletError};
