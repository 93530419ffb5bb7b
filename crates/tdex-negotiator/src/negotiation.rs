//! Preview, propose and complete against one provider market.
//!
//! ```text
//! Idle -> Previewed -> Proposed -> Completed
//!              \            \
//!               +-> Failed   +-> Failed
//! ```
//!
//! Calls out of order fail with `InvalidState` and leave the state as is.
//! A preview may be refreshed any number of times before proposing.

use crate::client::{DynTransport, TransportError, COMPLETE_PATH, PROPOSE_PATH};
use crate::error::{NegotiationError, NegotiationResult};
use crate::notifier::DynNotifier;
use crate::preview::trade_preview;
use crate::wallet::DynWallet;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tdex_core::validate::{validate_complete_response, validate_propose_response};
use tdex_core::{
    Coin, CoinPair, CompleteTradeRequest, Market, Network, PreviewTradeResponse,
    ProposeTradeRequest, SwapAccept, SwapComplete, TradeRequest, TradeStatusMessage, TradeType,
    UnblindedInput,
};
use tdex_router::get_trade_type;
use tdex_telemetry::Metrics;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Transaction the user's wallet prepared for the swap, before blinding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeDraft {
    pub transaction: String,
    pub unblinded_inputs: Vec<UnblindedInput>,
}

/// A preview together with the request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// Amount the user fixed.
    pub amount: Decimal,
    /// Asset the user fixed the amount of.
    pub asset: String,
    pub preview: PreviewTradeResponse,
}

impl Quote {
    /// `(amount_p, asset_p, amount_r, asset_r)`: what the user pays and
    /// what the user receives.
    fn legs(&self, pair: &CoinPair) -> (String, String, String, String) {
        let fixed = (self.amount.to_string(), self.asset.clone());
        let counter = (self.preview.amount.clone(), self.preview.asset.clone());
        if self.asset == pair.from.asset_hash {
            (fixed.0, fixed.1, counter.0, counter.1)
        } else {
            (counter.0, counter.1, fixed.0, fixed.1)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NegotiationState {
    Idle,
    Previewed(Quote),
    Proposed {
        quote: Quote,
        accept: SwapAccept,
        /// `None` when the provider sent a non-numeric expiry.
        expires_at: Option<DateTime<Utc>>,
    },
    Completed {
        txid: String,
    },
    Failed {
        code: Option<i64>,
        message: String,
    },
}

impl NegotiationState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Previewed(_) => "previewed",
            Self::Proposed { .. } => "proposed",
            Self::Completed { .. } => "completed",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Trade progress shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeStatus {
    Proposing,
    Confirm,
    Completed,
    Error,
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Proposing => write!(f, "PROPOSING"),
            Self::Confirm => write!(f, "CONFIRM"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// One swap attempt against `market`.
pub struct Negotiation {
    market: Market,
    pair: CoinPair,
    trade_type: TradeType,
    /// Network the market was discovered on.
    network: Network,
    transport: DynTransport,
    wallet: DynWallet,
    notifier: DynNotifier,
    state: NegotiationState,
}

impl Negotiation {
    pub fn new(
        market: Market,
        pair: CoinPair,
        network: Network,
        transport: DynTransport,
        wallet: DynWallet,
        notifier: DynNotifier,
    ) -> Self {
        let trade_type = get_trade_type(&market, &pair);
        Self {
            market,
            pair,
            trade_type,
            network,
            transport,
            wallet,
            notifier,
            state: NegotiationState::Idle,
        }
    }

    pub fn state(&self) -> &NegotiationState {
        &self.state
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn trade_type(&self) -> TradeType {
        self.trade_type
    }

    /// Display status; `None` before the first preview.
    pub fn status(&self) -> Option<TradeStatus> {
        match self.state {
            NegotiationState::Idle => None,
            NegotiationState::Previewed(_) => Some(TradeStatus::Proposing),
            NegotiationState::Proposed { .. } => Some(TradeStatus::Confirm),
            NegotiationState::Completed { .. } => Some(TradeStatus::Completed),
            NegotiationState::Failed { .. } => Some(TradeStatus::Error),
        }
    }

    fn invalid(&self, action: &'static str) -> NegotiationError {
        NegotiationError::InvalidState {
            action,
            state: self.state.name(),
        }
    }

    /// Move to failed and show the user the provider's message, or the
    /// generic status when there is none.
    fn fail(&mut self, stage: &'static str, error: NegotiationError) -> NegotiationError {
        warn!(market = %self.market, stage, error = %error, "Negotiation failed");
        Metrics::negotiation(stage, "failed");
        let message = error.user_message();
        self.notifier.notify(&message);
        self.state = NegotiationState::Failed {
            code: error.code(),
            message,
        };
        error
    }

    /// Price `amount` of `coin`, one side of the pair.
    ///
    /// Allowed while idle or previewed. A failed preview leaves the state
    /// unchanged so the user can retry with another amount.
    pub async fn preview(
        &mut self,
        amount: Decimal,
        coin: &Coin,
    ) -> NegotiationResult<&PreviewTradeResponse> {
        if !matches!(
            self.state,
            NegotiationState::Idle | NegotiationState::Previewed(_)
        ) {
            return Err(self.invalid("preview"));
        }

        let preview = trade_preview(
            self.transport.as_ref(),
            self.notifier.as_ref(),
            amount,
            coin,
            &self.market,
            &self.pair,
        )
        .await?;

        self.state = NegotiationState::Previewed(Quote {
            amount,
            asset: coin.asset_hash.clone(),
            preview,
        });
        match &self.state {
            NegotiationState::Previewed(quote) => Ok(&quote.preview),
            _ => Err(self.invalid("preview")),
        }
    }

    /// Send a swap request for the current preview.
    ///
    /// # Errors
    /// - `NetworkMismatch` when the wallet left the discovery network; the
    ///   preview is kept
    /// - `Signing`, `NegotiationFailed`, `ProviderUnreachable`, `Malformed`
    ///   move the negotiation to failed
    pub async fn propose(&mut self, draft: TradeDraft) -> NegotiationResult<&SwapAccept> {
        let NegotiationState::Previewed(quote) = &self.state else {
            return Err(self.invalid("propose"));
        };
        let quote = quote.clone();

        let wallet_network = self.wallet.current_network();
        if wallet_network != self.network {
            return Err(NegotiationError::NetworkMismatch {
                expected: self.network,
                wallet: wallet_network,
            });
        }

        let transaction = match self
            .wallet
            .blind_and_sign(&draft.transaction, &draft.unblinded_inputs)
            .await
        {
            Ok(tx) => tx,
            Err(e) => return Err(self.fail("propose", NegotiationError::Signing(e.0))),
        };

        let (amount_p, asset_p, amount_r, asset_r) = quote.legs(&self.pair);
        let request = ProposeTradeRequest {
            fee_amount: quote.preview.fee_amount.clone(),
            fee_asset: quote.preview.fee_asset.clone(),
            market: self.market.descriptor(),
            swap_request: TradeRequest {
                id: Uuid::new_v4().to_string(),
                amount_p,
                asset_p,
                amount_r,
                asset_r,
                transaction,
                unblinded_inputs: draft.unblinded_inputs,
            },
            trade_type: self.trade_type,
        };
        debug!(market = %self.market, request_id = %request.swap_request.id, "Proposing trade");

        let body = match self.post("propose", PROPOSE_PATH, &request).await {
            Ok(body) => body,
            Err(e) => return Err(self.fail("propose", e)),
        };
        let response = match validate_propose_response(&body) {
            Ok(response) => response,
            Err(e) => return Err(self.fail("propose", e.into())),
        };

        let expires_at = response.expiry();
        match (response.swap_fail, response.swap_accept) {
            (Some(fail), _) => Err(self.fail(
                "propose",
                NegotiationError::NegotiationFailed {
                    code: fail.failure_code,
                    message: fail.failure_message,
                },
            )),
            (None, Some(accept)) => {
                info!(
                    market = %self.market,
                    accept_id = %accept.id,
                    expiry = %response.expiry_time_unix,
                    "Trade accepted"
                );
                Metrics::negotiation("propose", "ok");
                self.state = NegotiationState::Proposed {
                    quote,
                    accept,
                    expires_at,
                };
                match &self.state {
                    NegotiationState::Proposed { accept, .. } => Ok(accept),
                    _ => Err(self.invalid("propose")),
                }
            }
            (None, None) => Err(self.fail(
                "propose",
                NegotiationError::NegotiationFailed {
                    code: 0,
                    message: TradeStatusMessage::SwapNotAccepted.to_string(),
                },
            )),
        }
    }

    /// Countersign the accepted swap and ask the provider to broadcast it.
    ///
    /// Returns the transaction id.
    pub async fn complete(&mut self) -> NegotiationResult<String> {
        let NegotiationState::Proposed {
            accept, expires_at, ..
        } = &self.state
        else {
            return Err(self.invalid("complete"));
        };
        let accept = accept.clone();
        let expires_at = *expires_at;

        if expires_at.is_some_and(|deadline| Utc::now() >= deadline) {
            return Err(self.fail("complete", NegotiationError::Expired));
        }

        let transaction = match self
            .wallet
            .blind_and_sign(&accept.transaction, &accept.unblinded_inputs)
            .await
        {
            Ok(tx) => tx,
            Err(e) => return Err(self.fail("complete", NegotiationError::Signing(e.0))),
        };

        let request = CompleteTradeRequest {
            swap_complete: SwapComplete {
                accept_id: accept.id.clone(),
                transaction,
            },
        };

        let body = match self.post("complete", COMPLETE_PATH, &request).await {
            Ok(body) => body,
            Err(e) => return Err(self.fail("complete", e)),
        };
        let response = match validate_complete_response(&body) {
            Ok(response) => response,
            Err(e) => return Err(self.fail("complete", e.into())),
        };

        match (response.txid, response.swap_fail) {
            (Some(txid), _) => {
                info!(market = %self.market, %txid, "Trade completed");
                Metrics::negotiation("complete", "ok");
                self.state = NegotiationState::Completed { txid: txid.clone() };
                Ok(txid)
            }
            (None, Some(fail)) => Err(self.fail(
                "complete",
                NegotiationError::NegotiationFailed {
                    code: fail.failure_code,
                    message: fail.failure_message,
                },
            )),
            // Ruled out by validation.
            (None, None) => Err(self.fail(
                "complete",
                NegotiationError::NegotiationFailed {
                    code: 0,
                    message: TradeStatusMessage::ErrorCompleting.to_string(),
                },
            )),
        }
    }

    /// POST `request` to the market's provider. Provider error bodies keep
    /// their code and message.
    async fn post<T: Serialize>(
        &self,
        stage: &'static str,
        path: &'static str,
        request: &T,
    ) -> NegotiationResult<Value> {
        let body = serde_json::to_value(request)
            .map_err(|e| NegotiationError::HttpClient(format!("Failed to encode {stage}: {e}")))?;

        match self.transport.post(&self.market.provider, path, body).await {
            Ok(body) => Ok(body),
            Err(TransportError::Rejected(error)) => Err(NegotiationError::NegotiationFailed {
                code: error.code,
                message: error.message,
            }),
            Err(TransportError::Unreachable(reason)) => Err(NegotiationError::ProviderUnreachable {
                endpoint: self.market.provider.endpoint.clone(),
                reason,
            }),
        }
    }
}
