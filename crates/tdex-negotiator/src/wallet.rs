//! Wallet collaborator.
//!
//! The wallet owns keys and blinding. Negotiation hands it transactions to
//! blind and sign and never inspects the result.

use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use std::sync::Arc;
use tdex_core::{Network, UnblindedInput};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct WalletError(pub String);

/// Signing wallet.
pub trait Wallet: Send + Sync {
    /// Network the wallet is connected to.
    fn current_network(&self) -> Network;

    /// Blind and sign `transaction` given the openings of its confidential
    /// inputs. Returns the signed transaction, encoded as received.
    fn blind_and_sign<'a>(
        &'a self,
        transaction: &'a str,
        unblinded_inputs: &'a [UnblindedInput],
    ) -> BoxFuture<'a, Result<String, WalletError>>;
}

/// Arc wrapper for Wallet trait objects.
pub type DynWallet = Arc<dyn Wallet>;

/// Mock wallet for testing.
///
/// Signs by prefixing `signed:` to the transaction unless a failure is set.
#[derive(Debug)]
pub struct MockWallet {
    network: Mutex<Network>,
    failure: Mutex<Option<String>>,
    signed: Mutex<Vec<(String, usize)>>,
}

impl MockWallet {
    pub fn new(network: Network) -> Self {
        Self {
            network: Mutex::new(network),
            failure: Mutex::new(None),
            signed: Mutex::new(Vec::new()),
        }
    }

    pub fn set_network(&self, network: Network) {
        *self.network.lock() = network;
    }

    /// Make every following signature fail with `reason`.
    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.failure.lock() = Some(reason.into());
    }

    /// Transactions signed so far, with the number of inputs passed.
    pub fn get_signed(&self) -> Vec<(String, usize)> {
        self.signed.lock().clone()
    }
}

impl Wallet for MockWallet {
    fn current_network(&self) -> Network {
        *self.network.lock()
    }

    fn blind_and_sign<'a>(
        &'a self,
        transaction: &'a str,
        unblinded_inputs: &'a [UnblindedInput],
    ) -> BoxFuture<'a, Result<String, WalletError>> {
        Box::pin(async move {
            if let Some(reason) = self.failure.lock().clone() {
                return Err(WalletError(reason));
            }
            self.signed
                .lock()
                .push((transaction.to_string(), unblinded_inputs.len()));
            Ok(format!("signed:{transaction}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_wallet_signs_and_records() {
        let wallet = MockWallet::new(Network::Testnet);
        let signed = wallet.blind_and_sign("cHNldP8B", &[]).await.unwrap();
        assert_eq!(signed, "signed:cHNldP8B");
        assert_eq!(wallet.get_signed(), vec![("cHNldP8B".to_string(), 0)]);
    }

    #[tokio::test]
    async fn test_mock_wallet_failure() {
        let wallet = MockWallet::new(Network::Liquid);
        wallet.fail_with("user rejected");
        let err = wallet.blind_and_sign("tx", &[]).await.unwrap_err();
        assert_eq!(err, WalletError("user rejected".to_string()));
        assert!(wallet.get_signed().is_empty());
    }
}
