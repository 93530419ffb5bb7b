//! Latest-wins market book.
//!
//! Every refresh takes an `Epoch`. A result is only published if its epoch
//! is still current when it arrives; a network switch or a newer refresh
//! bumps the generation and makes any in-flight result stale.

use crate::discovery::{discover_markets, Discovery};
use crate::error::{RegistryError, RegistryResult};
use crate::source::{MarketSource, ProviderSource};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tdex_core::Network;
use tdex_telemetry::Metrics;
use tracing::{debug, warn};

/// Generation token handed out by `MarketBook::begin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Epoch(u64);

impl Epoch {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Holds the most recent discovery result.
#[derive(Debug, Default)]
pub struct MarketBook {
    generation: AtomicU64,
    current: RwLock<Option<Arc<Discovery>>>,
}

impl MarketBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation. Any earlier epoch becomes stale.
    pub fn begin(&self) -> Epoch {
        Epoch(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Invalidate in-flight refreshes and drop the published snapshot.
    ///
    /// Called on network switch.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.current.write() = None;
    }

    pub fn is_current(&self, epoch: Epoch) -> bool {
        self.generation.load(Ordering::SeqCst) == epoch.0
    }

    /// Publish `discovery` if `epoch` is still current.
    ///
    /// Returns the published snapshot, or `None` when the result was stale
    /// and discarded.
    pub fn publish(&self, epoch: Epoch, discovery: Discovery) -> Option<Arc<Discovery>> {
        let mut current = self.current.write();
        // Checked under the write lock so a concurrent invalidate cannot interleave.
        if !self.is_current(epoch) {
            return None;
        }
        let snapshot = Arc::new(discovery);
        *current = Some(Arc::clone(&snapshot));
        Some(snapshot)
    }

    /// Clear the snapshot if `epoch` is still current.
    pub fn clear_if_current(&self, epoch: Epoch) -> bool {
        let mut current = self.current.write();
        if !self.is_current(epoch) {
            return false;
        }
        *current = None;
        true
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Option<Arc<Discovery>> {
        self.current.read().clone()
    }
}

/// Runs discovery against a provider and market source and keeps the book
/// up to date.
pub struct DiscoveryService<P, M> {
    providers: P,
    markets: M,
    book: Arc<MarketBook>,
}

impl<P, M> DiscoveryService<P, M>
where
    P: ProviderSource,
    M: MarketSource,
{
    pub fn new(providers: P, markets: M) -> Self {
        Self {
            providers,
            markets,
            book: Arc::new(MarketBook::new()),
        }
    }

    pub fn book(&self) -> Arc<MarketBook> {
        Arc::clone(&self.book)
    }

    pub fn providers(&self) -> &P {
        &self.providers
    }

    pub fn markets(&self) -> &M {
        &self.markets
    }

    /// Run a discovery cycle for `network` and publish it.
    ///
    /// # Errors
    /// Any discovery error, or `Stale` when a newer refresh or an
    /// invalidation happened while this one was in flight. A failed cycle
    /// that is still current clears the book.
    pub async fn refresh(&self, network: Network) -> RegistryResult<Arc<Discovery>> {
        let epoch = self.book.begin();
        debug!(%network, epoch = epoch.value(), "Discovery started");

        match discover_markets(&self.providers, &self.markets, network).await {
            Ok(discovery) => match self.book.publish(epoch, discovery) {
                Some(snapshot) => Ok(snapshot),
                None => {
                    debug!(%network, epoch = epoch.value(), "Discarding stale discovery");
                    Metrics::discovery_stale();
                    Err(RegistryError::Stale)
                }
            },
            Err(e) => {
                if self.book.clear_if_current(epoch) {
                    warn!(%network, error = %e, "Discovery failed");
                    Err(e)
                } else {
                    Metrics::discovery_stale();
                    Err(RegistryError::Stale)
                }
            }
        }
    }
}
