//! Provider discovery and market fetching for the TDEX swap router.
//!
//! Resolves liquidity providers from the network registry, fetches their
//! markets and prices, and aggregates them into a `Discovery` snapshot.
//!
//! Per-provider and per-market failures are absorbed: an unreachable
//! provider contributes zero markets and a failed price fetch leaves the
//! market unpriced. Only an empty registry or an empty aggregate fails
//! the whole cycle.

pub mod book;
pub mod client;
pub mod discovery;
pub mod error;
pub mod market;
pub mod source;

pub use book::{DiscoveryService, Epoch, MarketBook};
pub use client::{
    parse_registry, RegistryClient, DEFAULT_LIQUID_REGISTRY_URL, DEFAULT_TESTNET_REGISTRY_URL,
    DEFAULT_TIMEOUT,
};
pub use discovery::{discover_markets, Discovery};
pub use error::{RegistryError, RegistryResult};
pub use market::{parse_markets, MarketFetcher};
pub use source::{MarketSource, ProviderSource, StaticProviders};
