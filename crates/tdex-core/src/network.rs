//! Liquid network identifiers.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Network a wallet is connected to.
///
/// Each network has its own provider registry, so discovery results
/// are never shared across networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Liquid mainnet.
    #[default]
    Liquid,
    /// Liquid testnet.
    Testnet,
}

impl Network {
    /// Wire name used by wallets and the registry.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Liquid => "liquid",
            Self::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "liquid" | "mainnet" => Ok(Self::Liquid),
            "testnet" => Ok(Self::Testnet),
            other => Err(CoreError::UnknownNetwork(other.to_string())),
        }
    }
}
