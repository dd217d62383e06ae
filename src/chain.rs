//! Chain identifiers for the networks the front end knows about.
//!
//! A wallet can report any numeric chain id, so `ChainId` is an open newtype
//! rather than a closed enum. Unknown ids simply have no features, tokens or
//! subgraphs attached to them.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Numeric identifier of a connected network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
    pub const ETHEREUM: ChainId = ChainId(1);
    pub const KOVAN: ChainId = ChainId(42);
    pub const POLYGON: ChainId = ChainId(137);
    pub const ARBITRUM: ChainId = ChainId(42161);
    pub const HARMONY: ChainId = ChainId(1666600000);
    /// Godwoken mainnet
    pub const NERVOS: ChainId = ChainId(71402);
    /// Godwoken testnet
    pub const NERVOS_TESTNET: ChainId = ChainId(71393);

    /// Every network with a known configuration, in display order
    pub const KNOWN: [ChainId; 7] = [
        ChainId::ETHEREUM,
        ChainId::KOVAN,
        ChainId::POLYGON,
        ChainId::ARBITRUM,
        ChainId::HARMONY,
        ChainId::NERVOS,
        ChainId::NERVOS_TESTNET,
    ];

    pub fn id(&self) -> u64 {
        self.0
    }

    /// Human readable network name
    pub fn name(&self) -> &'static str {
        match *self {
            ChainId::ETHEREUM => "Ethereum",
            ChainId::KOVAN => "Kovan",
            ChainId::POLYGON => "Polygon",
            ChainId::ARBITRUM => "Arbitrum",
            ChainId::HARMONY => "Harmony",
            ChainId::NERVOS => "Nervos",
            ChainId::NERVOS_TESTNET => "Nervos Testnet",
            _ => "Unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        Self::KNOWN.contains(self)
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        ChainId(id)
    }
}

impl FromStr for ChainId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(ChainId)
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let chain: ChainId = " 137 ".parse().unwrap();
        assert_eq!(chain, ChainId::POLYGON);
        assert_eq!(chain.to_string(), "137");
        assert_eq!(chain.name(), "Polygon");
    }

    #[test]
    fn test_unknown_chain() {
        let chain = ChainId::from(999);
        assert!(!chain.is_known());
        assert_eq!(chain.name(), "Unknown");
    }
}
