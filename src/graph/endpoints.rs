//! Subgraph endpoint resolution
//!
//! Endpoint = `{host}/subgraphs/name/{subgraph}`, both looked up by chain.
//! A chain without a host or without the subgraph has no endpoint.

use std::collections::HashMap;

use crate::chain::ChainId;

/// Indexed service a query is sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// BentoBox vault, strategies, clones and Kashi pairs
    BentoBox,
    Blocks,
    Miso,
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Service::BentoBox => write!(f, "bentobox"),
            Service::Blocks => write!(f, "blocks"),
            Service::Miso => write!(f, "miso"),
        }
    }
}

lazy_static::lazy_static! {
    static ref GRAPH_HOST: HashMap<ChainId, &'static str> = {
        let mut m = HashMap::new();
        m.insert(ChainId::ETHEREUM, "https://api.thegraph.com");
        m.insert(ChainId::KOVAN, "https://api.thegraph.com");
        m.insert(ChainId::POLYGON, "https://api.thegraph.com");
        m.insert(ChainId::ARBITRUM, "https://api.thegraph.com");
        m.insert(ChainId::HARMONY, "https://sushi.graph.t.hmny.io");
        m
    };

    static ref BENTOBOX: HashMap<ChainId, &'static str> = {
        let mut m = HashMap::new();
        m.insert(ChainId::ETHEREUM, "sushiswap/bentobox");
        m.insert(ChainId::KOVAN, "sushiswap/kovan-bentobox");
        m.insert(ChainId::POLYGON, "sushiswap/matic-bentobox");
        m.insert(ChainId::ARBITRUM, "sushiswap/arbitrum-bentobox");
        m.insert(ChainId::HARMONY, "sushiswap/harmony-bentobox");
        m
    };

    static ref BLOCKS: HashMap<ChainId, &'static str> = {
        let mut m = HashMap::new();
        m.insert(ChainId::ETHEREUM, "blocklytics/ethereum-blocks");
        m.insert(ChainId::KOVAN, "blocklytics/kovan-blocks");
        m.insert(ChainId::POLYGON, "matthewlilley/polygon-blocks");
        m.insert(ChainId::ARBITRUM, "sushiswap/arbitrum-blocks");
        m.insert(ChainId::HARMONY, "sushiswap/harmony-blocks");
        m
    };

    static ref MISO: HashMap<ChainId, &'static str> = {
        let mut m = HashMap::new();
        m.insert(ChainId::KOVAN, "sushiswap/kovan-miso");
        m.insert(ChainId::HARMONY, "sushiswap/miso");
        m
    };
}

/// Static endpoint table with an optional host override for every chain
#[derive(Debug, Clone, Default)]
pub struct Endpoints {
    host_override: Option<String>,
}

impl Endpoints {
    pub fn new(host_override: Option<String>) -> Self {
        Self {
            host_override: host_override.map(|h| h.trim_end_matches('/').to_string()),
        }
    }

    pub fn host(&self, chain_id: ChainId) -> Option<String> {
        match &self.host_override {
            Some(host) => Some(host.clone()),
            None => GRAPH_HOST.get(&chain_id).map(|h| h.to_string()),
        }
    }

    pub fn subgraph(service: Service, chain_id: ChainId) -> Option<&'static str> {
        let table = match service {
            Service::BentoBox => &*BENTOBOX,
            Service::Blocks => &*BLOCKS,
            Service::Miso => &*MISO,
        };
        table.get(&chain_id).copied()
    }

    pub fn resolve(&self, service: Service, chain_id: ChainId) -> Option<String> {
        let host = self.host(chain_id)?;
        let name = Self::subgraph(service, chain_id)?;
        Some(format!("{}/subgraphs/name/{}", host, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        let endpoints = Endpoints::default();
        assert_eq!(
            endpoints.resolve(Service::Miso, ChainId::HARMONY).as_deref(),
            Some("https://sushi.graph.t.hmny.io/subgraphs/name/sushiswap/miso")
        );
        assert_eq!(
            endpoints.resolve(Service::Blocks, ChainId::ETHEREUM).as_deref(),
            Some("https://api.thegraph.com/subgraphs/name/blocklytics/ethereum-blocks")
        );
    }

    #[test]
    fn test_missing_subgraph_or_host() {
        let endpoints = Endpoints::default();
        assert!(endpoints.resolve(Service::Miso, ChainId::ETHEREUM).is_none());
        assert!(endpoints.resolve(Service::BentoBox, ChainId::NERVOS_TESTNET).is_none());
    }

    #[test]
    fn test_host_override() {
        let endpoints = Endpoints::new(Some("http://localhost:8000/".to_string()));
        assert_eq!(
            endpoints.resolve(Service::BentoBox, ChainId::POLYGON).as_deref(),
            Some("http://localhost:8000/subgraphs/name/sushiswap/matic-bentobox")
        );
        // Override does not invent subgraphs
        assert!(endpoints.resolve(Service::Miso, ChainId::POLYGON).is_none());
    }
}
