//! Kashi price oracle descriptors

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::chain::ChainId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OracleKind {
    Chainlink,
    /// https://www.diadata.org/
    Dia,
    Unknown,
}

impl OracleKind {
    pub fn name(&self) -> &'static str {
        match self {
            OracleKind::Chainlink => "Chainlink",
            OracleKind::Dia => "DIA",
            OracleKind::Unknown => "Unknown",
        }
    }
}

/// Oracle a Kashi pair was deployed with, `data` being its raw init data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Oracle {
    pub chain_id: ChainId,
    pub address: Address,
    pub kind: OracleKind,
    pub data: String,
}

impl Oracle {
    pub fn new(
        chain_id: ChainId,
        address: Address,
        kind: OracleKind,
        data: impl Into<String>,
    ) -> Self {
        Self { chain_id, address, kind, data: data.into() }
    }

    pub fn chainlink(chain_id: ChainId, address: Address, data: impl Into<String>) -> Self {
        Self::new(chain_id, address, OracleKind::Chainlink, data)
    }

    pub fn dia(chain_id: ChainId, address: Address, data: impl Into<String>) -> Self {
        Self::new(chain_id, address, OracleKind::Dia, data)
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}
