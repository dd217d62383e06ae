//! Feature flags per network
//!
//! Availability of a capability is a pure lookup in a declarative
//! (chain -> feature set) table. Nothing is cached and nothing is mutated
//! during resolution; overrides are applied once when the table is built.

use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use crate::chain::ChainId;

// ============================================
// FEATURES
// ============================================

/// Named capability that may or may not exist on a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Amm,
    LiquidityMining,
    Bentobox,
    Kashi,
    Migrate,
    Analytics,
    Staking,
    Meowshi,
    Inari,
    Vesting,
    LimitOrders,
    Miso,
    Trident,
}

impl Feature {
    pub const ALL: [Feature; 13] = [
        Feature::Amm,
        Feature::LiquidityMining,
        Feature::Bentobox,
        Feature::Kashi,
        Feature::Migrate,
        Feature::Analytics,
        Feature::Staking,
        Feature::Meowshi,
        Feature::Inari,
        Feature::Vesting,
        Feature::LimitOrders,
        Feature::Miso,
        Feature::Trident,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Amm => "amm",
            Feature::LiquidityMining => "liquidity_mining",
            Feature::Bentobox => "bentobox",
            Feature::Kashi => "kashi",
            Feature::Migrate => "migrate",
            Feature::Analytics => "analytics",
            Feature::Staking => "staking",
            Feature::Meowshi => "meowshi",
            Feature::Inari => "inari",
            Feature::Vesting => "vesting",
            Feature::LimitOrders => "limit_orders",
            Feature::Miso => "miso",
            Feature::Trident => "trident",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Feature {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Feature::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == normalized)
            .ok_or_else(|| eyre!("Unknown feature: {}", s))
    }
}

// ============================================
// FEATURE TABLE
// ============================================

/// Declarative mapping from network to the features it supports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureTable {
    chains: BTreeMap<ChainId, BTreeSet<Feature>>,
}

impl FeatureTable {
    /// Table with no features anywhere
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in availability of every feature on the known networks
    pub fn builtin() -> Self {
        use Feature::*;

        Self::empty()
            .with(
                ChainId::ETHEREUM,
                &[
                    Amm, Migrate, LiquidityMining, Bentobox, Kashi, Analytics, Staking,
                    Meowshi, Inari, Vesting, LimitOrders, Miso,
                ],
            )
            .with(ChainId::KOVAN, &[Amm, LiquidityMining, Bentobox, Kashi, Miso, Trident])
            .with(
                ChainId::POLYGON,
                &[Amm, LiquidityMining, Bentobox, Kashi, Analytics, LimitOrders, Trident, Miso],
            )
            .with(ChainId::ARBITRUM, &[Amm, LiquidityMining, Bentobox, Kashi, Analytics, Miso])
            .with(ChainId::HARMONY, &[Amm, LiquidityMining, Bentobox, Kashi, Analytics, Miso])
            .with(ChainId::NERVOS, &[Amm])
            .with(ChainId::NERVOS_TESTNET, &[Amm])
    }

    /// Replace the feature set of a chain
    pub fn with(mut self, chain_id: ChainId, features: &[Feature]) -> Self {
        self.chains.insert(chain_id, features.iter().copied().collect());
        self
    }

    pub fn enable(&mut self, feature: Feature, chain_id: ChainId) {
        self.chains.entry(chain_id).or_default().insert(feature);
    }

    pub fn disable(&mut self, feature: Feature, chain_id: ChainId) {
        if let Some(set) = self.chains.get_mut(&chain_id) {
            set.remove(&feature);
        }
    }

    /// Resolve a flag. An absent chain never has any feature.
    pub fn is_enabled(&self, feature: Feature, chain_id: Option<ChainId>) -> bool {
        match chain_id {
            Some(chain_id) => self
                .chains
                .get(&chain_id)
                .map(|set| set.contains(&feature))
                .unwrap_or(false),
            None => false,
        }
    }

    /// Features available on a chain, in declaration order
    pub fn features_on(&self, chain_id: ChainId) -> Vec<Feature> {
        self.chains
            .get(&chain_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Chains that have an entry in the table
    pub fn chains(&self) -> Vec<ChainId> {
        self.chains.keys().copied().collect()
    }

    /// Apply `feature@chain` overrides. Enables are applied before disables.
    pub fn apply_overrides(&mut self, enabled: &[String], disabled: &[String]) -> Result<()> {
        for entry in enabled {
            let (feature, chain_id) = parse_override(entry)?;
            self.enable(feature, chain_id);
        }
        for entry in disabled {
            let (feature, chain_id) = parse_override(entry)?;
            self.disable(feature, chain_id);
        }
        Ok(())
    }
}

/// Parse a `feature@chain` override such as `kashi@137`
pub fn parse_override(entry: &str) -> Result<(Feature, ChainId)> {
    let (feature, chain) = entry
        .split_once('@')
        .ok_or_else(|| eyre!("Feature override '{}' must look like feature@chain", entry))?;
    let feature: Feature = feature.parse()?;
    let chain_id: ChainId = chain
        .parse()
        .map_err(|e| eyre!("Invalid chain in override '{}': {}", entry, e))?;
    Ok((feature, chain_id))
}

lazy_static::lazy_static! {
    static ref BUILTIN_FEATURES: FeatureTable = FeatureTable::builtin();
}

/// Resolve a flag against the built-in table
pub fn feature_enabled(feature: Feature, chain_id: Option<ChainId>) -> bool {
    BUILTIN_FEATURES.is_enabled(feature, chain_id)
}

// ============================================
// OPENMEV
// ============================================

/// OpenMEV private relay is switched on globally
pub const OPENMEV_ENABLED: bool = true;

/// Networks the relay accepts transactions for
pub const OPENMEV_SUPPORTED_NETWORKS: [ChainId; 1] = [ChainId::ETHEREUM];

/// Relay URI for a chain, if the relay covers it
pub fn openmev_uri(chain_id: ChainId) -> Option<&'static str> {
    match chain_id {
        ChainId::ETHEREUM => Some("https://api.sushirelay.com/v1"),
        _ => None,
    }
}

/// Whether transactions on this chain should be routed through OpenMEV
pub fn openmev_available(chain_id: Option<ChainId>) -> bool {
    match chain_id {
        Some(chain_id) => OPENMEV_ENABLED && OPENMEV_SUPPORTED_NETWORKS.contains(&chain_id),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_chain_disables_everything() {
        let table = FeatureTable::builtin();
        for feature in Feature::ALL {
            assert!(!table.is_enabled(feature, None));
            assert!(!feature_enabled(feature, None));
        }
    }

    #[test]
    fn test_builtin_lookups() {
        assert!(feature_enabled(Feature::Kashi, Some(ChainId::ETHEREUM)));
        assert!(!feature_enabled(Feature::Trident, Some(ChainId::ETHEREUM)));
        assert!(feature_enabled(Feature::Trident, Some(ChainId::POLYGON)));
        assert!(!feature_enabled(Feature::Kashi, Some(ChainId::from(999))));
    }

    #[test]
    fn test_parse_feature() {
        assert_eq!("limit-orders".parse::<Feature>().unwrap(), Feature::LimitOrders);
        assert_eq!("BENTOBOX".parse::<Feature>().unwrap(), Feature::Bentobox);
        assert!("warp_drive".parse::<Feature>().is_err());
    }

    #[test]
    fn test_overrides() {
        let mut table = FeatureTable::builtin();
        table
            .apply_overrides(
                &["trident@1".to_string()],
                &["kashi@1".to_string(), "miso@137".to_string()],
            )
            .unwrap();

        assert!(table.is_enabled(Feature::Trident, Some(ChainId::ETHEREUM)));
        assert!(!table.is_enabled(Feature::Kashi, Some(ChainId::ETHEREUM)));
        assert!(!table.is_enabled(Feature::Miso, Some(ChainId::POLYGON)));

        assert!(table.apply_overrides(&["kashi".to_string()], &[]).is_err());
        assert!(table.apply_overrides(&["kashi@eth".to_string()], &[]).is_err());
    }

    #[test]
    fn test_openmev() {
        assert!(openmev_available(Some(ChainId::ETHEREUM)));
        assert!(!openmev_available(Some(ChainId::POLYGON)));
        assert!(!openmev_available(None));
        assert_eq!(openmev_uri(ChainId::ETHEREUM), Some("https://api.sushirelay.com/v1"));
    }
}
