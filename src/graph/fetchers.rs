//! Resource fetchers
//!
//! Each resource is one query against one subgraph plus whatever shaping the
//! views expect from the raw response.

use alloy_primitives::U256;
use chrono::{DateTime, Duration as ChronoDuration, DurationRound, Utc};
use eyre::{eyre, Result};
use serde_json::{json, Value};
use std::str::FromStr;
use tracing::debug;

use super::client::SubgraphClient;
use super::endpoints::Service;
use super::queries::*;
use crate::chain::ChainId;

// ============================================
// RESOURCES
// ============================================

/// Everything the front end reads from subgraphs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Clones,
    KashiPairs,
    BentoBox,
    BentoStrategies,
    BentoTokens,
    BentoUserTokens,
    Block,
    MassBlocks,
    AverageBlockTime,
    MisoCommitments,
}

impl Resource {
    pub const ALL: [Resource; 10] = [
        Resource::Clones,
        Resource::KashiPairs,
        Resource::BentoBox,
        Resource::BentoStrategies,
        Resource::BentoTokens,
        Resource::BentoUserTokens,
        Resource::Block,
        Resource::MassBlocks,
        Resource::AverageBlockTime,
        Resource::MisoCommitments,
    ];

    /// Literal that leads the cache key
    pub fn name(&self) -> &'static str {
        match self {
            Resource::Clones => "clones",
            Resource::KashiPairs => "kashiPairs",
            Resource::BentoBox => "bentoBox",
            Resource::BentoStrategies => "bentoStrategies",
            Resource::BentoTokens => "bentoTokens",
            Resource::BentoUserTokens => "bentoUserTokens",
            Resource::Block => "block",
            Resource::MassBlocks => "massBlocks",
            Resource::AverageBlockTime => "averageBlockTime",
            Resource::MisoCommitments => "misoCommitments",
        }
    }

    pub fn service(&self) -> Service {
        match self {
            Resource::Block | Resource::MassBlocks | Resource::AverageBlockTime => Service::Blocks,
            Resource::MisoCommitments => Service::Miso,
            _ => Service::BentoBox,
        }
    }

    /// Chain assumed when the caller does not pass one
    pub fn default_chain(&self) -> Option<ChainId> {
        match self {
            Resource::KashiPairs
            | Resource::BentoBox
            | Resource::BentoStrategies
            | Resource::Block
            | Resource::AverageBlockTime
            | Resource::MisoCommitments => Some(ChainId::ETHEREUM),
            _ => None,
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Resource {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        let wanted: String = s.chars().filter(|c| *c != '-' && *c != '_').collect();
        Resource::ALL
            .iter()
            .copied()
            .find(|r| r.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| eyre!("Unknown resource: {}", s))
    }
}

// ============================================
// RESPONSE HELPERS
// ============================================

fn take_list(mut data: Value, key: &str) -> Value {
    match data.get_mut(key).map(Value::take) {
        Some(list @ Value::Array(_)) => list,
        _ => json!([]),
    }
}

/// Subgraphs encode big numbers as strings
fn parse_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn parse_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn parse_u256(value: &Value) -> Option<U256> {
    match value {
        Value::Number(n) => n.as_u64().map(U256::from),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Mean gap between consecutive block timestamps
pub fn average_block_time(blocks: &[Value]) -> Option<f64> {
    let mut timestamps: Vec<u64> = blocks
        .iter()
        .filter_map(|b| b.get("timestamp").and_then(parse_u64))
        .collect();
    if timestamps.len() < 2 {
        return None;
    }
    timestamps.sort_unstable();
    let span = timestamps[timestamps.len() - 1] - timestamps[0];
    Some(span as f64 / (timestamps.len() - 1) as f64)
}

/// BentoBox share -> token amount: share * elastic / base, rounding down
pub fn share_to_amount(share: U256, total_base: U256, total_elastic: U256) -> U256 {
    if total_base.is_zero() {
        return share;
    }
    share.saturating_mul(total_elastic) / total_base
}

// ============================================
// FETCHERS
// ============================================

impl SubgraphClient {
    /// Fetch any resource by tag
    pub async fn fetch(
        &self,
        resource: Resource,
        chain_id: ChainId,
        variables: Value,
    ) -> Result<Value> {
        debug!("Fetching {} on chain {}", resource, chain_id);
        match resource {
            Resource::Clones => self.get_clones(chain_id).await,
            Resource::KashiPairs => self.get_kashi_pairs(chain_id, variables).await,
            Resource::BentoBox => self.get_bento_box(chain_id, variables).await,
            Resource::BentoStrategies => self.get_bento_strategies(chain_id, variables).await,
            Resource::BentoTokens => self.get_bento_tokens(chain_id, variables).await,
            Resource::BentoUserTokens => self.get_bento_user_tokens(chain_id, variables).await,
            Resource::Block => self.get_block(chain_id, variables).await,
            Resource::MassBlocks => {
                let timestamps = parse_timestamps(&variables)?;
                self.get_mass_blocks(chain_id, &timestamps).await
            }
            Resource::AverageBlockTime => self.get_average_block_time(chain_id, Utc::now()).await,
            Resource::MisoCommitments => self.get_miso_commitments(chain_id, variables).await,
        }
    }

    pub async fn get_clones(&self, chain_id: ChainId) -> Result<Value> {
        let data = self.pager(Service::BentoBox, chain_id, CLONES_QUERY, Value::Null).await?;
        Ok(take_list(data, "clones"))
    }

    pub async fn get_kashi_pairs(&self, chain_id: ChainId, variables: Value) -> Result<Value> {
        let data = self.pager(Service::BentoBox, chain_id, KASHI_PAIRS_QUERY, variables).await?;
        Ok(take_list(data, "kashiPairs"))
    }

    /// The single BentoBox entity, `null` if the subgraph has none
    pub async fn get_bento_box(&self, chain_id: ChainId, variables: Value) -> Result<Value> {
        let data = self.request(Service::BentoBox, chain_id, BENTOBOX_QUERY, &variables).await?;
        let first = data
            .get("bentoBoxes")
            .and_then(|b| b.get(0))
            .cloned()
            .unwrap_or(Value::Null);
        Ok(first)
    }

    /// Tokens with an active strategy, flattened to
    /// `{token, apy, targetPercentage, utilization}`
    pub async fn get_bento_strategies(&self, chain_id: ChainId, variables: Value) -> Result<Value> {
        let data = self
            .pager(Service::BentoBox, chain_id, BENTO_STRATEGIES_QUERY, variables)
            .await?;
        let strategies: Vec<Value> = take_list(data, "tokens")
            .as_array()
            .map(|tokens| {
                tokens
                    .iter()
                    .filter_map(|token| {
                        let strategy = token.get("strategy").filter(|s| !s.is_null())?;
                        Some(json!({
                            "token": token.get("id").cloned().unwrap_or(Value::Null),
                            "apy": strategy.get("apy").and_then(parse_f64).unwrap_or(0.0),
                            "targetPercentage": strategy
                                .get("targetPercentage")
                                .and_then(parse_f64)
                                .unwrap_or(0.0),
                            "utilization": strategy
                                .get("utilization")
                                .and_then(parse_f64)
                                .unwrap_or(0.0),
                        }))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(Value::Array(strategies))
    }

    pub async fn get_bento_tokens(&self, chain_id: ChainId, variables: Value) -> Result<Value> {
        let data = self.pager(Service::BentoBox, chain_id, BENTO_TOKENS_QUERY, variables).await?;
        Ok(take_list(data, "tokens"))
    }

    /// A user's BentoBox balances with shares converted to token amounts
    pub async fn get_bento_user_tokens(
        &self,
        chain_id: ChainId,
        variables: Value,
    ) -> Result<Value> {
        let data = self
            .pager(Service::BentoBox, chain_id, BENTO_USER_TOKENS_QUERY, variables)
            .await?;
        let balances: Vec<Value> = take_list(data, "userTokens")
            .as_array()
            .map(|rows| {
                rows.iter()
                    .filter_map(|row| {
                        let token = row.get("token")?;
                        let share = row.get("share").and_then(parse_u256)?;
                        let base = token
                            .get("totalSupplyBase")
                            .and_then(parse_u256)
                            .unwrap_or(U256::ZERO);
                        let elastic = token
                            .get("totalSupplyElastic")
                            .and_then(parse_u256)
                            .unwrap_or(U256::ZERO);
                        Some(json!({
                            "token": token.get("id").cloned().unwrap_or(Value::Null),
                            "symbol": token.get("symbol").cloned().unwrap_or(Value::Null),
                            "decimals": token.get("decimals").and_then(parse_u64).unwrap_or(18),
                            "share": share.to_string(),
                            "amount": share_to_amount(share, base, elastic).to_string(),
                        }))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(Value::Array(balances))
    }

    /// `{ "number": n }` of the newest block matching the filter, `null` if none
    pub async fn get_block(&self, chain_id: ChainId, variables: Value) -> Result<Value> {
        let data = self.request(Service::Blocks, chain_id, BLOCK_QUERY, &variables).await?;
        let number = data
            .get("blocks")
            .and_then(|b| b.get(0))
            .and_then(|b| b.get("number"))
            .and_then(parse_u64);
        Ok(match number {
            Some(number) => json!({ "number": number }),
            None => Value::Null,
        })
    }

    /// Block number for each timestamp, in input order. Timestamps without a
    /// matching block are left out.
    pub async fn get_mass_blocks(&self, chain_id: ChainId, timestamps: &[u64]) -> Result<Value> {
        if timestamps.is_empty() {
            return Ok(json!([]));
        }
        let query = mass_blocks_query(timestamps);
        let data = self.request(Service::Blocks, chain_id, &query, &Value::Null).await?;

        let blocks: Vec<Value> = timestamps
            .iter()
            .filter_map(|ts| {
                let number = data
                    .get(format!("t{}", ts))
                    .and_then(|b| b.get(0))
                    .and_then(|b| b.get("number"))
                    .and_then(parse_u64)?;
                Some(json!({ "timestamp": ts, "number": number }))
            })
            .collect();
        Ok(Value::Array(blocks))
    }

    /// Average seconds per block over the six hours before the current hour
    pub async fn get_average_block_time(
        &self,
        chain_id: ChainId,
        now: DateTime<Utc>,
    ) -> Result<Value> {
        let end = now.duration_trunc(ChronoDuration::hours(1))?;
        let start = end - ChronoDuration::hours(6);
        let variables = json!({
            "first": 1000,
            "start": start.timestamp(),
            "end": end.timestamp(),
        });

        let data = self.pager(Service::Blocks, chain_id, BLOCKS_QUERY, variables).await?;
        let blocks = take_list(data, "blocks");
        let average = blocks.as_array().and_then(|b| average_block_time(b));
        Ok(average.map(|a| json!(a)).unwrap_or(Value::Null))
    }

    pub async fn get_miso_commitments(&self, chain_id: ChainId, variables: Value) -> Result<Value> {
        let data = self.pager(Service::Miso, chain_id, MISO_COMMITMENTS_QUERY, variables).await?;
        Ok(take_list(data, "commitments"))
    }
}

/// Timestamps arrive as a JSON array of numbers or numeric strings
fn parse_timestamps(variables: &Value) -> Result<Vec<u64>> {
    let list = variables
        .as_array()
        .ok_or_else(|| eyre!("massBlocks expects an array of timestamps"))?;
    list.iter()
        .map(|v| parse_u64(v).ok_or_else(|| eyre!("Invalid timestamp: {}", v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::endpoints::Endpoints;
    use crate::graph::testing::MockTransport;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn client(transport: Arc<MockTransport>) -> SubgraphClient {
        SubgraphClient::new(transport, Endpoints::default())
    }

    #[test]
    fn test_resource_names() {
        assert_eq!("kashi-pairs".parse::<Resource>().unwrap(), Resource::KashiPairs);
        assert_eq!("averageBlockTime".parse::<Resource>().unwrap(), Resource::AverageBlockTime);
        assert_eq!("MISO_COMMITMENTS".parse::<Resource>().unwrap(), Resource::MisoCommitments);
        assert!("pools".parse::<Resource>().is_err());
        assert_eq!(Resource::MisoCommitments.service(), Service::Miso);
    }

    #[test]
    fn test_average_block_time() {
        let blocks = vec![
            json!({ "timestamp": "130" }),
            json!({ "timestamp": "100" }),
            json!({ "timestamp": "112" }),
        ];
        assert_eq!(average_block_time(&blocks), Some(15.0));
        assert_eq!(average_block_time(&blocks[..1]), None);
    }

    #[test]
    fn test_share_to_amount() {
        let amount = share_to_amount(U256::from(100u64), U256::from(1000u64), U256::from(1500u64));
        assert_eq!(amount, U256::from(150u64));
        assert_eq!(share_to_amount(U256::from(7u64), U256::ZERO, U256::ZERO), U256::from(7u64));
    }

    #[tokio::test]
    async fn test_get_block() {
        let transport = Arc::new(MockTransport::new(|_, _, _| {
            Ok(json!({ "blocks": [{ "id": "0x1", "number": "14000000", "timestamp": "1" }] }))
        }));
        let block = client(transport.clone())
            .get_block(ChainId::ETHEREUM, json!({ "where": { "timestamp_gt": 1 } }))
            .await
            .unwrap();

        assert_eq!(block, json!({ "number": 14000000 }));
        let calls = transport.calls();
        assert!(calls[0].0.ends_with("blocklytics/ethereum-blocks"));
        assert_eq!(calls[0].2["where"]["timestamp_gt"], json!(1));
    }

    #[tokio::test]
    async fn test_get_mass_blocks_keeps_input_order() {
        let transport = Arc::new(MockTransport::new(|_, query, _| {
            assert!(query.contains("t200:"));
            Ok(json!({
                "t200": [{ "number": "20" }],
                "t100": [{ "number": "10" }],
                "t300": []
            }))
        }));
        let blocks = client(transport)
            .get_mass_blocks(ChainId::POLYGON, &[200, 100, 300])
            .await
            .unwrap();

        assert_eq!(
            blocks,
            json!([{ "timestamp": 200, "number": 20 }, { "timestamp": 100, "number": 10 }])
        );
    }

    #[tokio::test]
    async fn test_get_bento_user_tokens_converts_shares() {
        let transport = Arc::new(MockTransport::new(|_, _, _| {
            Ok(json!({
                "userTokens": [{
                    "share": "1000",
                    "token": {
                        "id": "0xabc",
                        "symbol": "WETH",
                        "decimals": "18",
                        "totalSupplyBase": "2000",
                        "totalSupplyElastic": "3000"
                    }
                }]
            }))
        }));
        let balances = client(transport)
            .get_bento_user_tokens(ChainId::ETHEREUM, json!({ "user": "0xuser" }))
            .await
            .unwrap();

        assert_eq!(balances[0]["amount"], json!("1500"));
        assert_eq!(balances[0]["decimals"], json!(18));
    }

    #[tokio::test]
    async fn test_get_bento_strategies_skips_tokens_without_strategy() {
        let transport = Arc::new(MockTransport::new(|_, _, _| {
            Ok(json!({
                "tokens": [
                    {
                        "id": "0xa",
                        "strategy": {
                            "apy": "4.5",
                            "targetPercentage": "70",
                            "utilization": "65.2"
                        }
                    },
                    { "id": "0xb", "strategy": null }
                ]
            }))
        }));
        let strategies = client(transport)
            .get_bento_strategies(ChainId::ETHEREUM, Value::Null)
            .await
            .unwrap();

        assert_eq!(
            strategies,
            json!([{ "token": "0xa", "apy": 4.5, "targetPercentage": 70.0, "utilization": 65.2 }])
        );
    }

    #[tokio::test]
    async fn test_average_block_time_window() {
        let transport = Arc::new(MockTransport::new(|_, _, _| {
            Ok(json!({
                "blocks": [{ "timestamp": "24" }, { "timestamp": "12" }, { "timestamp": "0" }]
            }))
        }));
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 42, 7).unwrap();
        let average = client(transport.clone())
            .get_average_block_time(ChainId::ETHEREUM, now)
            .await
            .unwrap();

        assert_eq!(average, json!(12.0));
        let vars = &transport.calls()[0].2;
        let end = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap().timestamp();
        assert_eq!(vars["end"], json!(end));
        assert_eq!(vars["start"], json!(end - 6 * 3600));
    }

    #[tokio::test]
    async fn test_mass_blocks_rejects_bad_variables() {
        let transport = Arc::new(MockTransport::new(|_, _, _| Ok(json!({}))));
        let result = client(transport)
            .fetch(Resource::MassBlocks, ChainId::ETHEREUM, json!({ "ts": 1 }))
            .await;
        assert!(result.is_err());
    }
}
