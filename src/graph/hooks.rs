//! Hook-style entry points over the cache
//!
//! A hook resolves the chain (falling back to the resource default), decides
//! whether to fetch at all, builds the cache key and lets the cache do the
//! rest. Nothing is fetched when the key is absent.

use chrono::{DateTime, Duration as ChronoDuration, DurationRound, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::trace;

use super::cache::{CacheConfig, QueryKey, QueryState, SwrCache};
use super::client::SubgraphClient;
use super::fetchers::Resource;
use crate::chain::ChainId;
use crate::features::{Feature, FeatureTable};

/// Width of the timestamp window used to find a block
const BLOCK_WINDOW_SECS: i64 = 600;

#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub chain_id: Option<ChainId>,
    pub variables: Value,
    /// `None` means the resource's own default
    pub should_fetch: Option<bool>,
    pub cache_config: Option<CacheConfig>,
}

impl QueryOptions {
    pub fn on(chain_id: ChainId) -> Self {
        Self { chain_id: Some(chain_id), ..Default::default() }
    }

    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = variables;
        self
    }

    pub fn should_fetch(mut self, should_fetch: bool) -> Self {
        self.should_fetch = Some(should_fetch);
        self
    }
}

pub struct GraphHooks {
    client: SubgraphClient,
    cache: Arc<SwrCache>,
    features: Arc<FeatureTable>,
    defaults: CacheConfig,
}

impl GraphHooks {
    pub fn new(client: SubgraphClient, features: Arc<FeatureTable>, defaults: CacheConfig) -> Self {
        Self { client, cache: SwrCache::new(), features, defaults }
    }

    pub fn cache(&self) -> &Arc<SwrCache> {
        &self.cache
    }

    /// Cache key for a request, `None` when nothing should be fetched
    pub fn key_for(&self, resource: Resource, options: &QueryOptions) -> Option<QueryKey> {
        let chain_id = options.chain_id.or_else(|| resource.default_chain())?;
        let should_fetch = options
            .should_fetch
            .unwrap_or_else(|| self.enabled_by_default(resource, chain_id));
        if !should_fetch {
            trace!("{} on chain {} switched off", resource, chain_id);
            return None;
        }
        Some(QueryKey::new(resource.name(), chain_id, &options.variables))
    }

    fn enabled_by_default(&self, resource: Resource, chain_id: ChainId) -> bool {
        match resource {
            Resource::BentoStrategies | Resource::BentoTokens | Resource::BentoUserTokens => {
                self.features.is_enabled(Feature::Bentobox, Some(chain_id))
            }
            _ => true,
        }
    }

    pub async fn query(&self, resource: Resource, options: QueryOptions) -> QueryState {
        let Some(key) = self.key_for(resource, &options) else {
            return QueryState::default();
        };
        let config = options.cache_config.unwrap_or(self.defaults);
        let chain_id = key.chain_id;
        let client = self.client.clone();
        let variables = options.variables;

        self.cache
            .query(Some(key), &config, move || async move {
                client.fetch(resource, chain_id, variables).await
            })
            .await
    }

    /// Force a refetch regardless of freshness
    pub async fn revalidate(&self, resource: Resource, options: QueryOptions) -> QueryState {
        let Some(key) = self.key_for(resource, &options) else {
            return QueryState::default();
        };
        let chain_id = key.chain_id;
        let client = self.client.clone();
        let variables = options.variables;

        self.cache
            .revalidate(key, move || async move {
                client.fetch(resource, chain_id, variables).await
            })
            .await
    }

    pub async fn clones(&self, options: QueryOptions) -> QueryState {
        self.query(Resource::Clones, options).await
    }

    pub async fn kashi_pairs(&self, options: QueryOptions) -> QueryState {
        self.query(Resource::KashiPairs, options).await
    }

    pub async fn bento_box(&self, options: QueryOptions) -> QueryState {
        self.query(Resource::BentoBox, options).await
    }

    pub async fn bento_strategies(&self, options: QueryOptions) -> QueryState {
        self.query(Resource::BentoStrategies, options).await
    }

    pub async fn bento_tokens(&self, options: QueryOptions) -> QueryState {
        self.query(Resource::BentoTokens, options).await
    }

    pub async fn bento_user_tokens(&self, options: QueryOptions) -> QueryState {
        self.query(Resource::BentoUserTokens, options).await
    }

    pub async fn block(&self, options: QueryOptions) -> QueryState {
        self.query(Resource::Block, options).await
    }

    pub async fn mass_blocks(&self, chain_id: Option<ChainId>, timestamps: &[u64]) -> QueryState {
        let options = QueryOptions { chain_id, variables: json!(timestamps), ..Default::default() };
        self.query(Resource::MassBlocks, options).await
    }

    pub async fn average_block_time(&self, chain_id: Option<ChainId>) -> QueryState {
        let options = QueryOptions { chain_id, ..Default::default() };
        self.query(Resource::AverageBlockTime, options).await
    }

    pub async fn miso_commitments(&self, options: QueryOptions) -> QueryState {
        self.query(Resource::MisoCommitments, options).await
    }

    pub async fn one_day_block(&self, chain_id: Option<ChainId>, now: DateTime<Utc>) -> QueryState {
        self.block_before(chain_id, now, ChronoDuration::days(1)).await
    }

    pub async fn two_day_block(&self, chain_id: Option<ChainId>, now: DateTime<Utc>) -> QueryState {
        self.block_before(chain_id, now, ChronoDuration::days(2)).await
    }

    pub async fn one_week_block(
        &self,
        chain_id: Option<ChainId>,
        now: DateTime<Utc>,
    ) -> QueryState {
        self.block_before(chain_id, now, ChronoDuration::weeks(1)).await
    }

    pub async fn two_week_block(
        &self,
        chain_id: Option<ChainId>,
        now: DateTime<Utc>,
    ) -> QueryState {
        self.block_before(chain_id, now, ChronoDuration::weeks(2)).await
    }

    async fn block_before(
        &self,
        chain_id: Option<ChainId>,
        now: DateTime<Utc>,
        lookback: ChronoDuration,
    ) -> QueryState {
        let options = QueryOptions {
            chain_id,
            variables: block_window(now, lookback),
            ..Default::default()
        };
        self.block(options).await
    }
}

/// Block filter for the ten minutes starting at the top of the hour,
/// `lookback` before `now`
pub fn block_window(now: DateTime<Utc>, lookback: ChronoDuration) -> Value {
    let target = now - lookback;
    let start = target.duration_trunc(ChronoDuration::hours(1)).unwrap_or(target);
    let start = start.timestamp();
    json!({
        "where": {
            "timestamp_gt": start,
            "timestamp_lt": start + BLOCK_WINDOW_SECS,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::endpoints::Endpoints;
    use crate::graph::testing::MockTransport;
    use chrono::TimeZone;
    use std::time::Duration;

    fn hooks(transport: Arc<MockTransport>, features: FeatureTable) -> GraphHooks {
        let client = SubgraphClient::new(transport, Endpoints::default());
        GraphHooks::new(client, Arc::new(features), CacheConfig::default())
    }

    #[test]
    fn test_block_window() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 14, 37, 12).unwrap();
        let window = block_window(now, ChronoDuration::days(1));
        let start = Utc.with_ymd_and_hms(2024, 5, 9, 14, 0, 0).unwrap().timestamp();

        assert_eq!(window["where"]["timestamp_gt"], json!(start));
        assert_eq!(window["where"]["timestamp_lt"], json!(start + 600));
    }

    #[test]
    fn test_key_defaults_chain() {
        let transport = Arc::new(MockTransport::new(|_, _, _| Ok(json!({}))));
        let hooks = hooks(transport, FeatureTable::builtin());

        let key = hooks.key_for(Resource::KashiPairs, &QueryOptions::default()).unwrap();
        assert_eq!(key.chain_id, ChainId::ETHEREUM);
        assert_eq!(key.resource, "kashiPairs");

        // No default chain, nothing to key on
        assert!(hooks.key_for(Resource::Clones, &QueryOptions::default()).is_none());
        assert!(hooks
            .key_for(Resource::BentoBox, &QueryOptions::on(ChainId::POLYGON).should_fetch(false))
            .is_none());
    }

    #[tokio::test]
    async fn test_reordered_variables_fetch_once() {
        let transport = Arc::new(
            MockTransport::new(|_, _, _| Ok(json!({ "kashiPairs": [{ "id": "0x1" }] })))
                .with_delay(Duration::from_millis(50)),
        );
        let hooks = hooks(transport.clone(), FeatureTable::builtin());

        let a = QueryOptions::on(ChainId::ETHEREUM)
            .with_variables(json!({ "where": { "a": 1, "b": 2 } }));
        let b = QueryOptions::on(ChainId::ETHEREUM)
            .with_variables(json!({ "where": { "b": 2, "a": 1 } }));
        let (first, second) = tokio::join!(hooks.kashi_pairs(a), hooks.kashi_pairs(b));

        assert_eq!(transport.calls().len(), 1);
        assert_eq!(first.data, second.data);
        assert_eq!(first.data.as_deref(), Some(&json!([{ "id": "0x1" }])));
    }

    #[tokio::test]
    async fn test_bento_hooks_follow_feature_flag() {
        let transport = Arc::new(MockTransport::new(|_, _, _| Ok(json!({ "tokens": [] }))));
        let features = FeatureTable::empty().with(ChainId::ETHEREUM, &[Feature::Amm]);
        let hooks = hooks(transport.clone(), features);

        let state = hooks.bento_tokens(QueryOptions::on(ChainId::ETHEREUM)).await;
        assert!(state.is_empty());
        let state = hooks.bento_strategies(QueryOptions::default()).await;
        assert!(state.is_empty());
        assert!(transport.calls().is_empty());

        // An explicit flag wins over the table
        let state = hooks
            .bento_tokens(QueryOptions::on(ChainId::ETHEREUM).should_fetch(true))
            .await;
        assert_eq!(state.data.as_deref(), Some(&json!([])));
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_subgraph_surfaces_as_error() {
        let transport = Arc::new(MockTransport::new(|_, _, _| Ok(json!({}))));
        let hooks = hooks(transport, FeatureTable::builtin());

        let state = hooks.miso_commitments(QueryOptions::default()).await;
        assert!(state.data.is_none());
        assert!(state.error.is_some());
    }

    #[tokio::test]
    async fn test_one_day_block() {
        let transport = Arc::new(MockTransport::new(|_, _, _| {
            Ok(json!({ "blocks": [{ "number": "100" }] }))
        }));
        let hooks = hooks(transport.clone(), FeatureTable::builtin());
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 14, 37, 12).unwrap();

        let state = hooks.one_day_block(None, now).await;
        assert_eq!(state.data.as_deref(), Some(&json!({ "number": 100 })));
        let calls = transport.calls();
        assert!(calls[0].0.ends_with("ethereum-blocks"));
        assert_eq!(calls[0].2, block_window(now, ChronoDuration::days(1)));
    }
}
