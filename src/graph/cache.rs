//! Stale-while-revalidate query cache
//!
//! Entries are keyed by (resource, chain, canonical variables). A fresh entry
//! is returned as is; a stale one is returned immediately while a background
//! refresh runs. At most one request per key is in flight: later callers join
//! the pending one and observe the same outcome. A failed refresh records the
//! error next to whatever data the entry already held.

use eyre::{Report, Result};
use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, trace, warn};

use crate::chain::ChainId;

// ============================================
// KEYS
// ============================================

/// Serialize JSON with object keys sorted at every level, so structurally
/// equal values always produce the same string.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub resource: &'static str,
    pub chain_id: ChainId,
    pub variables: String,
}

impl QueryKey {
    pub fn new(resource: &'static str, chain_id: ChainId, variables: &Value) -> Self {
        Self { resource, chain_id, variables: canonical_json(variables) }
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}:{}", self.resource, self.chain_id, self.variables)
    }
}

// ============================================
// ENTRIES
// ============================================

/// Per-request cache behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// An entry younger than this is served without any request
    pub dedupe_interval: Duration,
    /// Serve stale data while refreshing in the background
    pub revalidate_if_stale: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dedupe_interval: Duration::from_secs(2),
            revalidate_if_stale: true,
        }
    }
}

/// What a caller sees for a key
#[derive(Debug, Clone, Default)]
pub struct QueryState {
    pub data: Option<Arc<Value>>,
    pub error: Option<Arc<Report>>,
    /// Bumped every time a request for the key settles; 0 means never fetched
    pub version: u64,
}

impl QueryState {
    pub fn is_empty(&self) -> bool {
        self.data.is_none() && self.error.is_none()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Option<Arc<Value>>,
    error: Option<Arc<Report>>,
    fetched_at: Instant,
    version: u64,
}

impl CacheEntry {
    fn state(&self) -> QueryState {
        QueryState {
            data: self.data.clone(),
            error: self.error.clone(),
            version: self.version,
        }
    }
}

type FetchOutcome = std::result::Result<Arc<Value>, Arc<Report>>;
type PendingFetch = Shared<BoxFuture<'static, FetchOutcome>>;

// ============================================
// CACHE
// ============================================

#[derive(Default)]
pub struct SwrCache {
    entries: RwLock<HashMap<QueryKey, CacheEntry>>,
    inflight: Mutex<HashMap<QueryKey, PendingFetch>>,
    requests: AtomicU64,
}

impl SwrCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Resolve a key.
    ///
    /// `None` means fetching is switched off: nothing is requested and nothing
    /// is returned.
    pub async fn query<F, Fut>(
        self: &Arc<Self>,
        key: Option<QueryKey>,
        config: &CacheConfig,
        fetcher: F,
    ) -> QueryState
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        let Some(key) = key else {
            return QueryState::default();
        };

        if let Some(entry) = self.entry(&key).await {
            if entry.fetched_at.elapsed() < config.dedupe_interval {
                trace!("Cache hit for {}", key);
                return entry.state();
            }
            if config.revalidate_if_stale && entry.data.is_some() {
                debug!("Serving stale {} while revalidating", key);
                // Already running on its own task
                let _ = self.start_fetch(key, fetcher).await;
                return entry.state();
            }
        }

        self.revalidate(key, fetcher).await
    }

    /// Fetch (or join the pending fetch) and wait for it to settle
    pub async fn revalidate<F, Fut>(self: &Arc<Self>, key: QueryKey, fetcher: F) -> QueryState
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        let pending = self.start_fetch(key.clone(), fetcher).await;
        let _ = pending.await;
        self.peek(&key).await
    }

    /// Current state of a key without triggering anything
    pub async fn peek(&self, key: &QueryKey) -> QueryState {
        self.entry(key).await.map(|e| e.state()).unwrap_or_default()
    }

    /// Number of requests actually started
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    async fn entry(&self, key: &QueryKey) -> Option<CacheEntry> {
        self.entries.read().await.get(key).cloned()
    }

    /// Register a fetch for `key` unless one is already pending.
    ///
    /// The fetch runs on its own task, so it completes and lands in the cache
    /// even if every caller stops waiting for it.
    async fn start_fetch<F, Fut>(self: &Arc<Self>, key: QueryKey, fetcher: F) -> PendingFetch
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        let mut inflight = self.inflight.lock().await;
        if let Some(pending) = inflight.get(&key) {
            trace!("Joining in-flight request for {}", key);
            return pending.clone();
        }

        debug!("Fetching {}", key);
        self.requests.fetch_add(1, Ordering::Relaxed);

        let cache = Arc::clone(self);
        let task_key = key.clone();
        let request = fetcher();
        let pending = async move {
            let outcome: FetchOutcome = request.await.map(Arc::new).map_err(Arc::new);
            cache.settle(&task_key, &outcome).await;
            outcome
        }
        .boxed()
        .shared();

        inflight.insert(key, pending.clone());
        tokio::spawn(pending.clone());
        pending
    }

    async fn settle(&self, key: &QueryKey, outcome: &FetchOutcome) {
        {
            let mut entries = self.entries.write().await;
            let entry = entries.entry(key.clone()).or_insert_with(|| CacheEntry {
                data: None,
                error: None,
                fetched_at: Instant::now(),
                version: 0,
            });
            match outcome {
                Ok(data) => {
                    entry.data = Some(data.clone());
                    entry.error = None;
                }
                Err(e) => {
                    warn!("Request for {} failed: {}", key, e);
                    entry.error = Some(e.clone());
                }
            }
            entry.fetched_at = Instant::now();
            entry.version += 1;
        }
        self.inflight.lock().await.remove(key);
    }
}
