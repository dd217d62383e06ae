//! Subgraph data layer
//!
//! Responsible for:
//! - Resolving subgraph endpoints per chain
//! - Executing (and paging) GraphQL queries
//! - Resource fetchers with their response shaping
//! - A stale-while-revalidate cache with request deduplication
//! - Hook-style entry points that tie resources, feature flags and the cache together

mod cache;
mod client;
mod endpoints;
mod fetchers;
mod hooks;
mod queries;
mod transport;

pub use cache::{canonical_json, CacheConfig, QueryKey, QueryState, SwrCache};
pub use client::{SubgraphClient, PAGE_SIZE};
pub use endpoints::{Endpoints, Service};
pub use fetchers::Resource;
pub use hooks::{block_window, GraphHooks, QueryOptions};
pub use transport::{GraphTransport, HttpTransport};

#[cfg(test)]
pub(crate) mod testing {
    use eyre::Result;
    use futures::future::{BoxFuture, FutureExt};
    use serde_json::Value;
    use std::sync::Mutex;
    use std::time::Duration;

    use super::GraphTransport;

    type Responder = dyn Fn(&str, &str, &Value) -> Result<Value> + Send + Sync;

    /// In-memory transport that records every request
    pub struct MockTransport {
        respond: Box<Responder>,
        delay: Duration,
        calls: Mutex<Vec<(String, String, Value)>>,
    }

    impl MockTransport {
        pub fn new<F>(respond: F) -> Self
        where
            F: Fn(&str, &str, &Value) -> Result<Value> + Send + Sync + 'static,
        {
            Self {
                respond: Box::new(respond),
                delay: Duration::ZERO,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        /// (endpoint, query, variables) of every request so far
        pub fn calls(&self) -> Vec<(String, String, Value)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl GraphTransport for MockTransport {
        fn post(
            &self,
            endpoint: &str,
            query: &str,
            variables: &Value,
        ) -> BoxFuture<'static, Result<Value>> {
            self.calls
                .lock()
                .unwrap()
                .push((endpoint.to_string(), query.to_string(), variables.clone()));
            let result = (self.respond)(endpoint, query, variables);
            let delay = self.delay;
            async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            .boxed()
        }
    }
}
