//! Subgraph client: endpoint lookup, single requests and the pager

use eyre::{eyre, Result};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

use super::endpoints::{Endpoints, Service};
use super::transport::{GraphTransport, HttpTransport};
use crate::chain::ChainId;

/// Largest page a subgraph returns
pub const PAGE_SIZE: usize = 1000;

/// Upper bound on requests per paged query
pub const MAX_PAGES: usize = 100;

#[derive(Clone)]
pub struct SubgraphClient {
    transport: Arc<dyn GraphTransport>,
    endpoints: Endpoints,
}

impl SubgraphClient {
    pub fn new(transport: Arc<dyn GraphTransport>, endpoints: Endpoints) -> Self {
        Self { transport, endpoints }
    }

    /// Client over HTTP with the given timeout and optional host override
    pub fn http(timeout: Duration, host_override: Option<String>) -> Result<Self> {
        let transport = HttpTransport::new(timeout)?;
        Ok(Self::new(Arc::new(transport), Endpoints::new(host_override)))
    }

    pub fn endpoint(&self, service: Service, chain_id: ChainId) -> Result<String> {
        self.endpoints
            .resolve(service, chain_id)
            .ok_or_else(|| {
                eyre!("No {} subgraph on chain {} ({})", service, chain_id, chain_id.name())
            })
    }

    /// Single request, no paging
    pub async fn request(
        &self,
        service: Service,
        chain_id: ChainId,
        query: &str,
        variables: &Value,
    ) -> Result<Value> {
        let endpoint = self.endpoint(service, chain_id)?;
        self.transport.post(&endpoint, query, variables).await
    }

    /// Request every page of a query.
    ///
    /// While any top-level list comes back with exactly `PAGE_SIZE` rows the
    /// query is repeated with `skip` advanced, and lists are concatenated per
    /// key. A caller-supplied `first` means the caller wants one page only.
    /// Paging stops early when a page repeats the previous one (the subgraph
    /// ignored `skip`) or after `MAX_PAGES` requests.
    pub async fn pager(
        &self,
        service: Service,
        chain_id: ChainId,
        query: &str,
        variables: Value,
    ) -> Result<Value> {
        let endpoint = self.endpoint(service, chain_id)?;

        let mut variables = match variables {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => return Err(eyre!("Query variables must be an object, got {}", other)),
        };
        let fixed_first = variables.get("first").map(|v| !v.is_null()).unwrap_or(false);

        let mut data = Map::new();
        let mut skip = 0usize;
        let mut pages = 0usize;
        let mut previous: Option<Map<String, Value>> = None;

        loop {
            let page = self
                .transport
                .post(&endpoint, query, &Value::Object(variables.clone()))
                .await?;
            pages += 1;

            let Value::Object(page) = page else {
                return Err(eyre!("Subgraph returned non-object data"));
            };
            if previous.as_ref() == Some(&page) {
                warn!("{} ignored skip={}, keeping {} page(s)", endpoint, skip, pages - 1);
                break;
            }

            let mut full_page = false;
            for (key, value) in page.clone() {
                if value.as_array().map(|rows| rows.len() == PAGE_SIZE).unwrap_or(false) {
                    full_page = true;
                }
                match data.get_mut(&key) {
                    Some(Value::Array(existing)) if value.is_array() => {
                        if let Value::Array(rows) = value {
                            existing.extend(rows);
                        }
                    }
                    _ => {
                        data.insert(key, value);
                    }
                }
            }

            if !full_page || fixed_first {
                break;
            }
            if pages >= MAX_PAGES {
                warn!("Stopped paging {} after {} pages", endpoint, pages);
                break;
            }
            previous = Some(page);
            skip += PAGE_SIZE;
            trace!("Paging {} at skip={}", endpoint, skip);
            variables.insert("skip".to_string(), json!(skip));
        }

        debug!("Fetched {} page(s) from {}", pages, endpoint);
        Ok(Value::Object(data))
    }
}
