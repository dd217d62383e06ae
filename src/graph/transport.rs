//! GraphQL over HTTP

use eyre::{eyre, Result};
use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, trace};

/// Sends one GraphQL document and yields its `data` object
pub trait GraphTransport: Send + Sync {
    fn post(
        &self,
        endpoint: &str,
        query: &str,
        variables: &Value,
    ) -> BoxFuture<'static, Result<Value>>;
}

#[derive(Debug, Deserialize)]
struct GraphResponse {
    data: Option<Value>,
    errors: Option<Vec<GraphError>>,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct HttpTransport {
    http_client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;
        Ok(Self { http_client })
    }
}

impl GraphTransport for HttpTransport {
    fn post(
        &self,
        endpoint: &str,
        query: &str,
        variables: &Value,
    ) -> BoxFuture<'static, Result<Value>> {
        let client = self.http_client.clone();
        let endpoint = endpoint.to_string();
        let body = json!({ "query": query, "variables": variables });

        async move {
            debug!("POST {}", endpoint);
            trace!("GraphQL body: {}", body);

            let response: GraphResponse = client
                .post(&endpoint)
                .json(&body)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            parse_response(response)
        }
        .boxed()
    }
}

fn parse_response(response: GraphResponse) -> Result<Value> {
    if let Some(errors) = response.errors.filter(|e| !e.is_empty()) {
        let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
        return Err(eyre!("Subgraph error: {}", messages.join("; ")));
    }
    response.data.ok_or_else(|| eyre!("Subgraph response has no data"))
}
