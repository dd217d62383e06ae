//! Wallet context: the last known (chain, account) snapshot.
//!
//! One `ContextWriter` owns the cell and replaces it wholesale on every wallet
//! event. Any number of `ContextReader`s take snapshots or wait for changes.
//! Snapshots are immutable `Arc`s; a payload that omits a field clears it.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::chain::ChainId;

/// Payload emitted by the wallet connector, also the stored snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<ChainId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

impl WalletContext {
    pub fn new(chain_id: Option<ChainId>, account: Option<String>) -> Self {
        Self { chain_id, account }
    }

    /// Account if present and non-empty
    pub fn account(&self) -> Option<&str> {
        self.account.as_deref().filter(|a| !a.is_empty())
    }

    pub fn is_connected(&self) -> bool {
        self.chain_id.is_some() && self.account().is_some()
    }
}

/// Create an empty context cell
pub fn wallet_context() -> (ContextWriter, ContextReader) {
    let (tx, rx) = watch::channel(Arc::new(WalletContext::default()));
    (ContextWriter { tx }, ContextReader { rx })
}

/// Sole writer of the wallet context. Not `Clone`.
#[derive(Debug)]
pub struct ContextWriter {
    tx: watch::Sender<Arc<WalletContext>>,
}

impl ContextWriter {
    /// Replace the context in full. Returns whether anything changed.
    pub fn update(&self, payload: WalletContext) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if **current == payload {
                return false;
            }
            *current = Arc::new(payload.clone());
            true
        });

        if changed {
            info!(
                "Wallet context updated: chain={} account={}",
                payload.chain_id.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()),
                payload.account().unwrap_or("-")
            );
        } else {
            debug!("Wallet context unchanged");
        }
        changed
    }

    /// Reset to the empty context (wallet disconnected)
    pub fn clear(&self) -> bool {
        self.update(WalletContext::default())
    }

    pub fn reader(&self) -> ContextReader {
        ContextReader { rx: self.tx.subscribe() }
    }
}

/// Read side of the wallet context
#[derive(Debug, Clone)]
pub struct ContextReader {
    rx: watch::Receiver<Arc<WalletContext>>,
}

impl ContextReader {
    /// Current snapshot
    pub fn snapshot(&self) -> Arc<WalletContext> {
        self.rx.borrow().clone()
    }

    /// Wait for the next replacement and return it.
    /// `None` once the writer is gone.
    pub async fn changed(&mut self) -> Option<Arc<WalletContext>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}
