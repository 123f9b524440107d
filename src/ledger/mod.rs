//! The dedup ledger: which posts have we already acted on?
//!
//! The ledger is what makes actions at-most-once. It records "an action
//! was attempted for this post", not "the action fully succeeded": a
//! post whose repost went through but whose like failed must never be
//! retried and double-reposted.

pub mod sqlite;

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;

/// Durable backing for the ledger. Optional; without one, dedup is
/// scoped to the process lifetime.
#[async_trait]
pub trait Store: Send + Sync {
    async fn load(&self) -> Result<HashSet<String>>;
    async fn save(&self, uris: &HashSet<String>) -> Result<()>;
}

/// Set of post URIs already acted upon. Grows monotonically; never
/// shrinks. Owned by a single run at a time.
pub struct Ledger {
    acted: HashSet<String>,
    store: Option<Box<dyn Store>>,
}

impl Ledger {
    /// Ledger seeded from a durable store.
    pub async fn open(store: Box<dyn Store>) -> Result<Self> {
        let acted = store.load().await?;
        Ok(Self {
            acted,
            store: Some(store),
        })
    }

    /// Ledger with no persistence. Dedup across separate runs is then
    /// out of scope.
    pub fn in_memory() -> Self {
        Self {
            acted: HashSet::new(),
            store: None,
        }
    }

    /// Membership query. No side effects.
    pub fn has_acted(&self, uri: &str) -> bool {
        self.acted.contains(uri)
    }

    /// Record that an action was attempted for this post. Idempotent:
    /// re-recording a known URI is a no-op, not an error. A new entry is
    /// written through to the store before returning, so a kill after
    /// this call cannot lose the record.
    pub async fn record_acted(&mut self, uri: &str) -> Result<()> {
        if !self.acted.insert(uri.to_string()) {
            return Ok(());
        }
        if let Some(store) = &self.store {
            store.save(&self.acted).await?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.acted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acted.is_empty()
    }
}
