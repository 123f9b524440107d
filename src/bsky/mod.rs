//! The network seam. The engine only knows these traits; the real XRPC
//! client and the scripted test doubles both live behind them.

pub mod client;
pub mod mock;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post as observed from the network. Immutable for the duration of
/// one run; the core never owns it beyond that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier (`at://` URI).
    pub uri: String,
    /// Content identifier. Required to act on the post.
    pub cid: String,
    /// Author handle.
    pub author: String,
    /// Body text.
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// True when the record carries a reply reference.
    pub is_reply: bool,
}

/// An authenticated session, as returned by the session provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub did: String,
    pub handle: String,
    pub access_jwt: String,
}

/// Login credentials, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub identifier: String,
    pub secret: String,
}

/// Search result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Latest,
    Top,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Latest => "latest",
            SortOrder::Top => "top",
        }
    }
}

/// Establishes an authenticated session. Failure here is fatal to the run.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn login(&self, identifier: &str, secret: &str) -> Result<Session>;
}

/// One tag query against the network's search endpoint.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search_by_tag(&self, tag: &str, limit: usize, sort: SortOrder) -> Result<Vec<Post>>;
}

/// Outbound engagement actions.
#[async_trait]
pub trait ActionDispatcher: Send + Sync {
    async fn repost(&self, uri: &str, cid: &str) -> Result<()>;
    async fn like(&self, uri: &str, cid: &str) -> Result<()>;
}
