//! Scripted collaborators for tests. No network, fully deterministic.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{Result, bail};
use async_trait::async_trait;

use super::{ActionDispatcher, Post, SearchProvider, Session, SessionProvider, SortOrder};

/// Session provider that succeeds with a canned session, or always fails.
pub struct MockSession {
    fail: bool,
}

impl MockSession {
    pub fn ok() -> Self {
        Self { fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl SessionProvider for MockSession {
    async fn login(&self, identifier: &str, _secret: &str) -> Result<Session> {
        if self.fail {
            bail!("invalid identifier or password");
        }
        Ok(Session {
            did: "did:plc:mockbot".to_string(),
            handle: identifier.to_string(),
            access_jwt: "mock-jwt".to_string(),
        })
    }
}

/// Search provider with canned per-tag results. Tags marked as failing
/// return an error; unknown tags return no posts. Every query is
/// recorded for assertions.
#[derive(Default)]
pub struct MockSearch {
    results: HashMap<String, Vec<Post>>,
    failing: HashSet<String>,
    queries: Mutex<Vec<String>>,
}

impl MockSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(mut self, tag: &str, posts: Vec<Post>) -> Self {
        self.results.insert(tag.to_string(), posts);
        self
    }

    pub fn with_failure(mut self, tag: &str) -> Self {
        self.failing.insert(tag.to_string());
        self
    }

    /// Tags queried so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    async fn search_by_tag(&self, tag: &str, _limit: usize, _sort: SortOrder) -> Result<Vec<Post>> {
        self.queries.lock().unwrap().push(tag.to_string());
        if self.failing.contains(tag) {
            bail!("search for {} failed (502): upstream unavailable", tag);
        }
        Ok(self.results.get(tag).cloned().unwrap_or_default())
    }
}

/// Action dispatcher that records every call. URIs can be marked so
/// their repost or like fails.
#[derive(Default)]
pub struct MockDispatcher {
    fail_reposts: HashSet<String>,
    fail_likes: HashSet<String>,
    attempts: Mutex<Vec<String>>,
    reposts: Mutex<Vec<String>>,
    likes: Mutex<Vec<String>>,
}

impl MockDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failing_repost(mut self, uri: &str) -> Self {
        self.fail_reposts.insert(uri.to_string());
        self
    }

    pub fn with_failing_like(mut self, uri: &str) -> Self {
        self.fail_likes.insert(uri.to_string());
        self
    }

    /// Every repost attempt, in dispatch order, failures included.
    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    /// URIs whose repost succeeded.
    pub fn reposts(&self) -> Vec<String> {
        self.reposts.lock().unwrap().clone()
    }

    /// URIs whose like succeeded.
    pub fn likes(&self) -> Vec<String> {
        self.likes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActionDispatcher for MockDispatcher {
    async fn repost(&self, uri: &str, _cid: &str) -> Result<()> {
        self.attempts.lock().unwrap().push(uri.to_string());
        if self.fail_reposts.contains(uri) {
            bail!("repost of {} failed (429): rate limited", uri);
        }
        self.reposts.lock().unwrap().push(uri.to_string());
        Ok(())
    }

    async fn like(&self, uri: &str, _cid: &str) -> Result<()> {
        if self.fail_likes.contains(uri) {
            bail!("like of {} failed (429): rate limited", uri);
        }
        self.likes.lock().unwrap().push(uri.to_string());
        Ok(())
    }
}
