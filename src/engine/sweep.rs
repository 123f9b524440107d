use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use chrono::Utc;

use super::{Engine, RunSummary};
use crate::bsky::{ActionDispatcher, Credentials, Post, SearchProvider, SessionProvider, SortOrder};
use crate::consts;
use crate::filter::{FilterContext, TagSet, Verdict, evaluate};
use crate::ledger::Ledger;
use crate::quota::{Pacer, Quota};

pub struct SweepConfig {
    pub tags: TagSet,
    /// The operating account's handle. Its own posts are skipped.
    pub own_handle: String,
    pub freshness: chrono::Duration,
    pub max_actions: usize,
    pub search_limit: usize,
    pub query_delay: Duration,
    pub action_delay: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        let tags = consts::DEFAULT_TAGS.iter().map(|t| t.to_string()).collect();
        Self {
            tags: TagSet::new(tags).expect("default tag list is non-empty"),
            own_handle: String::new(),
            freshness: chrono::Duration::hours(consts::DEFAULT_FRESHNESS_HOURS),
            max_actions: consts::DEFAULT_MAX_REPOSTS,
            search_limit: consts::DEFAULT_SEARCH_LIMIT,
            query_delay: Duration::from_millis(consts::DEFAULT_QUERY_DELAY_MS),
            action_delay: Duration::from_millis(consts::DEFAULT_ACTION_DELAY_MS),
        }
    }
}

/// One sweep: log in, query every monitored tag, filter the pool, act on
/// what qualifies under the quota, report. Wires together the network
/// collaborators, the dedup ledger, and the quota.
pub struct SweepEngine {
    sessions: Arc<dyn SessionProvider>,
    search: Arc<dyn SearchProvider>,
    actions: Arc<dyn ActionDispatcher>,
    ledger: Ledger,
    credentials: Credentials,
    config: SweepConfig,
}

impl SweepEngine {
    pub fn new(
        sessions: Arc<dyn SessionProvider>,
        search: Arc<dyn SearchProvider>,
        actions: Arc<dyn ActionDispatcher>,
        ledger: Ledger,
        credentials: Credentials,
        config: SweepConfig,
    ) -> Self {
        Self {
            sessions,
            search,
            actions,
            ledger,
            credentials,
            config,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}

#[async_trait]
impl Engine for SweepEngine {
    async fn run(&mut self) -> Result<RunSummary> {
        let session = self
            .sessions
            .login(&self.credentials.identifier, &self.credentials.secret)
            .await
            .context("authentication failed")?;
        println!("[auth] logged in as {}", session.handle);

        // One query per tag, strictly sequential. A failed query costs
        // only that tag's results, never the run.
        let query_pacer = Pacer::new(self.config.query_delay);
        let mut candidates: Vec<Post> = Vec::new();
        for (i, tag) in self.config.tags.iter().enumerate() {
            if i > 0 {
                query_pacer.pace().await;
            }
            println!("[fetch] searching {}...", tag);
            match self
                .search
                .search_by_tag(tag, self.config.search_limit, SortOrder::Latest)
                .await
            {
                Ok(posts) => candidates.extend(posts),
                Err(e) => eprintln!("[fetch] {} failed: {:#}", tag, e),
            }
        }
        println!("[fetch] {} candidate posts", candidates.len());

        let action_pacer = Pacer::new(self.config.action_delay);
        let mut quota = Quota::new(self.config.max_actions);
        let now = Utc::now();
        let mut attempted = 0;
        let mut reposted = 0;

        for post in &candidates {
            let ctx = FilterContext {
                tags: &self.config.tags,
                own_handle: &self.config.own_handle,
                now,
                freshness: self.config.freshness,
            };
            if let Verdict::Reject(_) = evaluate(post, &ctx) {
                continue;
            }
            if self.ledger.has_acted(&post.uri) {
                println!("[act] already reposted: {}", post.uri);
                continue;
            }
            if !quota.try_reserve() {
                println!("[act] repost limit ({}) reached, stopping", quota.ceiling());
                break;
            }

            attempted += 1;
            match self.actions.repost(&post.uri, &post.cid).await {
                Ok(()) => {
                    // Recorded before the like: a partial success must
                    // never be retried and double-reposted.
                    self.ledger.record_acted(&post.uri).await?;
                    reposted += 1;
                    println!("[act] reposted: {}...", snippet(&post.text));

                    if let Err(e) = self.actions.like(&post.uri, &post.cid).await {
                        eprintln!("[act] like of {} failed: {:#}", post.uri, e);
                    } else {
                        println!("[act] liked: {}", post.uri);
                    }
                    action_pacer.pace().await;
                }
                // The post stays out of the ledger and remains eligible
                // for a future run. The reservation is not returned.
                Err(e) => eprintln!("[act] repost of {} failed: {:#}", post.uri, e),
            }
        }

        Ok(RunSummary {
            candidates: candidates.len(),
            attempted,
            reposted,
        })
    }
}

/// First 50 characters of the text, for log lines.
fn snippet(text: &str) -> String {
    text.chars().take(50).collect()
}
