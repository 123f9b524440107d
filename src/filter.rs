//! The decision core: does this post deserve a repost?
//!
//! Everything here is pure: the current time is passed in via
//! [`FilterContext`], never read from the clock, so a verdict is
//! reproducible from its inputs alone.

use anyhow::{Result, bail};
use chrono::{DateTime, Duration, Utc};

use crate::bsky::Post;

/// The monitored tags. Non-empty, ordered as configured.
///
/// Tags keep their original casing (search queries use them verbatim);
/// matching lowercases both sides.
#[derive(Debug, Clone)]
pub struct TagSet {
    tags: Vec<String>,
}

impl TagSet {
    pub fn new(tags: Vec<String>) -> Result<Self> {
        if tags.is_empty() {
            bail!("at least one tag is required");
        }
        Ok(Self { tags })
    }

    /// True iff the text mentions any monitored tag, case-insensitively.
    ///
    /// This is substring matching: a tag embedded in a longer word still
    /// counts. That is the established matching policy; do not tighten
    /// it to word boundaries.
    pub fn matches(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let text = text.to_lowercase();
        self.tags
            .iter()
            .any(|tag| text.contains(&tag.to_lowercase()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Why a post was passed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// No monitored tag occurs in the body.
    NoTagMatch,
    /// The operating account wrote it.
    OwnPost,
    /// The post is a reply.
    Reply,
    /// Older than the freshness window.
    Stale,
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Reason::NoTagMatch => "no monitored tag",
            Reason::OwnPost => "own post",
            Reason::Reply => "reply",
            Reason::Stale => "stale",
        };
        write!(f, "{}", s)
    }
}

/// Accept/reject outcome for a single post. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(Reason),
}

/// Everything `evaluate` needs besides the post itself.
pub struct FilterContext<'a> {
    pub tags: &'a TagSet,
    /// The operating account's handle. Its own posts are never acted on.
    pub own_handle: &'a str,
    /// Injected wall-clock time.
    pub now: DateTime<Utc>,
    /// Maximum post age before it counts as stale.
    pub freshness: Duration,
}

/// Decide whether a post qualifies for engagement.
///
/// Checks run in order and short-circuit on the first failure; the order
/// only determines which reason is reported, not the final verdict. Age
/// exactly equal to the freshness window is still fresh.
pub fn evaluate(post: &Post, ctx: &FilterContext) -> Verdict {
    if !ctx.tags.matches(&post.text) {
        return Verdict::Reject(Reason::NoTagMatch);
    }
    if post.author == ctx.own_handle {
        return Verdict::Reject(Reason::OwnPost);
    }
    if post.is_reply {
        return Verdict::Reject(Reason::Reply);
    }
    if ctx.now - post.created_at > ctx.freshness {
        return Verdict::Reject(Reason::Stale);
    }
    Verdict::Accept
}
