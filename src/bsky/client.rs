use std::sync::Mutex;

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ActionDispatcher, Post, SearchProvider, Session, SessionProvider, SortOrder};

const REPOST_COLLECTION: &str = "app.bsky.feed.repost";
const LIKE_COLLECTION: &str = "app.bsky.feed.like";

/// XRPC client for a Bluesky PDS. Implements all three collaborator
/// traits; the session established by `login` is held internally and
/// used for every later call.
pub struct BskyClient {
    http: reqwest::Client,
    service: String,
    session: Mutex<Option<Session>>,
}

impl BskyClient {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            service: service.into(),
            session: Mutex::new(None),
        }
    }

    fn xrpc(&self, method: &str) -> String {
        format!("{}/xrpc/{}", self.service, method)
    }

    fn session(&self) -> Result<Session> {
        match self.session.lock().unwrap().as_ref() {
            Some(session) => Ok(session.clone()),
            None => bail!("not authenticated, call login first"),
        }
    }

    async fn create_record(&self, collection: &str, uri: &str, cid: &str) -> Result<()> {
        let session = self.session()?;
        let body = CreateRecordRequest {
            repo: &session.did,
            collection,
            record: EngagementRecord {
                record_type: collection,
                subject: Subject { uri, cid },
                created_at: Utc::now(),
            },
        };

        let resp = self
            .http
            .post(self.xrpc("com.atproto.repo.createRecord"))
            .bearer_auth(&session.access_jwt)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("{} failed ({}): {}", collection, status, text);
        }
        Ok(())
    }
}

#[async_trait]
impl SessionProvider for BskyClient {
    async fn login(&self, identifier: &str, secret: &str) -> Result<Session> {
        let resp = self
            .http
            .post(self.xrpc("com.atproto.server.createSession"))
            .json(&CreateSessionRequest {
                identifier,
                password: secret,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("login failed ({}): {}", status, text);
        }

        let session: Session = resp.json().await?;
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(session)
    }
}

#[async_trait]
impl SearchProvider for BskyClient {
    async fn search_by_tag(&self, tag: &str, limit: usize, sort: SortOrder) -> Result<Vec<Post>> {
        let session = self.session()?;
        let limit = limit.to_string();

        let resp = self
            .http
            .get(self.xrpc("app.bsky.feed.searchPosts"))
            .bearer_auth(&session.access_jwt)
            .query(&[("q", tag), ("limit", limit.as_str()), ("sort", sort.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("search for {} failed ({}): {}", tag, status, text);
        }

        let results: SearchResponse = resp.json().await?;
        Ok(results.posts.into_iter().map(Post::from).collect())
    }
}

#[async_trait]
impl ActionDispatcher for BskyClient {
    async fn repost(&self, uri: &str, cid: &str) -> Result<()> {
        self.create_record(REPOST_COLLECTION, uri, cid).await
    }

    async fn like(&self, uri: &str, cid: &str) -> Result<()> {
        self.create_record(LIKE_COLLECTION, uri, cid).await
    }
}

// --- Wire types ---

#[derive(Serialize)]
struct CreateSessionRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct CreateRecordRequest<'a> {
    repo: &'a str,
    collection: &'a str,
    record: EngagementRecord<'a>,
}

#[derive(Serialize)]
struct EngagementRecord<'a> {
    #[serde(rename = "$type")]
    record_type: &'a str,
    subject: Subject<'a>,
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct Subject<'a> {
    uri: &'a str,
    cid: &'a str,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    posts: Vec<PostView>,
}

#[derive(Deserialize)]
struct PostView {
    uri: String,
    cid: String,
    author: AuthorView,
    record: PostRecord,
}

#[derive(Deserialize)]
struct AuthorView {
    handle: String,
}

#[derive(Deserialize)]
struct PostRecord {
    #[serde(default)]
    text: String,
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,
    reply: Option<serde_json::Value>,
}

impl From<PostView> for Post {
    fn from(view: PostView) -> Self {
        Post {
            uri: view.uri,
            cid: view.cid,
            author: view.author.handle,
            text: view.record.text,
            created_at: view.record.created_at,
            is_reply: view.record.reply.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_view_conversion_derives_reply_flag() {
        let json = r#"{
            "uri": "at://did:plc:abc/app.bsky.feed.post/1",
            "cid": "bafyreia",
            "author": {"handle": "alice.example.com"},
            "record": {
                "text": "hello #3DAssets",
                "createdAt": "2026-08-01T12:00:00Z",
                "reply": {"parent": {"uri": "at://x", "cid": "y"}}
            }
        }"#;
        let view: PostView = serde_json::from_str(json).unwrap();
        let post = Post::from(view);
        assert_eq!(post.author, "alice.example.com");
        assert!(post.is_reply);
    }

    #[test]
    fn post_view_without_reply_is_top_level() {
        let json = r#"{
            "uri": "at://did:plc:abc/app.bsky.feed.post/2",
            "cid": "bafyreib",
            "author": {"handle": "bob.example.com"},
            "record": {"text": "top level", "createdAt": "2026-08-01T12:00:00Z"}
        }"#;
        let view: PostView = serde_json::from_str(json).unwrap();
        let post = Post::from(view);
        assert!(!post.is_reply);
        assert_eq!(post.text, "top level");
    }

    #[test]
    fn search_response_tolerates_missing_posts_field() {
        let results: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(results.posts.is_empty());
    }

    #[test]
    fn engagement_record_serializes_lexicon_type() {
        let record = EngagementRecord {
            record_type: REPOST_COLLECTION,
            subject: Subject {
                uri: "at://did:plc:abc/app.bsky.feed.post/1",
                cid: "bafyreia",
            },
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["$type"], "app.bsky.feed.repost");
        assert_eq!(json["subject"]["cid"], "bafyreia");
        assert!(json["createdAt"].is_string());
    }

    #[test]
    fn unauthenticated_client_has_no_session() {
        let client = BskyClient::new("https://bsky.social");
        assert!(client.session().is_err());
    }
}
