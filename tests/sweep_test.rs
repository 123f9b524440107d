use std::sync::Arc;

use chrono::{Duration, Utc};

use herald::bsky::mock::{MockDispatcher, MockSearch, MockSession};
use herald::bsky::{Credentials, Post};
use herald::engine::Engine;
use herald::engine::sweep::{SweepConfig, SweepEngine};
use herald::filter::TagSet;
use herald::ledger::Ledger;

fn post(n: u32, text: &str) -> Post {
    Post {
        uri: format!("at://did:plc:alice/app.bsky.feed.post/{}", n),
        cid: format!("bafyreia{}", n),
        author: "alice.example.com".to_string(),
        text: text.to_string(),
        created_at: Utc::now() - Duration::minutes(5),
        is_reply: false,
    }
}

fn config(tags: &[&str], ceiling: usize) -> SweepConfig {
    SweepConfig {
        tags: TagSet::new(tags.iter().map(|s| s.to_string()).collect()).unwrap(),
        own_handle: "bot.example.com".to_string(),
        freshness: Duration::hours(24),
        max_actions: ceiling,
        search_limit: 20,
        // Zero delays keep tests instant; pacing itself is covered in
        // the quota module's unit tests.
        query_delay: std::time::Duration::ZERO,
        action_delay: std::time::Duration::ZERO,
    }
}

fn build_engine(
    search: Arc<MockSearch>,
    actions: Arc<MockDispatcher>,
    ledger: Ledger,
    config: SweepConfig,
) -> SweepEngine {
    SweepEngine::new(
        Arc::new(MockSession::ok()),
        search,
        actions,
        ledger,
        Credentials {
            identifier: "bot.example.com".to_string(),
            secret: "app-password".to_string(),
        },
        config,
    )
}

#[tokio::test]
async fn three_qualifying_posts_ceiling_two() {
    let posts = vec![
        post(1, "pack one #3DAssets"),
        post(2, "pack two #3DAssets"),
        post(3, "pack three #3DAssets"),
    ];
    let search = Arc::new(MockSearch::new().with_posts("#3DAssets", posts));
    let actions = Arc::new(MockDispatcher::new());
    let mut engine = build_engine(
        search,
        actions.clone(),
        Ledger::in_memory(),
        config(&["#3DAssets"], 2),
    );

    let summary = engine.run().await.unwrap();

    assert_eq!(summary.candidates, 3);
    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.reposted, 2);

    assert_eq!(
        actions.reposts(),
        vec![
            "at://did:plc:alice/app.bsky.feed.post/1",
            "at://did:plc:alice/app.bsky.feed.post/2",
        ]
    );
    // The third post never reached the dispatcher or the ledger.
    assert_eq!(engine.ledger().len(), 2);
    assert!(!engine.ledger().has_acted("at://did:plc:alice/app.bsky.feed.post/3"));
}

#[tokio::test]
async fn failed_primary_leaves_post_eligible_for_next_run() {
    let posts = vec![
        post(1, "pack one #3DAssets"),
        post(2, "pack two #3DAssets"),
        post(3, "pack three #3DAssets"),
    ];
    let search = Arc::new(MockSearch::new().with_posts("#3DAssets", posts));
    let actions = Arc::new(
        MockDispatcher::new().with_failing_repost("at://did:plc:alice/app.bsky.feed.post/2"),
    );
    let mut engine = build_engine(
        search,
        actions.clone(),
        Ledger::in_memory(),
        config(&["#3DAssets"], 2),
    );

    let summary = engine.run().await.unwrap();

    // Both reservations were spent on posts 1 and 2, so post 3 was
    // never reserved. Post 2's failed dispatch is not in the ledger.
    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.reposted, 1);
    assert_eq!(
        actions.attempts(),
        vec![
            "at://did:plc:alice/app.bsky.feed.post/1",
            "at://did:plc:alice/app.bsky.feed.post/2",
        ]
    );
    assert_eq!(engine.ledger().len(), 1);
    assert!(engine.ledger().has_acted("at://did:plc:alice/app.bsky.feed.post/1"));
    assert!(!engine.ledger().has_acted("at://did:plc:alice/app.bsky.feed.post/2"));
    assert!(!engine.ledger().has_acted("at://did:plc:alice/app.bsky.feed.post/3"));
}

#[tokio::test]
async fn reappearing_uri_acted_on_once_within_a_run() {
    // The same post matches two monitored tags, so it shows up twice in
    // the candidate pool.
    let p = post(1, "cross-posted #GameAssets #UnityAssets");
    let search = Arc::new(
        MockSearch::new()
            .with_posts("#GameAssets", vec![p.clone()])
            .with_posts("#UnityAssets", vec![p]),
    );
    let actions = Arc::new(MockDispatcher::new());
    let mut engine = build_engine(
        search,
        actions.clone(),
        Ledger::in_memory(),
        config(&["#GameAssets", "#UnityAssets"], 5),
    );

    let summary = engine.run().await.unwrap();

    assert_eq!(summary.candidates, 2);
    assert_eq!(summary.attempted, 1);
    assert_eq!(summary.reposted, 1);
    assert_eq!(engine.ledger().len(), 1);
}

#[tokio::test]
async fn failed_tag_query_does_not_abort_the_run() {
    let search = Arc::new(
        MockSearch::new()
            .with_failure("#GameAssets")
            .with_posts("#UnityAssets", vec![post(1, "works #UnityAssets")]),
    );
    let actions = Arc::new(MockDispatcher::new());
    let mut engine = build_engine(
        search.clone(),
        actions,
        Ledger::in_memory(),
        config(&["#GameAssets", "#UnityAssets"], 5),
    );

    let summary = engine.run().await.unwrap();

    // Both tags were queried despite the first one failing.
    assert_eq!(search.queries(), vec!["#GameAssets", "#UnityAssets"]);
    assert_eq!(summary.candidates, 1);
    assert_eq!(summary.reposted, 1);
}

#[tokio::test]
async fn login_failure_is_fatal() {
    let mut engine = SweepEngine::new(
        Arc::new(MockSession::failing()),
        Arc::new(MockSearch::new()),
        Arc::new(MockDispatcher::new()),
        Ledger::in_memory(),
        Credentials {
            identifier: "bot.example.com".to_string(),
            secret: "wrong".to_string(),
        },
        config(&["#3DAssets"], 5),
    );

    let err = engine.run().await.unwrap_err();
    assert!(format!("{:#}", err).contains("authentication failed"));
}

#[tokio::test]
async fn rejected_posts_never_reach_dispatch() {
    let mut own = post(1, "self promo #3DAssets");
    own.author = "bot.example.com".to_string();

    let mut reply = post(2, "re: #3DAssets");
    reply.is_reply = true;

    let mut stale = post(3, "old news #3DAssets");
    stale.created_at = Utc::now() - Duration::hours(25);

    let untagged = post(4, "nothing to see here");

    let search = Arc::new(
        MockSearch::new().with_posts("#3DAssets", vec![own, reply, stale, untagged]),
    );
    let actions = Arc::new(MockDispatcher::new());
    let mut engine = build_engine(
        search,
        actions.clone(),
        Ledger::in_memory(),
        config(&["#3DAssets"], 5),
    );

    let summary = engine.run().await.unwrap();

    assert_eq!(summary.candidates, 4);
    assert_eq!(summary.attempted, 0);
    assert_eq!(summary.reposted, 0);
    assert!(actions.attempts().is_empty());
    assert!(engine.ledger().is_empty());
}

#[tokio::test]
async fn quota_denial_terminates_the_acting_loop() {
    let posts = vec![
        post(1, "one #3DAssets"),
        post(2, "two #3DAssets"),
        post(3, "three #3DAssets"),
    ];
    let search = Arc::new(MockSearch::new().with_posts("#3DAssets", posts));
    let actions = Arc::new(MockDispatcher::new());
    let mut engine = build_engine(
        search,
        actions.clone(),
        Ledger::in_memory(),
        config(&["#3DAssets"], 1),
    );

    let summary = engine.run().await.unwrap();

    assert_eq!(summary.attempted, 1);
    assert_eq!(actions.attempts().len(), 1);
    assert_eq!(engine.ledger().len(), 1);
}

#[tokio::test]
async fn like_failure_affects_neither_ledger_nor_quota() {
    let posts = vec![post(1, "one #3DAssets"), post(2, "two #3DAssets")];
    let search = Arc::new(MockSearch::new().with_posts("#3DAssets", posts));
    let actions = Arc::new(
        MockDispatcher::new().with_failing_like("at://did:plc:alice/app.bsky.feed.post/1"),
    );
    let mut engine = build_engine(
        search,
        actions.clone(),
        Ledger::in_memory(),
        config(&["#3DAssets"], 2),
    );

    let summary = engine.run().await.unwrap();

    // Post 1's like failed, but it is still recorded and still counted
    // as reposted; post 2 got both.
    assert_eq!(summary.reposted, 2);
    assert_eq!(engine.ledger().len(), 2);
    assert_eq!(actions.likes(), vec!["at://did:plc:alice/app.bsky.feed.post/2"]);
}

#[tokio::test]
async fn previously_recorded_post_is_skipped() {
    let mut ledger = Ledger::in_memory();
    ledger
        .record_acted("at://did:plc:alice/app.bsky.feed.post/1")
        .await
        .unwrap();

    let posts = vec![post(1, "seen before #3DAssets"), post(2, "new #3DAssets")];
    let search = Arc::new(MockSearch::new().with_posts("#3DAssets", posts));
    let actions = Arc::new(MockDispatcher::new());
    let mut engine = build_engine(search, actions.clone(), ledger, config(&["#3DAssets"], 5));

    let summary = engine.run().await.unwrap();

    assert_eq!(summary.attempted, 1);
    assert_eq!(actions.reposts(), vec!["at://did:plc:alice/app.bsky.feed.post/2"]);
}

#[tokio::test]
async fn run_with_zero_qualifying_posts_succeeds() {
    let search = Arc::new(MockSearch::new());
    let actions = Arc::new(MockDispatcher::new());
    let mut engine = build_engine(
        search,
        actions,
        Ledger::in_memory(),
        config(&["#3DAssets"], 5),
    );

    let summary = engine.run().await.unwrap();

    assert_eq!(summary.candidates, 0);
    assert_eq!(summary.attempted, 0);
    assert_eq!(summary.reposted, 0);
}
