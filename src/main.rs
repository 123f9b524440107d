use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use herald::banner::{BannerInfo, print_banner, print_run_summary};
use herald::bsky::Credentials;
use herald::bsky::client::BskyClient;
use herald::consts;
use herald::engine::Engine;
use herald::engine::sweep::{SweepConfig, SweepEngine};
use herald::filter::TagSet;
use herald::ledger::Ledger;
use herald::ledger::sqlite::SqliteStore;

#[derive(Parser)]
#[command(name = "herald", version, about = "Finds tagged posts and amplifies them.")]
struct Cli {
    /// Tag to monitor (repeat for several; defaults to the 3D-asset set)
    #[arg(short, long = "tag")]
    tags: Vec<String>,

    /// PDS service URL
    #[arg(long, default_value = consts::DEFAULT_SERVICE)]
    service: String,

    /// Ledger database path (use :memory: for ephemeral)
    #[arg(short, long)]
    db: Option<String>,

    /// Search results requested per tag
    #[arg(short, long, default_value_t = consts::DEFAULT_SEARCH_LIMIT)]
    limit: usize,

    /// Maximum reposts per run
    #[arg(short, long, default_value_t = consts::DEFAULT_MAX_REPOSTS)]
    max_reposts: usize,

    /// Posts older than this many hours are skipped
    #[arg(long, default_value_t = consts::DEFAULT_FRESHNESS_HOURS)]
    freshness_hours: i64,

    /// Delay between tag queries, in milliseconds
    #[arg(long, default_value_t = consts::DEFAULT_QUERY_DELAY_MS)]
    query_delay_ms: u64,

    /// Delay between repost actions, in milliseconds
    #[arg(long, default_value_t = consts::DEFAULT_ACTION_DELAY_MS)]
    action_delay_ms: u64,
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .with_context(|| format!("{} is not set", name))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let identifier = env_var("BSKY_HANDLE")?;
    let secret = env_var("BSKY_PASSWORD")?;

    let tags = if cli.tags.is_empty() {
        consts::DEFAULT_TAGS.iter().map(|t| t.to_string()).collect()
    } else {
        cli.tags.clone()
    };
    let tags = TagSet::new(tags)?;

    let db = cli
        .db
        .unwrap_or_else(|| consts::default_db_path().to_string_lossy().into_owned());
    if db != ":memory:"
        && let Some(parent) = Path::new(&db).parent()
    {
        std::fs::create_dir_all(parent)?;
    }

    let ledger_label = if db == ":memory:" { "ephemeral" } else { &db };

    print_banner(&BannerInfo {
        handle: &identifier,
        service: &cli.service,
        tag_count: tags.len(),
        ceiling: cli.max_reposts,
        ledger: ledger_label,
    });

    let ledger = Ledger::open(Box::new(SqliteStore::open(&db)?)).await?;
    let client = Arc::new(BskyClient::new(cli.service.clone()));

    let config = SweepConfig {
        tags,
        own_handle: identifier.clone(),
        freshness: chrono::Duration::hours(cli.freshness_hours),
        max_actions: cli.max_reposts,
        search_limit: cli.limit,
        query_delay: Duration::from_millis(cli.query_delay_ms),
        action_delay: Duration::from_millis(cli.action_delay_ms),
    };

    let mut engine = SweepEngine::new(
        client.clone(),
        client.clone(),
        client,
        ledger,
        Credentials { identifier, secret },
        config,
    );

    // Ctrl+C cancels the run; anything already recorded in the ledger
    // stays recorded.
    tokio::select! {
        result = engine.run() => {
            let summary = result?;
            print_run_summary(&summary);
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\ninterrupted");
        }
    }

    Ok(())
}
