//! Project-wide defaults.

use std::path::PathBuf;

/// Default PDS endpoint.
pub const DEFAULT_SERVICE: &str = "https://bsky.social";

/// Tags monitored when none are given on the command line.
pub const DEFAULT_TAGS: &[&str] = &[
    "#3DAssets",
    "#3DMarketplace",
    "#3DModels",
    "#GameAssets",
    "#UnityAssets",
    "#UnityStore",
    "#UnrealAssets",
    "#UnrealMarketplace",
    "#FABAssets",
    "#3DContentCreators",
    "#BlenderAssets",
];

/// Search results requested per tag query.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Maximum reposts dispatched in a single run.
pub const DEFAULT_MAX_REPOSTS: usize = 5;

/// Posts older than this many hours are considered stale.
pub const DEFAULT_FRESHNESS_HOURS: i64 = 24;

/// Delay between successive tag queries, in milliseconds.
pub const DEFAULT_QUERY_DELAY_MS: u64 = 1000;

/// Delay between successive repost actions, in milliseconds.
pub const DEFAULT_ACTION_DELAY_MS: u64 = 2000;

/// Default ledger path: `~/.herald/herald.db`.
pub fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .expect("cannot determine home directory")
        .join(".herald")
        .join("herald.db")
}
