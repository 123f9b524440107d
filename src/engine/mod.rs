pub mod sweep;

use anyhow::Result;
use async_trait::async_trait;

/// What one run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Posts fetched across all tag queries, duplicates included.
    pub candidates: usize,
    /// Primary dispatches attempted, failures included.
    pub attempted: usize,
    /// Primary dispatches that succeeded.
    pub reposted: usize,
}

/// The outermost boundary. main.rs only knows this trait.
#[async_trait]
pub trait Engine: Send + Sync {
    async fn run(&mut self) -> Result<RunSummary>;
}
