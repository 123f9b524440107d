use std::collections::HashSet;
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::Connection;

use super::Store;

/// SQLite-backed ledger store. Use `":memory:"` for tests.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open ledger database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS reposted_posts (
                uri        TEXT PRIMARY KEY,
                first_seen TEXT NOT NULL DEFAULT (datetime('now'))
            )",
        )
        .context("failed to create ledger table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn load(&self) -> Result<HashSet<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT uri FROM reposted_posts")?;
        let uris = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(uris)
    }

    async fn save(&self, uris: &HashSet<String>) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        // OR IGNORE keeps the save idempotent; the set only ever grows.
        let mut stmt = conn.prepare("INSERT OR IGNORE INTO reposted_posts (uri) VALUES (?1)")?;
        for uri in uris {
            stmt.execute([uri])?;
        }
        Ok(())
    }
}
