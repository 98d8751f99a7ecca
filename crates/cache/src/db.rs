//! SQLite pool for the metadata cache.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use sqlx::sqlite::{
    SqliteAutoVacuum, SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

// Store requests are paced at roughly one per second, so reads never queue
// for long behind the single WAL writer.
const FILE_CONNECTIONS: u32 = 4;
// Concurrent exports write back at the same time; wait for the writer lock
// rather than failing with SQLITE_BUSY.
const BUSY_TIMEOUT: Duration = Duration::from_millis(2500);

/// The cache database. Clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the cache file at `path` and bring its
    /// schema up to date. The parent directory must exist.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let options = cache_options().filename(path.as_ref()).create_if_missing(true);
        Self::open(options, FILE_CONNECTIONS).await
    }

    /// A private in-memory cache, used by tests across the workspace.
    pub async fn connect_in_memory() -> Result<Self> {
        // Each connection to ":memory:" is a separate database.
        Self::open(cache_options().filename(":memory:"), 1).await
    }

    async fn open(options: SqliteConnectOptions, connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(connections)
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Database)?;
        MIGRATOR.run(&pool).await.or_raise(|| ErrorKind::Migration)?;
        debug!(connections, "metadata cache ready");
        Ok(Self { pool })
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Rewrite the file to give back space left by pruned rows.
    #[instrument(skip(self))]
    pub async fn vacuum(&self) -> Result<()> {
        sqlx::query("VACUUM").execute(&self.pool).await.or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    /// Refresh planner statistics and close the pool once every connection
    /// is returned.
    pub async fn close(&self) {
        _ = sqlx::query("PRAGMA optimize").execute(&self.pool).await;
        self.pool.close().await;
    }
}

/// Connection settings shared by file and in-memory caches. Pragmas set here
/// apply to every pooled connection.
fn cache_options() -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(BUSY_TIMEOUT)
        // Entries are overwritten far more often than deleted; `vacuum`
        // reclaims space on request.
        .auto_vacuum(SqliteAutoVacuum::None)
        .pragma("wal_autocheckpoint", "1000")
        .pragma("cache_size", "-4096")
        .pragma("temp_store", "MEMORY")
}
