//! Repository for cached [`TitleMetadata`] rows.

use crate::error::{ErrorKind, Result};
use crate::models::MetadataRow;
use crate::{Database, Staleness, TitleId, TitleMetadata};
use exn::ResultExt;
use sge_extract::models::Availability;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;
use time::UtcDateTime;
use tracing::instrument;

/// SQLite refuses statements with more than 999 bound parameters (on older
/// builds), so bulk lookups are split into chunks of this size.
const MAX_BINDS: usize = 999;

/// Number of cached entries per availability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub accessible: u64,
    pub not_accessible: u64,
    pub unresolved: u64,
}
impl CacheStats {
    pub fn total(&self) -> u64 {
        self.accessible + self.not_accessible + self.unresolved
    }
}

/// Reads and writes [`TitleMetadata`] keyed by [`TitleId`].
///
/// The repository has no notion of freshness; it returns whatever is stored.
/// Callers decide what is stale with a [`Staleness`] policy.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Get/Fetch
    // =========================================================================

    pub async fn get(&self, title_id: TitleId) -> Result<Option<TitleMetadata>> {
        let row: Option<MetadataRow> = sqlx::query_as(include_str!("../queries/get_by_title_id.sql"))
            .bind(i64::from(title_id.get()))
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(TitleMetadata::try_from).transpose()
    }

    /// Fetch every cached entry among `title_ids`. Titles without an entry are
    /// absent from the map.
    #[instrument(skip_all, fields(titles = title_ids.len()))]
    pub async fn get_many(&self, title_ids: &[TitleId]) -> Result<HashMap<TitleId, TitleMetadata>> {
        let mut found = HashMap::with_capacity(title_ids.len());
        for chunk in title_ids.chunks(MAX_BINDS) {
            let mut query: QueryBuilder<'_, Sqlite> =
                QueryBuilder::new(include_str!("../queries/select_title_metadata.sql"));
            query.push(" WHERE title_id IN (");
            let mut separated = query.separated(", ");
            for title_id in chunk {
                separated.push_bind(i64::from(title_id.get()));
            }
            separated.push_unseparated(")");
            let rows: Vec<MetadataRow> = query
                .build_query_as()
                .fetch_all(&self.pool)
                .await
                .or_raise(|| ErrorKind::Database)?;
            for row in rows {
                let metadata = TitleMetadata::try_from(row)?;
                found.insert(metadata.title_id, metadata);
            }
        }
        Ok(found)
    }

    // =========================================================================
    // Insert
    // =========================================================================

    /// Insert or replace the entry for `metadata.title_id`.
    pub async fn put(&self, metadata: &TitleMetadata) -> Result<()> {
        let row = MetadataRow::try_from(metadata)?;
        sqlx::query(include_str!("../queries/upsert_title.sql"))
            .bind(row.title_id)
            .bind(row.name)
            .bind(row.store_url)
            .bind(row.app_type)
            .bind(row.developers)
            .bind(row.publishers)
            .bind(row.is_free)
            .bind(row.on_linux)
            .bind(row.on_mac)
            .bind(row.on_windows)
            .bind(row.supported_languages)
            .bind(row.controller_support)
            .bind(row.age_gate)
            .bind(row.categories)
            .bind(row.genres)
            .bind(row.release_date)
            .bind(row.fetched_at)
            .bind(row.accessible)
            .bind(row.retryable)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Returns `true` if an entry was deleted.
    pub async fn delete(&self, title_id: TitleId) -> Result<bool> {
        let result = sqlx::query(include_str!("../queries/delete_by_title_id.sql"))
            .bind(i64::from(title_id.get()))
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every entry that is stale under `staleness` at `now`, returning
    /// how many were removed.
    #[instrument(skip(self))]
    pub async fn prune(&self, staleness: &Staleness, now: UtcDateTime) -> Result<u64> {
        let result = sqlx::query(include_str!("../queries/delete_stale.sql"))
            .bind(staleness.cutoff(Availability::Accessible, now))
            .bind(staleness.cutoff(Availability::NotAccessible, now))
            .bind(staleness.cutoff(Availability::Unresolved, now))
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    // Counts
    // =========================================================================

    pub async fn stats(&self) -> Result<CacheStats> {
        let rows: Vec<(bool, bool, i64)> = sqlx::query_as(include_str!("../queries/count_by_availability.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let mut stats = CacheStats::default();
        for (accessible, retryable, entries) in rows {
            let entries = u64::try_from(entries).or_raise(|| ErrorKind::InvalidData("entry count"))?;
            match Availability::from_flags(accessible, retryable) {
                Availability::Accessible => stats.accessible += entries,
                Availability::NotAccessible => stats.not_accessible += entries,
                Availability::Unresolved => stats.unresolved += entries,
            }
        }
        Ok(stats)
    }
}
