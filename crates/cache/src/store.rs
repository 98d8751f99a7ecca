//! Cache-or-fetch with per-title request coalescing.

use crate::{Repository, Staleness, TitleId, TitleMetadata};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use time::UtcDateTime;
use tracing::{Instrument, debug, info_span, warn};

type Lookup = Shared<BoxFuture<'static, Resolved>>;

/// Where a resolved entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// A fresh entry was already cached.
    Cache,
    /// The entry was fetched upstream (and written back to the cache).
    Upstream,
}

#[derive(Debug, Clone)]
pub struct Resolved {
    pub metadata: TitleMetadata,
    pub origin: Origin,
}

/// Shared front door to the metadata cache.
///
/// [`resolve`](Self::resolve) returns the cached entry for a title if it is
/// fresh, and otherwise runs the supplied fetch and writes its result back.
/// Concurrent resolutions of the same title, from the same export or from
/// different ones, share a single lookup: at most one fetch per title is ever
/// in flight. Clones share the same in-flight table.
///
/// Cache failures never fail a resolution. An unreadable entry is treated as
/// a miss and a failed write-back is logged; the fetched metadata is returned
/// either way.
#[derive(Clone)]
pub struct MetadataStore {
    repo: Repository,
    staleness: Staleness,
    in_flight: Arc<Mutex<HashMap<TitleId, Lookup>>>,
}
impl MetadataStore {
    pub fn new(repo: Repository, staleness: Staleness) -> Self {
        Self {
            repo,
            staleness,
            in_flight: Arc::default(),
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn staleness(&self) -> &Staleness {
        &self.staleness
    }

    /// Fresh cached entries among `title_ids`, read in bulk.
    ///
    /// Used to plan an export before resolving titles one at a time; an entry
    /// returned here may still be refetched by [`resolve`](Self::resolve) if
    /// it goes stale in between.
    pub async fn fresh_entries(&self, title_ids: &[TitleId]) -> crate::error::Result<HashMap<TitleId, TitleMetadata>> {
        let now = UtcDateTime::now();
        let mut entries = self.repo.get_many(title_ids).await?;
        entries.retain(|_, metadata| !self.staleness.is_stale(metadata, now));
        Ok(entries)
    }

    /// Resolve metadata for `title_id`, calling `fetch` only if no fresh entry
    /// is cached and no other resolution of the same title is in progress.
    ///
    /// `fetch` must not fail: transport and store failures are expected to be
    /// folded into a not-accessible or unresolved placeholder, which is cached
    /// like any other result.
    ///
    /// The lookup runs as its own task. Callers that stop waiting do not stop
    /// it: it still finishes, writes back, and leaves the in-flight table.
    pub async fn resolve<F, Fut>(&self, title_id: TitleId, fetch: F) -> Resolved
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = TitleMetadata> + Send + 'static,
    {
        let lookup = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            match in_flight.get(&title_id) {
                Some(lookup) => {
                    debug!(%title_id, "joining in-flight lookup");
                    lookup.clone()
                },
                None => {
                    let task = tokio::spawn(self.lookup(title_id, fetch));
                    let lookup = async move {
                        match task.await {
                            Ok(resolved) => resolved,
                            Err(error) => {
                                warn!(%title_id, ?error, "lookup task failed");
                                Resolved {
                                    metadata: TitleMetadata::unresolved(title_id, UtcDateTime::now()),
                                    origin: Origin::Upstream,
                                }
                            },
                        }
                    }
                    .boxed()
                    .shared();
                    in_flight.insert(title_id, lookup.clone());
                    lookup
                },
            }
        };
        lookup.await
    }

    fn lookup<F, Fut>(&self, title_id: TitleId, fetch: F) -> impl Future<Output = Resolved> + Send + 'static
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = TitleMetadata> + Send + 'static,
    {
        let repo = self.repo.clone();
        let staleness = self.staleness;
        let retire = Retire {
            in_flight: Arc::clone(&self.in_flight),
            title_id,
        };
        async move {
            let resolved = Self::cache_or_fetch(&repo, &staleness, title_id, fetch).await;
            // The entry is written back before the lookup is retired, so a
            // resolution arriving after this point finds it in the cache.
            drop(retire);
            resolved
        }
        .instrument(info_span!("lookup", %title_id))
    }

    async fn cache_or_fetch<F, Fut>(repo: &Repository, staleness: &Staleness, title_id: TitleId, fetch: F) -> Resolved
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = TitleMetadata>,
    {
        match repo.get(title_id).await {
            Ok(Some(metadata)) if !staleness.is_stale(&metadata, UtcDateTime::now()) => {
                debug!(availability = %metadata.availability, "cache hit");
                return Resolved {
                    metadata,
                    origin: Origin::Cache,
                };
            },
            Ok(Some(_)) => debug!("cached entry is stale"),
            Ok(None) => debug!("cache miss"),
            Err(error) => warn!(?error, "unreadable cache entry, fetching instead"),
        }
        let metadata = fetch().await;
        if let Err(error) = repo.put(&metadata).await {
            warn!(?error, "could not write metadata back to the cache");
        }
        Resolved {
            metadata,
            origin: Origin::Upstream,
        }
    }
}

/// Removes a lookup from the in-flight table when its task ends, panics
/// included.
struct Retire {
    in_flight: Arc<Mutex<HashMap<TitleId, Lookup>>>,
    title_id: TitleId,
}
impl Drop for Retire {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.title_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use sge_extract::models::Availability;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    async fn store(staleness: Staleness) -> MetadataStore {
        let db = Database::connect_in_memory().await.unwrap();
        MetadataStore::new(Repository::from(&db), staleness)
    }

    fn counting_fetch(
        title_id: TitleId,
        calls: &Arc<AtomicUsize>,
    ) -> impl FnOnce() -> BoxFuture<'static, TitleMetadata> + Send + 'static {
        let calls = Arc::clone(calls);
        move || {
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                let mut metadata = TitleMetadata::empty(title_id, Availability::Accessible, UtcDateTime::now());
                metadata.name = Some(format!("Title {title_id}"));
                metadata
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn test_concurrent_resolutions_share_one_fetch() {
        let store = store(Staleness::default()).await;
        let calls = Arc::new(AtomicUsize::new(0));
        let title_id = TitleId::new(440);
        let resolutions = (0..8).map(|_| store.resolve(title_id, counting_fetch(title_id, &calls)));
        let results = futures::future::join_all(resolutions).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| r.metadata.name.as_deref() == Some("Title 440")));
        assert!(store.in_flight.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_resolution_is_served_from_cache() {
        let store = store(Staleness::default()).await;
        let calls = Arc::new(AtomicUsize::new(0));
        let title_id = TitleId::new(570);
        let first = store.resolve(title_id, counting_fetch(title_id, &calls)).await;
        let second = store.resolve(title_id, counting_fetch(title_id, &calls)).await;
        assert_eq!(first.origin, Origin::Upstream);
        assert_eq!(second.origin, Origin::Cache);
        assert_eq!(second.metadata.name, first.metadata.name);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_entry_is_refetched() {
        let store = store(Staleness::default()).await;
        let title_id = TitleId::new(10);
        let two_hours_ago = UtcDateTime::now() - Duration::from_secs(2 * 60 * 60);
        store.repository().put(&TitleMetadata::unresolved(title_id, two_hours_ago)).await.unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let resolved = store.resolve(title_id, counting_fetch(title_id, &calls)).await;
        assert_eq!(resolved.origin, Origin::Upstream);
        assert!(resolved.metadata.is_accessible());
        let cached = store.repository().get(title_id).await.unwrap().unwrap();
        assert!(cached.is_accessible());
    }

    #[tokio::test]
    async fn test_fresh_entries_skip_stale() {
        let store = store(Staleness::default()).await;
        let now = UtcDateTime::now();
        let long_ago = now - Duration::from_secs(2 * 60 * 60);
        store.repository().put(&TitleMetadata::not_accessible(TitleId::new(1), long_ago)).await.unwrap();
        store.repository().put(&TitleMetadata::unresolved(TitleId::new(2), long_ago)).await.unwrap();
        let ids = [TitleId::new(1), TitleId::new(2), TitleId::new(3)];
        let fresh = store.fresh_entries(&ids).await.unwrap();
        assert_eq!(fresh.len(), 1);
        assert!(fresh.contains_key(&TitleId::new(1)));
    }

    #[tokio::test]
    async fn test_abandoned_resolution_still_completes() {
        let store = store(Staleness::default()).await;
        let calls = Arc::new(AtomicUsize::new(0));
        let title_id = TitleId::new(220);
        let abandoned = tokio::time::timeout(
            Duration::from_millis(5),
            store.resolve(title_id, counting_fetch(title_id, &calls)),
        )
        .await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(store.in_flight.lock().unwrap().is_empty());
        let cached = store.repository().get(title_id).await.unwrap().unwrap();
        assert_eq!(cached.name.as_deref(), Some("Title 220"));

        let resolved = store.resolve(title_id, counting_fetch(title_id, &calls)).await;
        assert_eq!(resolved.origin, Origin::Cache);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
