use sge_cache::MetadataStore;
use sge_extract::models::AccountId;
use sge_steam::{OwnedGames, StoreMetadata};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on concurrent title resolutions.
pub const MAX_WORKERS: usize = 32;

/// What to export, and for whom. Exists only for the duration of one export;
/// the account id is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportRequest {
    pub account: AccountId,
    /// Without metadata, only the owned-games list is consulted and every
    /// metadata cell is left empty.
    pub include_metadata: bool,
}
impl ExportRequest {
    pub fn new(account: AccountId) -> Self {
        Self {
            account,
            include_metadata: true,
        }
    }

    pub fn without_metadata(mut self) -> Self {
        self.include_metadata = false;
        self
    }
}

/// Process-wide collaborators shared by every export.
///
/// Cheap to clone. The metadata store's in-flight table and the store
/// client's rate limiter are shared between clones, and so between concurrent
/// exports.
#[derive(Clone)]
pub struct Context {
    pub(crate) owned: Arc<dyn OwnedGames>,
    pub(crate) store: Arc<dyn StoreMetadata>,
    pub(crate) cache: MetadataStore,
    pub(crate) workers: usize,
    pub(crate) interval: Duration,
}

impl Context {
    /// `interval` is the rate limiter's spacing between store requests. It
    /// sizes the worker pool (see [`worker_count`]) and the time estimates.
    pub fn new(
        owned: Arc<dyn OwnedGames>,
        store: Arc<dyn StoreMetadata>,
        cache: MetadataStore,
        interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            owned,
            store,
            cache,
            workers: worker_count(timeout, interval),
            interval,
        }
    }

    /// Override the derived worker count. Clamped to `1..=MAX_WORKERS`.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.clamp(1, MAX_WORKERS);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn cache(&self) -> &MetadataStore {
        &self.cache
    }
}

/// Enough workers to keep the limiter saturated while a request takes as long
/// as it possibly can: `ceil(timeout / interval)`, clamped to
/// `1..=MAX_WORKERS`.
pub fn worker_count(timeout: Duration, interval: Duration) -> usize {
    if interval.is_zero() {
        return MAX_WORKERS;
    }
    let workers = timeout.as_nanos().div_ceil(interval.as_nanos());
    usize::try_from(workers).unwrap_or(MAX_WORKERS).clamp(1, MAX_WORKERS)
}
