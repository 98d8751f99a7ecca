//! SQLite cache database for Steam store metadata.
//!
//! Store metadata rarely changes and the store API is slow and rate limited,
//! so every fetched title is persisted and reused across exports, processes
//! and accounts. The cache is keyed by title id only; it holds nothing that
//! links a title to the accounts that own it.
//!
//! # Architecture
//! - [`Database`] owns the connection pool and runs the embedded migrations.
//! - [`Repository`] reads and writes [`TitleMetadata`] rows. Each row's
//!   `fetched_at` and availability are its freshness markers.
//! - [`Staleness`] decides, per availability, when a row must be refetched.
//! - [`MetadataStore`] is the cache-or-fetch critical section: concurrent
//!   lookups of the same title collapse into one upstream fetch.

mod db;
pub mod error;
mod models;
mod repo;
mod staleness;
mod store;

pub use crate::db::Database;
pub use crate::repo::{CacheStats, Repository};
pub use crate::staleness::Staleness;
pub use crate::store::{MetadataStore, Origin, Resolved};
pub(crate) use sge_extract::models::{TitleId, TitleMetadata};
