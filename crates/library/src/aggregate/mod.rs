//! Merging an account's owned titles with their store metadata.
//!
//! The owned-games list is fetched once and decides both the set and the
//! order of the rows. Each title's metadata comes from the cache when fresh,
//! and otherwise from the store through the coalescing
//! [`MetadataStore`](sge_cache::MetadataStore). A title the store refuses or
//! never answers for still gets a (degraded) row; only a failure to list the
//! owned titles aborts the export.

mod resolve;
mod stream;

pub use self::stream::{AggregateEvent, Plan, TitleOutcome, aggregate, aggregate_stream};
