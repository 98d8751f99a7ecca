//! Clients for the two upstream Steam services.
//!
//! - [`OwnedGamesClient`] lists the titles an account owns. It is called once
//!   per export and any failure aborts that export.
//! - [`StoreClient`] fetches public store metadata for one title. It is
//!   called once per uncached title, so every attempt goes through a shared
//!   [`RateLimiter`] and transient failures are retried by a [`RetryPolicy`].
//!   Responses are judged by [`classify`].
//!
//! Both are used through the [`OwnedGames`] and [`StoreMetadata`] traits so
//! that callers can substitute in-memory sources (see the `mock` feature).

mod classify;
pub mod error;
mod http;
mod limiter;
#[cfg(feature = "mock")]
mod mock;
mod owned;
mod retry;
mod store;
#[cfg(test)]
mod testing;

pub use crate::classify::{TerminalReason, TransientReason, Verdict, classify};
pub use crate::http::HttpOptions;
pub use crate::limiter::RateLimiter;
#[cfg(feature = "mock")]
pub use crate::mock::{MockOwnedGames, MockStore, MockTitle};
pub use crate::owned::{DEFAULT_OWNED_GAMES_URL, OwnedGamesClient};
pub use crate::retry::RetryPolicy;
pub use crate::store::{DEFAULT_STORE_URL, StoreClient};
use async_trait::async_trait;
use sge_extract::models::{AccountId, OwnedTitle, TitleId, TitleMetadata};

/// Source of the owned-titles list for an account.
#[async_trait]
pub trait OwnedGames: Send + Sync {
    /// Titles in the order the upstream listed them.
    ///
    /// Fails with [`AccountPrivate`](error::ErrorKind::AccountPrivate) or
    /// [`UpstreamUnavailable`](error::ErrorKind::UpstreamUnavailable).
    async fn owned_titles(&self, account: AccountId) -> error::Result<Vec<OwnedTitle>>;
}

/// Source of store metadata for a single title.
#[async_trait]
pub trait StoreMetadata: Send + Sync {
    /// Fails with [`NotAccessible`](error::ErrorKind::NotAccessible) when the
    /// store refused the title and
    /// [`RetriesExhausted`](error::ErrorKind::RetriesExhausted) when every
    /// attempt failed transiently.
    async fn title_metadata(&self, title_id: TitleId) -> error::Result<TitleMetadata>;
}
