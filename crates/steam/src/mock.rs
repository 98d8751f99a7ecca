//! In-memory sources for testing.

use crate::classify::{TerminalReason, TransientReason};
use crate::error::{ErrorKind, Result};
use crate::{OwnedGames, StoreMetadata};
use async_trait::async_trait;
use sge_extract::models::{AccountId, Availability, OwnedTitle, TitleId, TitleMetadata};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use time::UtcDateTime;

enum OwnedAnswer {
    Titles(Vec<OwnedTitle>),
    Private,
    Unavailable,
}

/// Owned-games source with a canned answer for every account.
pub struct MockOwnedGames {
    answer: OwnedAnswer,
}

impl MockOwnedGames {
    pub fn with_titles(titles: impl IntoIterator<Item = OwnedTitle>) -> Self {
        Self {
            answer: OwnedAnswer::Titles(titles.into_iter().collect()),
        }
    }

    pub fn private() -> Self {
        Self {
            answer: OwnedAnswer::Private,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            answer: OwnedAnswer::Unavailable,
        }
    }
}

#[async_trait]
impl OwnedGames for MockOwnedGames {
    async fn owned_titles(&self, _account: AccountId) -> Result<Vec<OwnedTitle>> {
        match &self.answer {
            OwnedAnswer::Titles(titles) => Ok(titles.clone()),
            OwnedAnswer::Private => exn::bail!(ErrorKind::AccountPrivate),
            OwnedAnswer::Unavailable => exn::bail!(ErrorKind::UpstreamUnavailable),
        }
    }
}

/// How [`MockStore`] answers for one title.
#[derive(Debug, Clone)]
pub enum MockTitle {
    /// Accessible: a Windows game with the given name.
    Named(String),
    /// Refused with the given HTTP status.
    Refused(u16),
    /// Every attempt fails transiently.
    Flaky,
}

/// Store metadata source with canned answers per title.
///
/// Titles without an answer are refused with a 404. Every call is counted,
/// and can be slowed down to widen race windows in concurrency tests.
///
/// # Examples
///
/// ```
/// use sge_extract::models::TitleId;
/// use sge_steam::{MockStore, MockTitle, StoreMetadata};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = MockStore::new([(TitleId::new(620), MockTitle::Named("Portal 2".to_string()))]);
/// let metadata = store.title_metadata(TitleId::new(620)).await.unwrap();
/// assert_eq!(metadata.name.as_deref(), Some("Portal 2"));
/// assert!(store.title_metadata(TitleId::new(1)).await.is_err());
/// assert_eq!(store.total_calls(), 2);
/// # }
/// ```
pub struct MockStore {
    titles: HashMap<TitleId, MockTitle>,
    delay: Duration,
    calls: Mutex<HashMap<TitleId, usize>>,
}

impl MockStore {
    pub fn new(titles: impl IntoIterator<Item = (TitleId, MockTitle)>) -> Self {
        Self {
            titles: titles.into_iter().collect(),
            delay: Duration::ZERO,
            calls: Mutex::default(),
        }
    }

    /// Sleep for `delay` before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self, title_id: TitleId) -> usize {
        self.calls.lock().map(|calls| calls.get(&title_id).copied().unwrap_or(0)).unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().map(|calls| calls.values().sum()).unwrap_or(0)
    }
}

#[async_trait]
impl StoreMetadata for MockStore {
    async fn title_metadata(&self, title_id: TitleId) -> Result<TitleMetadata> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(title_id).or_default() += 1;
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.titles.get(&title_id) {
            Some(MockTitle::Named(name)) => {
                let mut metadata = TitleMetadata::empty(title_id, Availability::Accessible, UtcDateTime::now());
                metadata.name = Some(name.clone());
                metadata.app_type = Some("game".to_string());
                metadata.platforms.windows = Some(true);
                Ok(metadata)
            },
            Some(MockTitle::Refused(status)) => exn::bail!(ErrorKind::NotAccessible {
                title_id,
                reason: TerminalReason::Status(*status),
            }),
            Some(MockTitle::Flaky) => {
                let error = exn::Exn::from(ErrorKind::Transient(TransientReason::Status(503)));
                Err(error.raise(ErrorKind::RetriesExhausted { attempts: 1 }))
            },
            None => exn::bail!(ErrorKind::NotAccessible {
                title_id,
                reason: TerminalReason::Status(404),
            }),
        }
    }
}
