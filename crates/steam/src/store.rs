//! Client for the storefront `appdetails` endpoint.

use crate::StoreMetadata;
use crate::classify::{TransientReason, Verdict, classify};
use crate::error::{ErrorKind, Result};
use crate::http::{HttpOptions, transport_reason};
use crate::limiter::RateLimiter;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use exn::ResultExt;
use sge_extract::extract_details;
use sge_extract::models::{TitleId, TitleMetadata};
use std::time::Duration;
use time::UtcDateTime;
use tracing::{debug, instrument, warn};

pub const DEFAULT_STORE_URL: &str = "https://store.steampowered.com/api/appdetails";
const DEFAULT_COOL_OFF: Duration = Duration::from_secs(60);

/// Fetches and extracts store metadata for one title at a time.
///
/// Every attempt, retries included, first takes a permit from the shared
/// [`RateLimiter`]. A 429 pauses the limiter for everyone for the cool-off
/// period before the attempt is retried.
#[derive(Debug, Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    url: String,
    limiter: RateLimiter,
    retry: RetryPolicy,
    cool_off: Duration,
}

impl StoreClient {
    pub fn new(options: &HttpOptions, limiter: RateLimiter, retry: RetryPolicy) -> Result<Self> {
        Ok(Self {
            http: options.build()?,
            url: DEFAULT_STORE_URL.to_string(),
            limiter,
            retry,
            cool_off: DEFAULT_COOL_OFF,
        })
    }

    /// Point the client at a different endpoint (a proxy, or a test server).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// How long every request is paused after a 429.
    pub fn with_cool_off(mut self, cool_off: Duration) -> Self {
        self.cool_off = cool_off;
        self
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    async fn attempt(&self, title_id: TitleId) -> Result<TitleMetadata> {
        self.limiter.acquire().await;
        let appids = title_id.to_string();
        let response = match self.http.get(&self.url).query(&[("appids", appids.as_str())]).send().await {
            Ok(response) => response,
            Err(error) => {
                let reason = transport_reason(&error);
                return Err(error).or_raise(|| ErrorKind::Transient(reason));
            },
        };
        let status = response.status().as_u16();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(error) => {
                let reason = transport_reason(&error);
                return Err(error).or_raise(|| ErrorKind::Transient(reason));
            },
        };
        match classify(title_id, status, &body) {
            Verdict::Details(details) => {
                let extraction = extract_details(title_id, &details, UtcDateTime::now());
                if !extraction.malformed.is_empty() {
                    warn!(%title_id, malformed = extraction.malformed.len(), "store payload had malformed fields");
                }
                Ok(extraction.metadata)
            },
            Verdict::Terminal(reason) => {
                debug!(%title_id, %reason, "store refused title");
                exn::bail!(ErrorKind::NotAccessible { title_id, reason })
            },
            Verdict::Transient(reason) => {
                if reason == TransientReason::RateLimited {
                    self.limiter.penalize(self.cool_off);
                }
                exn::bail!(ErrorKind::Transient(reason))
            },
        }
    }
}

#[async_trait]
impl StoreMetadata for StoreClient {
    #[instrument(skip(self))]
    async fn title_metadata(&self, title_id: TitleId) -> Result<TitleMetadata> {
        self.retry.run(|_| self.attempt(title_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::TerminalReason;
    use crate::testing::mock_sequence;
    use tokio::time::Instant;

    const PORTAL_2: TitleId = TitleId::new(620);
    const DETAILS: &str = r#"{"620": {"success": true, "data": {
        "type": "game", "name": "Portal 2", "developers": ["Valve"],
        "release_date": {"coming_soon": false, "date": "18 Apr, 2011"}
    }}}"#;

    fn client(url: String) -> StoreClient {
        let retry = RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(40),
        };
        StoreClient::new(&HttpOptions::default(), RateLimiter::new(100, Duration::from_secs(1)), retry)
            .unwrap()
            .with_url(url)
            .with_cool_off(Duration::from_millis(200))
    }

    fn responses(items: &[(u16, &str)]) -> Vec<(u16, String)> {
        items.iter().map(|(status, body)| (*status, body.to_string())).collect()
    }

    #[tokio::test]
    async fn test_details() {
        let (url, handle) = mock_sequence(responses(&[(200, DETAILS)])).await;
        let metadata = client(url).title_metadata(PORTAL_2).await.unwrap();
        assert_eq!(metadata.name.as_deref(), Some("Portal 2"));
        assert_eq!(metadata.developers, vec!["Valve"]);
        assert!(metadata.is_accessible());
        let requests = handle.await.unwrap();
        assert!(requests[0].starts_with("GET /api?appids=620 "));
    }

    #[tokio::test]
    async fn test_forbidden_is_not_retried() {
        let (url, handle) = mock_sequence(responses(&[(403, "Access Denied"), (200, DETAILS)])).await;
        let error = client(url).title_metadata(PORTAL_2).await.unwrap_err();
        assert!(matches!(
            &*error,
            ErrorKind::NotAccessible {
                reason: TerminalReason::Status(403),
                ..
            }
        ));
        handle.abort();
    }

    #[tokio::test]
    async fn test_unsuccessful_envelope() {
        let (url, _handle) = mock_sequence(responses(&[(200, r#"{"620": {"success": false}}"#)])).await;
        let error = client(url).title_metadata(PORTAL_2).await.unwrap_err();
        assert!(matches!(
            &*error,
            ErrorKind::NotAccessible {
                reason: TerminalReason::Unlisted,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let (url, handle) = mock_sequence(responses(&[(503, ""), (200, ""), (200, DETAILS)])).await;
        let metadata = client(url).title_metadata(PORTAL_2).await.unwrap();
        assert_eq!(metadata.name.as_deref(), Some("Portal 2"));
        assert_eq!(handle.await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let (url, handle) = mock_sequence(responses(&[(500, ""), (502, ""), (503, "")])).await;
        let error = client(url).title_metadata(PORTAL_2).await.unwrap_err();
        assert!(matches!(&*error, ErrorKind::RetriesExhausted { attempts: 3 }));
        assert_eq!(handle.await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_rate_limited_cools_off() {
        let (url, _handle) = mock_sequence(responses(&[(429, ""), (200, DETAILS)])).await;
        let start = Instant::now();
        let metadata = client(url).title_metadata(PORTAL_2).await.unwrap();
        assert!(metadata.is_accessible());
        assert!(start.elapsed() >= Duration::from_millis(200));
    }
}
