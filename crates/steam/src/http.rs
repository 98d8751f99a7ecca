use crate::classify::TransientReason;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Transport options shared by both clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOptions {
    /// Whole-request timeout, connection included.
    pub timeout: Duration,
    pub user_agent: String,
}
impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
impl HttpOptions {
    pub(crate) fn build(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()
            .or_raise(|| ErrorKind::InvalidConfiguration)
    }
}

/// What a failed send or body read means for the store.
pub(crate) fn transport_reason(error: &reqwest::Error) -> TransientReason {
    if error.is_timeout() { TransientReason::Timeout } else { TransientReason::Connection }
}
