//! Steam Client Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use crate::classify::{TerminalReason, TransientReason};
use derive_more::{Display, Error};
use sge_extract::models::TitleId;

/// A client error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The account's game details are not public. Nothing to export.
    #[display("the account's game details are private; set \"Game details\" to Public in the Steam profile's privacy settings (https://steamcommunity.com/my/edit/settings)")]
    AccountPrivate,
    /// The owned-games list could not be retrieved at all.
    #[display("the owned games service is unavailable")]
    UpstreamUnavailable,
    /// The store gave a definitive answer that it will not describe this
    /// title (delisted, unknown, region locked). Never retried.
    #[display("title {title_id} is not accessible: {reason}")]
    NotAccessible { title_id: TitleId, reason: TerminalReason },
    /// A failure that may well go away if asked again.
    #[display("transient store failure: {_0}")]
    Transient(#[error(not(source))] TransientReason),
    /// Every attempt allowed by the retry policy failed transiently.
    #[display("gave up after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
    /// The HTTP client could not be built from the given options.
    #[display("invalid client configuration")]
    InvalidConfiguration,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Returns `true` for failures that should abort a whole export rather
    /// than degrade a single title.
    pub fn is_job_level(&self) -> bool {
        matches!(self, Self::AccountPrivate | Self::UpstreamUnavailable | Self::InvalidConfiguration)
    }
}
