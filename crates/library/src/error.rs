//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that abort a whole export. Per-title failures never surface
/// here; they degrade that title's row instead.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The account's game details are not public.
    #[display("the account's game details are private; set \"Game details\" to Public in the Steam profile's privacy settings (https://steamcommunity.com/my/edit/settings)")]
    AccountPrivate,
    /// The owned-games list could not be retrieved.
    #[display("the owned games service is unavailable")]
    UpstreamUnavailable,
    /// The rows could not be encoded in the requested format.
    #[display("export encoding failure")]
    Export,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable)
    }
}
