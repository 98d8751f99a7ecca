use crate::TitleMetadata;
use sge_extract::models::Availability;
use std::time::Duration;
use time::UtcDateTime;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// How long a cached entry stays fresh, per availability.
///
/// `None` means entries with that availability never go stale. Store details
/// barely change once published, so accessible entries are kept forever by
/// default; a definitive "no" is checked again monthly in case the title is
/// relisted, and transient failures are retried after an hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Staleness {
    pub accessible: Option<Duration>,
    pub not_accessible: Option<Duration>,
    pub unresolved: Option<Duration>,
}
impl Default for Staleness {
    fn default() -> Self {
        Self {
            accessible: None,
            not_accessible: Some(30 * DAY),
            unresolved: Some(Duration::from_secs(60 * 60)),
        }
    }
}
impl Staleness {
    /// Staleness that never expires anything.
    pub const NEVER: Self = Self {
        accessible: None,
        not_accessible: None,
        unresolved: None,
    };

    pub fn max_age(&self, availability: Availability) -> Option<Duration> {
        match availability {
            Availability::Accessible => self.accessible,
            Availability::NotAccessible => self.not_accessible,
            Availability::Unresolved => self.unresolved,
        }
    }

    /// An entry fetched "in the future" (clock skew) is treated as fresh.
    pub fn is_stale(&self, metadata: &TitleMetadata, now: UtcDateTime) -> bool {
        let Some(max_age) = self.max_age(metadata.availability) else {
            return false;
        };
        let age = now.unix_timestamp() - metadata.fetched_at.unix_timestamp();
        age > 0 && age.unsigned_abs() > max_age.as_secs()
    }

    /// Unix timestamp before which entries with the given availability are
    /// stale, or `i64::MIN` if they never are.
    pub(crate) fn cutoff(&self, availability: Availability, now: UtcDateTime) -> i64 {
        match self.max_age(availability) {
            Some(max_age) => {
                let max_age = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
                now.unix_timestamp().saturating_sub(max_age)
            },
            None => i64::MIN,
        }
    }
}
