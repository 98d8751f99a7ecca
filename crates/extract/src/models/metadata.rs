use super::{Availability, ReleaseDate, TitleId};
use time::UtcDateTime;

/// Platform availability advertised on the store page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Platforms {
    pub linux: Option<bool>,
    pub mac: Option<bool>,
    pub windows: Option<bool>,
}

/// Public store metadata for a single title.
///
/// Every attribute may be missing from the store's response; missing scalars
/// are `None` and missing lists are empty. A title the store would not talk
/// about at all is represented with every attribute absent and an
/// [`Availability`] other than [`Accessible`](Availability::Accessible).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleMetadata {
    pub title_id: TitleId,
    pub name: Option<String>,
    pub store_url: String,
    /// Product type ("game", "dlc", "demo", "music", ...).
    pub app_type: Option<String>,
    pub developers: Vec<String>,
    pub publishers: Vec<String>,
    pub is_free: Option<bool>,
    pub platforms: Platforms,
    pub supported_languages: Vec<String>,
    pub controller_support: Option<String>,
    /// Minimum age required to view the store page.
    pub age_gate: Option<u32>,
    pub categories: Vec<String>,
    pub genres: Vec<String>,
    pub release_date: Option<ReleaseDate>,
    pub fetched_at: UtcDateTime,
    pub availability: Availability,
}
impl TitleMetadata {
    /// Metadata with every attribute absent.
    pub fn empty(title_id: TitleId, availability: Availability, fetched_at: UtcDateTime) -> Self {
        Self {
            title_id,
            name: None,
            store_url: title_id.store_url(),
            app_type: None,
            developers: Vec::new(),
            publishers: Vec::new(),
            is_free: None,
            platforms: Platforms::default(),
            supported_languages: Vec::new(),
            controller_support: None,
            age_gate: None,
            categories: Vec::new(),
            genres: Vec::new(),
            release_date: None,
            fetched_at,
            availability,
        }
    }

    /// Placeholder recorded when the store gave a definitive "no".
    pub fn not_accessible(title_id: TitleId, fetched_at: UtcDateTime) -> Self {
        Self::empty(title_id, Availability::NotAccessible, fetched_at)
    }

    /// Placeholder recorded when every attempt failed transiently.
    pub fn unresolved(title_id: TitleId, fetched_at: UtcDateTime) -> Self {
        Self::empty(title_id, Availability::Unresolved, fetched_at)
    }

    pub fn is_accessible(&self) -> bool {
        self.availability.is_accessible()
    }
}
