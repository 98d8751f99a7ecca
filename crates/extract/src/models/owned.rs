use super::TitleId;

/// Minutes played, in total and split per platform.
///
/// The per-platform values only cover play sessions recorded since Steam
/// started tracking them, so they do not necessarily add up to `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Playtime {
    pub total: u64,
    pub linux: u64,
    pub mac: u64,
    pub windows: u64,
}

/// One entry of an account's library, as reported by the owned games endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedTitle {
    pub title_id: TitleId,
    /// Display name from the library listing. Independent of the store, so
    /// it is still known for delisted titles.
    pub name: Option<String>,
    pub playtime: Playtime,
}
impl OwnedTitle {
    pub fn new(title_id: impl Into<TitleId>, name: Option<String>, playtime: Playtime) -> Self {
        Self {
            title_id: title_id.into(),
            name,
            playtime,
        }
    }
}
