use crate::cell::Cell;
use sge_extract::models::{OwnedTitle, TitleMetadata};

/// Header of every export, in column order.
pub const COLUMNS: [&str; 19] = [
    "store_url",
    "name",
    "playtime_forever",
    "playtime_linux_forever",
    "playtime_mac_forever",
    "playtime_windows_forever",
    "type",
    "developers",
    "publishers",
    "is_free",
    "on_linux",
    "on_mac",
    "on_windows",
    "supported_languages",
    "controller_support",
    "required_age",
    "categories",
    "genres",
    "release_date",
];

/// One owned title merged with whatever the store said about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    cells: [Cell; COLUMNS.len()],
    /// Whether accessible store metadata was merged in.
    enriched: bool,
}

impl ExportRow {
    /// Merge an owned title with its store metadata.
    ///
    /// Without metadata, or with metadata for a title the store would not
    /// describe, the row is degraded: store link, name and playtimes only.
    /// The library listing's name wins over the store's.
    pub fn merge(owned: &OwnedTitle, metadata: Option<&TitleMetadata>) -> Self {
        let metadata = metadata.filter(|metadata| metadata.is_accessible());
        let name = owned.name.as_deref().or(metadata.and_then(|m| m.name.as_deref()));
        let playtime = owned.playtime;
        let mut cells = [
            Cell::text(owned.title_id.store_url()),
            Cell::optional_text(name),
            Cell::Number(playtime.total),
            Cell::Number(playtime.linux),
            Cell::Number(playtime.mac),
            Cell::Number(playtime.windows),
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
        ];
        if let Some(metadata) = metadata {
            let details = [
                Cell::optional_text(metadata.app_type.as_deref()),
                Cell::list(&metadata.developers),
                Cell::list(&metadata.publishers),
                Cell::flag(metadata.is_free),
                Cell::flag(metadata.platforms.linux),
                Cell::flag(metadata.platforms.mac),
                Cell::flag(metadata.platforms.windows),
                Cell::list(&metadata.supported_languages),
                Cell::optional_text(metadata.controller_support.as_deref()),
                metadata.age_gate.map(|age| Cell::Number(u64::from(age))).unwrap_or_default(),
                Cell::list(&metadata.categories),
                Cell::list(&metadata.genres),
                Cell::optional_text(metadata.release_date.as_ref().map(ToString::to_string)),
            ];
            for (cell, detail) in cells[6..].iter_mut().zip(details) {
                *cell = detail;
            }
        }
        Self {
            cells,
            enriched: metadata.is_some(),
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Returns `true` if no accessible store metadata was merged into the
    /// row. A title whose store page is accessible but sparse is not
    /// degraded, even if all its metadata cells are empty.
    pub fn is_degraded(&self) -> bool {
        !self.enriched
    }
}
