use crate::error::{Error, ErrorKind};
use crate::{TitleId, TitleMetadata};
use exn::ResultExt;
use serde_json::{from_str as from_json, to_string as to_json};
use sge_extract::models::{Availability, Platforms, ReleaseDate};
use time::UtcDateTime;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MetadataRow {
    pub(crate) title_id: i64,
    pub(crate) name: Option<String>,
    pub(crate) store_url: String,
    pub(crate) app_type: Option<String>,
    pub(crate) developers: String,
    pub(crate) publishers: String,
    pub(crate) is_free: Option<bool>,
    pub(crate) on_linux: Option<bool>,
    pub(crate) on_mac: Option<bool>,
    pub(crate) on_windows: Option<bool>,
    pub(crate) supported_languages: String,
    pub(crate) controller_support: Option<String>,
    pub(crate) age_gate: Option<i64>,
    pub(crate) categories: String,
    pub(crate) genres: String,
    pub(crate) release_date: Option<String>,
    pub(crate) fetched_at: i64,
    pub(crate) accessible: bool,
    pub(crate) retryable: bool,
}
impl TryFrom<&TitleMetadata> for MetadataRow {
    type Error = Error;
    fn try_from(metadata: &TitleMetadata) -> Result<Self, Self::Error> {
        Ok(Self {
            title_id: i64::from(metadata.title_id.get()),
            name: metadata.name.clone(),
            store_url: metadata.store_url.clone(),
            app_type: metadata.app_type.clone(),
            developers: to_json(&metadata.developers).or_raise(|| ErrorKind::InvalidData("developers"))?,
            publishers: to_json(&metadata.publishers).or_raise(|| ErrorKind::InvalidData("publishers"))?,
            is_free: metadata.is_free,
            on_linux: metadata.platforms.linux,
            on_mac: metadata.platforms.mac,
            on_windows: metadata.platforms.windows,
            supported_languages: to_json(&metadata.supported_languages)
                .or_raise(|| ErrorKind::InvalidData("supported languages"))?,
            controller_support: metadata.controller_support.clone(),
            age_gate: metadata.age_gate.map(i64::from),
            categories: to_json(&metadata.categories).or_raise(|| ErrorKind::InvalidData("categories"))?,
            genres: to_json(&metadata.genres).or_raise(|| ErrorKind::InvalidData("genres"))?,
            // Structured dates are stored in their ISO form, which parses
            // back to the same variant.
            release_date: metadata.release_date.as_ref().map(ToString::to_string),
            fetched_at: metadata.fetched_at.unix_timestamp(),
            accessible: metadata.availability.is_accessible(),
            retryable: metadata.availability.is_retryable(),
        })
    }
}
impl TryFrom<MetadataRow> for TitleMetadata {
    type Error = Error;
    fn try_from(row: MetadataRow) -> Result<Self, Self::Error> {
        let title_id = u32::try_from(row.title_id).or_raise(|| ErrorKind::InvalidData("title id"))?;
        Ok(Self {
            title_id: TitleId::new(title_id),
            name: row.name,
            store_url: row.store_url,
            app_type: row.app_type,
            developers: from_json(&row.developers).or_raise(|| ErrorKind::InvalidData("developers"))?,
            publishers: from_json(&row.publishers).or_raise(|| ErrorKind::InvalidData("publishers"))?,
            is_free: row.is_free,
            platforms: Platforms {
                linux: row.on_linux,
                mac: row.on_mac,
                windows: row.on_windows,
            },
            supported_languages: from_json(&row.supported_languages)
                .or_raise(|| ErrorKind::InvalidData("supported languages"))?,
            controller_support: row.controller_support,
            age_gate: row
                .age_gate
                .map(u32::try_from)
                .transpose()
                .or_raise(|| ErrorKind::InvalidData("age gate"))?,
            categories: from_json(&row.categories).or_raise(|| ErrorKind::InvalidData("categories"))?,
            genres: from_json(&row.genres).or_raise(|| ErrorKind::InvalidData("genres"))?,
            release_date: row.release_date.and_then(ReleaseDate::parse),
            fetched_at: UtcDateTime::from_unix_timestamp(row.fetched_at)
                .or_raise(|| ErrorKind::InvalidData("fetch date"))?,
            availability: Availability::from_flags(row.accessible, row.retryable),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Month};

    fn sample() -> TitleMetadata {
        let mut metadata = TitleMetadata::empty(TitleId::new(620), Availability::Accessible, UtcDateTime::now());
        metadata.name = Some("Portal 2".to_string());
        metadata.developers = vec!["Valve".to_string()];
        metadata.platforms.linux = Some(true);
        metadata.platforms.mac = Some(false);
        metadata.age_gate = Some(0);
        metadata.genres = vec!["Action".to_string(), "Adventure".to_string()];
        metadata.release_date = Some(ReleaseDate::Day(Date::from_calendar_date(2011, Month::April, 18).unwrap()));
        metadata
    }

    #[test]
    fn test_model_to_row() {
        let row = MetadataRow::try_from(&sample()).unwrap();
        assert_eq!(row.title_id, 620);
        assert_eq!(row.developers, r#"["Valve"]"#);
        assert_eq!(row.publishers, "[]");
        assert_eq!(row.on_windows, None);
        assert_eq!(row.release_date.as_deref(), Some("2011-04-18"));
        assert!(row.accessible);
        assert!(!row.retryable);
    }

    #[test]
    fn test_row_to_model() {
        let original = sample();
        let row = MetadataRow::try_from(&original).unwrap();
        let restored = TitleMetadata::try_from(row).unwrap();
        // Unix timestamps carry whole seconds only.
        assert_eq!(restored.fetched_at, original.fetched_at.replace_nanosecond(0).unwrap());
        assert_eq!(restored.platforms, original.platforms);
        assert_eq!(restored.release_date, original.release_date);
        assert_eq!(restored.genres, original.genres);
        assert_eq!(restored.availability, Availability::Accessible);
    }

    #[test]
    fn test_corrupt_list_is_invalid_data() {
        let mut row = MetadataRow::try_from(&sample()).unwrap();
        row.genres = "Action, Adventure".to_string();
        let error = TitleMetadata::try_from(row).unwrap_err();
        assert!(matches!(&*error, ErrorKind::InvalidData("genres")));
    }

    #[test]
    fn test_negative_title_id_is_invalid_data() {
        let mut row = MetadataRow::try_from(&sample()).unwrap();
        row.title_id = -3;
        assert!(TitleMetadata::try_from(row).is_err());
    }
}
