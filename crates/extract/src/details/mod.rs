//! Extraction of [`TitleMetadata`] from the `data` object of an `appdetails`
//! store payload.

mod fields;

use self::fields::Fields;
use crate::consts;
use crate::models::{Availability, Platforms, ReleaseDate, TitleId, TitleMetadata};
use time::UtcDateTime;
use tracing::instrument;

/// A store field that was present but could not be interpreted. The field is
/// left out of the metadata; everything else is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedField {
    pub field: &'static str,
    /// JSON rendering of the offending value.
    pub value: String,
}

/// Result of extracting one title's details.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub metadata: TitleMetadata,
    pub malformed: Vec<MalformedField>,
}

/// Extract [`TitleMetadata`] from a store `data` object.
///
/// Never fails: absent fields become `None`/empty, and fields of the wrong
/// shape are dropped and listed in [`Extraction::malformed`]. A release date
/// that matches none of the known formats is kept as
/// [`ReleaseDate::Raw`].
#[instrument(skip(details, fetched_at))]
pub fn extract_details(title_id: TitleId, details: &serde_json::Value, fetched_at: UtcDateTime) -> Extraction {
    let mut fields = Fields::new(details);

    let platforms = match fields.nested("platforms") {
        Some(mut nested) => {
            let platforms = Platforms {
                linux: nested.flag("linux"),
                mac: nested.flag("mac"),
                windows: nested.flag("windows"),
            };
            fields.absorb(nested);
            platforms
        },
        None => Platforms::default(),
    };
    let release_date = match fields.nested("release_date") {
        Some(mut nested) => {
            let date = nested.text("date").and_then(ReleaseDate::parse);
            fields.absorb(nested);
            date
        },
        None => None,
    };
    let supported_languages = fields.text("supported_languages").map(parse_languages).unwrap_or_default();

    let metadata = TitleMetadata {
        title_id,
        name: fields.text("name"),
        store_url: title_id.store_url(),
        app_type: fields.text("type"),
        developers: fields.strings("developers"),
        publishers: fields.strings("publishers"),
        is_free: fields.flag("is_free"),
        platforms,
        supported_languages,
        controller_support: fields.text("controller_support"),
        age_gate: fields.count("required_age"),
        categories: fields.descriptions("categories"),
        genres: fields.descriptions("genres"),
        release_date,
        fetched_at,
        availability: Availability::Accessible,
    };
    Extraction {
        metadata,
        malformed: fields.into_malformed(),
    }
}

/// Parse the HTML fragment the store uses for supported languages.
///
/// The first line lists the languages, with `<strong>*</strong>` marking those
/// with full audio. Anything after the first `<br>` is a footnote explaining
/// the markers and is dropped.
///
/// ```
/// use sge_extract::parse_languages;
///
/// let html = "English<strong>*</strong>, French, Spanish - Spain<br><strong>*</strong>languages with full audio support";
/// assert_eq!(parse_languages(html), vec!["English", "French", "Spanish - Spain"]);
/// ```
pub fn parse_languages(html: impl AsRef<str>) -> Vec<String> {
    let html = html.as_ref();
    let first_line = consts::LINE_BREAK_REGEX.split(html).next().unwrap_or_default();
    let text = consts::HTML_TAG_REGEX.replace_all(first_line, "");
    text.split(',')
        .map(|language| language.trim().trim_end_matches('*').trim())
        .filter(|language| !language.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::{Date, Month};

    fn full_payload() -> serde_json::Value {
        json!({
            "type": "game",
            "name": "Portal 2",
            "steam_appid": 620,
            "required_age": 0,
            "is_free": false,
            "controller_support": "full",
            "supported_languages": "English<strong>*</strong>, French<strong>*</strong>, German<br><strong>*</strong>languages with full audio support",
            "developers": ["Valve"],
            "publishers": ["Valve"],
            "platforms": {"windows": true, "mac": false, "linux": true},
            "categories": [{"id": 2, "description": "Single-player"}, {"id": 9, "description": "Co-op"}],
            "genres": [{"id": "1", "description": "Action"}, {"id": "25", "description": "Adventure"}],
            "release_date": {"coming_soon": false, "date": "18 Apr, 2011"},
        })
    }

    #[test]
    fn test_full_payload() {
        let extraction = extract_details(TitleId::new(620), &full_payload(), UtcDateTime::now());
        assert!(extraction.malformed.is_empty());
        let metadata = extraction.metadata;
        assert_eq!(metadata.name.as_deref(), Some("Portal 2"));
        assert_eq!(metadata.store_url, "https://store.steampowered.com/app/620");
        assert_eq!(metadata.app_type.as_deref(), Some("game"));
        assert_eq!(metadata.developers, vec!["Valve"]);
        assert_eq!(metadata.is_free, Some(false));
        assert_eq!(metadata.platforms.mac, Some(false));
        assert_eq!(metadata.supported_languages, vec!["English", "French", "German"]);
        assert_eq!(metadata.age_gate, Some(0));
        assert_eq!(metadata.categories, vec!["Single-player", "Co-op"]);
        assert_eq!(metadata.genres, vec!["Action", "Adventure"]);
        assert_eq!(
            metadata.release_date,
            Some(ReleaseDate::Day(Date::from_calendar_date(2011, Month::April, 18).unwrap()))
        );
        assert!(metadata.is_accessible());
    }

    #[test]
    fn test_sparse_payload() {
        let payload = json!({"name": "Soundtrack", "type": "music"});
        let extraction = extract_details(TitleId::new(1), &payload, UtcDateTime::now());
        assert!(extraction.malformed.is_empty());
        let metadata = extraction.metadata;
        assert_eq!(metadata.name.as_deref(), Some("Soundtrack"));
        assert!(metadata.developers.is_empty());
        assert_eq!(metadata.platforms, Platforms::default());
        assert_eq!(metadata.release_date, None);
        assert_eq!(metadata.age_gate, None);
    }

    #[test]
    fn test_malformed_field_keeps_the_rest() {
        let mut payload = full_payload();
        payload["platforms"] = json!("windows");
        payload["required_age"] = json!({"min": 18});
        let extraction = extract_details(TitleId::new(620), &payload, UtcDateTime::now());
        let fields: Vec<_> = extraction.malformed.iter().map(|m| m.field).collect();
        assert_eq!(fields, vec!["platforms", "required_age"]);
        assert_eq!(extraction.metadata.platforms, Platforms::default());
        assert_eq!(extraction.metadata.age_gate, None);
        assert_eq!(extraction.metadata.name.as_deref(), Some("Portal 2"));
        assert_eq!(extraction.metadata.genres.len(), 2);
    }

    #[test]
    fn test_unparseable_release_date_is_raw() {
        let mut payload = full_payload();
        payload["release_date"] = json!({"coming_soon": true, "date": "Coming soon"});
        let extraction = extract_details(TitleId::new(620), &payload, UtcDateTime::now());
        assert!(extraction.malformed.is_empty());
        assert_eq!(extraction.metadata.release_date, Some(ReleaseDate::Raw("Coming soon".to_string())));
    }

    #[test]
    fn test_data_not_an_object() {
        let extraction = extract_details(TitleId::new(5), &json!([1, 2, 3]), UtcDateTime::now());
        assert_eq!(extraction.malformed.len(), 1);
        assert_eq!(extraction.metadata.name, None);
        assert_eq!(extraction.metadata.store_url, "https://store.steampowered.com/app/5");
    }

    #[test]
    fn test_languages_without_markup() {
        assert_eq!(parse_languages("English, Japanese"), vec!["English", "Japanese"]);
        assert!(parse_languages("").is_empty());
        assert_eq!(parse_languages("English<br/>footnote"), vec!["English"]);
    }
}
