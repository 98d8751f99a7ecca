use regex::Regex;
use std::sync::LazyLock;

/// Public store page, the title id is appended.
pub(crate) const STORE_PAGE_URL: &str = "https://store.steampowered.com/app/";

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// Release date strategies, tried in this order. Store pages are localised by
// whoever entered the date, so the same month can be "Jun", "June" or "Jun.".
regex!(DAY_MONTH_YEAR_REGEX, r"^(\d{1,2})\s+([A-Za-z]{3,9})\.?,?\s+(\d{4})$");
regex!(MONTH_DAY_YEAR_REGEX, r"^([A-Za-z]{3,9})\.?\s+(\d{1,2}),?\s+(\d{4})$");
regex!(ISO_DATE_REGEX, r"^(\d{4})-(\d{1,2})-(\d{1,2})$");
regex!(MONTH_YEAR_REGEX, r"^([A-Za-z]{3,9})\.?,?\s+(\d{4})$");
regex!(ISO_MONTH_REGEX, r"^(\d{4})-(\d{1,2})$");
regex!(YEAR_REGEX, r"^(\d{4})$");

// Supported languages arrive as an HTML fragment.
regex!(LINE_BREAK_REGEX, r"(?i)<br\s*/?>");
regex!(HTML_TAG_REGEX, r"<[^>]*>");
