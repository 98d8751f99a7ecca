use crate::consts;
use regex::Captures;
use std::fmt::{Display, Formatter, Result as FmtResult};
use time::{Date, Month};

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

type Strategy = fn(&str) -> Option<ReleaseDate>;

/// Parse strategies, most specific first.
const STRATEGIES: [Strategy; 6] = [
    day_month_year,
    month_day_year,
    iso_date,
    month_year,
    iso_month,
    year_only,
];

/// A release date, as precise as the store page allowed.
///
/// Store pages carry free-text dates ("12 Jun, 2022", "Jun 12, 2022",
/// "Q3 2024", "Coming soon"...). Anything that none of the known formats
/// understands is kept verbatim as [`Raw`](Self::Raw) rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseDate {
    Day(Date),
    Month { year: i32, month: Month },
    Year(i32),
    Raw(String),
}
impl ReleaseDate {
    /// Returns `None` only for blank input.
    pub fn parse(input: impl AsRef<str>) -> Option<Self> {
        let input = input.as_ref().trim();
        if input.is_empty() {
            return None;
        }
        Some(
            STRATEGIES
                .iter()
                .find_map(|strategy| strategy(input))
                .unwrap_or_else(|| Self::Raw(input.to_string())),
        )
    }

    pub fn is_structured(&self) -> bool {
        !matches!(self, Self::Raw(_))
    }
}
impl Display for ReleaseDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Day(date) => write!(f, "{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day()),
            Self::Month { year, month } => write!(f, "{:04}-{:02}", year, u8::from(*month)),
            Self::Year(year) => write!(f, "{:04}", year),
            Self::Raw(raw) => write!(f, "{}", raw),
        }
    }
}

/// Accepts "Jun", "June", "Sept"; rejects anything shorter than three letters
/// or that isn't the start of an English month name.
fn month_from_name(name: &str) -> Option<Month> {
    let name = name.to_lowercase();
    if name.len() < 3 {
        return None;
    }
    let position = MONTH_NAMES.iter().position(|full| full.starts_with(&name))?;
    Month::try_from(u8::try_from(position + 1).ok()?).ok()
}

fn month_from_number(number: &str) -> Option<Month> {
    Month::try_from(number.parse::<u8>().ok()?).ok()
}

fn capture<'a>(captures: &Captures<'a>, index: usize) -> Option<&'a str> {
    captures.get(index).map(|m| m.as_str())
}

fn calendar_date(year: &str, month: Month, day: &str) -> Option<ReleaseDate> {
    let date = Date::from_calendar_date(year.parse().ok()?, month, day.parse().ok()?).ok()?;
    Some(ReleaseDate::Day(date))
}

fn day_month_year(input: &str) -> Option<ReleaseDate> {
    let captures = consts::DAY_MONTH_YEAR_REGEX.captures(input)?;
    let month = month_from_name(capture(&captures, 2)?)?;
    calendar_date(capture(&captures, 3)?, month, capture(&captures, 1)?)
}

fn month_day_year(input: &str) -> Option<ReleaseDate> {
    let captures = consts::MONTH_DAY_YEAR_REGEX.captures(input)?;
    let month = month_from_name(capture(&captures, 1)?)?;
    calendar_date(capture(&captures, 3)?, month, capture(&captures, 2)?)
}

fn iso_date(input: &str) -> Option<ReleaseDate> {
    let captures = consts::ISO_DATE_REGEX.captures(input)?;
    let month = month_from_number(capture(&captures, 2)?)?;
    calendar_date(capture(&captures, 1)?, month, capture(&captures, 3)?)
}

fn month_year(input: &str) -> Option<ReleaseDate> {
    let captures = consts::MONTH_YEAR_REGEX.captures(input)?;
    Some(ReleaseDate::Month {
        year: capture(&captures, 2)?.parse().ok()?,
        month: month_from_name(capture(&captures, 1)?)?,
    })
}

fn iso_month(input: &str) -> Option<ReleaseDate> {
    let captures = consts::ISO_MONTH_REGEX.captures(input)?;
    Some(ReleaseDate::Month {
        year: capture(&captures, 1)?.parse().ok()?,
        month: month_from_number(capture(&captures, 2)?)?,
    })
}

fn year_only(input: &str) -> Option<ReleaseDate> {
    let captures = consts::YEAR_REGEX.captures(input)?;
    Some(ReleaseDate::Year(capture(&captures, 1)?.parse().ok()?))
}
