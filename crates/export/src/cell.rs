use std::fmt::{Display, Formatter, Result as FmtResult};

/// Separator between the values of a multi-valued field.
pub const LIST_DELIMITER: &str = ",\n";
/// Longest text a spreadsheet cell may hold.
pub const MAX_CELL_CHARS: usize = 32_767;

/// A single exported value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(u64),
}
impl Cell {
    /// Text cell, sanitized. Blank text becomes [`Empty`](Self::Empty).
    pub fn text(value: impl AsRef<str>) -> Self {
        let sanitized = sanitize(value.as_ref());
        if sanitized.is_empty() { Self::Empty } else { Self::Text(sanitized) }
    }

    pub fn optional_text(value: Option<impl AsRef<str>>) -> Self {
        value.map(Self::text).unwrap_or_default()
    }

    pub fn flag(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Text("yes".to_string()),
            Some(false) => Self::Text("no".to_string()),
            None => Self::Empty,
        }
    }

    /// An empty list is an empty cell.
    pub fn list(values: &[String]) -> Self {
        Self::text(values.join(LIST_DELIMITER))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}
impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Empty => Ok(()),
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

/// Drop control characters other than newline and tab, and cap the length.
fn sanitize(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .take(MAX_CELL_CHARS)
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Portal 2", Cell::Text("Portal 2".to_string()))]
    #[case("  padded\t", Cell::Text("padded".to_string()))]
    #[case("bell\u{7}ringer\r\nnext", Cell::Text("bellringer\nnext".to_string()))]
    #[case("\u{0}\u{1b}", Cell::Empty)]
    #[case("", Cell::Empty)]
    fn test_text(#[case] input: &str, #[case] expected: Cell) {
        assert_eq!(Cell::text(input), expected);
    }

    #[test]
    fn test_text_is_capped() {
        let Cell::Text(text) = Cell::text("é".repeat(MAX_CELL_CHARS + 10)) else {
            panic!("expected text");
        };
        assert_eq!(text.chars().count(), MAX_CELL_CHARS);
    }

    #[test]
    fn test_flags_and_lists() {
        assert_eq!(Cell::flag(Some(true)).to_string(), "yes");
        assert_eq!(Cell::flag(Some(false)).to_string(), "no");
        assert_eq!(Cell::flag(None), Cell::Empty);
        let genres = vec!["Action".to_string(), "Indie".to_string()];
        assert_eq!(Cell::list(&genres).to_string(), "Action,\nIndie");
        assert_eq!(Cell::list(&[]), Cell::Empty);
        assert_eq!(Cell::Number(1200).to_string(), "1200");
    }
}
