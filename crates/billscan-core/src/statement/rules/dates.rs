//! Date normalization for statement fields.

use chrono::{Datelike, NaiveDate};

/// Known statement date layouts, tried in order; the first that parses wins.
pub const DATE_FORMATS: [&str; 9] = [
    "%d %b %Y",  // 15 Jan 2024
    "%d/%m/%Y",  // 15/01/2024
    "%d-%m-%Y",  // 15-01-2024
    "%d-%b-%Y",  // 15-Jan-2024
    "%B %d, %Y", // January 15, 2024
    "%d %B %Y",  // 15 January 2024
    "%Y-%m-%d",  // 2024-01-15
    "%m/%d/%Y",  // 01/15/2024
    "%d.%m.%Y",  // 15.01.2024
];

/// Parse a raw matched date into a calendar date.
///
/// Interior whitespace runs (including line breaks) collapse to one space before
/// parsing. Years must have four digits. Unparsable input yields `None`.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .filter_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
        .find(|date| date.year() >= 1000)
}
