//! Detection of attendance columns whose headers are calendar dates.
//!
//! Detection is advisory: it only pre-selects the attendance columns and the
//! caller may replace the selection.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime};

const MIN_YEAR: i32 = 2000;
const MAX_YEAR: i32 = 2100;

/// Month-name layouts accepted verbatim, abbreviated and spelled out.
const LITERAL_FORMATS: &[&str] = &[
    "%b %d, %Y",
    "%b %d %Y",
    "%d %b %Y",
    "%d %b, %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
];

/// Layouts tried by the lenient fallback parser, guarded by [`looks_parseable`]
/// and the year window.
const FALLBACK_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d-%b-%Y",
    "%d-%b-%y",
    "%b-%d-%Y",
    "%d %b %y",
    "%b %d, %y",
    "%A, %b %d, %Y",
    "%a, %b %d, %Y",
    "%a %b %d %Y",
];

const FALLBACK_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Header words that are never dates even if a lenient parser could bend them into one.
const NON_DATE_HEADERS: &[&str] = &[
    "id",
    "name",
    "first",
    "last",
    "first name",
    "last name",
    "student",
    "student id",
    "email",
    "exam",
    "quiz",
    "test",
    "midterm",
    "final",
    "homework",
    "assignment",
    "participation",
    "attendance",
    "total",
    "grade",
    "score",
    "notes",
    "comments",
];

/// Returns the non-excluded columns whose names read as calendar dates, in
/// their original order.
pub fn detect_dates<S: AsRef<str>>(columns: &[S], exclude: &HashSet<String>) -> Vec<String> {
    columns
        .iter()
        .map(|column| column.as_ref())
        .filter(|column| !exclude.contains(*column))
        .filter(|column| is_date_header(column))
        .map(str::to_string)
        .collect()
}

/// True when `header` names a calendar date.
pub fn is_date_header(header: &str) -> bool {
    let header = header.trim();
    if matches_literal(header) {
        return true;
    }
    if !looks_parseable(header) {
        return false;
    }
    parse_lenient(header)
        .map(|date| (MIN_YEAR..=MAX_YEAR).contains(&date.year()))
        .unwrap_or(false)
}

fn matches_literal(header: &str) -> bool {
    numeric_date(header).is_some()
        || LITERAL_FORMATS
            .iter()
            .any(|format| NaiveDate::parse_from_str(header, format).is_ok())
}

/// Parses `M/D/Y`, `M-D-Y` or `M.D.Y` with a two- or four-digit year.
fn numeric_date(header: &str) -> Option<NaiveDate> {
    let separator = ['/', '-', '.']
        .into_iter()
        .find(|separator| header.contains(*separator))?;
    let parts: Vec<&str> = header.split(separator).collect();
    let &[month, day, year] = parts.as_slice() else {
        return None;
    };

    let all_digits = |part: &str| !part.is_empty() && part.chars().all(|ch| ch.is_ascii_digit());
    if !(all_digits(month) && all_digits(day) && all_digits(year)) {
        return None;
    }
    if month.len() > 2 || day.len() > 2 {
        return None;
    }

    let year: i32 = match year.len() {
        2 => 2000 + year.parse::<i32>().ok()?,
        4 => year.parse().ok()?,
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
}

fn looks_parseable(header: &str) -> bool {
    if header.chars().count() < 4 {
        return false;
    }
    if header.chars().all(|ch| ch.is_ascii_digit()) {
        return false;
    }
    let lowered = header.to_lowercase();
    !NON_DATE_HEADERS.contains(&lowered.as_str())
}

fn parse_lenient(header: &str) -> Option<NaiveDate> {
    FALLBACK_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(header, format).ok())
        .or_else(|| {
            FALLBACK_DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(header, format).ok())
                .map(|datetime| datetime.date())
        })
}
