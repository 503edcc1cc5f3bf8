//! Typed parsing of source cells.
//!
//! All parsers are permissive: a value that cannot be understood yields
//! `None` instead of an error, and the caller decides whether a missing value
//! is imputed, stored as null, or grounds for dropping the row.

use chrono::{NaiveDate, NaiveDateTime};

/// Date-time layouts seen in incident exports, tried in order.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    // City of Chicago portal export, e.g. "01/15/2024 10:30:00 PM"
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts, interpreted as midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parses a report timestamp. Returns `None` if no known layout matches.
#[must_use]
pub fn parse_report_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Parses a boolean flag such as `Arrest` or `Domestic`.
#[must_use]
pub fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" | "1.0" => Some(true),
        "false" | "f" | "no" | "n" | "0" | "0.0" => Some(false),
        _ => None,
    }
}

/// Parses a finite floating-point number. `NaN` and infinities are treated
/// as missing.
#[must_use]
pub fn parse_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a year, accepting spreadsheet floats with no fractional part
/// (e.g., `"2024.0"`).
#[must_use]
pub fn parse_year(s: &str) -> Option<i32> {
    let s = s.trim();
    if let Ok(year) = s.parse::<i32>() {
        return Some(year);
    }

    let value = parse_float(s)?;
    if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return None;
    }

    #[allow(clippy::cast_possible_truncation)]
    Some(value as i32)
}
