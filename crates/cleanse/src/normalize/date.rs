//! Mixed-format date parsing and composite date-time reconstruction.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use super::numeric::integral;
use crate::table::{DATE_FORMAT, Value};

/// Date layouts tried in order. Numeric month-first layouts win over
/// day-first ones; day-first is only reached when the month-first reading
/// is not a calendar date.
const DATE_LAYOUTS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%Y %B %d",
    "%B %Y %d",
    "%B %d %Y",
    "%B %d, %Y",
    "%d %B %Y",
];

/// Date-time layouts; only the date part is kept by [`parse_date`].
const DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const TIME_LAYOUTS: &[&str] = &["%H:%M:%S", "%H:%M:%S%.f", "%H:%M"];

/// Parse a date written in any of the recognized layouts.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Compact YYYYMMDD
    if trimmed.len() == 8 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(
            &format!("{}-{}-{}", &trimmed[..4], &trimmed[4..6], &trimmed[6..]),
            "%Y-%m-%d",
        )
        .ok();
    }

    if trimmed.contains(':') {
        if let Some(dt) = parse_datetime(trimmed) {
            return Some(dt.date());
        }
        // A supported date layout followed by a time of day.
        let (date_text, time_text) = trimmed.rsplit_once(char::is_whitespace)?;
        parse_time(time_text)?;
        return parse_date(date_text);
    }

    DATE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(trimmed, layout).ok())
}

/// Parse a date-time in one of the recognized layouts.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    DATETIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(trimmed, layout).ok())
}

/// Parse a time of day.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    TIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveTime::parse_from_str(trimmed, layout).ok())
}

/// Normalize a single date cell. Unresolvable values become `Null`.
pub fn normalize_date(value: &Value) -> Value {
    match value {
        Value::Date(_) => value.clone(),
        Value::DateTime(dt) => Value::Date(dt.date()),
        Value::Text(raw) => parse_date(raw).map(Value::Date).unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Read an integral date part from an integer, integral float or digit text.
fn date_part(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(i) => Some(*i),
        Value::Float(f) => integral(*f),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Build a calendar date from separate year, month and day cells.
///
/// Out-of-range parts (day 32, month 13, 30 February) yield `None`; they are
/// never clamped.
pub fn date_from_parts(year: &Value, month: &Value, day: &Value) -> Option<NaiveDate> {
    let year = i32::try_from(date_part(year)?).ok()?;
    let month = u32::try_from(date_part(month)?).ok()?;
    let day = u32::try_from(date_part(day)?).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Join a date with a time-of-day cell and re-parse the result.
///
/// The text round trip re-validates the time and canonicalizes its form.
pub fn compose_datetime(date: NaiveDate, time: &Value) -> Option<NaiveDateTime> {
    let time_text = match time {
        Value::Text(s) => s.trim().to_string(),
        Value::Time(_) => time.render(),
        _ => return None,
    };
    parse_datetime(&format!("{} {}", date.format(DATE_FORMAT), time_text))
}

/// Year, month, day and time-of-day of a validated composite value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParts {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub time: NaiveTime,
}

impl From<NaiveDateTime> for DateParts {
    fn from(dt: NaiveDateTime) -> Self {
        Self {
            year: dt.year(),
            month: dt.month(),
            day: dt.day(),
            time: dt.time(),
        }
    }
}
