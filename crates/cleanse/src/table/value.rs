//! Cell values for raw and cleansed tables.

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};

/// Rendering format for date cells.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Rendering format for date-time cells.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Rendering format for time-of-day cells.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// A single cell.
///
/// Raw tables hold `Text`, `Integer`, `Float` and `Null` as delivered by the
/// source. Cleansing stages replace them with typed values, or with `Null`
/// when a value cannot be made valid. `Null` is the one "no valid value"
/// marker; an empty string is `Text("")`, not `Null`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
}

impl Value {
    /// Create a text value.
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    /// Check if this is the null marker.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this is a text value.
    pub fn is_text(&self) -> bool {
        matches!(self, Value::Text(_))
    }

    /// Borrow the text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric view of integer and float values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Render the value as cell text. `Null` renders as an empty string.
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Text(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Date(d) => d.format(DATE_FORMAT).to_string(),
            Value::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
            Value::Time(t) => t.format(TIME_FORMAT).to_string(),
        }
    }

    /// Text form used when a stage needs to pattern-match a cell.
    ///
    /// Numbers are rendered (a card number delivered as an integer still has
    /// digits to validate); `Null` has no text form.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Float(f)
                if f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(f) =>
            {
                Some((*f as i64).to_string())
            }
            other => Some(other.render()),
        }
    }

    /// Convert a JSON value delivered by a source.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Text(b.to_string()),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::Text(s.clone()),
            other => Value::Text(other.to_string()),
        }
    }

    /// Order two values for sorting.
    ///
    /// Values of the same kind compare naturally, dates and date-times compare
    /// on the timeline, integers and floats compare numerically. `Null` sorts
    /// after everything else; otherwise mismatched kinds compare equal so a
    /// stable sort leaves them in place.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Greater,
            (_, Value::Null) => Ordering::Less,
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::Date(a), Value::DateTime(b)) => a.and_time(NaiveTime::MIN).cmp(b),
            (Value::DateTime(a), Value::Date(b)) => a.cmp(&b.and_time(NaiveTime::MIN)),
            (Value::Time(a), Value::Time(b)) => a.cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            other => write!(f, "{}", other.render()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            other => serializer.serialize_str(&other.render()),
        }
    }
}
