//! Numeric coercion and digit/price extraction.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::table::Value;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid regex"));

static PRICE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+\.\d{2})$").expect("valid regex"));

/// What to do with a value that cannot be read as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericPolicy {
    /// Replace it with the null marker.
    #[default]
    Coerce,
    /// Abort the run.
    Strict,
}

/// Target numeric type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericKind {
    Integer,
    Float,
}

/// Read a value as a number of the given kind.
///
/// `Null` stays `Null` (`Some(Value::Null)`); a value that is present but
/// not a number of that kind yields `None` so the caller can apply its
/// policy.
pub fn to_numeric(value: &Value, kind: NumericKind) -> Option<Value> {
    match (value, kind) {
        (Value::Null, _) => Some(Value::Null),
        (Value::Integer(i), NumericKind::Integer) => Some(Value::Integer(*i)),
        (Value::Integer(i), NumericKind::Float) => Some(Value::Float(*i as f64)),
        (Value::Float(f), NumericKind::Float) => Some(Value::Float(*f)),
        (Value::Float(f), NumericKind::Integer) => integral(*f).map(Value::Integer),
        (Value::Text(s), NumericKind::Integer) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(integral))
                .map(Value::Integer)
        }
        (Value::Text(s), NumericKind::Float) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::Float),
        _ => None,
    }
}

/// Convert a whole float to `i64`. Fractions, non-finite values and values
/// outside the `i64` range yield `None`.
pub(crate) fn integral(f: f64) -> Option<i64> {
    let in_range = (i64::MIN as f64..i64::MAX as f64).contains(&f);
    (in_range && f.fract() == 0.0).then_some(f as i64)
}

/// Coerce a value to a number, substituting `Null` on failure.
pub fn coerce_numeric(value: &Value, kind: NumericKind) -> Value {
    to_numeric(value, kind).unwrap_or(Value::Null)
}

/// Extract the first run of digits from a cell (`"J78"` → `"78"`).
///
/// Numbers pass through; cells with no digits become `Null`.
pub fn extract_digits(value: &Value) -> Value {
    match value {
        Value::Integer(_) | Value::Float(_) => value.clone(),
        Value::Text(s) => DIGIT_RUN
            .find(s)
            .map(|m| Value::text(m.as_str()))
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Extract a strict two-decimal price ending the cell (`"£9.99"` → 9.99).
///
/// Anything without that trailing pattern becomes `Null`.
pub fn extract_price(value: &Value) -> Value {
    match value {
        Value::Float(_) => value.clone(),
        Value::Integer(i) => Value::Float(*i as f64),
        Value::Text(s) => PRICE
            .captures(s.trim())
            .and_then(|caps| caps[1].parse::<f64>().ok())
            .map(Value::Float)
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}
