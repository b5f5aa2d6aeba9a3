//! Free-text product weights to kilograms.
//!
//! Source weights arrive as strings like `"500g"`, `"1.2kg"`, `"16oz"`,
//! `"400ml"` or multipacks such as `"12 x 100g"`. Conversion strips stray
//! punctuation, recognizes exactly one unit form and yields kilograms.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::table::Value;

/// Ounces per kilogram.
pub const OUNCES_PER_KILOGRAM: f64 = 35.274;

/// Grams (and millilitres, at an assumed density of 1 g/ml) per kilogram.
pub const GRAMS_PER_KILOGRAM: f64 = 1000.0;

static NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9a-zA-Z.]+").expect("valid regex"));

static MULTIPACK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d+(?:\.\d+)?)x(\d+(?:\.\d+)?)g$").expect("valid regex")
});

static MILLILITRES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d+(?:\.\d+)?)ml$").expect("valid regex"));

static OUNCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d+(?:\.\d+)?)oz$").expect("valid regex"));

static KILOGRAMS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d+(?:\.\d+)?)kg$").expect("valid regex"));

static GRAMS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d*\.?\d*\d)g$").expect("valid regex"));

/// The unit form a weight string was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightForm {
    /// `<count>x<per-unit>g`
    Multipack,
    Millilitres,
    Ounces,
    Kilograms,
    Grams,
    /// A bare number, taken as kilograms.
    Bare,
}

impl WeightForm {
    /// Recognize the unit form of an already-stripped weight string.
    ///
    /// The suffix forms are mutually exclusive: `ml`, `oz` and `kg` are
    /// tested before the generic `g` so `"1kg"` is never read as grams.
    pub fn classify(cleaned: &str) -> Option<Self> {
        if MULTIPACK.is_match(cleaned) {
            Some(WeightForm::Multipack)
        } else if MILLILITRES.is_match(cleaned) {
            Some(WeightForm::Millilitres)
        } else if OUNCES.is_match(cleaned) {
            Some(WeightForm::Ounces)
        } else if KILOGRAMS.is_match(cleaned) {
            Some(WeightForm::Kilograms)
        } else if GRAMS.is_match(cleaned) {
            Some(WeightForm::Grams)
        } else if cleaned.parse::<f64>().is_ok_and(f64::is_finite) {
            Some(WeightForm::Bare)
        } else {
            None
        }
    }
}

/// Drop everything but letters, digits and decimal points.
///
/// Leading and trailing dots are stray punctuation too (`"77g ."`).
pub fn strip_noise(raw: &str) -> String {
    NOISE.replace_all(raw, "").trim_matches('.').to_string()
}

/// Parse a weight string into kilograms.
///
/// Returns `None` when the string is not a recognizable weight.
pub fn parse_weight(raw: &str) -> Option<f64> {
    let cleaned = strip_noise(raw);
    let form = WeightForm::classify(&cleaned)?;

    let kilograms = match form {
        WeightForm::Multipack => {
            let caps = MULTIPACK.captures(&cleaned)?;
            let count: f64 = caps[1].parse().ok()?;
            let per_unit: f64 = caps[2].parse().ok()?;
            count * per_unit / GRAMS_PER_KILOGRAM
        }
        WeightForm::Millilitres => leading_number(&MILLILITRES, &cleaned)? / GRAMS_PER_KILOGRAM,
        WeightForm::Ounces => leading_number(&OUNCES, &cleaned)? / OUNCES_PER_KILOGRAM,
        WeightForm::Kilograms => leading_number(&KILOGRAMS, &cleaned)?,
        WeightForm::Grams => leading_number(&GRAMS, &cleaned)? / GRAMS_PER_KILOGRAM,
        WeightForm::Bare => cleaned.parse().ok()?,
    };

    (kilograms.is_finite() && kilograms >= 0.0).then_some(kilograms)
}

fn leading_number(pattern: &Regex, cleaned: &str) -> Option<f64> {
    pattern.captures(cleaned)?.get(1)?.as_str().parse().ok()
}

/// Convert a weight cell to kilograms.
///
/// Numeric cells are already canonical and pass through unchanged, so
/// converting a converted column is a no-op. Unparseable text becomes `Null`.
pub fn convert_weight(value: &Value) -> Value {
    match value {
        Value::Integer(_) | Value::Float(_) | Value::Null => value.clone(),
        Value::Text(raw) => parse_weight(raw).map(Value::Float).unwrap_or(Value::Null),
        _ => Value::Null,
    }
}
