//! Payment card field checks.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::table::Value;

static EXPIRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^((0[1-9])|(1[0-2]))/(\d{2})$").expect("valid regex"));

static CARD_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{11,}$").expect("valid regex"));

/// Keep an expiry date only if it reads `MM/YY`.
pub fn validate_expiry(value: &Value) -> Value {
    match value.as_text() {
        Some(text) if EXPIRY.is_match(text) => value.clone(),
        _ => Value::Null,
    }
}

/// Keep a card number of 11 or more digits.
///
/// PDF extraction pads some numbers with `?`; those are scrubbed and
/// re-checked before being rejected. Integer cells are rendered to digits.
pub fn validate_card_number(value: &Value) -> Value {
    let Some(text) = value.to_text() else {
        return Value::Null;
    };
    if CARD_NUMBER.is_match(&text) {
        return Value::Text(text);
    }

    let scrubbed = text.trim_matches('?');
    if CARD_NUMBER.is_match(scrubbed) {
        Value::text(scrubbed)
    } else {
        Value::Null
    }
}
