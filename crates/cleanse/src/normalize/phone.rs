//! Phone number normalization and per-country validation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::table::Value;

/// UK national format: 11 digits in area-code/subscriber groupings with an
/// optional `#` extension of 3-4 digits.
static GB_GRAMMAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^((\(?0\d{4}\)?\s?\d{3}\s?\d{3})|(\(?0\d{3}\)?\s?\d{3}\s?\d{4})|(\(?0\d{2}\)?\s?\d{4}\s?\d{4}))(\s?#(\d{4}|\d{3}))?$",
    )
    .expect("valid regex")
});

/// NANP: optional `00`/`+` + `1` prefix, area code starting 2-9, optional
/// `x` extension. Only the extension form is end-anchored.
static US_GRAMMAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^((00|\+)1)?(\(?[2-9]\d{2}\)?\d{3}\d{4})(x\d{3,5}$)?").expect("valid regex")
});

/// German numbers: optional `00`/`+` `49` prefix, first significant digit 2-9.
static DE_GRAMMAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^((00|\+)49)?(0?[2-9][0-9]{1,})$").expect("valid regex"));

/// Countries with a known phone grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhoneRegion {
    #[serde(rename = "GB")]
    Gb,
    #[serde(rename = "US")]
    Us,
    #[serde(rename = "DE")]
    De,
}

impl PhoneRegion {
    /// Look up a region by ISO country code. Unknown codes have no grammar.
    pub fn from_country_code(code: &str) -> Option<Self> {
        match code.trim() {
            "GB" => Some(PhoneRegion::Gb),
            "US" => Some(PhoneRegion::Us),
            "DE" => Some(PhoneRegion::De),
            _ => None,
        }
    }

    fn grammar(&self) -> &'static Regex {
        match self {
            PhoneRegion::Gb => &GB_GRAMMAR,
            PhoneRegion::Us => &US_GRAMMAR,
            PhoneRegion::De => &DE_GRAMMAR,
        }
    }

    /// Check a normalized number against this region's grammar.
    pub fn accepts(&self, normalized: &str) -> bool {
        self.grammar().is_match(normalized)
    }
}

/// Strip calling-code and punctuation noise from a phone number.
///
/// In order: a leading `+44` or `+49` becomes the national `0`, a leading
/// `+1` is dropped, a parenthesized `(0)` is dropped, then remaining
/// parentheses, spaces, hyphens and periods are removed.
pub fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    let national = if let Some(rest) = trimmed
        .strip_prefix("+44")
        .or_else(|| trimmed.strip_prefix("+49"))
    {
        format!("0{}", rest)
    } else if let Some(rest) = trimmed.strip_prefix("+1") {
        rest.to_string()
    } else {
        trimmed.to_string()
    };

    national
        .replace("(0)", "")
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | ' ' | '-' | '.'))
        .collect()
}

/// Normalize a phone cell and validate it against the row's country.
///
/// Numbers for GB, US and DE that fail their grammar become `Null`. Rows
/// from any other (or a missing) country code are normalized but not
/// validated.
pub fn validate_phone(phone: &Value, country_code: &Value) -> Value {
    let Some(raw) = phone.to_text() else {
        return Value::Null;
    };
    let normalized = normalize_phone(&raw);

    let region = country_code
        .as_text()
        .and_then(PhoneRegion::from_country_code);

    match region {
        Some(region) if !region.accepts(&normalized) => Value::Null,
        _ => Value::Text(normalized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_uk_international() {
        assert_eq!(normalize_phone("+441234567890"), "01234567890");
        assert_eq!(normalize_phone("+44 (0)1234 567 890"), "01234567890");
        assert_eq!(normalize_phone("01234 567890"), "01234567890");
    }

    #[test]
    fn test_normalize_us_and_de() {
        assert_eq!(normalize_phone("+1-212-555-0100"), "2125550100");
        assert_eq!(normalize_phone("(212) 555.0100"), "2125550100");
        assert_eq!(normalize_phone("+49 30 1234567"), "0301234567");
    }

    #[test]
    fn test_gb_grammar() {
        assert!(PhoneRegion::Gb.accepts("01234567890"));
        assert!(PhoneRegion::Gb.accepts("02079460000#123"));
        assert!(!PhoneRegion::Gb.accepts("1234567890"));
        assert!(!PhoneRegion::Gb.accepts("012345678901"));
    }

    #[test]
    fn test_us_grammar() {
        assert!(PhoneRegion::Us.accepts("2125550100"));
        assert!(PhoneRegion::Us.accepts("0012125550100"));
        assert!(PhoneRegion::Us.accepts("2125550100x1234"));
        assert!(!PhoneRegion::Us.accepts("1125550100"));
        assert!(!PhoneRegion::Us.accepts("212555"));
    }

    #[test]
    fn test_de_grammar() {
        assert!(PhoneRegion::De.accepts("0301234567"));
        assert!(PhoneRegion::De.accepts("0049301234567"));
        assert!(!PhoneRegion::De.accepts("01234567890"));
        assert!(!PhoneRegion::De.accepts("1234567"));
    }

    #[test]
    fn test_validate_phone_by_country() {
        let gb = Value::text("GB");
        assert_eq!(
            validate_phone(&Value::text("+44 (0)1234 567 890"), &gb),
            Value::text("01234567890")
        );
        assert_eq!(validate_phone(&Value::text("12345"), &gb), Value::Null);
        assert_eq!(
            validate_phone(&Value::text("0123456789"), &Value::text("DE")),
            Value::Null
        );
    }

    #[test]
    fn test_unknown_country_passes_through() {
        assert_eq!(
            validate_phone(&Value::text("12-34"), &Value::text("FR")),
            Value::text("1234")
        );
        assert_eq!(validate_phone(&Value::text("12-34"), &Value::Null), Value::text("1234"));
        assert_eq!(validate_phone(&Value::Null, &Value::text("GB")), Value::Null);
    }
}
