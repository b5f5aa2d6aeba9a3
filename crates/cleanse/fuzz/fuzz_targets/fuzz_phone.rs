//! Fuzz target for phone normalization and validation.

#![no_main]

use cleanse::normalize::{normalize_phone, validate_phone};
use cleanse::Value;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1_000 {
        return;
    }

    if let Ok(raw) = std::str::from_utf8(data) {
        let normalized = normalize_phone(raw);
        assert!(!normalized.contains([' ', '-', '.', '(', ')']));

        for country in ["GB", "US", "DE", "FR"] {
            let _ = validate_phone(&Value::text(raw), &Value::text(country));
        }
    }
});
