//! Fuzz target for the weight converter.
//!
//! Conversion must never panic and never yield a negative or non-finite
//! weight.

#![no_main]

use cleanse::normalize::parse_weight;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1_000 {
        return;
    }

    if let Ok(raw) = std::str::from_utf8(data) {
        if let Some(kg) = parse_weight(raw) {
            assert!(kg.is_finite() && kg >= 0.0);
        }
    }
});
