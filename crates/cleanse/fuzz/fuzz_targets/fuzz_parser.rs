//! Fuzz target for the source parser.
//!
//! Malformed delimited or JSON input must surface as an error, never a
//! panic.

#![no_main]

use cleanse::Parser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    let parser = Parser::new();
    let _ = parser.parse_delimited(data, b',');
    let _ = parser.parse_json(data);
});
