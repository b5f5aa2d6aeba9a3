//! Fuzz target for date parsing.
//!
//! Exercises every layout, the compact `YYYYMMDD` form and the date-part
//! reconstruction on arbitrary input.

#![no_main]

use cleanse::normalize::{compose_datetime, date_from_parts, parse_date, parse_time};
use cleanse::Value;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1_000 {
        return;
    }

    if let Ok(raw) = std::str::from_utf8(data) {
        let _ = parse_date(raw);
        let _ = parse_time(raw);

        let parts: Vec<&str> = raw.splitn(4, '|').collect();
        if let [year, month, day, time] = parts[..] {
            let date = date_from_parts(&Value::text(year), &Value::text(month), &Value::text(day));
            if let Some(date) = date {
                let _ = compose_datetime(date, &Value::text(time));
            }
        }
    }
});
