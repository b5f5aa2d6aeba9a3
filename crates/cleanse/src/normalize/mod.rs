//! Field rules: pure functions from a raw cell to a canonical cell or `Null`.
//!
//! Each rule is independent of any table. The pipeline stages apply them
//! column by column.

pub mod card;
pub mod date;
pub mod numeric;
pub mod phone;
pub mod values;
pub mod weight;

pub use card::{validate_card_number, validate_expiry};
pub use date::{
    DateParts, compose_datetime, date_from_parts, normalize_date, parse_date, parse_datetime,
    parse_time,
};
pub use numeric::{NumericKind, NumericPolicy, coerce_numeric, extract_digits, extract_price, to_numeric};
pub use phone::{PhoneRegion, normalize_phone, validate_phone};
pub use values::SubstitutionMap;
pub use weight::{OUNCES_PER_KILOGRAM, WeightForm, convert_weight, parse_weight};
