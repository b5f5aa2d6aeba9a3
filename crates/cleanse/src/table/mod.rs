//! In-memory table model shared by every stage.

mod table;
mod value;

pub use table::{CleansedTable, RawTable, Row, Table};
pub use value::{DATE_FORMAT, DATETIME_FORMAT, TIME_FORMAT, Value};
