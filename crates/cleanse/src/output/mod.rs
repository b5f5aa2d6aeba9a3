//! Load adapters: write cleansed tables to their destinations.

mod sink;

pub use sink::{FileSink, OutputFormat, TableSink};
