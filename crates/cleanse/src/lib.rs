//! Cleanse: field normalization and validation for retail sales data.
//!
//! Raw tables pulled from relational stores, REST endpoints, object storage
//! and PDF documents arrive with mixed date layouts, weights in assorted
//! units, country-specific phone formats, padded card numbers and sentinel
//! strings standing in for missing values. Cleanse turns each of six entity
//! tables (users, cards, stores, products, orders and sale date-parts) into a
//! canonical, typed table ready to load into a star schema.
//!
//! # Core Principles
//!
//! - **Per-cell, never fatal**: a value that cannot be made valid becomes
//!   `Null`; only a broken schema aborts a run
//! - **Explicit stages**: every entity is an ordered list of pure stages
//! - **Full audit**: every stage reports what it changed
//!
//! # Example
//!
//! ```no_run
//! use cleanse::{CleansingEngine, EntityKind, FileSource};
//!
//! let engine = CleansingEngine::new();
//! let result = engine
//!     .clean_source(EntityKind::Products, &FileSource::new("products.csv"))
//!     .unwrap();
//!
//! println!("Rows kept: {}", result.table.row_count());
//! println!("Rows dropped: {}", result.report.rows_dropped());
//! ```

pub mod engine;
pub mod error;
pub mod input;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod table;

pub use engine::{CleansingEngine, CleansingResult, EngineConfig};
pub use error::{CleanseError, Result};
pub use input::{FileSource, Parser, ParserConfig, SourceMetadata, TableSource};
pub use normalize::{
    SubstitutionMap, convert_weight, normalize_date, normalize_phone, validate_phone,
};
pub use output::{FileSink, OutputFormat, TableSink};
pub use pipeline::{
    CellAudit, CleansingReport, EntityKind, EntityPipeline, NullScope, SchemaPolicy, Stage,
    StageChange,
};
pub use table::{CleansedTable, RawTable, Row, Table, Value};
