//! Error types for the cleanse library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for cleanse operations.
///
/// Row-level data-quality problems never surface here: they become null
/// markers inside the table. Only conditions that invalidate a whole
/// entity run (or an adapter failure) are reported as errors.
#[derive(Debug, Error)]
pub enum CleanseError {
    /// Error reading or writing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The source table does not carry the columns the entity expects.
    #[error(
        "Schema mismatch for '{entity}': missing columns {missing:?}, unexpected columns {unexpected:?}"
    )]
    Schema {
        entity: String,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    /// A value could not be converted under a strict coercion policy.
    #[error("Cannot coerce '{value}' in column '{column}' (row {row}) for '{entity}'")]
    Coercion {
        entity: String,
        column: String,
        row: usize,
        value: String,
    },

    /// Entity name not recognized.
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    /// File format not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Empty file or no data to clean.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for cleanse operations.
pub type Result<T> = std::result::Result<T, CleanseError>;
