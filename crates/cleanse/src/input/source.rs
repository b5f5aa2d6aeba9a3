//! Table sources and extraction metadata.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::parser::{Parser, ParserConfig};
use crate::error::Result;
use crate::table::RawTable;

/// Metadata about an extracted source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, json, ...).
    pub format: String,
    /// Number of data rows.
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the extraction happened.
    pub extracted_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for an extracted file.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            row_count,
            column_count,
            extracted_at: Utc::now(),
        }
    }
}

/// Anything that can hand over a raw table.
///
/// Database readers, REST endpoints and PDF extractors all sit behind this
/// trait; the engine only ever sees the resulting [`RawTable`].
pub trait TableSource {
    /// Extract the table and describe where it came from.
    fn extract(&self) -> Result<(RawTable, SourceMetadata)>;
}

/// A delimited or JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    config: ParserConfig,
}

impl FileSource {
    /// Read a file with default parser settings.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            config: ParserConfig::default(),
        }
    }

    /// Read a file with custom parser settings.
    pub fn with_config(path: impl AsRef<Path>, config: ParserConfig) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            config,
        }
    }
}

impl TableSource for FileSource {
    fn extract(&self) -> Result<(RawTable, SourceMetadata)> {
        Parser::with_config(self.config.clone()).parse_file(&self.path)
    }
}
