//! Table sinks.

use std::fmt;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CleanseError, Result};
use crate::table::{CleansedTable, Value};

/// Name of the row-label column written ahead of the data columns.
const INDEX_COLUMN: &str = "index";

/// Anything that can accept a cleansed table.
pub trait TableSink {
    /// Store the table under a destination name and report where it went.
    fn load(&mut self, table: &CleansedTable, destination: &str) -> Result<PathBuf>;
}

/// On-disk layout of a written table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Tsv,
    Json,
}

impl OutputFormat {
    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = CleanseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(CleanseError::UnsupportedFormat(format!(
                "Unknown format: {s}. Use csv, tsv, or json."
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Writes `<dir>/<destination>.<ext>` files.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
    format: OutputFormat,
}

impl FileSink {
    /// Create a sink writing into `dir`.
    pub fn new(dir: impl AsRef<Path>, format: OutputFormat) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            format,
        }
    }

    /// Path a destination will be written to.
    pub fn path_for(&self, destination: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", destination, self.format.extension()))
    }

    fn write_delimited(&self, table: &CleansedTable, path: &Path, delimiter: u8) -> Result<()> {
        let file = create(path)?;
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(BufWriter::new(file));

        let with_index = !table.columns().iter().any(|c| c == INDEX_COLUMN);

        let mut header: Vec<&str> = Vec::with_capacity(table.columns().len() + 1);
        if with_index {
            header.push(INDEX_COLUMN);
        }
        header.extend(table.columns().iter().map(String::as_str));
        writer.write_record(&header)?;

        for row in table.rows() {
            let mut record: Vec<String> = Vec::with_capacity(header.len());
            if with_index {
                record.push(row.index.to_string());
            }
            record.extend(row.values.iter().map(Value::render));
            writer.write_record(&record)?;
        }

        writer.flush().map_err(|e| CleanseError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(())
    }

    fn write_json(&self, table: &CleansedTable, path: &Path) -> Result<()> {
        let with_index = !table.columns().iter().any(|c| c == INDEX_COLUMN);

        let records: Vec<IndexMap<&str, Value>> = table
            .rows()
            .iter()
            .map(|row| {
                let mut record = IndexMap::with_capacity(row.values.len() + 1);
                if with_index {
                    record.insert(INDEX_COLUMN, Value::Integer(row.index as i64));
                }
                for (column, value) in table.columns().iter().zip(&row.values) {
                    record.insert(column.as_str(), value.clone());
                }
                record
            })
            .collect();

        let writer = BufWriter::new(create(path)?);
        serde_json::to_writer_pretty(writer, &records)?;
        Ok(())
    }
}

impl TableSink for FileSink {
    fn load(&mut self, table: &CleansedTable, destination: &str) -> Result<PathBuf> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| CleanseError::Io {
                path: self.dir.clone(),
                source: e,
            })?;
        }

        let path = self.path_for(destination);
        match self.format {
            OutputFormat::Csv => self.write_delimited(table, &path, b',')?,
            OutputFormat::Tsv => self.write_delimited(table, &path, b'\t')?,
            OutputFormat::Json => self.write_json(table, &path)?,
        }

        info!(
            destination,
            rows = table.row_count(),
            path = %path.display(),
            "table loaded"
        );
        Ok(path)
    }
}

fn create(path: &Path) -> Result<File> {
    File::create(path).map_err(|e| CleanseError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
