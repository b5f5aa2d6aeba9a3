//! CSV/TSV and JSON parser with delimiter detection.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use tracing::warn;

use super::source::SourceMetadata;
use crate::error::{CleanseError, Result};
use crate::table::{RawTable, Table, Value};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Shape of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimited text; the delimiter may be detected.
    Delimited,
    /// JSON array of records, or an object of columns keyed by row label.
    Json,
}

impl SourceFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(SourceFormat::Json),
            "csv" | "tsv" | "txt" | "psv" | "" => Ok(SourceFormat::Delimited),
            other => Err(CleanseError::UnsupportedFormat(format!(
                "'.{other}' files cannot be read"
            ))),
        }
    }
}

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Format override (None = from the file extension).
    pub format: Option<SourceFormat>,
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            format: None,
            delimiter: None,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Parses source files into raw tables.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the raw table and metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(RawTable, SourceMetadata)> {
        let path = path.as_ref();
        let io_err = |e| CleanseError::Io {
            path: path.to_path_buf(),
            source: e,
        };

        let mut file = File::open(path).map_err(io_err)?;
        let size_bytes = file.metadata().map_err(io_err)?.len();

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(io_err)?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let source_format = match self.config.format {
            Some(f) => f,
            None => SourceFormat::from_path(path)?,
        };

        let (table, format) = match source_format {
            SourceFormat::Json => (self.parse_json(&contents)?, "json".to_string()),
            SourceFormat::Delimited => {
                let delimiter = match self.config.delimiter {
                    Some(d) => d,
                    None => detect_delimiter(&contents)?,
                };
                let format = match delimiter {
                    b'\t' => "tsv",
                    b',' => "csv",
                    b';' => "csv-semicolon",
                    b'|' => "psv",
                    _ => "delimited",
                };
                (self.parse_delimited(&contents, delimiter)?, format.to_string())
            }
        };

        let metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            format,
            table.row_count(),
            table.column_count(),
        );

        Ok((table, metadata))
    }

    /// Parse delimited bytes. Empty cells become `Null`, everything else `Text`.
    pub fn parse_delimited(&self, bytes: &[u8], delimiter: u8) -> Result<RawTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let headers = reader.headers()?.clone();
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(CleanseError::EmptyData("No columns found".to_string()));
        }
        let headers: Vec<String> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                if h.is_empty() {
                    format!("Unnamed: {i}")
                } else {
                    h.to_string()
                }
            })
            .collect();

        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            if self.config.max_rows.is_some_and(|max| row_idx >= max) {
                break;
            }

            let record = result?;
            if record.len() > headers.len() {
                warn!(
                    row = row_idx,
                    cells = record.len(),
                    columns = headers.len(),
                    "row has more cells than the header; extra cells dropped"
                );
            }
            let row: Vec<Value> = record
                .iter()
                .map(|cell| {
                    if cell.is_empty() {
                        Value::Null
                    } else {
                        Value::text(cell)
                    }
                })
                .collect();
            rows.push(row);
        }

        Ok(Table::new(headers, rows))
    }

    /// Parse JSON bytes.
    ///
    /// Accepts an array of records (`[{"col": v, ...}, ...]`) or an object of
    /// columns (`{"col": {"0": v, "1": v}, ...}`), the layout a dataframe
    /// export produces. Column order follows first appearance.
    pub fn parse_json(&self, bytes: &[u8]) -> Result<RawTable> {
        let document: serde_json::Value = serde_json::from_slice(bytes)?;

        let table = match document {
            serde_json::Value::Array(_) => {
                let records: Vec<IndexMap<String, serde_json::Value>> =
                    serde_json::from_value(document)?;
                from_records(records)
            }
            serde_json::Value::Object(_) => {
                let columns: IndexMap<String, IndexMap<String, serde_json::Value>> =
                    serde_json::from_value(document)?;
                from_columns(columns)
            }
            _ => {
                return Err(CleanseError::UnsupportedFormat(
                    "JSON source must be an array of records or an object of columns".to_string(),
                ));
            }
        };

        match self.config.max_rows {
            Some(max) => {
                let mut table = table;
                table.rows.truncate(max);
                Ok(table)
            }
            None => Ok(table),
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

fn from_records(records: Vec<IndexMap<String, serde_json::Value>>) -> Table {
    let mut columns: Vec<String> = Vec::new();
    for record in &records {
        for key in record.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|c| record.get(c).map(Value::from_json).unwrap_or_default())
                .collect()
        })
        .collect();

    Table::new(columns, rows)
}

fn from_columns(columns: IndexMap<String, IndexMap<String, serde_json::Value>>) -> Table {
    let mut labels: Vec<&String> = Vec::new();
    for cells in columns.values() {
        for label in cells.keys() {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
    }
    labels.sort_by(|a, b| match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    });

    let rows = labels
        .iter()
        .map(|label| {
            columns
                .values()
                .map(|cells| cells.get(*label).map(Value::from_json).unwrap_or_default())
                .collect()
        })
        .collect();

    Table::new(columns.keys().cloned().collect(), rows)
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .map_while(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(CleanseError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        // Consistent counts across lines win; tabs break ties.
        let score = if counts.iter().all(|&c| c == first_count) {
            first_count * 1000 + if delim == b'\t' { 100 } else { 0 }
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_detect_delimiter_ignores_quoted_commas() {
        let data = b"address|locality\n\"1 Main St, Leeds\"|Leeds\n\"2 High St, York\"|York";
        assert_eq!(detect_delimiter(data).unwrap(), b'|');
    }

    #[test]
    fn test_parse_delimited_empty_cells_are_null() {
        let parser = Parser::new();
        let data = b"name,age,city\nAlice,30,\nBob,,LA";
        let table = parser.parse_delimited(data, b',').unwrap();

        assert_eq!(table.columns, vec!["name", "age", "city"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(0, 0), Some(&Value::text("Alice")));
        assert_eq!(table.get(0, 2), Some(&Value::Null));
        assert_eq!(table.get(1, 1), Some(&Value::Null));
    }

    #[test]
    fn test_parse_delimited_unnamed_header_cells() {
        let data = b",product_name,\n0,Kettle,x\n";
        let table = Parser::new().parse_delimited(data, b',').unwrap();

        assert_eq!(table.columns, vec!["Unnamed: 0", "product_name", "Unnamed: 2"]);
        assert_eq!(table.value(0, "Unnamed: 0"), Some(&Value::text("0")));
    }

    #[test]
    fn test_parse_delimited_long_row_keeps_header_width() {
        let data = b"a,b\n1,2,3,4\n5,6\n";
        let table = Parser::new().parse_delimited(data, b',').unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0].values, vec![Value::text("1"), Value::text("2")]);
        assert_eq!(table.rows[1].values, vec![Value::text("5"), Value::text("6")]);
    }

    #[test]
    fn test_parse_delimited_header_only() {
        let table = Parser::new().parse_delimited(b"a,b\n", b',').unwrap();
        assert_eq!(table.column_count(), 2);
        assert!(table.is_empty());
    }

    #[test]
    fn test_parse_json_records() {
        let data = br#"[{"b": 1, "a": "x"}, {"a": null, "b": 2.5, "c": "new"}]"#;
        let table = Parser::new().parse_json(data).unwrap();

        assert_eq!(table.columns, vec!["b", "a", "c"]);
        assert_eq!(table.get(0, 0), Some(&Value::Integer(1)));
        assert_eq!(table.get(1, 0), Some(&Value::Float(2.5)));
        assert_eq!(table.get(1, 1), Some(&Value::Null));
        assert_eq!(table.get(0, 2), Some(&Value::Null));
    }

    #[test]
    fn test_parse_json_columns_sorted_numerically() {
        let data = br#"{"day": {"10": "3", "2": "1", "0": "9"}, "year": {"0": "2020", "2": "2021", "10": "2022"}}"#;
        let table = Parser::new().parse_json(data).unwrap();

        assert_eq!(table.columns, vec!["day", "year"]);
        assert_eq!(table.value(0, "day"), Some(&Value::text("9")));
        assert_eq!(table.value(1, "day"), Some(&Value::text("1")));
        assert_eq!(table.value(2, "year"), Some(&Value::text("2022")));
    }

    #[test]
    fn test_parse_json_rejects_scalar() {
        let err = Parser::new().parse_json(b"42").unwrap_err();
        assert!(matches!(err, CleanseError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            SourceFormat::from_path(Path::new("orders.json")).unwrap(),
            SourceFormat::Json
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("stores.TSV")).unwrap(),
            SourceFormat::Delimited
        );
        assert!(SourceFormat::from_path(Path::new("cards.pdf")).is_err());
    }
}
