//! Row-major tables with stable row labels.

use indexmap::IndexMap;

use super::value::Value;
use crate::pipeline::EntityKind;

/// One row of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Row label. Raw tables label rows by source position; labels survive
    /// filtering and sorting until a reindex rewrites them densely.
    pub index: usize,
    /// Cell values, aligned with the table's columns.
    pub values: Vec<Value>,
}

impl Row {
    /// Create a row.
    pub fn new(index: usize, values: Vec<Value>) -> Self {
        Self { index, values }
    }
}

/// Tabular data with named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Column names in order.
    pub columns: Vec<String>,
    /// Rows in order.
    pub rows: Vec<Row>,
}

/// A table as received from an extraction collaborator.
pub type RawTable = Table;

impl Table {
    /// Create a table, labelling rows 0..n in the given order.
    ///
    /// Short rows are padded with `Null`; long rows are truncated. Sources
    /// that can deliver ragged rows warn before building the table.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(index, mut values)| {
                values.resize(width, Value::Null);
                Row::new(index, values)
            })
            .collect();
        Self { columns, rows }
    }

    /// Create a table of text cells.
    pub fn from_text(columns: &[&str], rows: &[Vec<&str>]) -> Self {
        Self::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|v| Value::text(*v)).collect())
                .collect(),
        )
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.rows
            .iter()
            .map(move |row| row.values.get(index).unwrap_or(&Value::Null))
    }

    /// Get a column by name.
    pub fn column_by_name(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.column_index(name)?;
        Some(self.column_values(index).collect())
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.values.get(col))
    }

    /// Get a cell by row position and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.get(row, col)
    }

    /// Row labels in order.
    pub fn indices(&self) -> Vec<usize> {
        self.rows.iter().map(|r| r.index).collect()
    }

    /// Check that row labels run 0..n without gaps.
    pub fn has_dense_index(&self) -> bool {
        self.rows.iter().enumerate().all(|(pos, row)| row.index == pos)
    }

    /// Number of null cells in a column.
    pub fn null_count(&self, column: &str) -> usize {
        self.column_index(column)
            .map(|idx| self.column_values(idx).filter(|v| v.is_null()).count())
            .unwrap_or(0)
    }

    /// Rows as ordered column → value maps.
    pub fn to_records(&self) -> Vec<IndexMap<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.values.iter().cloned())
                    .collect()
            })
            .collect()
    }
}

/// A table whose rows satisfy an entity's required-field rules.
///
/// Only the cleansing engine builds these. Every row holds a value for each
/// required column and row labels run densely from 0.
#[derive(Debug, Clone, PartialEq)]
pub struct CleansedTable {
    entity: EntityKind,
    table: Table,
}

impl CleansedTable {
    pub(crate) fn new(entity: EntityKind, table: Table) -> Self {
        Self { entity, table }
    }

    /// The entity this table was cleansed as.
    pub fn entity(&self) -> EntityKind {
        self.entity
    }

    /// Destination name for the load collaborator.
    pub fn destination(&self) -> &'static str {
        self.entity.destination()
    }

    /// Borrow the underlying table.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.table.columns
    }

    /// Rows in order.
    pub fn rows(&self) -> &[Row] {
        &self.table.rows
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    /// Get a cell by row position and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        self.table.value(row, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_pads_and_labels_rows() {
        let table = Table::new(
            vec!["a".into(), "b".into()],
            vec![vec![Value::text("1")], vec![Value::text("2"), Value::text("3")]],
        );

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(0, 1), Some(&Value::Null));
        assert_eq!(table.indices(), vec![0, 1]);
        assert!(table.has_dense_index());
    }

    #[test]
    fn test_column_lookup() {
        let table = Table::from_text(&["name", "age"], &[vec!["Alice", "30"], vec!["Bob", "NULL"]]);

        assert_eq!(table.column_index("age"), Some(1));
        assert_eq!(table.value(1, "name"), Some(&Value::text("Bob")));
        assert_eq!(table.column_by_name("missing"), None);
    }

    #[test]
    fn test_dense_index_detects_gaps() {
        let mut table = Table::from_text(&["a"], &[vec!["x"], vec!["y"]]);
        table.rows.remove(0);
        assert!(!table.has_dense_index());
    }

    #[test]
    fn test_to_records_keeps_column_order() {
        let table = Table::from_text(&["z", "a"], &[vec!["1", "2"]]);
        let records = table.to_records();
        let keys: Vec<_> = records[0].keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }
}
