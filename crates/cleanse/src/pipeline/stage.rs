//! Pipeline stages.
//!
//! Every stage consumes a table and returns a new one together with a
//! record of what it changed. Stages never fail on bad cell data: a value
//! that cannot be made valid becomes `Null`, and rows are only removed by
//! the explicit drop stages. A stage fails only when a column it needs is
//! absent, or when a strict numeric coercion meets a non-number.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{CleanseError, Result};
use crate::normalize::{
    DateParts, NumericKind, NumericPolicy, SubstitutionMap, compose_datetime, convert_weight,
    date_from_parts, extract_digits, extract_price, normalize_date, to_numeric,
    validate_card_number, validate_expiry, validate_phone,
};
use crate::table::{Table, Value};

use super::EntityKind;
use super::report::{CellAudit, StageChange};

/// Which cells make a row ineligible when null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullScope {
    /// Any column.
    Any,
    /// Only the listed columns.
    Columns(Vec<String>),
}

/// One step of an entity pipeline.
#[derive(Debug, Clone)]
pub enum Stage {
    /// Literal substitution across every cell.
    ///
    /// Pre: none. Post: no cell equals a key of the map.
    Substitute(SubstitutionMap),

    /// Parse a mixed-format date column.
    ///
    /// Post: the column holds `Date` or `Null`.
    ParseDate { column: String },

    /// Normalize a phone column and validate it against the row's country.
    ///
    /// Post: numbers from countries with a known grammar are valid or `Null`.
    ValidatePhone {
        column: String,
        country_column: String,
    },

    /// Keep `MM/YY` expiry dates only.
    ValidateExpiry { column: String },

    /// Keep card numbers of 11+ digits, scrubbing `?` padding first.
    ValidateCardNumber { column: String },

    /// Replace a cell by its first run of digits.
    ExtractDigits { column: String },

    /// Coerce a column to a number.
    ///
    /// Post: the column holds numbers of `kind` or `Null`. Under
    /// [`NumericPolicy::Strict`] a non-number aborts the run instead.
    CoerceNumeric {
        column: String,
        kind: NumericKind,
        policy: NumericPolicy,
    },

    /// Convert a textual weight column to kilograms.
    ///
    /// A column with no text cells is already canonical and left untouched.
    ConvertWeight { column: String },

    /// Extract a strict two-decimal price and make it numeric.
    ExtractPrice { column: String },

    /// Build a date-time column from year, month, day and time-of-day.
    ///
    /// Post: `target` exists and holds `DateTime` or `Null`.
    ComposeDateTime {
        year: String,
        month: String,
        day: String,
        time: String,
        target: String,
    },

    /// Re-derive year, month, day and time-of-day from a date-time column.
    ///
    /// Post: rows whose source is `Null` have all four parts `Null`.
    DecomposeDateTime {
        source: String,
        year: String,
        month: String,
        day: String,
        time: String,
    },

    /// Drop rows holding `Null` in the given scope.
    DropNulls(NullScope),

    /// Drop rows whose column holds the given text.
    DropMatching { column: String, value: String },

    /// Remove columns.
    DropColumns(Vec<String>),

    /// Sort ascending by `order_by` and keep only the last row per `key`.
    ///
    /// Rows with a null key are never collapsed.
    KeepLatest { key: String, order_by: String },

    /// Sort rows back into source order by their labels.
    RestoreOrder,

    /// Relabel rows 0..n in their current order.
    Reindex,
}

/// Per-run settings shared by all stages.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StageContext {
    pub entity: EntityKind,
    pub audit_samples: usize,
}

impl StageContext {
    fn missing_column(&self, column: &str) -> CleanseError {
        CleanseError::Schema {
            entity: self.entity.to_string(),
            missing: vec![column.to_string()],
            unexpected: Vec::new(),
        }
    }

    fn column(&self, table: &Table, column: &str) -> Result<usize> {
        table
            .column_index(column)
            .ok_or_else(|| self.missing_column(column))
    }
}

impl Stage {
    /// Short machine-friendly name.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Substitute(_) => "substitute",
            Stage::ParseDate { .. } => "parse_date",
            Stage::ValidatePhone { .. } => "validate_phone",
            Stage::ValidateExpiry { .. } => "validate_expiry",
            Stage::ValidateCardNumber { .. } => "validate_card_number",
            Stage::ExtractDigits { .. } => "extract_digits",
            Stage::CoerceNumeric { .. } => "coerce_numeric",
            Stage::ConvertWeight { .. } => "convert_weight",
            Stage::ExtractPrice { .. } => "extract_price",
            Stage::ComposeDateTime { .. } => "compose_datetime",
            Stage::DecomposeDateTime { .. } => "decompose_datetime",
            Stage::DropNulls(_) => "drop_nulls",
            Stage::DropMatching { .. } => "drop_matching",
            Stage::DropColumns(_) => "drop_columns",
            Stage::KeepLatest { .. } => "keep_latest",
            Stage::RestoreOrder => "restore_order",
            Stage::Reindex => "reindex",
        }
    }

    /// Get a human-readable description of the stage.
    pub fn description(&self) -> String {
        match self {
            Stage::Substitute(map) => {
                let literals: Vec<_> = map.literals().take(3).collect();
                format!("Substitute {} literals ({})", map.len(), literals.join(", "))
            }
            Stage::ParseDate { column } => format!("Parse dates in '{}'", column),
            Stage::ValidatePhone {
                column,
                country_column,
            } => format!("Validate '{}' by country in '{}'", column, country_column),
            Stage::ValidateExpiry { column } => format!("Require MM/YY in '{}'", column),
            Stage::ValidateCardNumber { column } => {
                format!("Require 11+ digits in '{}'", column)
            }
            Stage::ExtractDigits { column } => format!("Extract digits from '{}'", column),
            Stage::CoerceNumeric {
                column,
                kind,
                policy,
            } => format!("Coerce '{}' to {:?} ({:?})", column, kind, policy),
            Stage::ConvertWeight { column } => format!("Convert '{}' to kg", column),
            Stage::ExtractPrice { column } => format!("Extract price from '{}'", column),
            Stage::ComposeDateTime {
                year,
                month,
                day,
                time,
                target,
            } => format!(
                "Compose '{}' from '{}', '{}', '{}', '{}'",
                target, year, month, day, time
            ),
            Stage::DecomposeDateTime { source, .. } => {
                format!("Re-derive date parts from '{}'", source)
            }
            Stage::DropNulls(NullScope::Any) => "Drop rows with any null".to_string(),
            Stage::DropNulls(NullScope::Columns(columns)) => {
                format!("Drop rows with null in {:?}", columns)
            }
            Stage::DropMatching { column, value } => {
                format!("Drop rows where '{}' is '{}'", column, value)
            }
            Stage::DropColumns(columns) => format!("Drop columns {:?}", columns),
            Stage::KeepLatest { key, order_by } => {
                format!("Keep latest '{}' per '{}'", order_by, key)
            }
            Stage::RestoreOrder => "Restore source row order".to_string(),
            Stage::Reindex => "Reindex rows from 0".to_string(),
        }
    }

    /// Apply the stage to a table.
    pub(crate) fn apply(&self, table: Table, ctx: &StageContext) -> Result<(Table, StageChange)> {
        let mut change = StageChange::new(self.name(), self.description());

        let table = match self {
            Stage::Substitute(map) => substitute(table, map, ctx, &mut change),
            Stage::ParseDate { column } => {
                map_column(table, column, ctx, &mut change, |_, v| normalize_date(v))?
            }
            Stage::ValidatePhone {
                column,
                country_column,
            } => {
                let country = ctx.column(&table, country_column)?;
                map_column(table, column, ctx, &mut change, |row, v| {
                    validate_phone(v, &row[country])
                })?
            }
            Stage::ValidateExpiry { column } => {
                map_column(table, column, ctx, &mut change, |_, v| validate_expiry(v))?
            }
            Stage::ValidateCardNumber { column } => {
                map_column(table, column, ctx, &mut change, |_, v| validate_card_number(v))?
            }
            Stage::ExtractDigits { column } => {
                map_column(table, column, ctx, &mut change, |_, v| extract_digits(v))?
            }
            Stage::CoerceNumeric {
                column,
                kind,
                policy,
            } => coerce(table, column, *kind, *policy, ctx, &mut change)?,
            Stage::ConvertWeight { column } => {
                let idx = ctx.column(&table, column)?;
                if table.column_values(idx).any(Value::is_text) {
                    map_column(table, column, ctx, &mut change, |_, v| convert_weight(v))?
                } else {
                    table
                }
            }
            Stage::ExtractPrice { column } => {
                map_column(table, column, ctx, &mut change, |_, v| extract_price(v))?
            }
            Stage::ComposeDateTime {
                year,
                month,
                day,
                time,
                target,
            } => compose(table, [year, month, day, time], target, ctx, &mut change)?,
            Stage::DecomposeDateTime {
                source,
                year,
                month,
                day,
                time,
            } => decompose(table, source, [year, month, day, time], ctx, &mut change)?,
            Stage::DropNulls(scope) => {
                let columns = match scope {
                    NullScope::Any => (0..table.column_count()).collect(),
                    NullScope::Columns(names) => names
                        .iter()
                        .map(|name| ctx.column(&table, name))
                        .collect::<Result<Vec<_>>>()?,
                };
                retain_rows(table, &mut change, |values| {
                    columns.iter().all(|&c| !values[c].is_null())
                })
            }
            Stage::DropMatching { column, value } => {
                let idx = ctx.column(&table, column)?;
                retain_rows(table, &mut change, |values| {
                    values[idx].as_text() != Some(value.as_str())
                })
            }
            Stage::DropColumns(columns) => drop_columns(table, columns, ctx, &mut change)?,
            Stage::KeepLatest { key, order_by } => keep_latest(table, key, order_by, ctx, &mut change)?,
            Stage::RestoreOrder => {
                let mut table = table;
                table.rows.sort_by_key(|row| row.index);
                table
            }
            Stage::Reindex => {
                let mut table = table;
                for (position, row) in table.rows.iter_mut().enumerate() {
                    row.index = position;
                }
                table
            }
        };

        Ok((table, change))
    }
}

fn audit(row: usize, column: &str, original: &Value, new: &Value) -> CellAudit {
    CellAudit {
        row,
        column: column.to_string(),
        original_value: original.to_string(),
        new_value: new.to_string(),
    }
}

fn substitute(
    mut table: Table,
    map: &SubstitutionMap,
    ctx: &StageContext,
    change: &mut StageChange,
) -> Table {
    for row in &mut table.rows {
        for (col, value) in row.values.iter_mut().enumerate() {
            if let Some(new) = map.lookup(value) {
                change.record(audit(row.index, &table.columns[col], value, &new), ctx.audit_samples);
                *value = new;
            }
        }
    }
    table
}

/// Rewrite one column cell by cell. The rule sees the whole row so it can
/// consult other columns.
fn map_column(
    mut table: Table,
    column: &str,
    ctx: &StageContext,
    change: &mut StageChange,
    rule: impl Fn(&[Value], &Value) -> Value,
) -> Result<Table> {
    let idx = ctx.column(&table, column)?;

    for row in &mut table.rows {
        let new = rule(row.values.as_slice(), &row.values[idx]);
        if new != row.values[idx] {
            change.record(audit(row.index, column, &row.values[idx], &new), ctx.audit_samples);
            row.values[idx] = new;
        }
    }

    Ok(table)
}

fn coerce(
    mut table: Table,
    column: &str,
    kind: NumericKind,
    policy: NumericPolicy,
    ctx: &StageContext,
    change: &mut StageChange,
) -> Result<Table> {
    let idx = ctx.column(&table, column)?;

    for row in &mut table.rows {
        let new = match (to_numeric(&row.values[idx], kind), policy) {
            (Some(number), _) => number,
            (None, NumericPolicy::Coerce) => Value::Null,
            (None, NumericPolicy::Strict) => {
                return Err(CleanseError::Coercion {
                    entity: ctx.entity.to_string(),
                    column: column.to_string(),
                    row: row.index,
                    value: row.values[idx].render(),
                });
            }
        };
        if new != row.values[idx] {
            change.record(audit(row.index, column, &row.values[idx], &new), ctx.audit_samples);
            row.values[idx] = new;
        }
    }

    Ok(table)
}

fn compose(
    mut table: Table,
    parts: [&String; 4],
    target: &str,
    ctx: &StageContext,
    change: &mut StageChange,
) -> Result<Table> {
    let [year, month, day, time] = parts.map(|name| ctx.column(&table, name));
    let (year, month, day, time) = (year?, month?, day?, time?);

    let target_idx = match table.column_index(target) {
        Some(idx) => idx,
        None => {
            table.columns.push(target.to_string());
            for row in &mut table.rows {
                row.values.push(Value::Null);
            }
            table.columns.len() - 1
        }
    };

    for row in &mut table.rows {
        let values = &row.values;
        let composite = date_from_parts(&values[year], &values[month], &values[day])
            .and_then(|date| compose_datetime(date, &values[time]));

        match composite {
            Some(dt) => row.values[target_idx] = Value::DateTime(dt),
            None => {
                let original = Value::Text(format!(
                    "{}-{}-{} {}",
                    values[year], values[month], values[day], values[time]
                ));
                change.record(audit(row.index, target, &original, &Value::Null), ctx.audit_samples);
                row.values[target_idx] = Value::Null;
            }
        }
    }

    Ok(table)
}

fn decompose(
    mut table: Table,
    source: &str,
    parts: [&String; 4],
    ctx: &StageContext,
    change: &mut StageChange,
) -> Result<Table> {
    let source_idx = ctx.column(&table, source)?;
    let targets = parts
        .iter()
        .map(|name| ctx.column(&table, name))
        .collect::<Result<Vec<_>>>()?;

    for row in &mut table.rows {
        let derived = match &row.values[source_idx] {
            Value::DateTime(dt) => {
                let parts = DateParts::from(*dt);
                [
                    Value::Integer(i64::from(parts.year)),
                    Value::Integer(i64::from(parts.month)),
                    Value::Integer(i64::from(parts.day)),
                    Value::Time(parts.time),
                ]
            }
            _ => [Value::Null, Value::Null, Value::Null, Value::Null],
        };

        for (&idx, new) in targets.iter().zip(derived) {
            if new != row.values[idx] {
                change.record(
                    audit(row.index, &table.columns[idx], &row.values[idx], &new),
                    ctx.audit_samples,
                );
                row.values[idx] = new;
            }
        }
    }

    Ok(table)
}

fn retain_rows(
    mut table: Table,
    change: &mut StageChange,
    keep: impl Fn(&[Value]) -> bool,
) -> Table {
    let before = table.rows.len();
    table.rows.retain(|row| keep(row.values.as_slice()));
    change.rows_dropped = before - table.rows.len();
    table
}

fn drop_columns(
    mut table: Table,
    columns: &[String],
    ctx: &StageContext,
    change: &mut StageChange,
) -> Result<Table> {
    let mut indices = columns
        .iter()
        .map(|name| ctx.column(&table, name))
        .collect::<Result<Vec<_>>>()?;
    indices.sort_unstable();
    indices.dedup();

    for &idx in indices.iter().rev() {
        change.columns_dropped.push(table.columns.remove(idx));
        for row in &mut table.rows {
            row.values.remove(idx);
        }
    }
    change.columns_dropped.reverse();

    Ok(table)
}

fn keep_latest(
    mut table: Table,
    key: &str,
    order_by: &str,
    ctx: &StageContext,
    change: &mut StageChange,
) -> Result<Table> {
    let key_idx = ctx.column(&table, key)?;
    let order_idx = ctx.column(&table, order_by)?;

    // Stable: ties keep source order, so the later source row wins.
    table
        .rows
        .sort_by(|a, b| a.values[order_idx].compare(&b.values[order_idx]));

    let before = table.rows.len();
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(before);
    for row in table.rows.into_iter().rev() {
        let keep = match &row.values[key_idx] {
            Value::Null => true,
            value => seen.insert(value.render()),
        };
        if keep {
            kept.push(row);
        }
    }
    kept.reverse();

    change.rows_dropped = before - kept.len();
    table.rows = kept;
    Ok(table)
}
