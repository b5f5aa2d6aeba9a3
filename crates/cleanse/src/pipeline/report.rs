//! Audit trail of a cleansing run.

use serde::{Deserialize, Serialize};

use super::EntityKind;

/// What one stage did to the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageChange {
    /// Short stage name.
    pub stage: String,

    /// Human-readable description of the stage.
    pub description: String,

    /// Number of cells whose value changed.
    pub values_changed: usize,

    /// Number of rows removed.
    pub rows_dropped: usize,

    /// Columns removed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns_dropped: Vec<String>,

    /// A sample of individual cell changes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<CellAudit>,
}

impl StageChange {
    /// Create an empty change record for a stage.
    pub fn new(stage: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            description: description.into(),
            values_changed: 0,
            rows_dropped: 0,
            columns_dropped: Vec::new(),
            samples: Vec::new(),
        }
    }

    /// Record a changed cell, keeping at most `limit` samples.
    pub fn record(&mut self, audit: CellAudit, limit: usize) {
        self.values_changed += 1;
        if self.samples.len() < limit {
            self.samples.push(audit);
        }
    }
}

/// A single changed cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellAudit {
    /// Source row label.
    pub row: usize,

    /// Column that was changed.
    pub column: String,

    /// Value before the stage.
    pub original_value: String,

    /// Value after the stage (`null` for the null marker).
    pub new_value: String,
}

/// Result of cleansing one entity table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleansingReport {
    /// Entity that was cleansed.
    pub entity: EntityKind,

    /// Load destination name.
    pub destination: String,

    /// Rows received.
    pub rows_in: usize,

    /// Rows in the cleansed table.
    pub rows_out: usize,

    /// Per-stage changes, in execution order.
    pub stages: Vec<StageChange>,
}

impl CleansingReport {
    /// Create an empty report.
    pub fn new(entity: EntityKind, rows_in: usize) -> Self {
        Self {
            entity,
            destination: entity.destination().to_string(),
            rows_in,
            rows_out: rows_in,
            stages: Vec::new(),
        }
    }

    /// Add a stage's change to the report.
    pub fn add_change(&mut self, change: StageChange) {
        self.rows_out = self.rows_out.saturating_sub(change.rows_dropped);
        self.stages.push(change);
    }

    /// Total rows removed across all stages.
    pub fn rows_dropped(&self) -> usize {
        self.stages.iter().map(|s| s.rows_dropped).sum()
    }

    /// Total cells changed across all stages.
    pub fn values_changed(&self) -> usize {
        self.stages.iter().map(|s| s.values_changed).sum()
    }
}
