//! The cleansing engine and its configuration.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{CleanseError, Result};
use crate::input::{SourceMetadata, TableSource};
use crate::normalize::SubstitutionMap;
use crate::pipeline::{CleansingReport, EntityKind, EntityPipeline, SchemaPolicy};
use crate::table::{CleansedTable, RawTable};

/// Default number of changed cells sampled per stage in a report.
pub const DEFAULT_AUDIT_SAMPLES: usize = 5;

/// Configuration for the cleansing engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How strictly source columns are checked.
    pub schema_policy: SchemaPolicy,
    /// Extra literal substitutions per entity, merged into its pipeline.
    pub substitutions: IndexMap<EntityKind, SubstitutionMap>,
    /// Changed cells kept as samples per stage.
    pub audit_samples: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            schema_policy: SchemaPolicy::Strict,
            substitutions: IndexMap::new(),
            audit_samples: DEFAULT_AUDIT_SAMPLES,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| CleanseError::Config(format!("Invalid engine configuration: {}", e)))
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| CleanseError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&text)
    }

    /// Set the schema policy.
    pub fn with_schema_policy(mut self, policy: SchemaPolicy) -> Self {
        self.schema_policy = policy;
        self
    }

    /// Add literal substitutions for one entity.
    pub fn with_substitutions(mut self, kind: EntityKind, extra: SubstitutionMap) -> Self {
        self.substitutions.entry(kind).or_default().extend(&extra);
        self
    }

    /// Set the number of sampled cell changes per stage.
    pub fn with_audit_samples(mut self, samples: usize) -> Self {
        self.audit_samples = samples;
        self
    }
}

/// Everything produced by cleansing one extracted source.
#[derive(Debug, Clone)]
pub struct CleansingResult {
    /// Where the raw table came from.
    pub source: SourceMetadata,
    /// The cleansed table.
    pub table: CleansedTable,
    /// What every stage changed.
    pub report: CleansingReport,
}

/// Runs entity pipelines over raw tables.
///
/// Pipelines are built once, on construction, and never change afterwards,
/// so one engine can serve any number of runs.
///
/// # Example
///
/// ```
/// use cleanse::{CleansingEngine, EntityKind, Table, Value};
///
/// let raw = Table::from_text(
///     &["card_number", "expiry_date", "card_provider", "date_payment_confirmed"],
///     &[vec!["???4971858637664481", "09/26", "VISA 16 digit", "2015-11-25"]],
/// );
///
/// let engine = CleansingEngine::new();
/// let cards = engine.clean(EntityKind::Cards, raw).unwrap();
///
/// assert_eq!(cards.row_count(), 1);
/// assert_eq!(cards.value(0, "card_number"), Some(&Value::text("4971858637664481")));
/// ```
#[derive(Debug, Clone)]
pub struct CleansingEngine {
    config: EngineConfig,
    pipelines: [EntityPipeline; 6],
}

impl CleansingEngine {
    /// Create an engine with default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine with custom configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        let pipelines = EntityKind::ALL.map(|kind| {
            let pipeline = EntityPipeline::for_entity(kind);
            match config.substitutions.get(&kind) {
                Some(extra) => pipeline.with_substitutions(extra),
                None => pipeline,
            }
        });

        Self { config, pipelines }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The pipeline that cleanses an entity.
    pub fn pipeline(&self, kind: EntityKind) -> &EntityPipeline {
        // Slots follow EntityKind::ALL, which lists variants in declaration order.
        &self.pipelines[kind as usize]
    }

    /// Cleanse a raw table as the given entity.
    pub fn clean(&self, kind: EntityKind, raw: RawTable) -> Result<CleansedTable> {
        self.clean_with_report(kind, raw).map(|(table, _)| table)
    }

    /// Cleanse a raw table and report what every stage changed.
    pub fn clean_with_report(
        &self,
        kind: EntityKind,
        raw: RawTable,
    ) -> Result<(CleansedTable, CleansingReport)> {
        let (table, report) =
            self.pipeline(kind)
                .run(raw, self.config.schema_policy, self.config.audit_samples)?;
        Ok((CleansedTable::new(kind, table), report))
    }

    /// Extract a table from a source and cleanse it.
    pub fn clean_source(
        &self,
        kind: EntityKind,
        source: &impl TableSource,
    ) -> Result<CleansingResult> {
        let (raw, metadata) = source.extract()?;
        let (table, report) = self.clean_with_report(kind, raw)?;
        Ok(CleansingResult {
            source: metadata,
            table,
            report,
        })
    }

    /// Cleanse user records.
    pub fn clean_users(&self, raw: RawTable) -> Result<CleansedTable> {
        self.clean(EntityKind::Users, raw)
    }

    /// Cleanse payment card records.
    pub fn clean_cards(&self, raw: RawTable) -> Result<CleansedTable> {
        self.clean(EntityKind::Cards, raw)
    }

    /// Cleanse store records.
    pub fn clean_stores(&self, raw: RawTable) -> Result<CleansedTable> {
        self.clean(EntityKind::Stores, raw)
    }

    /// Cleanse product records.
    pub fn clean_products(&self, raw: RawTable) -> Result<CleansedTable> {
        self.clean(EntityKind::Products, raw)
    }

    /// Cleanse order records.
    pub fn clean_orders(&self, raw: RawTable) -> Result<CleansedTable> {
        self.clean(EntityKind::Orders, raw)
    }

    /// Cleanse sale date-part records.
    pub fn clean_date_parts(&self, raw: RawTable) -> Result<CleansedTable> {
        self.clean(EntityKind::DateParts, raw)
    }
}

impl Default for CleansingEngine {
    fn default() -> Self {
        Self::new()
    }
}
