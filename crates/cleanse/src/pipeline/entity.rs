//! Entity kinds and their pipeline definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use crate::error::{CleanseError, Result};
use crate::normalize::{NumericKind, NumericPolicy, SubstitutionMap};
use crate::table::{RawTable, Table};

use super::report::CleansingReport;
use super::stage::{NullScope, Stage, StageContext};

const USER_COLUMNS: &[&str] = &[
    "index",
    "first_name",
    "last_name",
    "date_of_birth",
    "company",
    "email_address",
    "address",
    "country",
    "country_code",
    "phone_number",
    "join_date",
    "user_uuid",
];

const CARD_COLUMNS: &[&str] = &[
    "card_number",
    "expiry_date",
    "card_provider",
    "date_payment_confirmed",
];

const STORE_COLUMNS: &[&str] = &[
    "index",
    "address",
    "longitude",
    "lat",
    "locality",
    "store_code",
    "staff_numbers",
    "opening_date",
    "store_type",
    "latitude",
    "country_code",
    "continent",
];

const PRODUCT_COLUMNS: &[&str] = &[
    "Unnamed: 0",
    "product_name",
    "product_price",
    "weight",
    "category",
    "EAN",
    "date_added",
    "uuid",
    "removed",
    "product_code",
];

const ORDER_COLUMNS: &[&str] = &[
    "level_0",
    "index",
    "date_uuid",
    "first_name",
    "last_name",
    "user_uuid",
    "card_number",
    "store_code",
    "product_code",
    "1",
    "product_quantity",
];

const DATE_PART_COLUMNS: &[&str] = &["timestamp", "month", "year", "day", "time_period", "date_uuid"];

/// The six kinds of table the engine cleanses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Users,
    Cards,
    Stores,
    Products,
    Orders,
    DateParts,
}

impl EntityKind {
    /// Every entity, in load order.
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Users,
        EntityKind::Cards,
        EntityKind::Stores,
        EntityKind::Products,
        EntityKind::Orders,
        EntityKind::DateParts,
    ];

    /// Short name used on the command line and in file names.
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Users => "users",
            EntityKind::Cards => "cards",
            EntityKind::Stores => "stores",
            EntityKind::Products => "products",
            EntityKind::Orders => "orders",
            EntityKind::DateParts => "date_parts",
        }
    }

    /// Table name the load collaborator writes to.
    pub fn destination(&self) -> &'static str {
        match self {
            EntityKind::Users => "dim_users",
            EntityKind::Cards => "dim_card_details",
            EntityKind::Stores => "dim_store_details",
            EntityKind::Products => "dim_products",
            EntityKind::Orders => "orders_table",
            EntityKind::DateParts => "dim_date_times",
        }
    }

    /// Columns the source table must carry.
    pub fn expected_columns(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Users => USER_COLUMNS,
            EntityKind::Cards => CARD_COLUMNS,
            EntityKind::Stores => STORE_COLUMNS,
            EntityKind::Products => PRODUCT_COLUMNS,
            EntityKind::Orders => ORDER_COLUMNS,
            EntityKind::DateParts => DATE_PART_COLUMNS,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for EntityKind {
    type Err = CleanseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "users" | "user" | "dim_users" => Ok(EntityKind::Users),
            "cards" | "card" | "card_details" | "dim_card_details" => Ok(EntityKind::Cards),
            "stores" | "store" | "store_details" | "dim_store_details" => Ok(EntityKind::Stores),
            "products" | "product" | "dim_products" => Ok(EntityKind::Products),
            "orders" | "order" | "orders_table" => Ok(EntityKind::Orders),
            "date_parts" | "dates" | "date_times" | "dim_date_times" => Ok(EntityKind::DateParts),
            _ => Err(CleanseError::UnknownEntity(s.to_string())),
        }
    }
}

/// Whether columns beyond the expected set are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaPolicy {
    /// Missing and unexpected columns are both fatal.
    #[default]
    Strict,
    /// Only missing columns are fatal; extra columns flow through.
    AllowExtra,
}

/// The ordered stages that turn one entity's raw table into a cleansed one.
#[derive(Debug, Clone)]
pub struct EntityPipeline {
    kind: EntityKind,
    expected_columns: Vec<String>,
    stages: Vec<Stage>,
}

impl EntityPipeline {
    /// Start building a pipeline for an entity.
    pub fn builder(kind: EntityKind) -> PipelineBuilder {
        PipelineBuilder {
            kind,
            expected_columns: kind.expected_columns().iter().map(|c| c.to_string()).collect(),
            stages: Vec::new(),
            required: NullScope::Any,
        }
    }

    /// The standard pipeline for an entity.
    pub fn for_entity(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Users => users(),
            EntityKind::Cards => cards(),
            EntityKind::Stores => stores(),
            EntityKind::Products => products(),
            EntityKind::Orders => orders(),
            EntityKind::DateParts => date_parts(),
        }
    }

    /// Entity this pipeline cleanses.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Columns the source must carry.
    pub fn expected_columns(&self) -> &[String] {
        &self.expected_columns
    }

    /// Stages in execution order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Merge extra literal substitutions into the pipeline's first
    /// substitution stage, adding one at the front if there is none.
    pub fn with_substitutions(mut self, extra: &SubstitutionMap) -> Self {
        if extra.is_empty() {
            return self;
        }
        match self.stages.iter_mut().find_map(|s| match s {
            Stage::Substitute(map) => Some(map),
            _ => None,
        }) {
            Some(map) => map.extend(extra),
            None => self.stages.insert(0, Stage::Substitute(extra.clone())),
        }
        self
    }

    /// Check the source columns against the expected schema.
    pub fn check_schema(&self, table: &Table, policy: SchemaPolicy) -> Result<()> {
        let missing: Vec<String> = self
            .expected_columns
            .iter()
            .filter(|c| table.column_index(c).is_none())
            .cloned()
            .collect();

        let unexpected: Vec<String> = match policy {
            SchemaPolicy::Strict => table
                .columns
                .iter()
                .filter(|c| !self.expected_columns.contains(c))
                .cloned()
                .collect(),
            SchemaPolicy::AllowExtra => Vec::new(),
        };

        if missing.is_empty() && unexpected.is_empty() {
            Ok(())
        } else {
            Err(CleanseError::Schema {
                entity: self.kind.to_string(),
                missing,
                unexpected,
            })
        }
    }

    /// Run every stage over a raw table.
    ///
    /// The schema is checked before any row is touched. On success every
    /// remaining row satisfies the entity's required-field rule and row
    /// labels run densely from 0.
    pub fn run(
        &self,
        raw: RawTable,
        policy: SchemaPolicy,
        audit_samples: usize,
    ) -> Result<(Table, CleansingReport)> {
        let span = info_span!("cleanse", entity = %self.kind);
        let _guard = span.enter();

        if let Err(e) = self.check_schema(&raw, policy) {
            warn!(error = %e, "schema check failed");
            return Err(e);
        }

        let ctx = StageContext {
            entity: self.kind,
            audit_samples,
        };
        let mut report = CleansingReport::new(self.kind, raw.row_count());
        let mut table = raw;

        for stage in &self.stages {
            let rows_before = table.row_count();
            let (next, change) = stage.apply(table, &ctx)?;
            debug!(
                stage = stage.name(),
                rows_before,
                rows_after = next.row_count(),
                values_changed = change.values_changed,
                "stage applied"
            );
            report.add_change(change);
            table = next;
        }

        info!(
            rows_in = report.rows_in,
            rows_out = table.row_count(),
            "entity cleansed"
        );
        Ok((table, report))
    }
}

/// Builder for [`EntityPipeline`].
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    kind: EntityKind,
    expected_columns: Vec<String>,
    stages: Vec<Stage>,
    required: NullScope,
}

impl PipelineBuilder {
    /// Append a stage.
    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Require a value in every remaining column (the default).
    pub fn require_all(mut self) -> Self {
        self.required = NullScope::Any;
        self
    }

    /// Require a value only in the listed columns.
    pub fn require(mut self, columns: &[&str]) -> Self {
        self.required = NullScope::Columns(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    /// Finish the pipeline with the required-field checkpoint and a reindex.
    pub fn build(mut self) -> EntityPipeline {
        self.stages.push(Stage::DropNulls(self.required));
        self.stages.push(Stage::Reindex);
        EntityPipeline {
            kind: self.kind,
            expected_columns: self.expected_columns,
            stages: self.stages,
        }
    }
}

fn column(name: &str) -> String {
    name.to_string()
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn users() -> EntityPipeline {
    EntityPipeline::builder(EntityKind::Users)
        .stage(Stage::Substitute(
            SubstitutionMap::new().null("NULL").replace("GGB", "GB"),
        ))
        .stage(Stage::ParseDate {
            column: column("join_date"),
        })
        .stage(Stage::ParseDate {
            column: column("date_of_birth"),
        })
        .stage(Stage::DropNulls(NullScope::Any))
        .stage(Stage::ValidatePhone {
            column: column("phone_number"),
            country_column: column("country_code"),
        })
        .stage(Stage::DropNulls(NullScope::Any))
        .stage(Stage::DropColumns(columns(&["index"])))
        .require_all()
        .build()
}

fn cards() -> EntityPipeline {
    EntityPipeline::builder(EntityKind::Cards)
        .stage(Stage::Substitute(SubstitutionMap::new().null("NULL")))
        .stage(Stage::ParseDate {
            column: column("date_payment_confirmed"),
        })
        .stage(Stage::ValidateExpiry {
            column: column("expiry_date"),
        })
        .stage(Stage::ValidateCardNumber {
            column: column("card_number"),
        })
        .require_all()
        .build()
}

fn stores() -> EntityPipeline {
    EntityPipeline::builder(EntityKind::Stores)
        .stage(Stage::Substitute(
            SubstitutionMap::new()
                .replace("eeEurope", "Europe")
                .replace("eeAmerica", "America")
                .null("NULL")
                .null("N/A")
                .null("None"),
        ))
        .stage(Stage::ExtractDigits {
            column: column("staff_numbers"),
        })
        .stage(Stage::ParseDate {
            column: column("opening_date"),
        })
        .stage(Stage::CoerceNumeric {
            column: column("longitude"),
            kind: NumericKind::Float,
            policy: NumericPolicy::Coerce,
        })
        .stage(Stage::CoerceNumeric {
            column: column("latitude"),
            kind: NumericKind::Float,
            policy: NumericPolicy::Coerce,
        })
        .stage(Stage::CoerceNumeric {
            column: column("staff_numbers"),
            kind: NumericKind::Integer,
            policy: NumericPolicy::Coerce,
        })
        .stage(Stage::DropColumns(columns(&["lat", "index"])))
        .require(&["opening_date"])
        .build()
}

fn products() -> EntityPipeline {
    EntityPipeline::builder(EntityKind::Products)
        .stage(Stage::ConvertWeight {
            column: column("weight"),
        })
        .stage(Stage::DropNulls(NullScope::Any))
        .stage(Stage::DropMatching {
            column: column("removed"),
            value: column("Removed"),
        })
        .stage(Stage::ParseDate {
            column: column("date_added"),
        })
        .stage(Stage::DropNulls(NullScope::Columns(columns(&["date_added"]))))
        .stage(Stage::KeepLatest {
            key: column("product_name"),
            order_by: column("date_added"),
        })
        .stage(Stage::ExtractPrice {
            column: column("product_price"),
        })
        .stage(Stage::DropColumns(columns(&["Unnamed: 0"])))
        .stage(Stage::RestoreOrder)
        .require_all()
        .build()
}

fn orders() -> EntityPipeline {
    EntityPipeline::builder(EntityKind::Orders)
        .stage(Stage::DropColumns(columns(&[
            "level_0",
            "index",
            "first_name",
            "last_name",
            "1",
        ])))
        .stage(Stage::DropNulls(NullScope::Any))
        .stage(Stage::CoerceNumeric {
            column: column("product_quantity"),
            kind: NumericKind::Integer,
            policy: NumericPolicy::Strict,
        })
        .require_all()
        .build()
}

fn date_parts() -> EntityPipeline {
    EntityPipeline::builder(EntityKind::DateParts)
        .stage(Stage::Substitute(SubstitutionMap::new().null("NULL")))
        .stage(Stage::ComposeDateTime {
            year: column("year"),
            month: column("month"),
            day: column("day"),
            time: column("timestamp"),
            target: column("datetime"),
        })
        .stage(Stage::DecomposeDateTime {
            source: column("datetime"),
            year: column("year"),
            month: column("month"),
            day: column("day"),
            time: column("timestamp"),
        })
        .stage(Stage::DropColumns(columns(&["datetime"])))
        .require_all()
        .build()
}
