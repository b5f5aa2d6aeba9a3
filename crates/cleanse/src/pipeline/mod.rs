//! Per-entity cleansing pipelines.
//!
//! An [`EntityPipeline`] is an immutable, ordered list of [`Stage`]s plus the
//! schema the source table must carry. Running it yields a cleansed table and
//! a [`CleansingReport`] describing every change.

mod entity;
mod report;
mod stage;

pub use entity::{EntityKind, EntityPipeline, PipelineBuilder, SchemaPolicy};
pub use report::{CellAudit, CleansingReport, StageChange};
pub use stage::{NullScope, Stage};
