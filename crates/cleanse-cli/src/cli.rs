//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use cleanse::{EntityKind, OutputFormat};
use std::path::PathBuf;

/// Cleanse: field normalization and validation for retail sales tables
#[derive(Parser)]
#[command(name = "cleanse")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Cleanse one entity table from a file
    Clean {
        /// Entity the file holds (users, cards, stores, products, orders, date_parts)
        #[arg(value_name = "ENTITY")]
        entity: EntityKind,

        /// Path to the raw data file (CSV/TSV/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output directory (default: ./cleansed)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "csv")]
        format: OutputFormat,

        /// Also write the cleansing report as JSON
        #[arg(long)]
        report: bool,

        /// Engine configuration file (JSON)
        #[arg(long, value_name = "CONFIG_FILE")]
        config: Option<PathBuf>,
    },

    /// Show the expected columns and stages of an entity
    Schema {
        /// Entity to describe
        #[arg(value_name = "ENTITY")]
        entity: EntityKind,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Cleanse every entity file found in a directory
    Batch {
        /// Directory holding <entity>.csv, <entity>.tsv or <entity>.json files
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Output directory (default: <DIR>/cleansed)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "csv")]
        format: OutputFormat,

        /// Engine configuration file (JSON)
        #[arg(long, value_name = "CONFIG_FILE")]
        config: Option<PathBuf>,
    },
}
