//! CLI command implementations.

pub mod batch;
pub mod clean;
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use colored::Colorize;
use cleanse::{CleansingEngine, CleansingReport, EngineConfig};

/// Build an engine, optionally from a JSON configuration file.
pub(crate) fn load_engine(
    config: Option<PathBuf>,
) -> Result<CleansingEngine, Box<dyn std::error::Error>> {
    let config = match config {
        Some(path) => {
            if !path.exists() {
                return Err(format!("Config file not found: {}", path.display()).into());
            }
            EngineConfig::load(&path)?
        }
        None => EngineConfig::default(),
    };
    Ok(CleansingEngine::with_config(config))
}

/// Print a one-line summary of a run, plus per-stage detail when verbose.
pub(crate) fn print_report(report: &CleansingReport, verbose: bool) {
    let dropped = report.rows_dropped();
    let dropped_str = if dropped > 0 {
        dropped.to_string().yellow().bold()
    } else {
        dropped.to_string().green().bold()
    };

    println!(
        "  {:10} {} rows in, {} kept, {} dropped, {} values changed",
        report.entity.to_string().white().bold(),
        report.rows_in,
        report.rows_out.to_string().green().bold(),
        dropped_str,
        report.values_changed()
    );

    if verbose {
        for stage in &report.stages {
            if stage.values_changed == 0 && stage.rows_dropped == 0 && stage.columns_dropped.is_empty() {
                continue;
            }
            println!(
                "    {} {}",
                format!("{:20}", stage.stage).cyan(),
                stage.description.dimmed()
            );
            if stage.values_changed > 0 {
                println!("      {} values changed", stage.values_changed);
            }
            if stage.rows_dropped > 0 {
                println!("      {} rows dropped", stage.rows_dropped.to_string().yellow());
            }
            if !stage.columns_dropped.is_empty() {
                println!("      columns dropped: {}", stage.columns_dropped.join(", "));
            }
            for sample in &stage.samples {
                println!(
                    "      row {}: {} {} {} {}",
                    sample.row,
                    sample.column.dimmed(),
                    sample.original_value.red(),
                    "→".dimmed(),
                    sample.new_value.green()
                );
            }
        }
    }
}

/// Write a report as pretty JSON next to the cleansed output.
pub(crate) fn write_report(
    report: &CleansingReport,
    dir: &Path,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = dir.join(format!("{}.report.json", report.destination));
    fs::write(&path, serde_json::to_string_pretty(report)?)?;
    Ok(path)
}
