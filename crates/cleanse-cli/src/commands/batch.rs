//! Batch command - cleanse every entity file found in a directory.

use std::path::{Path, PathBuf};

use colored::Colorize;
use cleanse::{EntityKind, FileSink, FileSource, OutputFormat, TableSink};

use super::{load_engine, print_report};

/// Extensions tried, in order, for each entity.
const EXTENSIONS: &[&str] = &["csv", "tsv", "json"];

pub fn run(
    dir: PathBuf,
    output: Option<PathBuf>,
    format: OutputFormat,
    config: Option<PathBuf>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !dir.is_dir() {
        return Err(format!("Directory not found: {}", dir.display()).into());
    }

    let engine = load_engine(config)?;
    let out_dir = output.unwrap_or_else(|| dir.join("cleansed"));
    let mut sink = FileSink::new(&out_dir, format);

    let found: Vec<(EntityKind, PathBuf)> = EntityKind::ALL
        .iter()
        .filter_map(|&kind| find_source(&dir, kind).map(|path| (kind, path)))
        .collect();

    if found.is_empty() {
        println!(
            "{} No entity files found in {}",
            "Warning:".yellow().bold(),
            dir.display()
        );
        println!(
            "Expected names like {}",
            EntityKind::ALL
                .iter()
                .map(|k| format!("{}.csv", k.name()))
                .collect::<Vec<_>>()
                .join(", ")
                .cyan()
        );
        return Ok(());
    }

    println!(
        "{} {} entity files in {}",
        "Cleansing".cyan().bold(),
        found.len().to_string().white().bold(),
        dir.display()
    );
    println!();

    let mut failures = 0;
    for (kind, path) in &found {
        match engine.clean_source(*kind, &FileSource::new(path)) {
            Ok(result) => {
                print_report(&result.report, verbose);
                let written = sink.load(&result.table, result.table.destination())?;
                if verbose {
                    println!("    {} {}", "→".dimmed(), written.display());
                }
            }
            Err(e) => {
                failures += 1;
                println!(
                    "  {:10} {} {}",
                    kind.to_string().white().bold(),
                    "failed:".red().bold(),
                    e
                );
            }
        }
    }

    println!();
    if failures > 0 {
        return Err(format!("{} of {} entities failed", failures, found.len()).into());
    }
    println!("{} {}", "Saved to".green().bold(), out_dir.display());

    Ok(())
}

/// First `<entity>.<ext>` file present in `dir`.
fn find_source(dir: &Path, kind: EntityKind) -> Option<PathBuf> {
    EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", kind.name(), ext)))
        .find(|path| path.is_file())
}
