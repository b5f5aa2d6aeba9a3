//! Clean command - cleanse one entity file.

use std::path::PathBuf;

use colored::Colorize;
use cleanse::{EntityKind, FileSink, FileSource, OutputFormat, TableSink};

use super::{load_engine, print_report, write_report};

pub fn run(
    entity: EntityKind,
    file: PathBuf,
    output: Option<PathBuf>,
    format: OutputFormat,
    report: bool,
    config: Option<PathBuf>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let engine = load_engine(config)?;

    println!(
        "{} {} from {}",
        "Cleansing".cyan().bold(),
        entity.to_string().white().bold(),
        file.display()
    );

    let result = engine.clean_source(entity, &FileSource::new(&file))?;

    if verbose {
        println!(
            "  Source: {} ({}, {} rows, {})",
            result.source.file,
            result.source.format,
            result.source.row_count,
            result.source.hash.dimmed()
        );
    }
    print_report(&result.report, verbose);

    let out_dir = output.unwrap_or_else(|| PathBuf::from("cleansed"));
    let mut sink = FileSink::new(&out_dir, format);
    let path = sink.load(&result.table, result.table.destination())?;

    println!();
    println!("{} {}", "Saved:".green().bold(), path.display());

    if report {
        let report_path = write_report(&result.report, &out_dir)?;
        println!("{} {}", "Report:".green().bold(), report_path.display());
    }

    Ok(())
}
