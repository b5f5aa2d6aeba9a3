//! Example: Cleanse an entity table from a file.
//!
//! Usage:
//!   cargo run --example clean -- <entity> <file_path>
//!
//! Example:
//!   cargo run --example clean -- products data/products.csv

use std::env;
use std::path::Path;

use cleanse::{CleansingEngine, EntityKind, FileSource};

fn main() -> cleanse::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: cargo run --example clean -- <entity> <file_path>");
        eprintln!("\nEntities: users, cards, stores, products, orders, date_parts");
        std::process::exit(1);
    }

    let kind: EntityKind = args[1].parse()?;
    let path = Path::new(&args[2]);

    if !path.exists() {
        eprintln!("Error: File not found: {}", path.display());
        std::process::exit(1);
    }

    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("Cleansing {} from {}", kind, path.display());
    println!("{}", separator);
    println!();

    let engine = CleansingEngine::new();
    let result = engine.clean_source(kind, &FileSource::new(path))?;

    println!("## Source");
    println!("  File: {}", result.source.file);
    println!("  Format: {}", result.source.format);
    println!("  Rows: {}", result.source.row_count);
    println!("  Hash: {}", result.source.hash);
    println!();

    println!("## Stages");
    for stage in &result.report.stages {
        println!(
            "  {:22} changed={:<6} dropped={:<6} {}",
            stage.stage, stage.values_changed, stage.rows_dropped, stage.description
        );
        for sample in &stage.samples {
            println!(
                "      row {:<6} {:18} {:?} -> {:?}",
                sample.row, sample.column, sample.original_value, sample.new_value
            );
        }
    }
    println!();

    println!("## Result");
    println!("  Destination: {}", result.table.destination());
    println!("  Rows kept: {}", result.table.row_count());
    println!("  Rows dropped: {}", result.report.rows_dropped());
    println!();

    for (position, record) in result.table.table().to_records().iter().take(5).enumerate() {
        println!("  [{}] {}", position, serde_json::to_string(record)?);
    }

    Ok(())
}
