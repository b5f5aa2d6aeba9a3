//! Schema command - describe an entity's expected columns and stages.

use colored::Colorize;
use cleanse::{CleansingEngine, EntityKind};

pub fn run(entity: EntityKind, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let engine = CleansingEngine::new();
    let pipeline = engine.pipeline(entity);

    if json_output {
        let schema = serde_json::json!({
            "entity": entity,
            "destination": entity.destination(),
            "expected_columns": pipeline.expected_columns(),
            "stages": pipeline
                .stages()
                .iter()
                .map(|s| serde_json::json!({ "stage": s.name(), "description": s.description() }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    println!(
        "{} {} {} {}",
        "Entity".cyan().bold(),
        entity.to_string().white().bold(),
        "→".dimmed(),
        entity.destination().white()
    );
    println!();

    println!("{}", "Expected columns:".bold());
    for column in pipeline.expected_columns() {
        println!("  {}", column);
    }
    println!();

    println!("{}", "Stages:".bold());
    for (position, stage) in pipeline.stages().iter().enumerate() {
        println!(
            "  {:>2}. {:20} {}",
            position + 1,
            stage.name().cyan(),
            stage.description().dimmed()
        );
    }

    Ok(())
}
