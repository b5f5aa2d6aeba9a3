//! Cleanse CLI - retail sales data normalization.

mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Clean {
            entity,
            file,
            output,
            format,
            report,
            config,
        } => commands::clean::run(entity, file, output, format, report, config, cli.verbose),

        Commands::Schema { entity, json } => commands::schema::run(entity, json),

        Commands::Batch {
            dir,
            output,
            format,
            config,
        } => commands::batch::run(dir, output, format, config, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
