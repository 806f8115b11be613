//! hazcheck CLI
//!
//! Dangerous-goods shipment compliance checks from the command line.

use anyhow::Result;
use clap::Parser;
use hazcheck_core::Database;

mod app;
mod commands;
mod output;
mod progress;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // --verbose raises the default level; RUST_LOG still overrides both.
    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        let code = e
            .downcast_ref::<hazcheck_core::HazCheckError>()
            .map(|he| he.exit_code())
            .unwrap_or(hazcheck_core::error::exit_codes::GENERAL_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Open database (use HAZCHECK_DB env var if set, otherwise use default)
    let db_path = std::env::var("HAZCHECK_DB")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| Database::default_path());
    tracing::debug!("opening database at {}", db_path.display());
    let db = Database::open(&db_path)?;
    db.initialize()?;

    match cli.command {
        Commands::Validate(args) => commands::validate::run(args, &db, cli.format).await,
        Commands::Parse(args) => commands::parse::run(args, &db, cli.format).await,
        Commands::Screenshot(args) => commands::screenshot::run(args, &db, cli.format).await,
        Commands::Docs(args) => commands::docs::run(args, &db).await,
        Commands::Servers(args) => commands::servers::run(args).await,
        Commands::Config(args) => commands::config::run(args).await,
    }
}
