#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the incident spreadsheet loader.
//!
//! Connection settings come from `DB_USERNAME`, `DB_PASSWORD`, `DB_HOST`,
//! `DB_PORT`, and `DB_NAME`.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use incident_loader_database::db::{self, DbConfig};
use incident_loader_ingest::DEFAULT_SOURCE_FILE;

#[derive(Parser)]
#[command(
    name = "incident_loader_ingest",
    about = "Clean a crime incident spreadsheet and load it into incident_reports"
)]
struct Cli {
    /// Spreadsheet or CSV export to load
    #[arg(default_value = DEFAULT_SOURCE_FILE)]
    file: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .init();

    let cli = Cli::parse();
    let start = Instant::now();

    let config = DbConfig::from_env()?;
    let db = db::connect(&config).await?;

    let summary = incident_loader_ingest::run(db.as_ref(), &cli.file).await?;

    log::info!(
        "Process completed successfully in {:.1}s ({} rows inserted)",
        start.elapsed().as_secs_f64(),
        summary.inserted
    );

    Ok(())
}
