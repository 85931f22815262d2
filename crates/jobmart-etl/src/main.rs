//! `jobmart`: populate the star-schema warehouse from the staged CSV.
//!
//! Reads `jobmart.toml` (or the path given with `--config`), opens the SQLite
//! warehouse, runs every stage in order and prints the run summary as JSON.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use jobmart_etl::{CsvSource, Pipeline, config::EtlConfig};
use jobmart_store_sqlite::SqliteWarehouse;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Load the job-postings star schema")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "jobmart.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let cfg = EtlConfig::load(&cli.config)
    .with_context(|| format!("failed to read config {:?}", cli.config))?;

  let warehouse = SqliteWarehouse::open(&cfg.database_path)
    .await
    .with_context(|| format!("failed to open warehouse at {:?}", cfg.database_path))?;

  let source = CsvSource::from_path(&cfg.source_path);

  let summary = Pipeline::new(&warehouse, &source, cfg.options())
    .run()
    .await
    .context("warehouse load failed")?;

  println!("{}", serde_json::to_string_pretty(&summary)?);
  Ok(())
}
