//! Runtime configuration.
//!
//! Sources, lowest priority first: built-in defaults, the optional TOML file,
//! then `JOBMART_*` environment variables (e.g. `JOBMART_DATABASE_PATH`).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{
  load::MalformedPolicy,
  pipeline::{PipelineOptions, StagePolicy},
};

pub const DEFAULT_SOURCE_PATH: &str = "./data_staging/Staged_data.csv";
pub const DEFAULT_DATABASE_PATH: &str = "jobmart.db";

#[derive(Debug, Clone, Deserialize)]
pub struct EtlConfig {
  /// Headered CSV file to load.
  pub source_path:      PathBuf,
  /// SQLite database file; created on first use.
  pub database_path:    PathBuf,
  #[serde(default)]
  pub malformed_policy: MalformedPolicy,
  #[serde(default)]
  pub stage_policy:     StagePolicy,
}

impl EtlConfig {
  /// Layer defaults, `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> Result<Self, ::config::ConfigError> {
    ::config::Config::builder()
      .set_default("source_path", DEFAULT_SOURCE_PATH)?
      .set_default("database_path", DEFAULT_DATABASE_PATH)?
      .add_source(::config::File::from(path.to_path_buf()).required(false))
      .add_source(::config::Environment::with_prefix("JOBMART"))
      .build()?
      .try_deserialize()
  }

  pub fn options(&self) -> PipelineOptions {
    PipelineOptions { malformed: self.malformed_policy, stage: self.stage_policy }
  }
}
