//! Error type for `jobmart-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] jobmart_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A stored column held a type the domain has no representation for.
  #[error("{table}: unsupported stored value of type {kind}")]
  UnsupportedValue { table: &'static str, kind: &'static str },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
