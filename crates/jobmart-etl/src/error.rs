//! Error type for `jobmart-etl`.

use jobmart_core::dimension::DimensionKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The source file could not be opened or read.
  #[error("source error: {0}")]
  Source(#[from] csv::Error),

  /// One data row could not be decoded (e.g. invalid UTF-8). Later rows
  /// are still readable.
  #[error("line {line}: unreadable row: {source}")]
  UnreadableRow {
    line:   u64,
    #[source]
    source: csv::Error,
  },

  /// A record could not be projected onto a dimension and the malformed
  /// policy is `abort`.
  #[error("{dimension} dimension: malformed record: {source}")]
  Malformed {
    dimension: DimensionKind,
    #[source]
    source:    jobmart_core::Error,
  },

  /// A dimension load failed and the stage policy is `abort`.
  #[error("{dimension} dimension load failed: {source}")]
  DimensionLoad {
    dimension: DimensionKind,
    #[source]
    source:    Box<Error>,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// The backing store failed. Never survivable by a stage policy.
  pub fn is_store(&self) -> bool { matches!(self, Self::Store(_)) }

  /// Box a backend error.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
