//! Error types for `jobmart-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("line {line}: missing field {field:?}")]
  MissingField { line: u64, field: &'static str },

  #[error("line {line}: field {field:?} is not an integer: {value:?}")]
  InvalidInteger {
    line:  u64,
    field: &'static str,
    value: String,
  },

  #[error("line {line}: field {field:?} is not a boolean: {value:?}")]
  InvalidBoolean {
    line:  u64,
    field: &'static str,
    value: String,
  },

  /// A natural key read back from the store did not match the dimension's
  /// key columns.
  #[error("{table}: cannot decode natural key from stored values: {reason}")]
  KeyDecode { table: &'static str, reason: String },
}

impl Error {
  /// The source field that failed, if the error came from a source record.
  pub fn field(&self) -> Option<&'static str> {
    match self {
      Self::MissingField { field, .. }
      | Self::InvalidInteger { field, .. }
      | Self::InvalidBoolean { field, .. } => Some(*field),
      Self::KeyDecode { .. } => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
