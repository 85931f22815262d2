//! Conversion between [`jobmart_core::value::Value`] and SQLite values.
//!
//! Booleans are stored as INTEGER 0/1. Reading back goes through the core
//! decoders, which also accept text truth values, so a column written by
//! another tool with `'true'`/`'false'` still matches the cache keys.

use jobmart_core::value::Value;
use rusqlite::types::Value as SqlValue;

use crate::{Error, Result};

pub fn encode_value(v: Value) -> SqlValue {
  match v {
    Value::Integer(i) => SqlValue::Integer(i),
    Value::Text(s) => SqlValue::Text(s),
    Value::Bool(b) => SqlValue::Integer(i64::from(b)),
  }
}

pub fn decode_value(table: &'static str, v: SqlValue) -> Result<Value> {
  match v {
    SqlValue::Integer(i) => Ok(Value::Integer(i)),
    SqlValue::Text(s) => Ok(Value::Text(s)),
    SqlValue::Null => Err(Error::UnsupportedValue { table, kind: "null" }),
    SqlValue::Real(_) => Err(Error::UnsupportedValue { table, kind: "real" }),
    SqlValue::Blob(_) => Err(Error::UnsupportedValue { table, kind: "blob" }),
  }
}

/// Raw `(natural key values, surrogate key)` pair read from a dimension table.
pub struct RawKeyRow {
  pub key:       Vec<SqlValue>,
  pub surrogate: i64,
}

impl RawKeyRow {
  pub fn decode(self, table: &'static str) -> Result<(Vec<Value>, i64)> {
    let key = self
      .key
      .into_iter()
      .map(|v| decode_value(table, v))
      .collect::<Result<Vec<_>>>()?;
    Ok((key, self.surrogate))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn booleans_are_stored_as_integers() {
    assert_eq!(encode_value(Value::Bool(true)), SqlValue::Integer(1));
    assert_eq!(encode_value(Value::Bool(false)), SqlValue::Integer(0));
  }

  #[test]
  fn null_is_rejected() {
    assert!(matches!(
      decode_value("benefits_dim", SqlValue::Null),
      Err(Error::UnsupportedValue { kind: "null", .. })
    ));
  }
}
