//! Backend-neutral column values and the canonical boolean rule.
//!
//! Dimension rows are handed to the store as a list of [`Value`]s and natural
//! keys come back the same way. Booleans always travel as [`Value::Bool`];
//! backends persist them however they like, and [`Value::as_bool`] folds every
//! representation a backend might return back into a Rust `bool`.

use serde::Serialize;

/// A single column value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Value {
  Integer(i64),
  Text(String),
  Bool(bool),
}

impl Value {
  pub fn as_integer(&self) -> Option<i64> {
    match self {
      Self::Integer(i) => Some(*i),
      Self::Bool(b) => Some(i64::from(*b)),
      Self::Text(s) => s.trim().parse().ok(),
    }
  }

  pub fn as_text(&self) -> Option<&str> {
    match self {
      Self::Text(s) => Some(s),
      _ => None,
    }
  }

  /// Interpret the value as a boolean under the canonical rule.
  ///
  /// Integers are `true` for 1 and `false` for 0; text goes through
  /// [`parse_flag`].
  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Self::Bool(b) => Some(*b),
      Self::Integer(0) => Some(false),
      Self::Integer(1) => Some(true),
      Self::Integer(_) => None,
      Self::Text(s) => parse_flag(s),
    }
  }
}

impl From<i64> for Value {
  fn from(v: i64) -> Self { Self::Integer(v) }
}

impl From<bool> for Value {
  fn from(v: bool) -> Self { Self::Bool(v) }
}

impl From<String> for Value {
  fn from(v: String) -> Self { Self::Text(v) }
}

impl From<&str> for Value {
  fn from(v: &str) -> Self { Self::Text(v.to_owned()) }
}

/// Parse boolean text the same way everywhere: source fields, cache keys and
/// values read back from the store.
///
/// Case-insensitive and whitespace-tolerant. Returns `None` for anything that
/// is not a recognised truth value.
pub fn parse_flag(raw: &str) -> Option<bool> {
  match raw.trim().to_ascii_lowercase().as_str() {
    "true" | "t" | "yes" | "y" | "1" => Some(true),
    "false" | "f" | "no" | "n" | "0" => Some(false),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_flag_is_case_insensitive() {
    assert_eq!(parse_flag("True"), Some(true));
    assert_eq!(parse_flag("TRUE"), Some(true));
    assert_eq!(parse_flag(" false "), Some(false));
    assert_eq!(parse_flag("FaLsE"), Some(false));
  }

  #[test]
  fn parse_flag_accepts_numeric_and_short_forms() {
    assert_eq!(parse_flag("1"), Some(true));
    assert_eq!(parse_flag("0"), Some(false));
    assert_eq!(parse_flag("y"), Some(true));
    assert_eq!(parse_flag("N"), Some(false));
  }

  #[test]
  fn parse_flag_rejects_garbage() {
    assert_eq!(parse_flag(""), None);
    assert_eq!(parse_flag("maybe"), None);
    assert_eq!(parse_flag("2"), None);
  }

  #[test]
  fn stored_representations_agree() {
    assert_eq!(Value::Integer(1).as_bool(), Some(true));
    assert_eq!(Value::Integer(0).as_bool(), Some(false));
    assert_eq!(Value::Text("t".into()).as_bool(), Some(true));
    assert_eq!(Value::Bool(false).as_bool(), Some(false));
    assert_eq!(Value::Integer(7).as_bool(), None);
  }
}
