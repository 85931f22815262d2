//! The `Warehouse` trait and supporting report types.
//!
//! The trait is implemented by storage backends (e.g. `jobmart-store-sqlite`).
//! The ETL pipeline depends on this abstraction, not on any concrete backend.

use std::future::Future;

use serde::Serialize;

use crate::{
  dimension::Dimension,
  fact::{FactKeys, Measure, PartitionCount},
};

/// Outcome of one insert-or-ignore batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InsertReport {
  /// Rows handed to the store.
  pub submitted: u64,
  /// Rows that were new and are now persisted.
  pub inserted:  u64,
  /// Rows skipped because their unique key was already present.
  pub ignored:   u64,
}

impl InsertReport {
  pub fn new(submitted: u64, inserted: u64) -> Self {
    Self { submitted, inserted, ignored: submitted.saturating_sub(inserted) }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the star-schema backing store.
///
/// Both insert operations follow an *insert or ignore* contract: a row whose
/// unique key (a dimension's natural key, or the fact six-tuple) already exists
/// is skipped silently and never overwrites the stored row. Any other failure
/// is returned as an error and leaves none of the batch visible.
pub trait Warehouse: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Dimensions ────────────────────────────────────────────────────────

  /// Insert a batch of dimension rows in a single transaction.
  fn insert_dimension<D: Dimension>(
    &self,
    rows: Vec<D>,
  ) -> impl Future<Output = Result<InsertReport, Self::Error>> + Send + '_;

  /// Read every `(natural key, surrogate key)` pair of a dimension table in
  /// one query.
  fn dimension_keys<D: Dimension>(
    &self,
  ) -> impl Future<Output = Result<Vec<(D::Key, i64)>, Self::Error>> + Send + '_;

  // ── Facts ─────────────────────────────────────────────────────────────

  /// Insert resolved fact rows in a single transaction; duplicate six-tuples
  /// are ignored.
  fn insert_facts(
    &self,
    rows: Vec<FactKeys>,
  ) -> impl Future<Output = Result<InsertReport, Self::Error>> + Send + '_;

  // ── Measures ──────────────────────────────────────────────────────────

  /// Compute `measure` as a windowed count over the fact table and write it
  /// onto every fact row. Returns the number of rows updated. Reruns
  /// overwrite, they never accumulate.
  fn compute_measure(
    &self,
    measure: Measure,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// One entry per `(year, category)` partition of a computed measure.
  fn partition_counts(
    &self,
    measure: Measure,
  ) -> impl Future<Output = Result<Vec<PartitionCount>, Self::Error>> + Send + '_;

  // ── Verification ──────────────────────────────────────────────────────

  /// Number of rows in `table`.
  fn count_rows(
    &self,
    table: &'static str,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Number of fact rows whose `measure` column is still unset.
  fn unmeasured_facts(
    &self,
    measure: Measure,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Number of fact rows with at least one key that does not reference an
  /// existing dimension row.
  fn orphan_facts(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
