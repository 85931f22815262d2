//! Post-load measure computation.

use jobmart_core::{fact::Measure, store::Warehouse};
use serde::Serialize;
use strum::IntoEnumIterator as _;

use crate::{Error, Result};

/// Outcome of one measure pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeasureRun {
  pub measure:      Measure,
  /// Fact rows whose measure column was (re)written.
  pub rows_updated: u64,
  /// Distinct `(year, category)` partitions.
  pub partitions:   u64,
  /// Fact rows still without a value after the pass.
  pub unmeasured:   u64,
}

/// Run every measure pass in declaration order. Must follow the fact load.
pub async fn compute_measures<W: Warehouse>(warehouse: &W) -> Result<Vec<MeasureRun>> {
  let mut runs = Vec::new();

  for measure in Measure::iter() {
    let rows_updated = warehouse.compute_measure(measure).await.map_err(Error::store)?;
    let partitions = warehouse
      .partition_counts(measure)
      .await
      .map_err(Error::store)?
      .len() as u64;

    let unmeasured = warehouse.unmeasured_facts(measure).await.map_err(Error::store)?;
    if unmeasured > 0 {
      tracing::warn!(%measure, unmeasured, "fact rows left without a measure value");
    }

    tracing::info!(%measure, rows_updated, partitions, "measure computed");
    runs.push(MeasureRun { measure, rows_updated, partitions, unmeasured });
  }

  Ok(runs)
}
