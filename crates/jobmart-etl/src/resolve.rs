//! Fact resolution: map every source record onto six surrogate keys.
//!
//! A record yields a fact row only when all six natural keys are present in
//! the [`DimensionKeyCache`]. Anything else is a soft skip. It is counted and
//! logged, never an error, and never produces a partial row.

use std::collections::BTreeMap;

use jobmart_core::{
  dimension::{
    Benefits, CompanyHqLocation, CompanyProfile, DimensionKind, JobLocation, JobPosting,
    PostingDate,
  },
  fact::FactKeys,
  record::SourceRecord,
};
use serde::Serialize;

use crate::{
  Error, Result,
  cache::{Cached, DimensionKeyCache},
  source::CsvSource,
};

/// Why a record did not resolve.
#[derive(Debug)]
enum Miss {
  /// The natural key is well-formed but absent from the dimension.
  Unresolved(DimensionKind),
  /// The natural key could not be built from the record.
  Malformed(DimensionKind, jobmart_core::Error),
}

/// Resolved fact rows plus an account of everything that was dropped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Resolution {
  /// Not deduplicated; the fact load ignores repeated six-tuples.
  #[serde(skip)]
  pub facts:      Vec<FactKeys>,
  pub records:    u64,
  pub resolved:   u64,
  /// Dropped records keyed by the first dimension that failed to resolve.
  pub unresolved: BTreeMap<DimensionKind, u64>,
  /// Dropped records whose natural key could not be coerced, plus rows
  /// that could not be read at all.
  pub malformed:  u64,
}

impl Resolution {
  pub fn dropped(&self) -> u64 {
    self.unresolved.values().sum::<u64>() + self.malformed
  }
}

fn lookup<D: Cached>(cache: &DimensionKeyCache, record: &SourceRecord) -> Result<i64, Miss> {
  let key = D::key_from_record(record).map_err(|e| Miss::Malformed(D::KIND, e))?;
  cache.lookup::<D>(&key).ok_or(Miss::Unresolved(D::KIND))
}

fn resolve_record(cache: &DimensionKeyCache, record: &SourceRecord) -> Result<FactKeys, Miss> {
  Ok(FactKeys {
    job_posting:         lookup::<JobPosting>(cache, record)?,
    company_profile:     lookup::<CompanyProfile>(cache, record)?,
    posting_date:        lookup::<PostingDate>(cache, record)?,
    benefits:            lookup::<Benefits>(cache, record)?,
    company_hq_location: lookup::<CompanyHqLocation>(cache, record)?,
    job_location:        lookup::<JobLocation>(cache, record)?,
  })
}

/// Re-stream `source` and resolve each record against `cache`.
///
/// Only a failure to open or read the source as a whole is an error.
pub fn resolve_facts(cache: &DimensionKeyCache, source: &CsvSource) -> Result<Resolution> {
  let mut resolution = Resolution::default();

  for record in source.records()? {
    let record = match record {
      Ok(record) => record,
      Err(err @ Error::UnreadableRow { .. }) => {
        tracing::debug!("unreadable row dropped: {err}");
        resolution.records += 1;
        resolution.malformed += 1;
        continue;
      }
      Err(err) => return Err(err),
    };
    resolution.records += 1;

    match resolve_record(cache, &record) {
      Ok(keys) => {
        resolution.facts.push(keys);
        resolution.resolved += 1;
      }
      Err(Miss::Unresolved(dimension)) => {
        tracing::debug!(line = record.line, %dimension, "no dimension row; record dropped");
        *resolution.unresolved.entry(dimension).or_default() += 1;
      }
      Err(Miss::Malformed(dimension, err)) => {
        tracing::debug!(line = record.line, %dimension, "malformed key; record dropped: {err}");
        resolution.malformed += 1;
      }
    }
  }

  if resolution.dropped() > 0 {
    tracing::warn!(
      dropped = resolution.dropped(),
      malformed = resolution.malformed,
      "records dropped during fact resolution"
    );
  }
  tracing::info!(
    records = resolution.records,
    resolved = resolution.resolved,
    "fact rows resolved"
  );

  Ok(resolution)
}
