//! Dimension loading: project, coerce, deduplicate, insert-or-ignore.

use std::collections::HashSet;

use jobmart_core::{
  dimension::{Dimension, DimensionKind},
  store::Warehouse,
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, source::CsvSource};

/// What to do with a record that cannot be projected onto a dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
  /// Fail the whole dimension batch; nothing is inserted.
  #[default]
  Abort,
  /// Log the offending record and leave it out of the batch.
  Skip,
}

/// Rows extracted from the source for one dimension, deduplicated by natural
/// key. The first occurrence of each key wins and source order is kept.
#[derive(Debug)]
pub struct Extraction<D> {
  pub rows:      Vec<D>,
  pub records:   u64,
  pub malformed: u64,
}

/// Outcome of loading one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionLoad {
  pub dimension: DimensionKind,
  /// Source records read.
  pub records:   u64,
  /// Records or unreadable rows skipped under [`MalformedPolicy::Skip`].
  pub malformed: u64,
  /// Distinct natural keys submitted to the store.
  pub distinct:  u64,
  pub inserted:  u64,
  /// Rows whose natural key was already present in the table.
  pub ignored:   u64,
}

pub fn extract<D: Dimension>(source: &CsvSource, policy: MalformedPolicy) -> Result<Extraction<D>> {
  let mut seen = HashSet::new();
  let mut extraction = Extraction { rows: Vec::new(), records: 0, malformed: 0 };

  for record in source.records()? {
    let record = match record {
      Ok(record) => record,
      Err(err @ Error::UnreadableRow { .. }) => {
        extraction.records += 1;
        match policy {
          MalformedPolicy::Abort => return Err(err),
          MalformedPolicy::Skip => {
            tracing::warn!(dimension = %D::KIND, "skipping unreadable row: {err}");
            extraction.malformed += 1;
            continue;
          }
        }
      }
      Err(err) => return Err(err),
    };
    extraction.records += 1;

    match D::from_record(&record) {
      Ok(row) => {
        if seen.insert(row.natural_key()) {
          extraction.rows.push(row);
        }
      }
      Err(err) => match policy {
        MalformedPolicy::Abort => {
          return Err(Error::Malformed { dimension: D::KIND, source: err });
        }
        MalformedPolicy::Skip => {
          tracing::warn!(
            dimension = %D::KIND,
            line = record.line,
            field = err.field().unwrap_or_default(),
            "skipping malformed record: {err}"
          );
          extraction.malformed += 1;
        }
      },
    }
  }

  Ok(extraction)
}

/// Load one dimension from `source` into `warehouse`.
pub async fn load_dimension<D, W>(
  warehouse: &W,
  source: &CsvSource,
  policy: MalformedPolicy,
) -> Result<DimensionLoad>
where
  D: Dimension,
  W: Warehouse,
{
  let Extraction { rows, records, malformed } = extract::<D>(source, policy)?;
  let distinct = rows.len() as u64;

  let report = warehouse.insert_dimension(rows).await.map_err(Error::store)?;

  tracing::info!(
    dimension = %D::KIND,
    records,
    distinct,
    inserted = report.inserted,
    ignored = report.ignored,
    "dimension loaded"
  );

  Ok(DimensionLoad {
    dimension: D::KIND,
    records,
    malformed,
    distinct,
    inserted: report.inserted,
    ignored: report.ignored,
  })
}

#[cfg(test)]
mod tests {
  use jobmart_core::dimension::{CompanyHqLocation, PostingDate};

  use super::*;

  const DATES: &str = "Day,Month,Year\n1,2,2023\n1,2,2023\n3,4,2022\n";

  #[test]
  fn extract_dedups_by_natural_key_in_source_order() {
    let ex = extract::<PostingDate>(&CsvSource::from_text(DATES), MalformedPolicy::Abort).unwrap();
    assert_eq!(ex.records, 3);
    assert_eq!(
      ex.rows,
      vec![
        PostingDate { day: 1, month: 2, year: 2023 },
        PostingDate { day: 3, month: 4, year: 2022 },
      ]
    );
  }

  #[test]
  fn abort_policy_fails_on_first_bad_record() {
    let source = CsvSource::from_text("Day,Month,Year\n1,2,2023\nx,2,2023\n");
    let err = extract::<PostingDate>(&source, MalformedPolicy::Abort).unwrap_err();
    assert!(matches!(
      err,
      Error::Malformed { dimension: DimensionKind::PostingDate, .. }
    ));
  }

  #[test]
  fn skip_policy_counts_bad_records() {
    let source = CsvSource::from_text("Day,Month,Year\n1,2,2023\nx,2,2023\n5,6\n");
    let ex = extract::<PostingDate>(&source, MalformedPolicy::Skip).unwrap();
    assert_eq!(ex.rows.len(), 1);
    assert_eq!(ex.malformed, 2);
    assert_eq!(ex.records, 3);
  }

  const BAD_UTF8_DATES: &[u8] = b"Day,Month,Year\n1,2,2023\n\xff,2,2023\n3,4,2022\n";

  #[test]
  fn skip_policy_skips_unreadable_rows() {
    let source = CsvSource::from_bytes(BAD_UTF8_DATES);
    let ex = extract::<PostingDate>(&source, MalformedPolicy::Skip).unwrap();
    assert_eq!(ex.rows.len(), 2);
    assert_eq!(ex.malformed, 1);
    assert_eq!(ex.records, 3);
  }

  #[test]
  fn abort_policy_fails_on_unreadable_row() {
    let source = CsvSource::from_bytes(BAD_UTF8_DATES);
    let err = extract::<PostingDate>(&source, MalformedPolicy::Abort).unwrap_err();
    assert!(matches!(err, Error::UnreadableRow { .. }));
  }

  #[test]
  fn extraction_only_reads_its_own_fields() {
    let source = CsvSource::from_text(
      "Company HQ Country,Company HQ City,Day\nUSA,Austin,not-a-number\n",
    );
    let ex = extract::<CompanyHqLocation>(&source, MalformedPolicy::Abort).unwrap();
    assert_eq!(ex.rows.len(), 1);
  }
}
