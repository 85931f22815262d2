//! The fact table row and the measures derived over it.

use serde::Serialize;
use strum::{Display, EnumIter};

/// Table holding one row per resolvable source record.
pub const FACT_TABLE: &str = "job_posting_fact";

/// Surrogate keys of one fact row, one per dimension.
///
/// The full six-tuple is unique in the fact table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FactKeys {
  pub job_posting:         i64,
  pub company_profile:     i64,
  pub posting_date:        i64,
  pub benefits:            i64,
  pub company_hq_location: i64,
  pub job_location:        i64,
}

impl FactKeys {
  /// Fact-table foreign-key columns, in the order of [`FactKeys::to_array`].
  pub const COLUMNS: [&'static str; 6] = [
    "job_posting_key",
    "company_profile_key",
    "job_posting_date_key",
    "benefits_key",
    "company_hq_location_key",
    "job_location_key",
  ];

  pub fn to_array(&self) -> [i64; 6] {
    [
      self.job_posting,
      self.company_profile,
      self.posting_date,
      self.benefits,
      self.company_hq_location,
      self.job_location,
    ]
  }
}

// ─── Measures ────────────────────────────────────────────────────────────────

/// A windowed count materialised onto every fact row of its partition.
///
/// Partitions are `(posting year, category)` where the category is an
/// attribute of the company-profile dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Measure {
  /// Jobs posted per industry per year.
  JobsPerIndustryAndYear,
  /// Jobs a company posted per year.
  JobsPerCompanyAndYear,
}

impl Measure {
  /// Fact-table column the count is written to.
  pub fn column(self) -> &'static str {
    match self {
      Self::JobsPerIndustryAndYear => "jobs_per_industry_and_year",
      Self::JobsPerCompanyAndYear => "jobs_per_company_and_year",
    }
  }

  /// Company-profile column the count is partitioned on, alongside year.
  pub fn category_column(self) -> &'static str {
    match self {
      Self::JobsPerIndustryAndYear => "industry",
      Self::JobsPerCompanyAndYear => "name",
    }
  }
}

/// One partition of a measure as read back from the fact table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionCount {
  pub year:     i64,
  pub category: String,
  pub count:    i64,
}
