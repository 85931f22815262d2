//! Source records and field coercion.
//!
//! A [`SourceRecord`] is one data line of the flat job-postings dataset,
//! addressed by header name. Dimensions pull typed attributes out of it with
//! [`SourceRecord::text`], [`SourceRecord::integer`] and [`SourceRecord::flag`].

use std::collections::HashMap;

use crate::{Error, Result, value::parse_flag};

/// Header names of the source dataset. Matching is case-sensitive.
pub mod fields {
  pub const JOB_ID: &str = "Job Id";
  pub const JOB_TITLE: &str = "Job Title";
  pub const QUALIFICATIONS: &str = "Qualifications";
  pub const SPECIALIZATION: &str = "Specialization";
  pub const JOB_PORTAL: &str = "Job Portal";
  pub const SKILLS: &str = "Skills";
  pub const RESPONSIBILITIES: &str = "Responsibilities";
  pub const MINIMUM_SALARY: &str = "Minimum Salary";
  pub const MAXIMUM_SALARY: &str = "Maximum Salary";
  pub const MINIMUM_EXPERIENCE: &str = "Minimum Experience (years)";
  pub const MAXIMUM_EXPERIENCE: &str = "Maximum Experience (years)";
  pub const WORK_TYPE: &str = "Work Type";
  pub const GENDER_PREFERENCE: &str = "Gender Preference";

  pub const COMPANY: &str = "Company";
  pub const COMPANY_SECTOR: &str = "Company Sector";
  pub const COMPANY_INDUSTRY: &str = "Company Industry";
  pub const COMPANY_SIZE: &str = "Company Size";
  pub const COMPANY_TICKER: &str = "Company Ticker";

  pub const DAY: &str = "Day";
  pub const MONTH: &str = "Month";
  pub const YEAR: &str = "Year";

  pub const RETIREMENT_PLANS: &str = "Retirement Plans";
  pub const STOCK_OPTIONS: &str = "Stock Options or Equity Grants";
  pub const PARENTAL_LEAVE: &str = "Parental Leave";
  pub const PAID_TIME_OFF: &str = "Paid Time Off (PTO)";
  pub const FLEXIBLE_WORK: &str = "Flexible Work Arrangements";
  pub const HEALTH_INSURANCE: &str = "Health Insurance";
  pub const LIFE_AND_DISABILITY: &str = "Life and Disability Insurance";
  pub const ASSISTANCE_PROGRAM: &str = "Employee Assistance Program";
  pub const WELLNESS_FACILITIES: &str = "Health and Wellness Facilities";
  pub const REFERRAL_PROGRAM: &str = "Employee Referral Program";
  pub const TRANSPORTATION: &str = "Transportation Benefits";
  pub const BONUSES: &str = "Bonuses and Incentive Programs";

  pub const HQ_COUNTRY: &str = "Company HQ Country";
  pub const HQ_CITY: &str = "Company HQ City";

  pub const COUNTRY: &str = "Country";
  pub const CITY: &str = "City";
  pub const CITY_POPULATION: &str = "Job City Population";
}

/// One data line of the source, keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRecord {
  /// 1-based line number in the source file (the header is line 1).
  pub line:   u64,
  pub values: HashMap<String, String>,
}

impl SourceRecord {
  pub fn new(line: u64, values: HashMap<String, String>) -> Self {
    Self { line, values }
  }

  /// Build a record from `(header, value)` pairs.
  pub fn from_pairs<K, V>(line: u64, pairs: impl IntoIterator<Item = (K, V)>) -> Self
  where
    K: Into<String>,
    V: Into<String>,
  {
    Self {
      line,
      values: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
    }
  }

  fn raw(&self, field: &'static str) -> Result<&str> {
    self
      .values
      .get(field)
      .map(String::as_str)
      .ok_or(Error::MissingField { line: self.line, field })
  }

  /// The field verbatim.
  pub fn text(&self, field: &'static str) -> Result<String> {
    self.raw(field).map(str::to_owned)
  }

  /// The field parsed as a signed integer; surrounding whitespace is ignored.
  pub fn integer(&self, field: &'static str) -> Result<i64> {
    let raw = self.raw(field)?;
    raw.trim().parse().map_err(|_| Error::InvalidInteger {
      line:  self.line,
      field,
      value: raw.to_owned(),
    })
  }

  /// The field parsed under the canonical boolean rule.
  pub fn flag(&self, field: &'static str) -> Result<bool> {
    let raw = self.raw(field)?;
    parse_flag(raw).ok_or_else(|| Error::InvalidBoolean {
      line:  self.line,
      field,
      value: raw.to_owned(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record() -> SourceRecord {
    SourceRecord::from_pairs(
      7,
      [
        (fields::JOB_ID, "1089843540111562"),
        (fields::YEAR, " 2023 "),
        (fields::HEALTH_INSURANCE, "True"),
        (fields::BONUSES, "maybe"),
        (fields::COMPANY, "Icahn Enterprises"),
      ],
    )
  }

  #[test]
  fn integer_trims_whitespace() {
    assert_eq!(record().integer(fields::YEAR).unwrap(), 2023);
    assert_eq!(
      record().integer(fields::JOB_ID).unwrap(),
      1_089_843_540_111_562
    );
  }

  #[test]
  fn text_is_verbatim() {
    assert_eq!(record().text(fields::COMPANY).unwrap(), "Icahn Enterprises");
  }

  #[test]
  fn missing_field_reports_line() {
    let err = record().text(fields::CITY).unwrap_err();
    assert!(matches!(
      err,
      Error::MissingField { line: 7, field: fields::CITY }
    ));
  }

  #[test]
  fn non_integer_is_rejected() {
    let err = record().integer(fields::COMPANY).unwrap_err();
    assert!(matches!(err, Error::InvalidInteger { .. }));
    assert_eq!(err.field(), Some(fields::COMPANY));
  }

  #[test]
  fn flag_normalises_and_rejects() {
    assert!(record().flag(fields::HEALTH_INSURANCE).unwrap());
    assert!(matches!(
      record().flag(fields::BONUSES).unwrap_err(),
      Error::InvalidBoolean { .. }
    ));
  }
}
