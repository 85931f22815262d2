//! The six dimensions of the job-postings star schema.
//!
//! Every dimension is a plain struct implementing [`Dimension`]. The trait
//! carries the table layout the store needs (table, columns, natural key,
//! surrogate key) and the two conversions the pipeline needs: projecting a
//! [`SourceRecord`] into a row, and decoding a natural key read back from the
//! store. Loader and resolver both go through [`Dimension::from_record`], so
//! they always agree on field selection and coercion.

use std::{fmt::Debug, hash::Hash};

use serde::Serialize;
use strum::{Display, EnumIter, IntoStaticStr};

use crate::{
  Error, Result,
  record::{SourceRecord, fields},
  value::Value,
};

// ─── Kinds ───────────────────────────────────────────────────────────────────

/// Identifies one of the six dimensions.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Display,
  EnumIter,
  IntoStaticStr,
  Serialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum DimensionKind {
  JobPosting,
  CompanyProfile,
  PostingDate,
  Benefits,
  CompanyHqLocation,
  JobLocation,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A dimension table and its row type.
pub trait Dimension: Sized + Send + 'static {
  /// The natural key; unique within the table.
  type Key: Clone + Eq + Hash + Debug + Send + 'static;

  const KIND: DimensionKind;
  const TABLE: &'static str;
  /// Surrogate key column referenced by the fact table.
  const SURROGATE: &'static str;
  /// `true` when the store assigns the surrogate key on insert; `false` when
  /// it is one of [`Self::COLUMNS`].
  const STORE_ASSIGNED: bool;
  /// Attribute columns, in the order of [`Dimension::values`].
  const COLUMNS: &'static [&'static str];
  /// Natural-key columns, in the order [`Dimension::key_from_values`] expects.
  const KEY_COLUMNS: &'static [&'static str];

  /// Project and coerce the dimension's attributes out of a source record.
  fn from_record(record: &SourceRecord) -> Result<Self>;

  /// Attribute values matching [`Self::COLUMNS`].
  fn values(&self) -> Vec<Value>;

  fn natural_key(&self) -> Self::Key;

  /// The natural key a source record maps to.
  fn key_from_record(record: &SourceRecord) -> Result<Self::Key> {
    Self::from_record(record).map(|row| row.natural_key())
  }

  /// Decode a natural key from values read in [`Self::KEY_COLUMNS`] order.
  fn key_from_values(values: &[Value]) -> Result<Self::Key>;
}

/// Sequential reader over stored natural-key values.
struct KeyReader<'a> {
  table:  &'static str,
  values: &'a [Value],
  next:   usize,
}

impl<'a> KeyReader<'a> {
  fn new(table: &'static str, values: &'a [Value], arity: usize) -> Result<Self> {
    if values.len() != arity {
      return Err(Error::KeyDecode {
        table,
        reason: format!("expected {arity} values, got {}", values.len()),
      });
    }
    Ok(Self { table, values, next: 0 })
  }

  fn take(&mut self) -> &'a Value {
    let v = &self.values[self.next];
    self.next += 1;
    v
  }

  fn integer(&mut self) -> Result<i64> {
    let v = self.take();
    v.as_integer().ok_or_else(|| self.bad("integer", v))
  }

  fn text(&mut self) -> Result<String> {
    let v = self.take();
    v.as_text().map(str::to_owned).ok_or_else(|| self.bad("text", v))
  }

  fn flag(&mut self) -> Result<bool> {
    let v = self.take();
    v.as_bool().ok_or_else(|| self.bad("boolean", v))
  }

  fn bad(&self, expected: &str, got: &Value) -> Error {
    Error::KeyDecode {
      table:  self.table,
      reason: format!("column {} is not {expected}: {got:?}", self.next - 1),
    }
  }
}

// ─── Job posting ─────────────────────────────────────────────────────────────

/// A job posting. The source's job id is both natural and surrogate key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPosting {
  pub job_id:             i64,
  pub job_title:          String,
  pub qualifications:     String,
  pub specialization:     String,
  pub job_portal:         String,
  pub skills:             String,
  pub responsibilities:   String,
  pub minimum_salary:     i64,
  pub maximum_salary:     i64,
  pub minimum_experience: i64,
  pub maximum_experience: i64,
  pub work_type:          String,
  pub gender_preference:  String,
}

impl Dimension for JobPosting {
  type Key = i64;

  const KIND: DimensionKind = DimensionKind::JobPosting;
  const TABLE: &'static str = "job_posting_dim";
  const SURROGATE: &'static str = "job_id";
  const STORE_ASSIGNED: bool = false;
  const COLUMNS: &'static [&'static str] = &[
    "job_id",
    "job_title",
    "qualifications",
    "specialization",
    "job_portal",
    "skills",
    "responsibilities",
    "minimum_salary",
    "maximum_salary",
    "minimum_experience",
    "maximum_experience",
    "work_type",
    "gender_preference",
  ];
  const KEY_COLUMNS: &'static [&'static str] = &["job_id"];

  fn from_record(r: &SourceRecord) -> Result<Self> {
    Ok(Self {
      job_id:             r.integer(fields::JOB_ID)?,
      job_title:          r.text(fields::JOB_TITLE)?,
      qualifications:     r.text(fields::QUALIFICATIONS)?,
      specialization:     r.text(fields::SPECIALIZATION)?,
      job_portal:         r.text(fields::JOB_PORTAL)?,
      skills:             r.text(fields::SKILLS)?,
      responsibilities:   r.text(fields::RESPONSIBILITIES)?,
      minimum_salary:     r.integer(fields::MINIMUM_SALARY)?,
      maximum_salary:     r.integer(fields::MAXIMUM_SALARY)?,
      minimum_experience: r.integer(fields::MINIMUM_EXPERIENCE)?,
      maximum_experience: r.integer(fields::MAXIMUM_EXPERIENCE)?,
      work_type:          r.text(fields::WORK_TYPE)?,
      gender_preference:  r.text(fields::GENDER_PREFERENCE)?,
    })
  }

  fn values(&self) -> Vec<Value> {
    vec![
      self.job_id.into(),
      self.job_title.clone().into(),
      self.qualifications.clone().into(),
      self.specialization.clone().into(),
      self.job_portal.clone().into(),
      self.skills.clone().into(),
      self.responsibilities.clone().into(),
      self.minimum_salary.into(),
      self.maximum_salary.into(),
      self.minimum_experience.into(),
      self.maximum_experience.into(),
      self.work_type.clone().into(),
      self.gender_preference.clone().into(),
    ]
  }

  fn natural_key(&self) -> i64 { self.job_id }

  fn key_from_values(values: &[Value]) -> Result<i64> {
    KeyReader::new(Self::TABLE, values, 1)?.integer()
  }
}

// ─── Company profile ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompanyProfile {
  pub name:     String,
  pub sector:   String,
  pub industry: String,
  pub size:     i64,
  pub ticker:   String,
}

impl Dimension for CompanyProfile {
  type Key = Self;

  const KIND: DimensionKind = DimensionKind::CompanyProfile;
  const TABLE: &'static str = "company_profile_dim";
  const SURROGATE: &'static str = "company_profile_key";
  const STORE_ASSIGNED: bool = true;
  const COLUMNS: &'static [&'static str] =
    &["name", "sector", "industry", "size", "ticker"];
  const KEY_COLUMNS: &'static [&'static str] = Self::COLUMNS;

  fn from_record(r: &SourceRecord) -> Result<Self> {
    Ok(Self {
      name:     r.text(fields::COMPANY)?,
      sector:   r.text(fields::COMPANY_SECTOR)?,
      industry: r.text(fields::COMPANY_INDUSTRY)?,
      size:     r.integer(fields::COMPANY_SIZE)?,
      ticker:   r.text(fields::COMPANY_TICKER)?,
    })
  }

  fn values(&self) -> Vec<Value> {
    vec![
      self.name.clone().into(),
      self.sector.clone().into(),
      self.industry.clone().into(),
      self.size.into(),
      self.ticker.clone().into(),
    ]
  }

  fn natural_key(&self) -> Self { self.clone() }

  fn key_from_values(values: &[Value]) -> Result<Self> {
    let mut r = KeyReader::new(Self::TABLE, values, 5)?;
    Ok(Self {
      name:     r.text()?,
      sector:   r.text()?,
      industry: r.text()?,
      size:     r.integer()?,
      ticker:   r.text()?,
    })
  }
}

// ─── Posting date ────────────────────────────────────────────────────────────

/// Calendar date a job was posted, kept as its three source components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PostingDate {
  pub day:   i64,
  pub month: i64,
  pub year:  i64,
}

impl Dimension for PostingDate {
  type Key = Self;

  const KIND: DimensionKind = DimensionKind::PostingDate;
  const TABLE: &'static str = "job_posting_date_dim";
  const SURROGATE: &'static str = "job_posting_date_key";
  const STORE_ASSIGNED: bool = true;
  const COLUMNS: &'static [&'static str] = &["day", "month", "year"];
  const KEY_COLUMNS: &'static [&'static str] = Self::COLUMNS;

  fn from_record(r: &SourceRecord) -> Result<Self> {
    Ok(Self {
      day:   r.integer(fields::DAY)?,
      month: r.integer(fields::MONTH)?,
      year:  r.integer(fields::YEAR)?,
    })
  }

  fn values(&self) -> Vec<Value> {
    vec![self.day.into(), self.month.into(), self.year.into()]
  }

  fn natural_key(&self) -> Self { *self }

  fn key_from_values(values: &[Value]) -> Result<Self> {
    let mut r = KeyReader::new(Self::TABLE, values, 3)?;
    Ok(Self { day: r.integer()?, month: r.integer()?, year: r.integer()? })
  }
}

// ─── Benefits ────────────────────────────────────────────────────────────────

/// The benefits package on offer. All twelve flags form the natural key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Benefits {
  pub retirement_plans:               bool,
  pub stock_options:                  bool,
  pub parental_leave:                 bool,
  pub paid_time_off:                  bool,
  pub flexible_work_arrangements:     bool,
  pub health_insurance:               bool,
  pub life_and_disability_insurance:  bool,
  pub employee_assistance_program:    bool,
  pub health_and_wellness_facilities: bool,
  pub employee_referral_program:      bool,
  pub transportation_benefits:        bool,
  pub bonuses_and_incentive_programs: bool,
}

impl Dimension for Benefits {
  type Key = Self;

  const KIND: DimensionKind = DimensionKind::Benefits;
  const TABLE: &'static str = "benefits_dim";
  const SURROGATE: &'static str = "benefits_key";
  const STORE_ASSIGNED: bool = true;
  const COLUMNS: &'static [&'static str] = &[
    "retirement_plans",
    "stock_options",
    "parental_leave",
    "paid_time_off",
    "flexible_work_arrangements",
    "health_insurance",
    "life_and_disability_insurance",
    "employee_assistance_program",
    "health_and_wellness_facilities",
    "employee_referral_program",
    "transportation_benefits",
    "bonuses_and_incentive_programs",
  ];
  const KEY_COLUMNS: &'static [&'static str] = Self::COLUMNS;

  fn from_record(r: &SourceRecord) -> Result<Self> {
    Ok(Self {
      retirement_plans:               r.flag(fields::RETIREMENT_PLANS)?,
      stock_options:                  r.flag(fields::STOCK_OPTIONS)?,
      parental_leave:                 r.flag(fields::PARENTAL_LEAVE)?,
      paid_time_off:                  r.flag(fields::PAID_TIME_OFF)?,
      flexible_work_arrangements:     r.flag(fields::FLEXIBLE_WORK)?,
      health_insurance:               r.flag(fields::HEALTH_INSURANCE)?,
      life_and_disability_insurance:  r.flag(fields::LIFE_AND_DISABILITY)?,
      employee_assistance_program:    r.flag(fields::ASSISTANCE_PROGRAM)?,
      health_and_wellness_facilities: r.flag(fields::WELLNESS_FACILITIES)?,
      employee_referral_program:      r.flag(fields::REFERRAL_PROGRAM)?,
      transportation_benefits:        r.flag(fields::TRANSPORTATION)?,
      bonuses_and_incentive_programs: r.flag(fields::BONUSES)?,
    })
  }

  fn values(&self) -> Vec<Value> {
    [
      self.retirement_plans,
      self.stock_options,
      self.parental_leave,
      self.paid_time_off,
      self.flexible_work_arrangements,
      self.health_insurance,
      self.life_and_disability_insurance,
      self.employee_assistance_program,
      self.health_and_wellness_facilities,
      self.employee_referral_program,
      self.transportation_benefits,
      self.bonuses_and_incentive_programs,
    ]
    .into_iter()
    .map(Value::Bool)
    .collect()
  }

  fn natural_key(&self) -> Self { *self }

  fn key_from_values(values: &[Value]) -> Result<Self> {
    let mut r = KeyReader::new(Self::TABLE, values, 12)?;
    Ok(Self {
      retirement_plans:               r.flag()?,
      stock_options:                  r.flag()?,
      parental_leave:                 r.flag()?,
      paid_time_off:                  r.flag()?,
      flexible_work_arrangements:     r.flag()?,
      health_insurance:               r.flag()?,
      life_and_disability_insurance:  r.flag()?,
      employee_assistance_program:    r.flag()?,
      health_and_wellness_facilities: r.flag()?,
      employee_referral_program:      r.flag()?,
      transportation_benefits:        r.flag()?,
      bonuses_and_incentive_programs: r.flag()?,
    })
  }
}

// ─── Company HQ location ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompanyHqLocation {
  pub country: String,
  pub city:    String,
}

impl Dimension for CompanyHqLocation {
  type Key = Self;

  const KIND: DimensionKind = DimensionKind::CompanyHqLocation;
  const TABLE: &'static str = "company_hq_location_dim";
  const SURROGATE: &'static str = "company_hq_location_key";
  const STORE_ASSIGNED: bool = true;
  const COLUMNS: &'static [&'static str] = &["country", "city"];
  const KEY_COLUMNS: &'static [&'static str] = Self::COLUMNS;

  fn from_record(r: &SourceRecord) -> Result<Self> {
    Ok(Self {
      country: r.text(fields::HQ_COUNTRY)?,
      city:    r.text(fields::HQ_CITY)?,
    })
  }

  fn values(&self) -> Vec<Value> {
    vec![self.country.clone().into(), self.city.clone().into()]
  }

  fn natural_key(&self) -> Self { self.clone() }

  fn key_from_values(values: &[Value]) -> Result<Self> {
    let mut r = KeyReader::new(Self::TABLE, values, 2)?;
    Ok(Self { country: r.text()?, city: r.text()? })
  }
}

// ─── Job location ────────────────────────────────────────────────────────────

/// Where the job itself is located. Population is descriptive only; the
/// natural key is `(country, city)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobLocation {
  pub country:         String,
  pub city:            String,
  pub city_population: i64,
}

impl Dimension for JobLocation {
  type Key = (String, String);

  const KIND: DimensionKind = DimensionKind::JobLocation;
  const TABLE: &'static str = "job_location_dim";
  const SURROGATE: &'static str = "job_location_key";
  const STORE_ASSIGNED: bool = true;
  const COLUMNS: &'static [&'static str] = &["country", "city", "city_population"];
  const KEY_COLUMNS: &'static [&'static str] = &["country", "city"];

  fn from_record(r: &SourceRecord) -> Result<Self> {
    Ok(Self {
      country:         r.text(fields::COUNTRY)?,
      city:            r.text(fields::CITY)?,
      city_population: r.integer(fields::CITY_POPULATION)?,
    })
  }

  fn values(&self) -> Vec<Value> {
    vec![
      self.country.clone().into(),
      self.city.clone().into(),
      self.city_population.into(),
    ]
  }

  fn natural_key(&self) -> (String, String) {
    (self.country.clone(), self.city.clone())
  }

  fn key_from_values(values: &[Value]) -> Result<(String, String)> {
    let mut r = KeyReader::new(Self::TABLE, values, 2)?;
    Ok((r.text()?, r.text()?))
  }
}
