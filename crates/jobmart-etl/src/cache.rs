//! In-memory natural-key → surrogate-key lookup for all six dimensions.
//!
//! Built once per run with one bulk read per dimension table, after every
//! dimension load has committed. Resolving a fact is then six hash lookups
//! instead of six database round-trips per source record.

use std::collections::HashMap;

use jobmart_core::{
  dimension::{
    Benefits, CompanyHqLocation, CompanyProfile, Dimension, DimensionKind, JobLocation,
    JobPosting, PostingDate,
  },
  store::Warehouse,
};

use crate::{Error, Result};

pub type KeyMap<K> = HashMap<K, i64>;

/// Natural-key lookups for one pipeline run. Immutable once built.
#[derive(Debug, Default)]
pub struct DimensionKeyCache {
  job_posting:         KeyMap<i64>,
  company_profile:     KeyMap<CompanyProfile>,
  posting_date:        KeyMap<PostingDate>,
  benefits:            KeyMap<Benefits>,
  company_hq_location: KeyMap<CompanyHqLocation>,
  job_location:        KeyMap<(String, String)>,
}

/// A dimension with a slot in [`DimensionKeyCache`].
pub trait Cached: Dimension {
  fn slot(cache: &DimensionKeyCache) -> &KeyMap<Self::Key>;
}

macro_rules! cached {
  ($dim:ty => $field:ident) => {
    impl Cached for $dim {
      fn slot(cache: &DimensionKeyCache) -> &KeyMap<Self::Key> { &cache.$field }
    }
  };
}

cached!(JobPosting => job_posting);
cached!(CompanyProfile => company_profile);
cached!(PostingDate => posting_date);
cached!(Benefits => benefits);
cached!(CompanyHqLocation => company_hq_location);
cached!(JobLocation => job_location);

async fn read<D, W>(warehouse: &W) -> Result<KeyMap<D::Key>>
where
  D: Dimension,
  W: Warehouse,
{
  let pairs = warehouse.dimension_keys::<D>().await.map_err(Error::store)?;
  let map: KeyMap<D::Key> = pairs.into_iter().collect();
  tracing::debug!(dimension = %D::KIND, keys = map.len(), "dimension keys cached");
  Ok(map)
}

impl DimensionKeyCache {
  /// Read back every dimension table. Callers must only invoke this after
  /// all dimension loads have committed.
  pub async fn build<W: Warehouse>(warehouse: &W) -> Result<Self> {
    Ok(Self {
      job_posting:         read::<JobPosting, W>(warehouse).await?,
      company_profile:     read::<CompanyProfile, W>(warehouse).await?,
      posting_date:        read::<PostingDate, W>(warehouse).await?,
      benefits:            read::<Benefits, W>(warehouse).await?,
      company_hq_location: read::<CompanyHqLocation, W>(warehouse).await?,
      job_location:        read::<JobLocation, W>(warehouse).await?,
    })
  }

  /// Surrogate key for a natural key, if the dimension holds it.
  pub fn lookup<D: Cached>(&self, key: &D::Key) -> Option<i64> {
    D::slot(self).get(key).copied()
  }

  pub fn len<D: Cached>(&self) -> usize { D::slot(self).len() }

  /// Number of cached keys per dimension.
  pub fn sizes(&self) -> Vec<(DimensionKind, usize)> {
    vec![
      (JobPosting::KIND, self.len::<JobPosting>()),
      (CompanyProfile::KIND, self.len::<CompanyProfile>()),
      (PostingDate::KIND, self.len::<PostingDate>()),
      (Benefits::KIND, self.len::<Benefits>()),
      (CompanyHqLocation::KIND, self.len::<CompanyHqLocation>()),
      (JobLocation::KIND, self.len::<JobLocation>()),
    ]
  }
}
