//! The staged warehouse load.
//!
//! Each stage consumes the value produced by the stage it depends on, so the
//! order `load dimensions → build cache → resolve facts → load facts →
//! compute measures` is enforced by the types rather than by call order:
//!
//! ```ignore
//! let summary = Pipeline::new(&warehouse, &source, options)
//!   .load_dimensions().await?
//!   .build_cache().await?
//!   .resolve_facts()?
//!   .load_facts().await?
//!   .compute_measures().await?;
//! ```

use std::{collections::BTreeMap, time::Instant};

use chrono::{DateTime, Utc};
use jobmart_core::{
  dimension::{
    Benefits, CompanyHqLocation, CompanyProfile, Dimension, DimensionKind, JobLocation,
    JobPosting, PostingDate,
  },
  fact::FactKeys,
  store::{InsertReport, Warehouse},
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use tracing::Instrument as _;
use uuid::Uuid;

use crate::{
  Error, Result,
  cache::DimensionKeyCache,
  load::{DimensionLoad, MalformedPolicy, load_dimension},
  measure::{MeasureRun, compute_measures},
  resolve::{Resolution, resolve_facts},
  source::CsvSource,
};

// ─── Stages and policies ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Stage {
  LoadDimensions,
  BuildCache,
  ResolveFacts,
  LoadFacts,
  ComputeMeasures,
}

impl Stage {
  /// The stage whose output this one consumes.
  pub fn depends_on(self) -> Option<Stage> {
    match self {
      Self::LoadDimensions => None,
      Self::BuildCache => Some(Self::LoadDimensions),
      Self::ResolveFacts => Some(Self::BuildCache),
      Self::LoadFacts => Some(Self::ResolveFacts),
      Self::ComputeMeasures => Some(Self::LoadFacts),
    }
  }
}

/// What a failed dimension load does to the rest of the run.
///
/// Only dimension loads are independent of each other; every later stage
/// aborts the run on error regardless of this setting. A backing-store
/// failure during a dimension load also always aborts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StagePolicy {
  /// Stop at the first failed dimension load.
  #[default]
  Abort,
  /// Log a source or malformed-record failure, finish the other dimension
  /// loads and carry on. Facts that need the failed dimension will not
  /// resolve.
  Continue,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
  pub malformed: MalformedPolicy,
  pub stage:     StagePolicy,
}

// ─── Summary ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct StageTiming {
  pub stage:           Stage,
  pub elapsed_seconds: f64,
}

/// Everything a run did, in stage order.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
  pub run_id:            Uuid,
  pub started_at:        DateTime<Utc>,
  pub source:            String,
  pub dimensions:        Vec<DimensionLoad>,
  pub failed_dimensions: Vec<DimensionKind>,
  /// Cached natural keys per dimension.
  pub cache:             BTreeMap<DimensionKind, usize>,
  pub resolution:        Resolution,
  pub facts:             InsertReport,
  pub measures:          Vec<MeasureRun>,
  pub stages:            Vec<StageTiming>,
  pub elapsed_seconds:   f64,
}

// ─── Run context ─────────────────────────────────────────────────────────────

struct Run<'a, W> {
  warehouse: &'a W,
  source:    &'a CsvSource,
  options:   PipelineOptions,
  summary:   RunSummary,
  started:   Instant,
}

impl<W: Warehouse> Run<'_, W> {
  fn begin(&self, stage: Stage) -> Instant {
    tracing::info!(%stage, "stage started");
    Instant::now()
  }

  fn finish(&mut self, stage: Stage, started: Instant) {
    let elapsed = started.elapsed().as_secs_f64();
    tracing::info!(%stage, elapsed = %format_args!("{elapsed:.6}s"), "stage finished");
    self.summary.stages.push(StageTiming { stage, elapsed_seconds: elapsed });
  }

  async fn load<D: Dimension>(&mut self) -> Result<()> {
    let started = Instant::now();
    let outcome = load_dimension::<D, W>(self.warehouse, self.source, self.options.malformed).await;

    match outcome {
      Ok(load) => {
        let elapsed = started.elapsed().as_secs_f64();
        tracing::info!(
          dimension = %D::KIND,
          elapsed = %format_args!("{elapsed:.6}s"),
          "dimension table populated"
        );
        self.summary.dimensions.push(load);
        Ok(())
      }
      Err(err) if self.options.stage == StagePolicy::Continue && !err.is_store() => {
        tracing::error!(dimension = %D::KIND, "dimension load failed, continuing: {err}");
        self.summary.failed_dimensions.push(D::KIND);
        Ok(())
      }
      Err(err) => Err(Error::DimensionLoad { dimension: D::KIND, source: Box::new(err) }),
    }
  }
}

macro_rules! summary_accessor {
  ($($stage:ident),*) => {
    $(
      impl<W> $stage<'_, W> {
        /// The run summary so far.
        pub fn summary(&self) -> &RunSummary { &self.run.summary }
      }
    )*
  };
}

// ─── Stages ──────────────────────────────────────────────────────────────────

/// A run that has not started yet.
pub struct Pipeline<'a, W> {
  run: Run<'a, W>,
}

pub struct DimensionsLoaded<'a, W> {
  run: Run<'a, W>,
}

pub struct CacheBuilt<'a, W> {
  run:   Run<'a, W>,
  cache: DimensionKeyCache,
}

pub struct FactsResolved<'a, W> {
  run:   Run<'a, W>,
  facts: Vec<FactKeys>,
}

pub struct FactsLoaded<'a, W> {
  run: Run<'a, W>,
}

summary_accessor!(Pipeline, DimensionsLoaded, CacheBuilt, FactsResolved, FactsLoaded);

impl<'a, W: Warehouse> Pipeline<'a, W> {
  pub fn new(warehouse: &'a W, source: &'a CsvSource, options: PipelineOptions) -> Self {
    let summary = RunSummary {
      run_id:            Uuid::new_v4(),
      started_at:        Utc::now(),
      source:            source.describe(),
      dimensions:        Vec::new(),
      failed_dimensions: Vec::new(),
      cache:             BTreeMap::new(),
      resolution:        Resolution::default(),
      facts:             InsertReport::default(),
      measures:          Vec::new(),
      stages:            Vec::new(),
      elapsed_seconds:   0.0,
    };

    Self {
      run: Run { warehouse, source, options, summary, started: Instant::now() },
    }
  }

  /// Run every stage in order.
  pub async fn run(self) -> Result<RunSummary> {
    let span = tracing::info_span!("run", run_id = %self.run.summary.run_id);

    async move {
      tracing::info!(source = %self.run.summary.source, "populating warehouse");
      self
        .load_dimensions()
        .await?
        .build_cache()
        .await?
        .resolve_facts()?
        .load_facts()
        .await?
        .compute_measures()
        .await
    }
    .instrument(span)
    .await
  }

  /// Load all six dimensions. They do not depend on each other.
  pub async fn load_dimensions(mut self) -> Result<DimensionsLoaded<'a, W>> {
    let started = self.run.begin(Stage::LoadDimensions);

    self.run.load::<JobPosting>().await?;
    self.run.load::<CompanyProfile>().await?;
    self.run.load::<PostingDate>().await?;
    self.run.load::<Benefits>().await?;
    self.run.load::<CompanyHqLocation>().await?;
    self.run.load::<JobLocation>().await?;

    if !self.run.summary.failed_dimensions.is_empty() {
      tracing::warn!(
        failed = ?self.run.summary.failed_dimensions,
        "continuing with incomplete dimensions"
      );
    }

    self.run.finish(Stage::LoadDimensions, started);
    Ok(DimensionsLoaded { run: self.run })
  }
}

impl<'a, W: Warehouse> DimensionsLoaded<'a, W> {
  pub async fn build_cache(mut self) -> Result<CacheBuilt<'a, W>> {
    let started = self.run.begin(Stage::BuildCache);

    let cache = DimensionKeyCache::build(self.run.warehouse).await?;
    self.run.summary.cache = cache.sizes().into_iter().collect();

    self.run.finish(Stage::BuildCache, started);
    Ok(CacheBuilt { run: self.run, cache })
  }
}

impl<'a, W: Warehouse> CacheBuilt<'a, W> {
  pub fn cache(&self) -> &DimensionKeyCache { &self.cache }

  /// Resolve every source record; the cache is dropped afterwards.
  pub fn resolve_facts(mut self) -> Result<FactsResolved<'a, W>> {
    let started = self.run.begin(Stage::ResolveFacts);

    let mut resolution = resolve_facts(&self.cache, self.run.source)?;
    let facts = std::mem::take(&mut resolution.facts);
    self.run.summary.resolution = resolution;

    self.run.finish(Stage::ResolveFacts, started);
    Ok(FactsResolved { run: self.run, facts })
  }
}

impl<'a, W: Warehouse> FactsResolved<'a, W> {
  pub fn facts(&self) -> &[FactKeys] { &self.facts }

  pub async fn load_facts(mut self) -> Result<FactsLoaded<'a, W>> {
    let started = self.run.begin(Stage::LoadFacts);

    let report = self
      .run
      .warehouse
      .insert_facts(self.facts)
      .await
      .map_err(Error::store)?;
    tracing::info!(
      inserted = report.inserted,
      ignored = report.ignored,
      "fact table populated"
    );
    self.run.summary.facts = report;

    self.run.finish(Stage::LoadFacts, started);
    Ok(FactsLoaded { run: self.run })
  }
}

impl<W: Warehouse> FactsLoaded<'_, W> {
  pub async fn compute_measures(mut self) -> Result<RunSummary> {
    let started = self.run.begin(Stage::ComputeMeasures);

    self.run.summary.measures = compute_measures(self.run.warehouse).await?;

    self.run.finish(Stage::ComputeMeasures, started);

    let elapsed = self.run.started.elapsed().as_secs_f64();
    self.run.summary.elapsed_seconds = elapsed;
    tracing::info!(elapsed = %format_args!("{elapsed:.6}s"), "warehouse populated");

    Ok(self.run.summary)
  }
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator as _;

  use super::*;

  #[test]
  fn stages_depend_on_their_predecessor() {
    let stages: Vec<Stage> = Stage::iter().collect();
    assert_eq!(stages[0].depends_on(), None);
    for pair in stages.windows(2) {
      assert_eq!(pair[1].depends_on(), Some(pair[0]));
    }
  }

  #[test]
  fn policies_default_to_abort() {
    let options = PipelineOptions::default();
    assert_eq!(options.malformed, MalformedPolicy::Abort);
    assert_eq!(options.stage, StagePolicy::Abort);
  }
}
