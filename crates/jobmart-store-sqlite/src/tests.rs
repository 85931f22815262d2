//! Integration tests for `SqliteWarehouse` against an in-memory database.

use jobmart_core::{
  dimension::{
    Benefits, CompanyHqLocation, CompanyProfile, Dimension, JobLocation, JobPosting,
    PostingDate,
  },
  fact::{FACT_TABLE, FactKeys, Measure, PartitionCount},
  store::{InsertReport, Warehouse},
};

use crate::SqliteWarehouse;

async fn store() -> SqliteWarehouse {
  SqliteWarehouse::open_in_memory()
    .await
    .expect("in-memory store")
}

fn company(name: &str, industry: &str) -> CompanyProfile {
  CompanyProfile {
    name:     name.into(),
    sector:   "Energy".into(),
    industry: industry.into(),
    size:     1000,
    ticker:   name.to_uppercase(),
  }
}

fn job(job_id: i64) -> JobPosting {
  JobPosting {
    job_id,
    job_title:          "Data Engineer".into(),
    qualifications:     "B.Tech".into(),
    specialization:     "Pipelines".into(),
    job_portal:         "Indeed".into(),
    skills:             "SQL".into(),
    responsibilities:   "Build things".into(),
    minimum_salary:     55,
    maximum_salary:     90,
    minimum_experience: 1,
    maximum_experience: 5,
    work_type:          "Intern".into(),
    gender_preference:  "Both".into(),
  }
}

fn date(year: i64) -> PostingDate { PostingDate { day: 4, month: 7, year } }

async fn key_of<D: Dimension>(s: &SqliteWarehouse, key: &D::Key) -> i64 {
  s.dimension_keys::<D>()
    .await
    .unwrap()
    .into_iter()
    .find(|(k, _)| k == key)
    .map(|(_, v)| v)
    .expect("key present")
}

// ─── Dimensions ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn dimension_insert_reports_counts() {
  let s = store().await;
  let report = s
    .insert_dimension(vec![company("acme", "Oil"), company("initech", "Software")])
    .await
    .unwrap();
  assert_eq!(report, InsertReport { submitted: 2, inserted: 2, ignored: 0 });
  assert_eq!(s.count_rows(CompanyProfile::TABLE).await.unwrap(), 2);
}

#[tokio::test]
async fn dimension_reload_is_idempotent() {
  let s = store().await;
  let rows = vec![date(2022), date(2023)];
  s.insert_dimension(rows.clone()).await.unwrap();

  let second = s.insert_dimension(rows).await.unwrap();
  assert_eq!(second.inserted, 0);
  assert_eq!(second.ignored, 2);
  assert_eq!(s.count_rows(PostingDate::TABLE).await.unwrap(), 2);
}

#[tokio::test]
async fn conflicting_row_does_not_overwrite() {
  let s = store().await;
  let lima = JobLocation { country: "Peru".into(), city: "Lima".into(), city_population: 10 };
  s.insert_dimension(vec![lima.clone()]).await.unwrap();

  let changed = JobLocation { city_population: 99, ..lima };
  let report = s.insert_dimension(vec![changed]).await.unwrap();
  assert_eq!(report.ignored, 1);

  let keys = s.dimension_keys::<JobLocation>().await.unwrap();
  assert_eq!(keys.len(), 1);
}

#[tokio::test]
async fn job_posting_key_is_job_id() {
  let s = store().await;
  s.insert_dimension(vec![job(42), job(7)]).await.unwrap();

  let mut keys = s.dimension_keys::<JobPosting>().await.unwrap();
  keys.sort();
  assert_eq!(keys, vec![(7, 7), (42, 42)]);
}

#[tokio::test]
async fn benefits_keys_round_trip_through_integers() {
  let s = store().await;
  let b = Benefits { parental_leave: true, bonuses_and_incentive_programs: true, ..Default::default() };
  s.insert_dimension(vec![b, Benefits::default()]).await.unwrap();

  let keys = s.dimension_keys::<Benefits>().await.unwrap();
  assert_eq!(keys.len(), 2);
  assert!(keys.iter().any(|(k, _)| *k == b));
  assert!(keys.iter().any(|(k, _)| *k == Benefits::default()));
}

#[tokio::test]
async fn empty_batch_is_a_no_op() {
  let s = store().await;
  let report = s.insert_dimension(Vec::<CompanyHqLocation>::new()).await.unwrap();
  assert_eq!(report, InsertReport::default());
}

// ─── Facts ───────────────────────────────────────────────────────────────────

/// Load one fact per `(job id, company, year)`; returns the store and the
/// fact rows that were inserted.
async fn seeded_with_rows(
  facts: &[(i64, CompanyProfile, i64)],
) -> (SqliteWarehouse, Vec<FactKeys>) {
  let s = store().await;
  let hq = CompanyHqLocation { country: "USA".into(), city: "Austin".into() };
  let loc = JobLocation { country: "Peru".into(), city: "Lima".into(), city_population: 10 };

  s.insert_dimension(facts.iter().map(|(id, _, _)| job(*id)).collect()).await.unwrap();
  s.insert_dimension(facts.iter().map(|(_, c, _)| c.clone()).collect()).await.unwrap();
  s.insert_dimension(facts.iter().map(|(_, _, y)| date(*y)).collect()).await.unwrap();
  s.insert_dimension(vec![Benefits::default()]).await.unwrap();
  s.insert_dimension(vec![hq.clone()]).await.unwrap();
  s.insert_dimension(vec![loc.clone()]).await.unwrap();

  let benefits = key_of::<Benefits>(&s, &Benefits::default()).await;
  let hq_key = key_of::<CompanyHqLocation>(&s, &hq).await;
  let loc_key = key_of::<JobLocation>(&s, &loc.natural_key()).await;

  let mut rows = Vec::new();
  for (id, c, y) in facts {
    rows.push(FactKeys {
      job_posting:         *id,
      company_profile:     key_of::<CompanyProfile>(&s, c).await,
      posting_date:        key_of::<PostingDate>(&s, &date(*y)).await,
      benefits,
      company_hq_location: hq_key,
      job_location:        loc_key,
    });
  }
  let report = s.insert_facts(rows.clone()).await.unwrap();
  assert_eq!(report.inserted, facts.len() as u64);
  (s, rows)
}

async fn seeded(facts: &[(i64, CompanyProfile, i64)]) -> SqliteWarehouse {
  seeded_with_rows(facts).await.0
}

#[tokio::test]
async fn fact_reload_is_idempotent() {
  let (s, rows) =
    seeded_with_rows(&[(1, company("a", "X"), 2023), (2, company("b", "X"), 2023)]).await;
  assert_eq!(s.count_rows(FACT_TABLE).await.unwrap(), 2);

  let again = s.insert_facts(rows).await.unwrap();
  assert_eq!(again, InsertReport { submitted: 2, inserted: 0, ignored: 2 });
  assert_eq!(s.count_rows(FACT_TABLE).await.unwrap(), 2);
  assert_eq!(s.orphan_facts().await.unwrap(), 0);
}

#[tokio::test]
async fn duplicate_fact_tuple_is_ignored() {
  let (s, rows) = seeded_with_rows(&[(1, company("a", "X"), 2023)]).await;
  let row = rows[0];
  let report = s.insert_facts(vec![row, row]).await.unwrap();
  assert_eq!(report, InsertReport { submitted: 2, inserted: 0, ignored: 2 });
  assert_eq!(s.count_rows(FACT_TABLE).await.unwrap(), 1);
}

#[tokio::test]
async fn fact_with_unknown_key_fails_and_rolls_back() {
  let (s, rows) = seeded_with_rows(&[(1, company("a", "X"), 2023)]).await;
  s.insert_dimension(vec![job(2)]).await.unwrap();

  let good = FactKeys { job_posting: 2, ..rows[0] };
  let bad = FactKeys { job_posting: 999, ..rows[0] };
  assert!(s.insert_facts(vec![good, bad]).await.is_err());
  assert_eq!(s.count_rows(FACT_TABLE).await.unwrap(), 1);
}

// ─── Measures ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn measures_are_windowed_counts() {
  let a = company("a", "X");
  let b = company("b", "X");
  let s = seeded(&[(1, a.clone(), 2023), (2, a, 2023), (3, b, 2023)]).await;

  assert_eq!(s.compute_measure(Measure::JobsPerCompanyAndYear).await.unwrap(), 3);
  assert_eq!(s.compute_measure(Measure::JobsPerIndustryAndYear).await.unwrap(), 3);

  assert_eq!(
    s.partition_counts(Measure::JobsPerCompanyAndYear).await.unwrap(),
    vec![
      PartitionCount { year: 2023, category: "a".into(), count: 2 },
      PartitionCount { year: 2023, category: "b".into(), count: 1 },
    ]
  );
  assert_eq!(
    s.partition_counts(Measure::JobsPerIndustryAndYear).await.unwrap(),
    vec![PartitionCount { year: 2023, category: "X".into(), count: 3 }]
  );
}

#[tokio::test]
async fn measures_partition_by_year() {
  let a = company("a", "X");
  let s = seeded(&[(1, a.clone(), 2022), (2, a.clone(), 2023), (3, a, 2023)]).await;
  s.compute_measure(Measure::JobsPerCompanyAndYear).await.unwrap();

  let counts = s.partition_counts(Measure::JobsPerCompanyAndYear).await.unwrap();
  assert_eq!(counts.len(), 2);
  assert_eq!(counts[0].count, 1);
  assert_eq!(counts[1].count, 2);
}

#[tokio::test]
async fn measure_rerun_overwrites() {
  let s = seeded(&[(1, company("a", "X"), 2023), (2, company("a", "X"), 2023)]).await;
  s.compute_measure(Measure::JobsPerIndustryAndYear).await.unwrap();
  s.compute_measure(Measure::JobsPerIndustryAndYear).await.unwrap();

  let counts = s.partition_counts(Measure::JobsPerIndustryAndYear).await.unwrap();
  assert_eq!(counts, vec![PartitionCount { year: 2023, category: "X".into(), count: 2 }]);
}

#[tokio::test]
async fn measure_rerun_picks_up_new_facts() {
  let a = company("a", "X");
  let (s, rows) = seeded_with_rows(&[(1, a, 2023)]).await;
  s.compute_measure(Measure::JobsPerCompanyAndYear).await.unwrap();
  assert_eq!(
    s.partition_counts(Measure::JobsPerCompanyAndYear).await.unwrap(),
    vec![PartitionCount { year: 2023, category: "a".into(), count: 1 }]
  );

  s.insert_dimension(vec![job(2)]).await.unwrap();
  s.insert_facts(vec![FactKeys { job_posting: 2, ..rows[0] }]).await.unwrap();
  assert_eq!(s.compute_measure(Measure::JobsPerCompanyAndYear).await.unwrap(), 2);

  // A stale value on either row would show up as a second partition entry.
  assert_eq!(
    s.partition_counts(Measure::JobsPerCompanyAndYear).await.unwrap(),
    vec![PartitionCount { year: 2023, category: "a".into(), count: 2 }]
  );
  assert_eq!(s.unmeasured_facts(Measure::JobsPerCompanyAndYear).await.unwrap(), 0);
}

#[tokio::test]
async fn every_fact_row_receives_the_measure() {
  let s = seeded(&[(1, company("a", "X"), 2022), (2, company("b", "Y"), 2023)]).await;
  assert_eq!(s.unmeasured_facts(Measure::JobsPerIndustryAndYear).await.unwrap(), 2);

  s.compute_measure(Measure::JobsPerIndustryAndYear).await.unwrap();
  assert_eq!(s.unmeasured_facts(Measure::JobsPerIndustryAndYear).await.unwrap(), 0);
  assert_eq!(s.unmeasured_facts(Measure::JobsPerCompanyAndYear).await.unwrap(), 2);
}

#[tokio::test]
async fn uncomputed_measure_has_no_partitions() {
  let s = seeded(&[(1, company("a", "X"), 2023)]).await;
  assert!(s.partition_counts(Measure::JobsPerCompanyAndYear).await.unwrap().is_empty());
}
