//! [`SqliteWarehouse`]: the SQLite implementation of [`Warehouse`].

use std::path::Path;

use jobmart_core::{
  dimension::Dimension,
  fact::{FACT_TABLE, FactKeys, Measure, PartitionCount},
  store::{InsertReport, Warehouse},
};
use rusqlite::{params_from_iter, types::Value as SqlValue};

use crate::{
  Result,
  encode::{RawKeyRow, encode_value},
  schema::{ORPHAN_FACTS, SCHEMA},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A star-schema warehouse backed by a single SQLite file.
///
/// Clones share the same reference-counted connection.
#[derive(Clone)]
pub struct SqliteWarehouse {
  conn: tokio_rusqlite::Connection,
}

impl SqliteWarehouse {
  /// Open (or create) a warehouse at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a private in-memory warehouse.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run one prepared insert per row inside a single transaction.
  ///
  /// The statement must be an `ON CONFLICT DO NOTHING` insert, so a row that
  /// hits a unique constraint reports zero changes instead of failing. Any
  /// other error drops the transaction, which rolls the whole batch back.
  async fn insert_batch(&self, sql: String, rows: Vec<Vec<SqlValue>>) -> Result<InsertReport> {
    let submitted = rows.len() as u64;

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut inserted = 0_u64;
        {
          let mut stmt = tx.prepare_cached(&sql)?;
          for row in &rows {
            inserted += stmt.execute(params_from_iter(row.iter()))? as u64;
          }
        }
        tx.commit()?;
        Ok(inserted)
      })
      .await?;

    Ok(InsertReport::new(submitted, inserted))
  }
}

/// `INSERT INTO table (a, b) VALUES (?1, ?2) ON CONFLICT DO NOTHING`
fn insert_or_ignore_sql(table: &str, columns: &[&str]) -> String {
  let placeholders = (1..=columns.len())
    .map(|i| format!("?{i}"))
    .collect::<Vec<_>>()
    .join(", ");
  format!(
    "INSERT INTO {table} ({}) VALUES ({placeholders}) ON CONFLICT DO NOTHING",
    columns.join(", ")
  )
}

/// Windowed count over `(year, category)` written back per fact row.
fn measure_update_sql(measure: Measure) -> String {
  let column = measure.column();
  let category = measure.category_column();
  format!(
    "WITH counts AS (
       SELECT f.fact_key AS fact_key,
              COUNT(*) OVER (PARTITION BY d.year, c.{category}) AS n
       FROM {FACT_TABLE} f
       JOIN job_posting_date_dim d ON d.job_posting_date_key = f.job_posting_date_key
       JOIN company_profile_dim  c ON c.company_profile_key  = f.company_profile_key
     )
     UPDATE {FACT_TABLE}
        SET {column} = counts.n
       FROM counts
      WHERE {FACT_TABLE}.fact_key = counts.fact_key"
  )
}

// ─── Warehouse impl ──────────────────────────────────────────────────────────

impl Warehouse for SqliteWarehouse {
  type Error = crate::Error;

  // ── Dimensions ────────────────────────────────────────────────────────────

  async fn insert_dimension<D: Dimension>(&self, rows: Vec<D>) -> Result<InsertReport> {
    debug_assert_eq!(
      D::COLUMNS.contains(&D::SURROGATE),
      !D::STORE_ASSIGNED,
      "{}: surrogate column must be inserted exactly when the store does not assign it",
      D::TABLE
    );
    let sql = insert_or_ignore_sql(D::TABLE, D::COLUMNS);
    let encoded = rows
      .iter()
      .map(|row| row.values().into_iter().map(encode_value).collect())
      .collect();

    let report = self.insert_batch(sql, encoded).await?;
    tracing::debug!(
      table = D::TABLE,
      inserted = report.inserted,
      ignored = report.ignored,
      "dimension batch committed"
    );
    Ok(report)
  }

  async fn dimension_keys<D: Dimension>(&self) -> Result<Vec<(D::Key, i64)>> {
    let arity = D::KEY_COLUMNS.len();
    let sql = format!(
      "SELECT {}, {} FROM {}",
      D::KEY_COLUMNS.join(", "),
      D::SURROGATE,
      D::TABLE
    );

    let raws: Vec<RawKeyRow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| {
            let key = (0..arity)
              .map(|i| row.get::<_, SqlValue>(i))
              .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(RawKeyRow { key, surrogate: row.get(arity)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|raw| -> Result<_> {
        let (values, surrogate) = raw.decode(D::TABLE)?;
        Ok((D::key_from_values(&values)?, surrogate))
      })
      .collect()
  }

  // ── Facts ─────────────────────────────────────────────────────────────────

  async fn insert_facts(&self, rows: Vec<FactKeys>) -> Result<InsertReport> {
    let sql = insert_or_ignore_sql(FACT_TABLE, &FactKeys::COLUMNS);
    let encoded = rows
      .iter()
      .map(|keys| keys.to_array().into_iter().map(SqlValue::Integer).collect())
      .collect();

    self.insert_batch(sql, encoded).await
  }

  // ── Measures ──────────────────────────────────────────────────────────────

  async fn compute_measure(&self, measure: Measure) -> Result<u64> {
    let sql = measure_update_sql(measure);

    let updated = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let updated = tx.execute(&sql, [])? as u64;
        tx.commit()?;
        Ok(updated)
      })
      .await?;

    Ok(updated)
  }

  async fn partition_counts(&self, measure: Measure) -> Result<Vec<PartitionCount>> {
    let column = measure.column();
    let category = measure.category_column();
    let sql = format!(
      "SELECT DISTINCT d.year, c.{category}, f.{column}
       FROM {FACT_TABLE} f
       JOIN job_posting_date_dim d ON d.job_posting_date_key = f.job_posting_date_key
       JOIN company_profile_dim  c ON c.company_profile_key  = f.company_profile_key
       WHERE f.{column} IS NOT NULL
       ORDER BY d.year, c.{category}"
    );

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| {
            Ok(PartitionCount {
              year:     row.get(0)?,
              category: row.get(1)?,
              count:    row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(rows)
  }

  // ── Verification ──────────────────────────────────────────────────────────

  async fn count_rows(&self, table: &'static str) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?)
      })
      .await?;
    Ok(count as u64)
  }

  async fn unmeasured_facts(&self, measure: Measure) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM {FACT_TABLE} WHERE {} IS NULL", measure.column());
    let count: i64 = self
      .conn
      .call(move |conn| Ok(conn.query_row(&sql, [], |r| r.get(0))?))
      .await?;
    Ok(count as u64)
  }

  async fn orphan_facts(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row(ORPHAN_FACTS, [], |r| r.get(0))?))
      .await?;
    Ok(count as u64)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn insert_sql_numbers_placeholders() {
    assert_eq!(
      insert_or_ignore_sql("t", &["a", "b", "c"]),
      "INSERT INTO t (a, b, c) VALUES (?1, ?2, ?3) ON CONFLICT DO NOTHING"
    );
  }

  #[test]
  fn measure_sql_partitions_on_category() {
    let sql = measure_update_sql(Measure::JobsPerCompanyAndYear);
    assert!(sql.contains("PARTITION BY d.year, c.name"));
    assert!(sql.contains("SET jobs_per_company_and_year = counts.n"));
  }
}
