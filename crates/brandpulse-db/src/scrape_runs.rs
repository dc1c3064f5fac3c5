//! Database operations for `scrape_runs`, the per-run ledger.
//!
//! A run is created `running` when ingestion enters discovery, then moves
//! exactly once to `succeeded` (with its summary) or `failed`.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `scrape_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScrapeRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub scrape_id: String,
    pub brand: String,
    pub keywords: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub summary: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Fields needed to open a run.
#[derive(Debug, Clone, Copy)]
pub struct NewScrapeRun<'a> {
    pub scrape_id: &'a str,
    pub brand: &'a str,
    pub keywords: &'a [String],
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

const RUN_COLUMNS: &str = "id, public_id, scrape_id, brand, keywords, start_date, end_date, \
                           status, summary, error_message, started_at, completed_at";

/// Creates a run in `running` status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including when
/// `scrape_id` already exists.
pub async fn create_scrape_run(
    pool: &PgPool,
    run: NewScrapeRun<'_>,
) -> Result<ScrapeRunRow, DbError> {
    let row = sqlx::query_as::<_, ScrapeRunRow>(&format!(
        "INSERT INTO scrape_runs (public_id, scrape_id, brand, keywords, start_date, end_date) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {RUN_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(run.scrape_id)
    .bind(run.brand)
    .bind(run.keywords)
    .bind(run.start_date)
    .bind(run.end_date)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a run `succeeded` and stores its summary.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `running`,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn complete_scrape_run(
    pool: &PgPool,
    scrape_id: &str,
    summary: &serde_json::Value,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE scrape_runs \
         SET status = 'succeeded', completed_at = NOW(), summary = $1 \
         WHERE scrape_id = $2 AND status = 'running'",
    )
    .bind(summary)
    .bind(scrape_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            scrape_id: scrape_id.to_string(),
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a run `failed` with `error_message`.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `running`,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn fail_scrape_run(
    pool: &PgPool,
    scrape_id: &str,
    error_message: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE scrape_runs \
         SET status = 'failed', completed_at = NOW(), error_message = $1 \
         WHERE scrape_id = $2 AND status = 'running'",
    )
    .bind(error_message)
    .bind(scrape_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            scrape_id: scrape_id.to_string(),
            expected_status: "running",
        });
    }

    Ok(())
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no run has `scrape_id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_scrape_run(pool: &PgPool, scrape_id: &str) -> Result<ScrapeRunRow, DbError> {
    sqlx::query_as::<_, ScrapeRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM scrape_runs WHERE scrape_id = $1"
    ))
    .bind(scrape_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Returns the most recent `limit` runs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_scrape_runs(pool: &PgPool, limit: i64) -> Result<Vec<ScrapeRunRow>, DbError> {
    let rows = sqlx::query_as::<_, ScrapeRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM scrape_runs ORDER BY started_at DESC, id DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
