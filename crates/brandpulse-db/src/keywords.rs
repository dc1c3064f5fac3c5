//! Database operations for `saved_combinations`, the keyword store.

use brandpulse_core::KeywordRecord;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct KeywordRow {
    pub id: i64,
    pub brand: String,
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<KeywordRow> for KeywordRecord {
    fn from(row: KeywordRow) -> Self {
        KeywordRecord {
            brand: row.brand,
            keywords: row.keywords,
            created_at: row.created_at,
        }
    }
}

/// Saves a brand/keyword combination. The newest row is the one ingestion
/// uses.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn save_keyword_record(
    pool: &PgPool,
    brand: &str,
    keywords: &[String],
) -> Result<KeywordRow, DbError> {
    let row = sqlx::query_as::<_, KeywordRow>(
        "INSERT INTO saved_combinations (brand, keywords) \
         VALUES ($1, $2) \
         RETURNING id, brand, keywords, created_at",
    )
    .bind(brand)
    .bind(keywords)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// The most recently saved combination, or `None` if none exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_keyword_record(pool: &PgPool) -> Result<Option<KeywordRecord>, DbError> {
    let row = sqlx::query_as::<_, KeywordRow>(
        "SELECT id, brand, keywords, created_at \
         FROM saved_combinations \
         ORDER BY created_at DESC, id DESC \
         LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(row.map(KeywordRecord::from))
}
