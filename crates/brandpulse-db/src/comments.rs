//! Database operations for the four bucket tables
//! (`english_aspects`, `sinhala_aspects`, `english_garbage`, `sinhala_garbage`).

use brandpulse_core::{Aspect, Bucket, CommentRecord};
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::DbError;

/// Rows per multi-row `INSERT`. Keeps bind parameters well under the
/// Postgres limit of 65535.
const INSERT_CHUNK: usize = 500;

/// Valid comments of one aspect, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct AspectGroup {
    pub aspect: String,
    pub comments: Vec<String>,
}

/// Everything a run classified as valid, grouped by aspect per language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapeResults {
    pub brand: String,
    pub scrape_id: String,
    pub english: Vec<AspectGroup>,
    pub sinhala: Vec<AspectGroup>,
}

/// Bulk-inserts `records` into `bucket`'s table inside one transaction.
///
/// Score columns exist only on `sinhala_aspects`; other buckets ignore
/// [`CommentRecord::scores`]. Returns the number of rows written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails; the whole bucket is rolled
/// back in that case.
pub async fn insert_comment_records(
    pool: &PgPool,
    bucket: Bucket,
    records: &[CommentRecord],
) -> Result<u64, DbError> {
    if records.is_empty() {
        return Ok(0);
    }

    let with_scores = bucket == Bucket::SinhalaValid;
    let columns = if with_scores {
        "scrape_id, brand, trigger_keywords, comment, aspect, published_at, \
         model_score, lexicon_score, final_score"
    } else {
        "scrape_id, brand, trigger_keywords, comment, aspect, published_at"
    };

    let mut tx = pool.begin().await?;
    let mut inserted = 0;

    for chunk in records.chunks(INSERT_CHUNK) {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("INSERT INTO {} ({columns}) ", bucket.table_name()));

        qb.push_values(chunk, |mut row, record| {
            row.push_bind(record.scrape_id.as_str().to_string())
                .push_bind(record.brand.clone())
                .push_bind(record.trigger_keywords.clone())
                .push_bind(record.comment.clone())
                .push_bind(record.aspect.map(Aspect::as_str))
                .push_bind(record.published_at);
            if with_scores {
                row.push_bind(record.scores.map(|s| s.model_score))
                    .push_bind(record.scores.map(|s| s.lexicon_score))
                    .push_bind(record.scores.map(|s| s.final_score));
            }
        });

        let result = qb.build().execute(&mut *tx).await?;
        inserted += result.rows_affected();
    }

    tx.commit().await?;
    tracing::debug!(table = bucket.table_name(), rows = inserted, "bucket inserted");
    Ok(inserted)
}

/// Valid English and Sinhala comments for one brand and run, grouped by
/// aspect name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails.
pub async fn find_results(
    pool: &PgPool,
    brand: &str,
    scrape_id: &str,
) -> Result<ScrapeResults, DbError> {
    let english = grouped_by_aspect(pool, Bucket::EnglishValid, brand, scrape_id).await?;
    let sinhala = grouped_by_aspect(pool, Bucket::SinhalaValid, brand, scrape_id).await?;

    Ok(ScrapeResults {
        brand: brand.to_string(),
        scrape_id: scrape_id.to_string(),
        english,
        sinhala,
    })
}

async fn grouped_by_aspect(
    pool: &PgPool,
    bucket: Bucket,
    brand: &str,
    scrape_id: &str,
) -> Result<Vec<AspectGroup>, DbError> {
    let sql = format!(
        "SELECT aspect, array_agg(comment ORDER BY id) AS comments \
         FROM {} \
         WHERE brand = $1 AND scrape_id = $2 AND aspect IS NOT NULL \
         GROUP BY aspect \
         ORDER BY aspect",
        bucket.table_name()
    );
    let rows = sqlx::query_as::<_, AspectGroup>(&sql)
        .bind(brand)
        .bind(scrape_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}
