//! Postgres-backed [`KeywordStore`] and [`Persistence`].

use async_trait::async_trait;
use brandpulse_core::{Bucket, CommentRecord, KeywordRecord, RunSummary, ScrapeId};
use brandpulse_db::{NewScrapeRun, ScrapeResults};
use sqlx::PgPool;

use crate::error::IngestError;
use crate::traits::{KeywordStore, Persistence, RunStart};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeywordStore for PgStore {
    async fn latest(&self) -> Result<Option<KeywordRecord>, IngestError> {
        Ok(brandpulse_db::latest_keyword_record(&self.pool).await?)
    }
}

#[async_trait]
impl Persistence for PgStore {
    async fn bulk_insert(
        &self,
        bucket: Bucket,
        records: &[CommentRecord],
    ) -> Result<u64, IngestError> {
        Ok(brandpulse_db::insert_comment_records(&self.pool, bucket, records).await?)
    }

    async fn find_by(&self, brand: &str, scrape_id: &str) -> Result<ScrapeResults, IngestError> {
        Ok(brandpulse_db::find_results(&self.pool, brand, scrape_id).await?)
    }

    async fn open_run(&self, run: &RunStart) -> Result<(), IngestError> {
        brandpulse_db::create_scrape_run(
            &self.pool,
            NewScrapeRun {
                scrape_id: run.scrape_id.as_str(),
                brand: &run.brand,
                keywords: &run.keywords,
                start_date: run.start_date,
                end_date: run.end_date,
            },
        )
        .await?;
        Ok(())
    }

    async fn complete_run(
        &self,
        scrape_id: &ScrapeId,
        summary: &RunSummary,
    ) -> Result<(), IngestError> {
        let summary = serde_json::to_value(summary)
            .map_err(|e| IngestError::Persistence(format!("summary serialization: {e}")))?;
        brandpulse_db::complete_scrape_run(&self.pool, scrape_id.as_str(), &summary).await?;
        Ok(())
    }

    async fn fail_run(&self, scrape_id: &ScrapeId, message: &str) -> Result<(), IngestError> {
        brandpulse_db::fail_scrape_run(&self.pool, scrape_id.as_str(), message).await?;
        Ok(())
    }
}
