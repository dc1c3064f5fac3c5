//! Read-side commands plus saving keyword combinations.

use brandpulse_ingest::{Persistence, PgStore};

/// Prints a run's valid comments grouped by aspect, as JSON.
pub(crate) async fn run_results(
    pool: sqlx::PgPool,
    brand: &str,
    scrape_id: &str,
) -> anyhow::Result<()> {
    let store = PgStore::new(pool);
    let results = store.find_by(brand, scrape_id).await?;

    if results.english.is_empty() && results.sinhala.is_empty() {
        tracing::warn!(brand, scrape_id, "no valid comments stored for this run");
    }
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

pub(crate) async fn run_runs_list(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let runs = brandpulse_db::list_scrape_runs(pool, limit).await?;
    if runs.is_empty() {
        println!("no runs recorded");
        return Ok(());
    }

    println!(
        "{:<28} {:<10} {:<20} {:<23}",
        "SCRAPE ID", "STATUS", "BRAND", "WINDOW"
    );
    for run in &runs {
        println!(
            "{:<28} {:<10} {:<20} {} .. {}",
            run.scrape_id, run.status, run.brand, run.start_date, run.end_date
        );
    }
    Ok(())
}

pub(crate) async fn run_runs_show(pool: &sqlx::PgPool, scrape_id: &str) -> anyhow::Result<()> {
    let run = match brandpulse_db::get_scrape_run(pool, scrape_id).await {
        Ok(run) => run,
        Err(brandpulse_db::DbError::NotFound) => anyhow::bail!("no run with scrape id {scrape_id}"),
        Err(e) => return Err(e.into()),
    };

    let view = serde_json::json!({
        "scrape_id": run.scrape_id,
        "public_id": run.public_id.to_string(),
        "brand": run.brand,
        "keywords": run.keywords,
        "start_date": run.start_date.to_string(),
        "end_date": run.end_date.to_string(),
        "status": run.status,
        "summary": run.summary,
        "error_message": run.error_message,
        "started_at": run.started_at.to_rfc3339(),
        "completed_at": run.completed_at.map(|t| t.to_rfc3339()),
    });
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

/// Trims keywords and drops blanks and case-insensitive repeats, keeping
/// first-seen order.
pub(crate) fn normalize_keywords(raw: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    raw.into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && seen.insert(k.to_lowercase()))
        .collect()
}

pub(crate) async fn run_keywords_save(
    pool: &sqlx::PgPool,
    brand: &str,
    keywords: Vec<String>,
) -> anyhow::Result<()> {
    let brand = brand.trim();
    if brand.is_empty() {
        anyhow::bail!("brand must not be empty");
    }
    let keywords = normalize_keywords(keywords);
    if keywords.is_empty() {
        anyhow::bail!("at least one non-blank keyword is required");
    }

    let row = brandpulse_db::save_keyword_record(pool, brand, &keywords).await?;
    tracing::info!(id = row.id, brand = %row.brand, "keyword combination saved");
    println!("saved {} keyword(s) for {}", row.keywords.len(), row.brand);
    Ok(())
}

pub(crate) async fn run_keywords_show(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    match brandpulse_db::latest_keyword_record(pool).await? {
        Some(record) => println!(
            "{} (saved {}): {}",
            record.brand,
            record.created_at.format("%Y-%m-%d %H:%M UTC"),
            record.keywords.join(", ")
        ),
        None => println!("no keyword combination saved yet"),
    }
    Ok(())
}
