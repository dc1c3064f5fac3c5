//! `brandpulse ingest`: builds the orchestrator and runs it once.

use brandpulse_core::AppConfig;
use brandpulse_ingest::{build_orchestrator, IngestOutcome, IngestionRequest};
use tokio_util::sync::CancellationToken;

/// Runs one ingestion. Ctrl-C cancels the run between videos; whatever was
/// classified by then is still persisted.
///
/// A bad date range comes back as [`IngestOutcome::Error`] like any other
/// failed run.
///
/// # Errors
///
/// Returns an error only when startup fails: a lexicon, API key, or client
/// that cannot be set up.
pub(crate) async fn run_ingest(
    pool: sqlx::PgPool,
    config: &AppConfig,
    start_date: &str,
    end_date: &str,
) -> anyhow::Result<IngestOutcome> {
    let request = match IngestionRequest::parse(start_date, end_date) {
        Ok(request) => request,
        Err(e) => {
            return Ok(IngestOutcome::Error {
                message: e.to_string(),
            })
        }
    };

    let orchestrator = build_orchestrator(config, pool)?;

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received; stopping after in-flight videos");
                cancel.cancel();
            }
        })
    };

    let outcome = orchestrator.ingest(&request, &cancel).await;
    interrupt.abort();
    Ok(outcome)
}
