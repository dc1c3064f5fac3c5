//! Ingestion runs: discover videos for the saved keyword set, harvest and
//! classify their comments, then persist the four buckets.

pub mod buckets;
pub mod discovery;
pub mod error;
pub mod harvest;
pub mod orchestrator;
pub mod setup;
pub mod snapshot;
pub mod store;
pub mod traits;

#[cfg(test)]
mod testing;

pub use buckets::RunAccumulator;
pub use discovery::{build_query, discover, extract_hashtags, matched_keywords, video_url};
pub use error::{IngestError, PlatformError};
pub use harvest::harvest_comments;
pub use orchestrator::{
    IngestOutcome, IngestSettings, IngestionRequest, Orchestrator, RunState,
};
pub use setup::build_orchestrator;
pub use snapshot::write_snapshots;
pub use store::PgStore;
pub use traits::{KeywordStore, Persistence, RunStart, VideoPlatform};
