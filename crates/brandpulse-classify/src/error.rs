use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single classifier call. The comment it was classifying
/// becomes a `skip`; the run continues.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("classifier at {endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("unexpected classifier response from {endpoint}: {reason}")]
    Response { endpoint: String, reason: String },
}

/// Lexicon files could not be loaded at startup.
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("failed to read lexicon {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse lexicon {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("lexicon {path} names unknown aspect {label:?}")]
    UnknownAspect { path: PathBuf, label: String },
}
