//! Comment classification for BrandPulse.
//!
//! Routes each cleaned comment to a language, rejects noise through the
//! garbage filter, and resolves an aspect for the survivors. Sinhala aspects
//! fuse classifier probabilities with keyword hits from the lexicon store.
//! Classifiers themselves are external; [`TeiClassifier`] talks to a text
//! embeddings inference server's `/predict` endpoint.

pub mod aspect;
pub mod classifier;
pub mod error;
pub mod garbage;
pub mod language;
pub mod lexicon;
pub mod pipeline;
pub mod text;

mod tei;

pub use aspect::{
    checked_probabilities, fuse_sinhala, matches_override_phrase, resolve_english, FusedAspect,
    OVERRIDE_PHRASES,
};
pub use classifier::TextClassifier;
pub use error::{ClassifierError, LexiconError};
pub use garbage::{
    filter_english, filter_sinhala, sinhala_rule_verdict, GarbageReason, GarbageVerdict,
};
pub use language::{route, LanguageDetector, WhatlangDetector};
pub use lexicon::LexiconStore;
pub use pipeline::CommentClassifier;
pub use tei::TeiClassifier;
pub use text::{clean_comment, strip_emojis};
