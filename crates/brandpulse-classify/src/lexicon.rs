//! Static word lists loaded once at startup.
//!
//! The store holds the Sinhala garbage-word list, the Sinhala aspect keyword
//! map, and the English word list used by the language router's overlap
//! ratio. It is immutable after [`LexiconStore::load`] returns.

use std::collections::{BTreeMap, HashSet};
use std::io::ErrorKind;
use std::path::Path;

use brandpulse_core::{Aspect, LexiconPaths};
use serde::Deserialize;

use crate::error::LexiconError;

#[derive(Deserialize)]
struct GarbageFile {
    #[serde(default)]
    garbage_words: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LexiconStore {
    sinhala_garbage: Vec<String>,
    sinhala_aspects: [Vec<String>; Aspect::COUNT],
    english_words: HashSet<String>,
}

impl LexiconStore {
    /// Load every lexicon file named in `paths`.
    ///
    /// A missing file is an error unless `paths.allow_empty` is set, in which
    /// case that lexicon is loaded empty and a warning is logged. Unreadable
    /// or malformed files are always errors.
    ///
    /// # Errors
    ///
    /// Returns [`LexiconError`] for missing (without the fallback),
    /// unreadable, or malformed files.
    pub fn load(paths: &LexiconPaths) -> Result<Self, LexiconError> {
        let sinhala_garbage = match read_optional(&paths.sinhala_garbage, paths.allow_empty)? {
            Some(raw) => {
                let file: GarbageFile =
                    serde_json::from_str(&raw).map_err(|source| LexiconError::Parse {
                        path: paths.sinhala_garbage.clone(),
                        source,
                    })?;
                file.garbage_words
            }
            None => Vec::new(),
        };

        let sinhala_aspects = match read_optional(&paths.sinhala_aspects, paths.allow_empty)? {
            Some(raw) => {
                let map: BTreeMap<String, Vec<String>> =
                    serde_json::from_str(&raw).map_err(|source| LexiconError::Parse {
                        path: paths.sinhala_aspects.clone(),
                        source,
                    })?;
                let mut resolved = Vec::with_capacity(map.len());
                for (label, keywords) in map {
                    let aspect =
                        Aspect::from_label(&label).map_err(|_| LexiconError::UnknownAspect {
                            path: paths.sinhala_aspects.clone(),
                            label: label.clone(),
                        })?;
                    resolved.push((aspect, keywords));
                }
                resolved
            }
            None => Vec::new(),
        };

        let english_words = read_optional(&paths.english_words, paths.allow_empty)?
            .map(|raw| raw.lines().map(str::to_string).collect::<Vec<_>>())
            .unwrap_or_default();

        let store = Self::from_parts(sinhala_garbage, sinhala_aspects, english_words);
        tracing::info!(
            garbage_words = store.sinhala_garbage.len(),
            aspect_keywords = store.sinhala_aspects.iter().map(Vec::len).sum::<usize>(),
            english_words = store.english_words.len(),
            "lexicons loaded"
        );
        Ok(store)
    }

    /// An empty store: no garbage words, no aspect keywords, no English words.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a store from in-memory lists. Entries are trimmed and
    /// lowercased; blanks are dropped.
    #[must_use]
    pub fn from_parts<G, A, E>(sinhala_garbage: G, sinhala_aspects: A, english_words: E) -> Self
    where
        G: IntoIterator<Item = String>,
        A: IntoIterator<Item = (Aspect, Vec<String>)>,
        E: IntoIterator<Item = String>,
    {
        let mut aspects: [Vec<String>; Aspect::COUNT] = Default::default();
        for (aspect, keywords) in sinhala_aspects {
            aspects[aspect.index()].extend(keywords.iter().filter_map(|k| normalize(k)));
        }

        Self {
            sinhala_garbage: sinhala_garbage
                .into_iter()
                .filter_map(|w| normalize(&w))
                .collect(),
            sinhala_aspects: aspects,
            english_words: english_words
                .into_iter()
                .filter_map(|w| normalize(&w))
                .collect(),
        }
    }

    /// The first Sinhala garbage word occurring anywhere in `text`.
    #[must_use]
    pub fn garbage_match(&self, text: &str) -> Option<&str> {
        let lower = text.to_lowercase();
        self.sinhala_garbage
            .iter()
            .find(|word| lower.contains(word.as_str()))
            .map(String::as_str)
    }

    /// Per-aspect keyword hit counts for `text`, indexed by [`Aspect::index`].
    ///
    /// Each keyword counts at most once, however often it occurs.
    #[must_use]
    pub fn aspect_hits(&self, text: &str) -> [usize; Aspect::COUNT] {
        let lower = text.to_lowercase();
        let mut hits = [0; Aspect::COUNT];
        for (slot, keywords) in hits.iter_mut().zip(&self.sinhala_aspects) {
            *slot = keywords
                .iter()
                .filter(|kw| lower.contains(kw.as_str()))
                .count();
        }
        hits
    }

    #[must_use]
    pub fn is_english_word(&self, word: &str) -> bool {
        self.english_words.contains(word)
    }

    #[must_use]
    pub fn has_english_words(&self) -> bool {
        !self.english_words.is_empty()
    }
}

fn normalize(word: &str) -> Option<String> {
    let trimmed = word.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

fn read_optional(path: &Path, allow_empty: bool) -> Result<Option<String>, LexiconError> {
    match std::fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == ErrorKind::NotFound && allow_empty => {
            tracing::warn!(
                path = %path.display(),
                "lexicon file missing; continuing with an empty list"
            );
            Ok(None)
        }
        Err(source) => Err(LexiconError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
