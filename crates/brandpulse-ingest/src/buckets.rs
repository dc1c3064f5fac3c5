//! Run-scoped state shared by concurrent video units.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, PoisonError};

use brandpulse_core::{Bucket, CommentRecord, Language};

/// Dedup set, bucket contents and skip counters for one run.
///
/// Each field sits behind its own lock; [`RunAccumulator::first_sighting`]
/// checks and inserts under a single acquisition.
#[derive(Debug, Default)]
pub struct RunAccumulator {
    seen: Mutex<HashSet<String>>,
    buckets: Mutex<BTreeMap<Bucket, Vec<CommentRecord>>>,
    skipped: Mutex<BTreeMap<Language, usize>>,
}

impl RunAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `cleaned` as seen. Returns `false` if it was already seen
    /// this run.
    pub fn first_sighting(&self, cleaned: &str) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        seen.insert(cleaned.to_string())
    }

    pub fn push(&self, bucket: Bucket, record: CommentRecord) {
        self.buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(bucket)
            .or_default()
            .push(record);
    }

    pub fn skip(&self, language: Language) {
        *self
            .skipped
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(language)
            .or_insert(0) += 1;
    }

    #[cfg(test)]
    pub(crate) fn count(&self, bucket: Bucket) -> usize {
        self.buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&bucket)
            .map_or(0, Vec::len)
    }

    /// Consumes the accumulator into the bucket contents and skip counters.
    #[must_use]
    pub fn into_parts(
        self,
    ) -> (
        BTreeMap<Bucket, Vec<CommentRecord>>,
        BTreeMap<Language, usize>,
    ) {
        let buckets = self
            .buckets
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        let skipped = self
            .skipped
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        (buckets, skipped)
    }
}
