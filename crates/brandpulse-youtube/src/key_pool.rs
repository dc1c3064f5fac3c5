//! Round-robin rotation over the configured API keys.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::YoutubeError;

/// A fixed set of API keys handed out in rotation.
///
/// Shared across concurrent requests; the exact interleaving of keys under
/// concurrency is unspecified.
pub struct KeyPool {
    keys: Vec<String>,
    next: AtomicUsize,
}

impl KeyPool {
    /// # Errors
    ///
    /// Returns [`YoutubeError::NoApiKeys`] if `keys` has no non-blank entry.
    pub fn new<I, S>(keys: I) -> Result<Self, YoutubeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys
            .into_iter()
            .map(Into::into)
            .filter(|k: &String| !k.trim().is_empty())
            .collect();
        if keys.is_empty() {
            return Err(YoutubeError::NoApiKeys);
        }
        Ok(Self {
            keys,
            next: AtomicUsize::new(0),
        })
    }

    /// The next key in rotation.
    #[must_use]
    pub fn next_key(&self) -> &str {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.keys.len();
        &self.keys[index]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl std::fmt::Debug for KeyPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPool")
            .field("keys", &format!("[{} redacted]", self.keys.len()))
            .finish_non_exhaustive()
    }
}
