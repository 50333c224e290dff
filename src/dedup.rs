//! Cross-page torrent deduplication
//!
//! The listing API can attach the same physical torrent to several entries
//! (re-releases, duplicate listings). The [`Deduplicator`] guarantees each
//! hash is downloaded at most once per run: `claim` is a single atomic
//! check-and-insert under a mutex, so two workers racing on the same hash
//! cannot both win.

use std::collections::HashSet;
use std::sync::Mutex;

/// Tracks which torrent hashes have already been claimed this run.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: Mutex<HashSet<String>>,
}

impl Deduplicator {
    /// Create an empty deduplicator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a hash for download. Returns `true` exactly once per distinct
    /// hash; later callers (or racing workers) get `false`.
    pub fn claim(&self, hash: &str) -> bool {
        self.seen
            .lock()
            .expect("dedup lock poisoned")
            .insert(hash.to_string())
    }

    /// Number of distinct hashes claimed so far.
    pub fn claimed_count(&self) -> usize {
        self.seen.lock().expect("dedup lock poisoned").len()
    }
}
