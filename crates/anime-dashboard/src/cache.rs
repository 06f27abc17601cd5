//! Suggestion cache.
//!
//! Keeps suggestion lists in memory for a fixed time-to-live so that typing
//! the same prefix twice does not hit the API again.

use shared::SuggestionEntry;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Default time-to-live for a cached suggestion list
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct CacheEntry {
    inserted_at: Instant,
    suggestions: Vec<SuggestionEntry>,
}

/// In-memory suggestion cache keyed by search term
#[derive(Debug)]
pub struct SuggestionCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
}

impl Default for SuggestionCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl SuggestionCache {
    /// Create a new cache with the given time-to-live
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a cached list if it exists and has not expired
    ///
    /// Expired entries are evicted here.
    pub fn get(&mut self, term: &str) -> Option<Vec<SuggestionEntry>> {
        let now = Instant::now();
        match self.entries.get(term) {
            Some(entry) if now.duration_since(entry.inserted_at) < self.ttl => {
                debug!(term = term, "Cache hit");
                Some(entry.suggestions.clone())
            }
            Some(_) => {
                debug!(term = term, "Cache entry expired");
                self.entries.remove(term);
                None
            }
            None => {
                debug!(term = term, "Cache miss");
                None
            }
        }
    }

    /// Store a list, replacing any previous entry for the term
    ///
    /// Expired entries for other terms are evicted here too.
    pub fn insert(&mut self, term: impl Into<String>, suggestions: Vec<SuggestionEntry>) {
        let term = term.into();
        let now = Instant::now();
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| now.duration_since(entry.inserted_at) < ttl);

        debug!(term = %term, count = suggestions.len(), "Cache stored");
        self.entries.insert(
            term,
            CacheEntry {
                inserted_at: now,
                suggestions,
            },
        );
    }

    /// Check if a live entry exists
    pub fn contains(&mut self, term: &str) -> bool {
        self.get(term).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let live_entries = self
            .entries
            .values()
            .filter(|entry| now.duration_since(entry.inserted_at) < self.ttl)
            .count();

        CacheStats {
            total_entries: self.entries.len(),
            live_entries,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub live_entries: usize,
}
