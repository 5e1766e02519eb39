// Explicit memoization of fetched bodies.
//
// Entries are keyed by (source, url) where the url already carries every
// request parameter. Only successful bodies are cached. The cache lives inside
// the wrapper, so its lifetime is whatever the caller gives the wrapper.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::{Fetcher, SourceError, SourceKind};

/// Source of the current time for TTL checks.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

struct CacheEntry {
    fetched_at: DateTime<Utc>,
    body: String,
}

/// Memoizing wrapper around any `Fetcher`.
pub struct CachedFetcher<F, C = SystemClock> {
    inner: F,
    clock: C,
    ttl: Duration,
    entries: Mutex<HashMap<(SourceKind, String), CacheEntry>>,
}

impl<F: Fetcher> CachedFetcher<F> {
    pub fn new(inner: F, ttl: Duration) -> Self {
        Self::with_clock(inner, ttl, SystemClock)
    }
}

impl<F: Fetcher, C: Clock> CachedFetcher<F, C> {
    pub fn with_clock(inner: F, ttl: Duration, clock: C) -> Self {
        Self {
            inner,
            clock,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Drop every cached body.
    pub fn invalidate_all(&self) {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let dropped = entries.len();
        entries.clear();
        debug!("cache invalidated ({} entries dropped)", dropped);
    }

    pub fn len(&self) -> usize {
        match self.entries.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<F: Fetcher, C: Clock> Fetcher for CachedFetcher<F, C> {
    fn fetch(&self, kind: SourceKind, url: &str) -> Result<String, SourceError> {
        let key = (kind, url.to_string());
        let now = self.clock.now();

        {
            let entries = match self.entries.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Some(entry) = entries.get(&key) {
                if now - entry.fetched_at < self.ttl {
                    debug!("cache hit: {} {}", kind, url);
                    return Ok(entry.body.clone());
                }
            }
        }

        // Lock released across the fetch; a concurrent miss may fetch twice.
        let body = self.inner.fetch(kind, url)?;

        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.insert(
            key,
            CacheEntry {
                fetched_at: now,
                body: body.clone(),
            },
        );
        Ok(body)
    }
}
