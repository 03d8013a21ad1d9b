//! Translation metrics and observability module.
//!
//! Tracks dictionary loading (fetches, failures, session cache hits) and how
//! lookups resolve (active language, default-language fallback, raw key).

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters shared by a dictionary loader and the translator that owns it.
#[derive(Debug, Default)]
pub struct DictionaryMetrics {
    /// Dictionary requests answered from the session cache
    cache_hits: AtomicUsize,

    /// Dictionary fetches issued against the source
    fetches: AtomicUsize,

    /// Fetches that failed or returned unparseable content
    fetch_failures: AtomicUsize,

    /// Lookups answered by the default-language dictionary
    fallbacks: AtomicUsize,

    /// Lookups that resolved to the raw key
    misses: AtomicUsize,
}

impl DictionaryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch(&self) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    pub fn fetch_failures(&self) -> usize {
        self.fetch_failures.load(Ordering::Relaxed)
    }

    pub fn fallbacks(&self) -> usize {
        self.fallbacks.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn report(&self) -> MetricsReport {
        let fetches = self.fetches();
        let failures = self.fetch_failures();
        let fetch_success_rate = if fetches > 0 {
            ((fetches - failures) as f64 / fetches as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cache_hits: self.cache_hits(),
            fetches,
            fetch_failures: failures,
            fetch_success_rate,
            fallbacks: self.fallbacks(),
            misses: self.misses(),
        }
    }
}

/// Snapshot of the dictionary counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub cache_hits: usize,
    pub fetches: usize,
    pub fetch_failures: usize,

    /// Fetch success rate as a percentage (0-100)
    pub fetch_success_rate: f64,

    pub fallbacks: usize,
    pub misses: usize,
}
