//! Cache Metrics System
//!
//! Provides a small metrics system using BTreeMap-based reporting. The cache
//! tracks its counters inside the same critical section as the operation that
//! produced them, so a snapshot is always consistent with the cache state.
//!
//! # Why BTreeMap over HashMap?
//!
//! BTreeMap keeps metric keys in a deterministic order, which makes output
//! reproducible across runs and easy to compare in tests.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

pub mod eviction;

pub use eviction::EvictionCacheMetrics;

/// Counters common to both eviction policies
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CoreCacheMetrics {
    /// Total number of `find` calls
    pub requests: u64,

    /// Number of `find` calls that found their key
    pub cache_hits: u64,

    /// Number of keys that entered the cache as new entries
    pub insertions: u64,

    /// Number of `add` calls for a key that was already present
    pub reinsertions: u64,

    /// Number of keys removed to make room for a new one
    pub evictions: u64,
}

impl CoreCacheMetrics {
    /// Records a lookup that found its key
    pub fn record_hit(&mut self) {
        self.requests += 1;
        self.cache_hits += 1;
    }

    /// Records a lookup that did not find its key
    ///
    /// Cache misses are calculated as (requests - cache_hits).
    pub fn record_miss(&mut self) {
        self.requests += 1;
    }

    /// Records a fresh insertion
    pub fn record_insertion(&mut self) {
        self.insertions += 1;
    }

    /// Records an `add` of a key that was already cached
    pub fn record_reinsertion(&mut self) {
        self.reinsertions += 1;
    }

    /// Records a capacity eviction
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Number of lookups that missed
    pub fn cache_misses(&self) -> u64 {
        self.requests - self.cache_hits
    }

    /// Fraction of lookups that hit, or 0.0 if no lookups have been made
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Fraction of lookups that missed, or 0.0 if no lookups have been made
    pub fn miss_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_misses() as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Convert core metrics to BTreeMap for reporting
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        metrics.insert("cache_hits".to_string(), self.cache_hits as f64);
        metrics.insert("cache_misses".to_string(), self.cache_misses() as f64);
        metrics.insert("evictions".to_string(), self.evictions as f64);
        metrics.insert("insertions".to_string(), self.insertions as f64);
        metrics.insert("reinsertions".to_string(), self.reinsertions as f64);
        metrics.insert("requests".to_string(), self.requests as f64);

        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("miss_rate".to_string(), self.miss_rate());

        if self.insertions > 0 {
            metrics.insert(
                "eviction_rate".to_string(),
                self.evictions as f64 / self.insertions as f64,
            );
        }

        metrics
    }
}

/// Uniform read access to a cache's metrics
///
/// The trait uses BTreeMap to ensure deterministic ordering of metrics, which
/// keeps reports and test assertions stable.
pub trait CacheMetrics {
    /// Returns all metrics as key-value pairs in deterministic order
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Algorithm name for identification
    fn algorithm_name(&self) -> &'static str;
}
