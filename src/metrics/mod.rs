//! Cache Metrics System
//!
//! Count-based metrics collection shared by the cache types. Each cache
//! tracks its own counters and reports them through the common
//! [`CacheMetrics`] trait; the concurrent wrappers aggregate the
//! per-shard counters into one view.
//!
//! # Why BTreeMap over HashMap?
//!
//! Metrics are reported as a `BTreeMap<String, f64>` so that keys always
//! come back in the same order: reproducible output for logs, tests and
//! comparisons across runs. With a dozen keys the O(log n) lookup cost
//! is irrelevant.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

pub mod tinylfu;

pub use tinylfu::TinyLfuCacheMetrics;

/// Common counters tracked by all cache types.
///
/// All quantities are entry counts; the crate does not account for
/// bytes.
#[derive(Debug, Default, Clone)]
pub struct CoreCacheMetrics {
    /// Total number of lookups made against the cache.
    pub requests: u64,

    /// Lookups that found their key resident.
    pub cache_hits: u64,

    /// Entries written into the cache (new insertions and in-place
    /// replacements).
    pub insertions: u64,

    /// Entries removed to make room or by explicit removal.
    pub evictions: u64,
}

impl CoreCacheMetrics {
    /// Creates a zeroed metrics record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a lookup that found its key.
    #[inline]
    pub fn record_hit(&mut self) {
        self.requests += 1;
        self.cache_hits += 1;
    }

    /// Records a lookup that missed.
    #[inline]
    pub fn record_miss(&mut self) {
        self.requests += 1;
    }

    /// Records an entry written into the cache.
    #[inline]
    pub fn record_insertion(&mut self) {
        self.insertions += 1;
    }

    /// Records an entry leaving the cache.
    #[inline]
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Fraction of lookups that hit, in `[0.0, 1.0]`; 0.0 before any
    /// request.
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Fraction of lookups that missed, in `[0.0, 1.0]`; 0.0 before any
    /// request.
    pub fn miss_rate(&self) -> f64 {
        if self.requests > 0 {
            (self.requests - self.cache_hits) as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Converts the counters to a BTreeMap for reporting.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        metrics.insert("requests".to_string(), self.requests as f64);
        metrics.insert("cache_hits".to_string(), self.cache_hits as f64);
        metrics.insert(
            "cache_misses".to_string(),
            (self.requests - self.cache_hits) as f64,
        );
        metrics.insert("insertions".to_string(), self.insertions as f64);
        metrics.insert("evictions".to_string(), self.evictions as f64);

        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("miss_rate".to_string(), self.miss_rate());

        if self.requests > 0 {
            metrics.insert(
                "eviction_rate".to_string(),
                self.evictions as f64 / self.requests as f64,
            );
        }

        metrics
    }
}

/// Trait implemented by every cache type for metrics reporting.
///
/// The BTreeMap return type guarantees a deterministic key order, which
/// keeps test output and cross-run comparisons stable.
pub trait CacheMetrics {
    /// Returns all metrics as key-value pairs in deterministic order.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// A static name identifying the cache algorithm (e.g. "TinyLFU").
    fn algorithm_name(&self) -> &'static str;
}
