//! TinyLFU Cache Metrics
//!
//! Metrics for the admission-gated cache: the shared core counters plus
//! the number of newcomers the admission filter turned away.

extern crate alloc;

use super::{CacheMetrics, CoreCacheMetrics};
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// Metrics for a TinyLFU admitting cache.
#[derive(Debug, Default, Clone)]
pub struct TinyLfuCacheMetrics {
    /// Core counters common to all cache types.
    pub core: CoreCacheMetrics,

    /// Newcomers dropped because their frequency estimate did not reach
    /// the victim's. A high value under a skewed workload is the filter
    /// doing its job; a high value under a uniform workload means the
    /// sketch needs decaying.
    pub admission_rejections: u64,
}

impl TinyLfuCacheMetrics {
    /// Creates a zeroed metrics record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a newcomer rejected by the admission comparison.
    #[inline]
    pub fn record_rejection(&mut self) {
        self.admission_rejections += 1;
    }

    /// Converts the counters to a BTreeMap for reporting.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.core.to_btreemap();
        metrics.insert(
            "admission_rejections".to_string(),
            self.admission_rejections as f64,
        );
        metrics
    }
}

impl CacheMetrics for TinyLfuCacheMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "TinyLFU"
    }
}
