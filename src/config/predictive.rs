//! Options for the sharded predictive cache.

use crate::sketch;
use core::fmt;

/// Tuning options for a
/// [`PredictiveCache`](crate::concurrent::PredictiveCache).
///
/// The total capacity is passed separately at construction; these
/// options control sharding, admission sketch dimensions and the
/// prefetch policy.
///
/// # Defaults
///
/// | Field | Default | Meaning |
/// |-------|---------|---------|
/// | `shards` | 8 | Independently locked shards |
/// | `prefetch_topk` | 1 | Successors considered per access |
/// | `min_trans_count` | 4 | Transition count floor before a successor qualifies |
/// | `min_trans_prob` | 0.2 | Probability floor before a successor qualifies |
/// | `enable_prefetch` | `true` | Insert predicted successors as placeholders |
/// | `sketch_width` | 4096 | Admission sketch columns per shard |
/// | `sketch_depth` | 4 | Admission sketch rows per shard |
///
/// With `enable_prefetch` off the cache still learns transitions and
/// still protects residents through admission; it just never inserts
/// placeholders.
///
/// # Example
///
/// ```
/// use predictive_cache::config::PredictiveCacheOptions;
///
/// let options = PredictiveCacheOptions {
///     shards: 16,
///     prefetch_topk: 2,
///     ..Default::default()
/// };
/// assert_eq!(options.shards, 16);
/// assert_eq!(options.min_trans_count, 4);
/// ```
#[derive(Clone, Copy)]
pub struct PredictiveCacheOptions {
    /// Number of independently locked shards. Must be at least 1, and
    /// small enough that every shard receives at least one entry of
    /// capacity.
    pub shards: usize,
    /// How many predicted successors to consider on each access.
    pub prefetch_topk: usize,
    /// Minimum observed count before a transition qualifies for
    /// prefetching.
    pub min_trans_count: u32,
    /// Minimum probability (count over source total) before a
    /// transition qualifies for prefetching.
    pub min_trans_prob: f64,
    /// Whether to insert predicted successors as placeholders. When
    /// false the cache only protects residents via admission and
    /// recency.
    pub enable_prefetch: bool,
    /// Count-Min sketch width for each shard's admission filter.
    pub sketch_width: usize,
    /// Count-Min sketch depth for each shard's admission filter.
    pub sketch_depth: usize,
}

impl Default for PredictiveCacheOptions {
    fn default() -> Self {
        PredictiveCacheOptions {
            shards: 8,
            prefetch_topk: 1,
            min_trans_count: 4,
            min_trans_prob: 0.2,
            enable_prefetch: true,
            sketch_width: sketch::DEFAULT_WIDTH,
            sketch_depth: sketch::DEFAULT_DEPTH,
        }
    }
}

impl fmt::Debug for PredictiveCacheOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictiveCacheOptions")
            .field("shards", &self.shards)
            .field("prefetch_topk", &self.prefetch_topk)
            .field("min_trans_count", &self.min_trans_count)
            .field("min_trans_prob", &self.min_trans_prob)
            .field("enable_prefetch", &self.enable_prefetch)
            .field("sketch_width", &self.sketch_width)
            .field("sketch_depth", &self.sketch_depth)
            .finish()
    }
}
