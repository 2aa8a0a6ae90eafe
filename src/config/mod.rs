//! Cache Configuration Module
//!
//! Configuration structures for the cache types. Configs are plain
//! structs with public fields:
//!
//! - **Simple**: create the struct with the fields set
//! - **Type safety**: capacities are `NonZeroUsize`, so a zero-capacity
//!   cache is unrepresentable
//! - **Defaults where the design names them**: the predictive options
//!   implement `Default` with the tuned values
//!
//! | Config | Used by | Description |
//! |--------|---------|-------------|
//! | [`TinyLfuCacheConfig`] | [`TinyLfuCache`](crate::TinyLfuCache) | Capacity + sketch dimensions |
//! | [`PredictiveCacheOptions`] | [`PredictiveCache`](crate::concurrent::PredictiveCache) | Sharding + prefetch tuning |
//! | [`ConcurrentCacheConfig`] | [`ConcurrentTinyLfuCache`](crate::concurrent::ConcurrentTinyLfuCache) | Base config + segment count |
//!
//! # Examples
//!
//! ```
//! use predictive_cache::config::TinyLfuCacheConfig;
//! use predictive_cache::TinyLfuCache;
//! use core::num::NonZeroUsize;
//!
//! let config = TinyLfuCacheConfig {
//!     capacity: NonZeroUsize::new(1000).unwrap(),
//!     sketch_width: 4096,
//!     sketch_depth: 4,
//! };
//! let cache: TinyLfuCache<String, i32> = TinyLfuCache::with_config(config);
//! ```

pub mod predictive;
pub mod tinylfu;

pub use predictive::PredictiveCacheOptions;
pub use tinylfu::TinyLfuCacheConfig;

/// Generic configuration wrapper for the lock-striped concurrent caches.
///
/// Wraps a base cache configuration and adds the `segments` field
/// controlling how many independently locked segments the key space is
/// partitioned into.
///
/// # Example
///
/// ```
/// use predictive_cache::config::{ConcurrentCacheConfig, TinyLfuCacheConfig};
/// use core::num::NonZeroUsize;
///
/// let config = ConcurrentCacheConfig {
///     base: TinyLfuCacheConfig::with_capacity(NonZeroUsize::new(10_000).unwrap()),
///     segments: 16,
/// };
/// assert_eq!(config.segments, 16);
/// ```
#[cfg(feature = "concurrent")]
#[derive(Clone, Copy)]
pub struct ConcurrentCacheConfig<C> {
    /// Base configuration for the underlying cache algorithm.
    pub base: C,
    /// Number of segments for sharding (more segments, less contention).
    pub segments: usize,
}

#[cfg(feature = "concurrent")]
impl<C: core::fmt::Debug> core::fmt::Debug for ConcurrentCacheConfig<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConcurrentCacheConfig")
            .field("base", &self.base)
            .field("segments", &self.segments)
            .finish()
    }
}

/// Configuration for a concurrent TinyLFU cache.
/// Type alias for `ConcurrentCacheConfig<TinyLfuCacheConfig>`.
#[cfg(feature = "concurrent")]
pub type ConcurrentTinyLfuCacheConfig = ConcurrentCacheConfig<TinyLfuCacheConfig>;
