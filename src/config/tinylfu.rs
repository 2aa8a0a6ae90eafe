//! Configuration for the TinyLFU admitting cache.

use crate::sketch;
use core::fmt;
use core::num::NonZeroUsize;

/// Configuration for a [`TinyLfuCache`](crate::TinyLfuCache).
///
/// # Fields
///
/// - `capacity`: maximum number of resident entries
/// - `sketch_width`: columns per sketch row (rounded up to a power of
///   two); wider sketches overcount less
/// - `sketch_depth`: sketch rows; more rows tighten the estimate at the
///   cost of more work per access
///
/// # Examples
///
/// ```
/// use predictive_cache::config::TinyLfuCacheConfig;
/// use core::num::NonZeroUsize;
///
/// // Spelled out
/// let config = TinyLfuCacheConfig {
///     capacity: NonZeroUsize::new(100).unwrap(),
///     sketch_width: 1024,
///     sketch_depth: 4,
/// };
/// assert_eq!(config.capacity.get(), 100);
///
/// // Default sketch dimensions
/// let config = TinyLfuCacheConfig::with_capacity(NonZeroUsize::new(100).unwrap());
/// assert_eq!(config.sketch_width, 4096);
/// assert_eq!(config.sketch_depth, 4);
/// ```
#[derive(Clone, Copy)]
pub struct TinyLfuCacheConfig {
    /// Maximum number of key-value pairs the cache can hold.
    pub capacity: NonZeroUsize,
    /// Count-Min sketch width (columns per row).
    pub sketch_width: usize,
    /// Count-Min sketch depth (number of rows).
    pub sketch_depth: usize,
}

impl TinyLfuCacheConfig {
    /// Creates a config with the given capacity and the default sketch
    /// dimensions.
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        TinyLfuCacheConfig {
            capacity,
            sketch_width: sketch::DEFAULT_WIDTH,
            sketch_depth: sketch::DEFAULT_DEPTH,
        }
    }
}

impl fmt::Debug for TinyLfuCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TinyLfuCacheConfig")
            .field("capacity", &self.capacity)
            .field("sketch_width", &self.sketch_width)
            .field("sketch_depth", &self.sketch_depth)
            .finish()
    }
}
