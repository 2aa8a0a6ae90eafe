//! TinyLFU Admitting Cache
//!
//! Wraps the recency store with a frequency-based admission filter.
//! Recency decides *who leaves* when the cache is full; the Count-Min
//! sketch decides *who gets in*.
//!
//! # How Admission Works
//!
//! Every access, get or put alike, first bumps the key's counter in the
//! sketch, then touches the recency store. When a put finds the cache
//! full, the would-be newcomer is compared against the least-recent
//! resident (the victim):
//!
//! ```text
//! put(k, v) on a full cache:
//!
//!   sketch.add(k)
//!   victim  = store.peek_lru()
//!   admit   = estimate(k) >= estimate(victim)
//!
//!   admit:  evict victim, insert k     (frequency won)
//!   reject: drop k, cache unchanged    (victim stays protected)
//! ```
//!
//! The sketch observes a much longer history than the store can hold,
//! so under a skewed workload a one-shot scan key estimates low and
//! bounces off the resident working set instead of flushing it.
//!
//! Two deliberate corner cases:
//!
//! - The newcomer's own pre-put increment is included in its estimate,
//!   so a brand-new key ties against a victim that was also seen once.
//!   Ties admit.
//! - A saturated estimate stays at the counter maximum rather than
//!   wrapping or resetting, so saturated comparisons also tie and admit.
//!
//! # When to Use
//!
//! **Good for:** skewed or scan-polluted workloads where plain LRU
//! thrashes; long-running processes (pair with [`decay`]).
//!
//! **Not ideal for:** uniformly random accesses (admission adds work
//! without signal) or workloads smaller than the cache.
//!
//! [`decay`]: TinyLfuCache::decay
//!
//! # Thread Safety
//!
//! `TinyLfuCache` is not thread-safe. For concurrent access use the
//! sharded wrappers in [`crate::concurrent`], which reuse the segment
//! type defined here.
//!
//! # Examples
//!
//! ```
//! use predictive_cache::TinyLfuCache;
//! use core::num::NonZeroUsize;
//!
//! let mut cache = TinyLfuCache::new(NonZeroUsize::new(2).unwrap());
//!
//! cache.put("hot", 1);
//! cache.get(&"hot");
//! cache.get(&"hot");
//! cache.put("warm", 2);
//!
//! // "hot" was seen three times, "warm" twice, the newcomer once:
//! // it loses the admission comparison and is dropped.
//! cache.put("cold", 3);
//! assert_eq!(cache.get(&"cold"), None);
//! assert_eq!(cache.get(&"hot"), Some(&1));
//! ```

extern crate alloc;

use crate::config::TinyLfuCacheConfig;
use crate::lru::LruStore;
use crate::metrics::{CacheMetrics, TinyLfuCacheMetrics};
use crate::sketch::FrequencySketch;
use alloc::collections::BTreeMap;
use alloc::string::String;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// Internal admitting segment containing the actual algorithm.
///
/// Shared between [`TinyLfuCache`] (single-threaded) and the concurrent
/// wrappers in [`crate::concurrent`]. All admission logic lives here so
/// the wrappers stay thin.
///
/// The segment hashes keys once per operation with its own
/// `BuildHasher`; the same 64-bit hash feeds the sketch on every path,
/// which keeps the column derivation pure per key.
pub(crate) struct TinyLfuSegment<K, V, S = DefaultHashBuilder> {
    store: LruStore<K, V, S>,
    sketch: FrequencySketch,
    hash_builder: S,
    metrics: TinyLfuCacheMetrics,
}

impl<K: Hash + Eq, V, S: BuildHasher + Clone> TinyLfuSegment<K, V, S> {
    pub(crate) fn with_config_and_hasher(config: TinyLfuCacheConfig, hash_builder: S) -> Self {
        TinyLfuSegment {
            store: LruStore::with_hasher(config.capacity, hash_builder.clone()),
            sketch: FrequencySketch::new(config.sketch_width, config.sketch_depth),
            hash_builder,
            metrics: TinyLfuCacheMetrics::new(),
        }
    }

    #[inline]
    pub(crate) fn cap(&self) -> NonZeroUsize {
        self.store.cap()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.store.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    #[inline]
    pub(crate) fn metrics(&self) -> &TinyLfuCacheMetrics {
        &self.metrics
    }

    #[inline]
    fn key_hash<Q>(&self, key: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hash_builder.hash_one(key)
    }

    /// Looks up a key, counting the access in the sketch before the
    /// recency update.
    pub(crate) fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.key_hash(key);
        self.sketch.add(hash);
        match self.store.get(key) {
            Some(value) => {
                self.metrics.core.record_hit();
                Some(value)
            }
            None => {
                self.metrics.core.record_miss();
                None
            }
        }
    }

    /// Mutable lookup; same sketch and recency behavior as
    /// [`get`](Self::get).
    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.key_hash(key);
        self.sketch.add(hash);
        match self.store.get_mut(key) {
            Some(value) => {
                self.metrics.core.record_hit();
                Some(value)
            }
            None => {
                self.metrics.core.record_miss();
                None
            }
        }
    }

    #[inline]
    pub(crate) fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.store.contains(key)
    }

    #[inline]
    pub(crate) fn peek_lru(&self) -> Option<&K> {
        self.store.peek_lru()
    }

    /// Returns the sketch's frequency estimate for a key.
    pub(crate) fn estimate<Q>(&self, key: &Q) -> u32
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        self.sketch.estimate(self.key_hash(key))
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let removed = self.store.remove(key);
        if removed.is_some() {
            self.metrics.core.record_eviction();
        }
        removed
    }

    pub(crate) fn clear(&mut self) {
        self.store.clear();
    }

    /// Halves every sketch counter, aging frequency history toward
    /// recent behavior.
    pub(crate) fn decay(&mut self) {
        self.sketch.decay_half();
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher + Clone> TinyLfuSegment<K, V, S> {
    /// Inserts a key-value pair through the admission filter.
    ///
    /// Returns the displaced pair: the evicted victim when the newcomer
    /// was admitted into a full cache, the given pair itself when it was
    /// rejected, the replaced pair on an in-place update, or `None` when
    /// the insert needed no displacement.
    pub(crate) fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        let hash = self.key_hash(&key);
        self.sketch.add(hash);

        // In-place replacement never evicts
        if self.store.contains(&key) {
            self.metrics.core.record_insertion();
            return self.store.put(key, value);
        }

        if self.store.len() < self.store.cap().get() {
            self.metrics.core.record_insertion();
            return self.store.put(key, value);
        }

        match self.store.peek_lru() {
            None => {
                self.metrics.core.record_insertion();
                self.store.put(key, value)
            }
            Some(victim) => {
                let victim_hash = self.key_hash(victim);
                if self.sketch.estimate(hash) >= self.sketch.estimate(victim_hash) {
                    let evicted = self.store.put(key, value);
                    if evicted.is_some() {
                        self.metrics.core.record_eviction();
                    }
                    self.metrics.core.record_insertion();
                    evicted
                } else {
                    self.metrics.record_rejection();
                    Some((key, value))
                }
            }
        }
    }
}

impl<K: core::hash::Hash + Eq, V, S: core::hash::BuildHasher> core::fmt::Debug
    for TinyLfuSegment<K, V, S>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TinyLfuSegment")
            .field("capacity", &self.store.cap())
            .field("len", &self.store.len())
            .finish()
    }
}

/// An LRU cache with TinyLFU admission.
///
/// Recency-ordered storage with O(1) operations, plus a Count-Min
/// sketch that gates admission when the cache is full: a newcomer only
/// displaces the least-recent resident if its estimated access
/// frequency is at least the resident's.
///
/// # Type Parameters
///
/// - `K`: key type, `Hash + Eq` (plus `Clone` for `put`)
/// - `V`: value type, unconstrained
/// - `S`: hash builder, defaults to `DefaultHashBuilder`
///
/// # Example
///
/// ```
/// use predictive_cache::TinyLfuCache;
/// use core::num::NonZeroUsize;
///
/// let mut cache = TinyLfuCache::new(NonZeroUsize::new(100).unwrap());
/// cache.put("key", 42);
/// assert_eq!(cache.get(&"key"), Some(&42));
/// assert_eq!(cache.len(), 1);
/// ```
pub struct TinyLfuCache<K, V, S = DefaultHashBuilder> {
    segment: TinyLfuSegment<K, V, S>,
}

impl<K: core::hash::Hash + Eq, V, S: core::hash::BuildHasher> core::fmt::Debug
    for TinyLfuCache<K, V, S>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TinyLfuCache")
            .field("segment", &self.segment)
            .finish()
    }
}

impl<K: Hash + Eq, V> TinyLfuCache<K, V> {
    /// Creates a cache with the given capacity and default sketch
    /// dimensions.
    pub fn new(capacity: NonZeroUsize) -> TinyLfuCache<K, V, DefaultHashBuilder> {
        TinyLfuCache::with_config(TinyLfuCacheConfig::with_capacity(capacity))
    }

    /// Creates a cache from an explicit configuration.
    pub fn with_config(config: TinyLfuCacheConfig) -> TinyLfuCache<K, V, DefaultHashBuilder> {
        TinyLfuCache::with_config_and_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K: Hash + Eq, V, S: BuildHasher + Clone> TinyLfuCache<K, V, S> {
    /// Creates a cache from a configuration and a custom hash builder.
    ///
    /// Use this when you need deterministic hashing (tests) or a
    /// specific hasher for DoS resistance.
    pub fn with_config_and_hasher(config: TinyLfuCacheConfig, hash_builder: S) -> Self {
        TinyLfuCache {
            segment: TinyLfuSegment::with_config_and_hasher(config, hash_builder),
        }
    }

    /// Returns the maximum number of entries the cache can hold.
    #[inline]
    pub fn cap(&self) -> NonZeroUsize {
        self.segment.cap()
    }

    /// Returns the current number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.segment.len()
    }

    /// Returns `true` if the cache contains no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segment.is_empty()
    }

    /// Looks up a key, promoting it to most-recent on a hit.
    ///
    /// The access is counted in the frequency sketch whether or not the
    /// key is resident; misses are exactly the history the admission
    /// filter needs.
    #[inline]
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.get(key)
    }

    /// Mutable lookup; same sketch and recency behavior as
    /// [`get`](Self::get).
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.get_mut(key)
    }

    /// Returns `true` if the key is resident, without touching recency
    /// or the sketch.
    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.contains(key)
    }

    /// Borrows the least-recent key, the candidate the admission
    /// filter would weigh a newcomer against.
    #[inline]
    pub fn peek_lru(&self) -> Option<&K> {
        self.segment.peek_lru()
    }

    /// Returns the sketch's frequency estimate for a key.
    ///
    /// The estimate can overcount (hash collisions in the sketch) but
    /// never undercounts, and halves on every [`decay`](Self::decay).
    #[inline]
    pub fn estimate<Q>(&self, key: &Q) -> u32
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        self.segment.estimate(key)
    }

    /// Removes a key, returning its value if it was resident.
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.remove(key)
    }

    /// Removes all entries. The frequency sketch is left intact; use
    /// [`decay`](Self::decay) to age it.
    #[inline]
    pub fn clear(&mut self) {
        self.segment.clear();
    }

    /// Halves every sketch counter.
    ///
    /// Call periodically in long-running processes so that admission
    /// favors recently popular keys over all-time popular ones.
    #[inline]
    pub fn decay(&mut self) {
        self.segment.decay();
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher + Clone> TinyLfuCache<K, V, S> {
    /// Inserts a key-value pair through the admission filter.
    ///
    /// - Key already resident: value replaced, entry promoted, old pair
    ///   returned. Never evicts.
    /// - Cache not full: plain insert, returns `None`.
    /// - Cache full: the newcomer is admitted only if its frequency
    ///   estimate is at least the least-recent resident's. On
    ///   admission the victim is evicted and returned; on rejection the
    ///   cache is unchanged and the given pair itself is returned.
    ///
    /// # Example
    ///
    /// ```
    /// use predictive_cache::TinyLfuCache;
    /// use core::num::NonZeroUsize;
    ///
    /// let mut cache = TinyLfuCache::new(NonZeroUsize::new(1).unwrap());
    /// assert_eq!(cache.put("a", 1), None);
    ///
    /// // "a" and "b" have both been seen once: the tie admits "b"
    /// assert_eq!(cache.put("b", 2), Some(("a", 1)));
    /// ```
    #[inline]
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        self.segment.put(key, value)
    }
}

impl<K: Hash + Eq, V, S: BuildHasher + Clone> CacheMetrics for TinyLfuCache<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.segment.metrics().metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        self.segment.metrics().algorithm_name()
    }
}
