//! Concurrent TinyLFU Cache
//!
//! A thread-safe admitting cache using segmented storage: each segment
//! is a full [`TinyLfuCache`](crate::TinyLfuCache) core (recency store +
//! frequency sketch) behind its own lock, so admission decisions in one
//! segment never wait on another.

extern crate alloc;

use crate::config::{ConcurrentTinyLfuCacheConfig, TinyLfuCacheConfig};
use crate::error::ConfigError;
use crate::metrics::CacheMetrics;
use crate::tinylfu::TinyLfuSegment;
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;
use parking_lot::Mutex;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

use super::default_segment_count;

/// A thread-safe TinyLFU cache with segmented storage.
///
/// The key space is partitioned across segments by hash; each segment
/// owns an independent recency store and frequency sketch behind its
/// own lock. The total capacity is split evenly, with the remainder
/// granted to the last segment.
///
/// # Type Parameters
///
/// - `K`: key type, `Hash + Eq + Clone + Send`
/// - `V`: value type, `Clone + Send` (values are cloned out of `get`)
/// - `S`: hash builder, defaults to `DefaultHashBuilder`
///
/// # Example
///
/// ```
/// use predictive_cache::concurrent::ConcurrentTinyLfuCache;
/// use core::num::NonZeroUsize;
/// use std::sync::Arc;
///
/// let cache: Arc<ConcurrentTinyLfuCache<String, i32>> =
///     Arc::new(ConcurrentTinyLfuCache::new(NonZeroUsize::new(1000).unwrap()).unwrap());
///
/// let worker = Arc::clone(&cache);
/// std::thread::spawn(move || {
///     worker.put("key".to_string(), 42);
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(cache.get(&"key".to_string()), Some(42));
/// ```
pub struct ConcurrentTinyLfuCache<K, V, S = DefaultHashBuilder> {
    segments: Box<[Mutex<TinyLfuSegment<K, V, S>>]>,
    hash_builder: S,
}

impl<K, V> ConcurrentTinyLfuCache<K, V, DefaultHashBuilder>
where
    K: Hash + Eq + Clone + Send,
    V: Send,
{
    /// Creates a cache with the given total capacity and the default
    /// segment count.
    pub fn new(capacity: NonZeroUsize) -> Result<Self, ConfigError> {
        Self::with_segments(capacity, default_segment_count())
    }

    /// Creates a cache with the given total capacity and segment count.
    ///
    /// Fails if `segments` is 0 or larger than the capacity (a segment
    /// would receive no entries).
    pub fn with_segments(capacity: NonZeroUsize, segments: usize) -> Result<Self, ConfigError> {
        Self::with_config(ConcurrentTinyLfuCacheConfig {
            base: TinyLfuCacheConfig::with_capacity(capacity),
            segments,
        })
    }
}

impl<K, V, S> ConcurrentTinyLfuCache<K, V, S>
where
    K: Hash + Eq + Clone + Send,
    V: Send,
    S: BuildHasher + Clone + Send,
{
    /// Creates a cache from an explicit configuration.
    pub fn with_config(config: ConcurrentTinyLfuCacheConfig) -> Result<Self, ConfigError>
    where
        S: Default,
    {
        Self::with_config_and_hasher(config, S::default())
    }

    /// Creates a cache from a configuration and a custom hash builder.
    ///
    /// The same builder routes keys to segments and feeds every
    /// segment's sketch, so shard selection stays a pure function of
    /// the key for the lifetime of the cache.
    pub fn with_config_and_hasher(
        config: ConcurrentTinyLfuCacheConfig,
        hash_builder: S,
    ) -> Result<Self, ConfigError> {
        if config.segments == 0 {
            return Err(ConfigError::new("segment count must be greater than 0"));
        }

        let base_capacity = config.base.capacity.get() / config.segments;
        let extra = config.base.capacity.get() % config.segments;
        if base_capacity == 0 {
            return Err(ConfigError::new(
                "capacity must be at least one entry per segment",
            ));
        }

        let segments = (0..config.segments)
            .map(|i| {
                let capacity = if i == config.segments - 1 {
                    base_capacity + extra
                } else {
                    base_capacity
                };
                let capacity = NonZeroUsize::new(capacity)
                    .ok_or_else(|| ConfigError::new("segment capacity must be non-zero"))?;
                let segment_config = TinyLfuCacheConfig {
                    capacity,
                    ..config.base
                };
                Ok(Mutex::new(TinyLfuSegment::with_config_and_hasher(
                    segment_config,
                    hash_builder.clone(),
                )))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            segments: segments.into_boxed_slice(),
            hash_builder,
        })
    }

    /// Returns the segment index for the given key.
    #[inline]
    fn segment_index<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        (self.hash_builder.hash_one(key) as usize) % self.segments.len()
    }

    /// Returns the number of segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Returns the total capacity across all segments.
    pub fn capacity(&self) -> usize {
        self.segments.iter().map(|s| s.lock().cap().get()).sum()
    }

    /// Returns the total number of entries across all segments.
    ///
    /// Each segment is sampled under its own lock; the sum is not a
    /// globally consistent snapshot.
    pub fn len(&self) -> usize {
        self.segments.iter().map(|s| s.lock().len()).sum()
    }

    /// Returns `true` if every segment is empty.
    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.lock().is_empty())
    }

    /// Gets a value from the cache, cloning it out so the lock is
    /// released before the caller touches the value.
    ///
    /// For zero-copy access use [`get_with`](Self::get_with).
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        let idx = self.segment_index(key);
        let mut segment = self.segments[idx].lock();
        segment.get(key).cloned()
    }

    /// Applies a function to the value while holding the segment lock,
    /// avoiding a clone.
    pub fn get_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        let idx = self.segment_index(key);
        let mut segment = self.segments[idx].lock();
        segment.get(key).map(f)
    }

    /// Applies a function to a mutable reference of the value while
    /// holding the segment lock.
    pub fn get_mut_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&mut V) -> R,
    {
        let idx = self.segment_index(key);
        let mut segment = self.segments[idx].lock();
        segment.get_mut(key).map(f)
    }

    /// Inserts a key-value pair through the owning segment's admission
    /// filter.
    ///
    /// Returns the displaced pair as described on
    /// [`TinyLfuCache::put`](crate::TinyLfuCache::put): the evicted
    /// victim on admission, the given pair on rejection.
    pub fn put(&self, key: K, value: V) -> Option<(K, V)> {
        let idx = self.segment_index(&key);
        let mut segment = self.segments[idx].lock();
        segment.put(key, value)
    }

    /// Removes a key, returning its value if it was resident.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let idx = self.segment_index(key);
        let mut segment = self.segments[idx].lock();
        segment.remove(key)
    }

    /// Returns `true` if the key is resident, without touching recency
    /// or the sketch.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let idx = self.segment_index(key);
        let segment = self.segments[idx].lock();
        segment.contains(key)
    }

    /// Clears all entries from every segment. Frequency sketches are
    /// left intact.
    pub fn clear(&self) {
        for segment in self.segments.iter() {
            segment.lock().clear();
        }
    }

    /// Halves every segment's frequency sketch, one lock at a time.
    pub fn decay(&self) {
        for segment in self.segments.iter() {
            segment.lock().decay();
        }
    }
}

impl<K, V, S> CacheMetrics for ConcurrentTinyLfuCache<K, V, S>
where
    K: Hash + Eq + Clone + Send,
    V: Send,
    S: BuildHasher + Clone + Send,
{
    fn metrics(&self) -> BTreeMap<String, f64> {
        let mut aggregated: BTreeMap<String, f64> = BTreeMap::new();

        for segment in self.segments.iter() {
            let segment_metrics = segment.lock().metrics().metrics();
            for (key, value) in segment_metrics {
                *aggregated.entry(key).or_insert(0.0) += value;
            }
        }

        // Rates cannot be summed across segments; recompute them from
        // the aggregated counters.
        let requests = aggregated.get("requests").copied().unwrap_or(0.0);
        let hits = aggregated.get("cache_hits").copied().unwrap_or(0.0);
        if requests > 0.0 {
            aggregated.insert("hit_rate".into(), hits / requests);
            aggregated.insert("miss_rate".into(), (requests - hits) / requests);
            let evictions = aggregated.get("evictions").copied().unwrap_or(0.0);
            aggregated.insert("eviction_rate".into(), evictions / requests);
        }

        aggregated
    }

    fn algorithm_name(&self) -> &'static str {
        "ConcurrentTinyLFU"
    }
}

// SAFETY: all shard state sits behind parking_lot Mutexes; sending or
// sharing the cache is safe whenever the keys and values are Send.
unsafe impl<K: Send, V: Send, S: Send> Send for ConcurrentTinyLfuCache<K, V, S> {}
unsafe impl<K: Send, V: Send, S: Send + Sync> Sync for ConcurrentTinyLfuCache<K, V, S> {}

impl<K, V, S> core::fmt::Debug for ConcurrentTinyLfuCache<K, V, S>
where
    K: Hash + Eq + Clone + Send,
    V: Send,
    S: BuildHasher + Clone + Send,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConcurrentTinyLfuCache")
            .field("segment_count", &self.segments.len())
            .field("total_len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    extern crate std;
    use std::string::ToString;
    use std::sync::Arc;
    use std::thread;
    use std::vec::Vec;

    #[test]
    fn test_basic_operations() {
        let cache: ConcurrentTinyLfuCache<String, i32> =
            ConcurrentTinyLfuCache::new(NonZeroUsize::new(100).unwrap()).unwrap();

        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);

        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);
        cache.put("c".to_string(), 3);

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get(&"a".to_string()), Some(1));
        assert_eq!(cache.get(&"b".to_string()), Some(2));
        assert_eq!(cache.get(&"c".to_string()), Some(3));
        assert_eq!(cache.get(&"d".to_string()), None);
    }

    #[test]
    fn test_zero_segments_rejected() {
        let err = ConcurrentTinyLfuCache::<u64, u64>::with_segments(
            NonZeroUsize::new(100).unwrap(),
            0,
        )
        .unwrap_err();
        assert!(err.to_string().contains("segment count"));
    }

    #[test]
    fn test_capacity_smaller_than_segments_rejected() {
        let err =
            ConcurrentTinyLfuCache::<u64, u64>::with_segments(NonZeroUsize::new(4).unwrap(), 8)
                .unwrap_err();
        assert!(err.to_string().contains("capacity"));
    }

    #[test]
    fn test_capacity_split_with_remainder() {
        let cache: ConcurrentTinyLfuCache<u64, u64> =
            ConcurrentTinyLfuCache::with_segments(NonZeroUsize::new(10).unwrap(), 4).unwrap();

        // 10 / 4 = 2 per segment, the last one gets 2 + 2
        assert_eq!(cache.segment_count(), 4);
        assert_eq!(cache.capacity(), 10);
    }

    #[test]
    fn test_get_with() {
        let cache: ConcurrentTinyLfuCache<String, String> =
            ConcurrentTinyLfuCache::new(NonZeroUsize::new(100).unwrap()).unwrap();

        cache.put("key".to_string(), "hello world".to_string());

        let len = cache.get_with(&"key".to_string(), |v: &String| v.len());
        assert_eq!(len, Some(11));

        let missing = cache.get_with(&"missing".to_string(), |v: &String| v.len());
        assert_eq!(missing, None);
    }

    #[test]
    fn test_get_mut_with() {
        let cache: ConcurrentTinyLfuCache<String, i32> =
            ConcurrentTinyLfuCache::new(NonZeroUsize::new(100).unwrap()).unwrap();

        cache.put("counter".to_string(), 0);

        cache.get_mut_with(&"counter".to_string(), |v: &mut i32| *v += 1);
        cache.get_mut_with(&"counter".to_string(), |v: &mut i32| *v += 1);

        assert_eq!(cache.get(&"counter".to_string()), Some(2));
    }

    #[test]
    fn test_remove() {
        let cache: ConcurrentTinyLfuCache<String, i32> =
            ConcurrentTinyLfuCache::new(NonZeroUsize::new(100).unwrap()).unwrap();

        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);

        assert_eq!(cache.remove(&"a".to_string()), Some(1));
        assert_eq!(cache.get(&"a".to_string()), None);
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.remove(&"nonexistent".to_string()), None);
    }

    #[test]
    fn test_contains_key() {
        let cache: ConcurrentTinyLfuCache<String, i32> =
            ConcurrentTinyLfuCache::new(NonZeroUsize::new(100).unwrap()).unwrap();

        cache.put("exists".to_string(), 1);

        assert!(cache.contains_key(&"exists".to_string()));
        assert!(!cache.contains_key(&"missing".to_string()));
    }

    #[test]
    fn test_clear() {
        let cache: ConcurrentTinyLfuCache<String, i32> =
            ConcurrentTinyLfuCache::new(NonZeroUsize::new(100).unwrap()).unwrap();

        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_decay_is_visible_through_metrics() {
        let cache: ConcurrentTinyLfuCache<u64, u64> =
            ConcurrentTinyLfuCache::with_segments(NonZeroUsize::new(16).unwrap(), 2).unwrap();

        cache.put(1, 1);
        let _ = cache.get(&1);
        cache.decay();

        // Decay must not disturb residency
        assert_eq!(cache.get(&1), Some(1));
    }

    #[test]
    fn test_aggregated_metrics() {
        let cache: ConcurrentTinyLfuCache<u64, u64> =
            ConcurrentTinyLfuCache::with_segments(NonZeroUsize::new(64).unwrap(), 4).unwrap();

        for i in 0..16u64 {
            cache.put(i, i);
        }
        for i in 0..16u64 {
            assert_eq!(cache.get(&i), Some(i));
        }
        let _ = cache.get(&999);

        let metrics = cache.metrics();
        assert_eq!(metrics.get("cache_hits"), Some(&16.0));
        assert_eq!(metrics.get("cache_misses"), Some(&1.0));
        assert_eq!(metrics.get("requests"), Some(&17.0));
        let hit_rate = metrics.get("hit_rate").copied().unwrap();
        assert!((hit_rate - 16.0 / 17.0).abs() < 1e-9);
        assert_eq!(cache.algorithm_name(), "ConcurrentTinyLFU");
    }

    #[test]
    fn test_concurrent_access() {
        let cache: Arc<ConcurrentTinyLfuCache<String, usize>> = Arc::new(
            ConcurrentTinyLfuCache::new(NonZeroUsize::new(1000).unwrap()).unwrap(),
        );
        let num_threads = 8;
        let ops_per_thread = 1000;

        let mut handles: Vec<std::thread::JoinHandle<()>> = Vec::new();

        for t in 0..num_threads {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for i in 0..ops_per_thread {
                    let key = std::format!("thread_{}_key_{}", t, i);
                    cache.put(key.clone(), t * 1000 + i);
                    let _ = cache.get(&key);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(!cache.is_empty());
        assert!(cache.len() <= cache.capacity());
    }

    #[test]
    fn test_concurrent_mixed_operations() {
        let cache: Arc<ConcurrentTinyLfuCache<String, usize>> = Arc::new(
            ConcurrentTinyLfuCache::new(NonZeroUsize::new(100).unwrap()).unwrap(),
        );
        let num_threads = 8;
        let ops_per_thread = 500;

        let mut handles: Vec<std::thread::JoinHandle<()>> = Vec::new();

        for t in 0..num_threads {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for i in 0..ops_per_thread {
                    let key = std::format!("key_{}", i % 200);

                    match i % 4 {
                        0 => {
                            cache.put(key, i);
                        }
                        1 => {
                            let _ = cache.get(&key);
                        }
                        2 => {
                            cache.get_mut_with(&key, |v: &mut usize| *v += 1);
                        }
                        3 => {
                            let _ = cache.remove(&key);
                        }
                        _ => unreachable!(),
                    }

                    if i == 250 && t == 0 {
                        cache.clear();
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.len() <= 100);
    }
}
