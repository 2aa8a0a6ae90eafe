//! Sharded Predictive Cache
//!
//! The full composition: every shard owns a TinyLFU admitting core, a
//! Markov transition predictor and the last key it served, all behind
//! one mutex. Lookups feed the predictor, and the predictor's
//! qualifying successors are inserted ahead of time as placeholders.
//!
//! # Request Flow
//!
//! ```text
//! get(k):
//!   1. shard = hash(k) % S, lock it
//!   2. observe last_key → k in the shard's predictor
//!   3. last_key = k
//!   4. result = admitting core lookup (promotes + counts k)
//!   5. prefetch: for each predicted successor that hashes back
//!      into THIS shard and is absent, insert Default::default()
//!      (subject to normal admission)
//!   6. unlock, return result from step 4
//! ```
//!
//! Prefetching is same-shard only. A successor that routes elsewhere is
//! skipped rather than chased across a second lock, so a single
//! operation never holds more than one shard mutex and lock-ordering
//! deadlocks are impossible by construction. The predictor only ever
//! learns pairs that were consecutively served by its own shard, so
//! cross-shard successors are the rare false-routed cases anyway.

extern crate alloc;

use crate::config::{PredictiveCacheOptions, TinyLfuCacheConfig};
use crate::error::ConfigError;
use crate::metrics::CacheMetrics;
use crate::predictor::MarkovPredictor;
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

/// Per-shard state: one admitting core, one predictor, and the last key
/// this shard served. Everything here is only touched while the shard's
/// mutex is held.
struct PredictiveShard<K, V, S> {
    cache: TinyLfuSegment<K, V, S>,
    predictor: MarkovPredictor<K, S>,
    last_key: Option<K>,
    prefetch_insertions: u64,
}

/// A sharded TinyLFU cache that learns access transitions and
/// prefetches likely successors.
///
/// Capacity is partitioned across shards at construction: shard `i`
/// receives `capacity / shards` entries, with the division remainder
/// granted to the last shard. Keys route to shards by hash, using the
/// same hash builder everywhere the cache is consulted.
///
/// The value type must implement `Default` because the prefetcher
/// inserts default-constructed placeholders; a later `put` overwrites a
/// placeholder in place, and a `get` on one returns it as a hit.
///
/// # Type Parameters
///
/// - `K`: key type, `Hash + Eq + Clone + Send`
/// - `V`: value type, `Clone + Default + Send`
/// - `S`: hash builder, defaults to `DefaultHashBuilder`
///
/// # Example
///
/// ```
/// use predictive_cache::concurrent::PredictiveCache;
/// use predictive_cache::config::PredictiveCacheOptions;
/// use core::num::NonZeroUsize;
///
/// let cache: PredictiveCache<u64, String> = PredictiveCache::new(
///     NonZeroUsize::new(800).unwrap(),
///     PredictiveCacheOptions::default(),
/// )
/// .unwrap();
///
/// cache.put(1, "one".to_string());
/// assert_eq!(cache.get(&1), Some("one".to_string()));
/// assert_eq!(cache.num_shards(), 8);
/// ```
pub struct PredictiveCache<K, V, S = DefaultHashBuilder> {
    shards: Box<[Mutex<PredictiveShard<K, V, S>>]>,
    hash_builder: S,
    options: PredictiveCacheOptions,
}

impl<K, V> PredictiveCache<K, V, DefaultHashBuilder>
where
    K: Hash + Eq + Clone + Send,
    V: Clone + Default + Send,
{
    /// Creates a cache with the given total capacity and options.
    ///
    /// Fails if `options.shards` is 0, or if the capacity is smaller
    /// than the shard count (a shard would receive no entries).
    pub fn new(
        capacity: NonZeroUsize,
        options: PredictiveCacheOptions,
    ) -> Result<Self, ConfigError> {
        Self::with_hasher(capacity, options, DefaultHashBuilder::default())
    }
}

impl<K, V, S> PredictiveCache<K, V, S>
where
    K: Hash + Eq + Clone + Send,
    V: Clone + Default + Send,
    S: BuildHasher + Clone + Send,
{
    /// Creates a cache with a custom hash builder.
    ///
    /// The builder is cloned into every shard so that shard routing,
    /// sketch columns and map buckets all agree on each key's hash.
    pub fn with_hasher(
        capacity: NonZeroUsize,
        options: PredictiveCacheOptions,
        hash_builder: S,
    ) -> Result<Self, ConfigError> {
        if options.shards == 0 {
            return Err(ConfigError::new("shard count must be greater than 0"));
        }

        let base_capacity = capacity.get() / options.shards;
        let extra = capacity.get() % options.shards;
        if base_capacity == 0 {
            return Err(ConfigError::new(
                "capacity must be at least one entry per shard",
            ));
        }

        let shards = (0..options.shards)
            .map(|i| {
                let shard_capacity = if i == options.shards - 1 {
                    base_capacity + extra
                } else {
                    base_capacity
                };
                let shard_capacity = NonZeroUsize::new(shard_capacity)
                    .ok_or_else(|| ConfigError::new("shard capacity must be non-zero"))?;
                let config = TinyLfuCacheConfig {
                    capacity: shard_capacity,
                    sketch_width: options.sketch_width,
                    sketch_depth: options.sketch_depth,
                };
                Ok(Mutex::new(PredictiveShard {
                    cache: TinyLfuSegment::with_config_and_hasher(config, hash_builder.clone()),
                    predictor: MarkovPredictor::with_hasher(hash_builder.clone()),
                    last_key: None,
                    prefetch_insertions: 0,
                }))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            shards: shards.into_boxed_slice(),
            hash_builder,
            options,
        })
    }

    /// Returns the shard index for the given key.
    ///
    /// Pure: the same key always routes to the same shard for the
    /// lifetime of the cache.
    #[inline]
    fn shard_index<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        (self.hash_builder.hash_one(key) as usize) % self.shards.len()
    }

    /// Returns the number of shards.
    pub fn num_shards(&self) -> usize {
        self.shards.len()
    }

    /// Returns the options the cache was built with.
    pub fn options(&self) -> &PredictiveCacheOptions {
        &self.options
    }

    /// Returns the total capacity across all shards.
    pub fn capacity(&self) -> usize {
        self.shards.iter().map(|s| s.lock().cache.cap().get()).sum()
    }

    /// Returns the total number of entries across all shards.
    ///
    /// Each shard is sampled under its own lock; the sum is not a
    /// globally consistent snapshot.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.lock().cache.len()).sum()
    }

    /// Returns `true` if every shard is empty.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|s| s.lock().cache.is_empty())
    }

    /// Looks up a key, learning the transition from the shard's
    /// previous access and prefetching predicted successors.
    ///
    /// The returned value is cloned out so the shard lock is released
    /// before the caller touches it. Prefetch happens after the lookup
    /// and cannot change this call's result.
    pub fn get(&self, key: &K) -> Option<V> {
        self.get_with(key, V::clone)
    }

    /// Like [`get`](Self::get), but applies `f` to the value under the
    /// shard lock instead of cloning it out.
    pub fn get_with<F, R>(&self, key: &K, f: F) -> Option<R>
    where
        F: FnOnce(&V) -> R,
    {
        let idx = self.shard_index(key);
        let mut shard = self.shards[idx].lock();

        if let Some(prev) = shard.last_key.take() {
            shard.predictor.observe(prev, key.clone());
        }
        shard.last_key = Some(key.clone());

        let result = shard.cache.get(key).map(f);

        if self.options.enable_prefetch {
            self.prefetch(idx, &mut shard, key);
        }

        result
    }

    /// Like [`get_with`](Self::get_with) with a mutable borrow of the
    /// value.
    pub fn get_mut_with<F, R>(&self, key: &K, f: F) -> Option<R>
    where
        F: FnOnce(&mut V) -> R,
    {
        let idx = self.shard_index(key);
        let mut shard = self.shards[idx].lock();

        if let Some(prev) = shard.last_key.take() {
            shard.predictor.observe(prev, key.clone());
        }
        shard.last_key = Some(key.clone());

        let result = shard.cache.get_mut(key).map(f);

        if self.options.enable_prefetch {
            self.prefetch(idx, &mut shard, key);
        }

        result
    }

    /// Inserts predicted successors of `key` into the shard as
    /// placeholders. Same-shard only: successors that hash elsewhere
    /// are skipped so this never needs a second lock.
    fn prefetch(&self, idx: usize, shard: &mut PredictiveShard<K, V, S>, key: &K) {
        let predicted = shard.predictor.top_k_next(
            key,
            self.options.prefetch_topk,
            self.options.min_trans_count,
            self.options.min_trans_prob,
        );

        for next in predicted {
            if self.shard_index(&next) != idx {
                continue;
            }
            if shard.cache.get(&next).is_some() {
                continue;
            }
            // The placeholder goes through admission like any other
            // insert; put returns the pair itself when it was rejected.
            match shard.cache.put(next.clone(), V::default()) {
                Some((displaced, _)) if displaced == next => {}
                _ => shard.prefetch_insertions += 1,
            }
        }
    }

    /// Inserts a key-value pair through the owning shard's admission
    /// filter, and records the write as an access for sequence
    /// learning.
    ///
    /// Returns the displaced pair as described on
    /// [`TinyLfuCache::put`](crate::TinyLfuCache::put).
    pub fn put(&self, key: K, value: V) -> Option<(K, V)> {
        let idx = self.shard_index(&key);
        let mut shard = self.shards[idx].lock();
        let displaced = shard.cache.put(key.clone(), value);
        shard.last_key = Some(key);
        displaced
    }

    /// Removes a key, returning its value if it was resident.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let idx = self.shard_index(key);
        let mut shard = self.shards[idx].lock();
        shard.cache.remove(key)
    }

    /// Returns `true` if the key is resident, without touching recency,
    /// the sketch, or the predictor.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let idx = self.shard_index(key);
        let shard = self.shards[idx].lock();
        shard.cache.contains(key)
    }

    /// Halves every shard's transition model, one lock at a time.
    ///
    /// Call periodically: the transition model grows with the number of
    /// distinct transitions observed and decay is what bounds it.
    pub fn decay_models(&self) {
        for shard in self.shards.iter() {
            shard.lock().predictor.decay_half();
        }
    }

    /// Halves every shard's frequency sketch, one lock at a time.
    pub fn decay_frequency(&self) {
        for shard in self.shards.iter() {
            shard.lock().cache.decay();
        }
    }

    /// Clears all entries, learned transitions and last-key markers.
    /// Frequency sketches are left intact.
    pub fn clear(&self) {
        for shard in self.shards.iter() {
            let mut shard = shard.lock();
            shard.cache.clear();
            shard.predictor.clear();
            shard.last_key = None;
            shard.prefetch_insertions = 0;
        }
    }
}

impl<K, V, S> CacheMetrics for PredictiveCache<K, V, S>
where
    K: Hash + Eq + Clone + Send,
    V: Clone + Default + Send,
    S: BuildHasher + Clone + Send,
{
    fn metrics(&self) -> BTreeMap<String, f64> {
        let mut aggregated: BTreeMap<String, f64> = BTreeMap::new();
        let mut prefetch_insertions = 0u64;
        let mut predictor_sources = 0usize;

        for shard in self.shards.iter() {
            let shard = shard.lock();
            for (key, value) in shard.cache.metrics().metrics() {
                *aggregated.entry(key).or_insert(0.0) += value;
            }
            prefetch_insertions += shard.prefetch_insertions;
            predictor_sources += shard.predictor.len();
        }

        // Rates cannot be summed across shards; recompute them from the
        // aggregated counters.
        let requests = aggregated.get("requests").copied().unwrap_or(0.0);
        let hits = aggregated.get("cache_hits").copied().unwrap_or(0.0);
        if requests > 0.0 {
            aggregated.insert("hit_rate".into(), hits / requests);
            aggregated.insert("miss_rate".into(), (requests - hits) / requests);
            let evictions = aggregated.get("evictions").copied().unwrap_or(0.0);
            aggregated.insert("eviction_rate".into(), evictions / requests);
        }

        aggregated.insert("prefetch_insertions".into(), prefetch_insertions as f64);
        aggregated.insert("predictor_sources".into(), predictor_sources as f64);

        aggregated
    }

    fn algorithm_name(&self) -> &'static str {
        "PredictiveTinyLFU"
    }
}

// SAFETY: all shard state sits behind parking_lot Mutexes; sending or
// sharing the cache is safe whenever the keys and values are Send.
unsafe impl<K: Send, V: Send, S: Send> Send for PredictiveCache<K, V, S> {}
unsafe impl<K: Send, V: Send, S: Send + Sync> Sync for PredictiveCache<K, V, S> {}

impl<K, V, S> core::fmt::Debug for PredictiveCache<K, V, S>
where
    K: Hash + Eq + Clone + Send,
    V: Clone + Default + Send,
    S: BuildHasher + Clone + Send,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PredictiveCache")
            .field("num_shards", &self.shards.len())
            .field("total_len", &self.len())
            .field("prefetch_enabled", &self.options.enable_prefetch)
            .finish()
    }
}
