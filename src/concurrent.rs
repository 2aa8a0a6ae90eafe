//! Concurrent Cache Implementations
//!
//! Thread-safe cache compositions built on lock striping: the key space
//! is partitioned across independent shards, each protected by its own
//! `parking_lot::Mutex`, so operations on different shards never
//! contend.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                 PredictiveCache (8 shards)                         │
//! │                                                                    │
//! │  ┌──────────┐ ┌──────────┐ ┌──────────┐     ┌──────────┐          │
//! │  │ Shard 0  │ │ Shard 1  │ │ Shard 2  │ ... │ Shard 7  │          │
//! │  │ [Mutex]  │ │ [Mutex]  │ │ [Mutex]  │     │ [Mutex]  │          │
//! │  │ admitter │ │ admitter │ │ admitter │     │ admitter │          │
//! │  │ predictor│ │ predictor│ │ predictor│     │ predictor│          │
//! │  │ last key │ │ last key │ │ last key │     │ last key │          │
//! │  └──────────┘ └──────────┘ └──────────┘     └──────────┘          │
//! │       ▲            ▲            ▲                ▲                │
//! │       │            │            │                │                │
//! │  hash(k1)%8   hash(k2)%8   hash(k3)%8       hash(kN)%8            │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An operation computes its shard index from the key hash, acquires
//! that one mutex, and runs to completion. No operation ever holds two
//! shard locks. The predictive cache even restricts prefetching to
//! successors that hash back into the current shard for exactly this
//! reason.
//!
//! # Available Caches
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PredictiveCache`] | Sharded TinyLFU cache with Markov prefetching |
//! | [`ConcurrentTinyLfuCache`] | Sharded TinyLFU cache without prediction |
//!
//! # Ordering Guarantees
//!
//! Operations on keys of the same shard are linearizable with respect
//! to that shard's lock. There is no ordering between shards, and
//! `len()` sums per-shard snapshots taken one lock at a time; it is not
//! a globally consistent snapshot.
//!
//! # Example
//!
//! ```
//! use predictive_cache::concurrent::PredictiveCache;
//! use predictive_cache::config::PredictiveCacheOptions;
//! use core::num::NonZeroUsize;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let cache = Arc::new(
//!     PredictiveCache::new(
//!         NonZeroUsize::new(1000).unwrap(),
//!         PredictiveCacheOptions::default(),
//!     )
//!     .unwrap(),
//! );
//!
//! let handles: Vec<_> = (0..4u64)
//!     .map(|t| {
//!         let cache = Arc::clone(&cache);
//!         thread::spawn(move || {
//!             for i in 0..100u64 {
//!                 let key = t * 1000 + i;
//!                 cache.put(key, i);
//!                 let _ = cache.get(&key);
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! ```

mod predictive;
mod tinylfu;

pub use self::predictive::PredictiveCache;
pub use self::tinylfu::ConcurrentTinyLfuCache;

/// Returns the default number of segments for the plain concurrent
/// cache.
///
/// A fixed value that balances parallelism against per-segment sketch
/// memory across common hardware.
#[inline]
pub fn default_segment_count() -> usize {
    16
}
