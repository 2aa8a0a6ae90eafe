#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! Quick API overview for the main types.
//!
//! ## Choosing a Type
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                    Which cache should I use?                     │
//! ├──────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │  Single thread, plain recency?          ──▶  LruStore            │
//! │                                                                  │
//! │  Single thread, scan-polluted or                                 │
//! │  skewed workload?                       ──▶  TinyLfuCache        │
//! │                                                                  │
//! │  Many threads, no sequential locality?  ──▶  ConcurrentTinyLfu-  │
//! │                                              Cache               │
//! │                                                                  │
//! │  Many threads, sequential or repeating                           │
//! │  access patterns?                       ──▶  PredictiveCache     │
//! │                                                                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Single-Threaded Core
//!
//! ```
//! use predictive_cache::TinyLfuCache;
//! use core::num::NonZeroUsize;
//!
//! let mut cache = TinyLfuCache::new(NonZeroUsize::new(2).unwrap());
//! cache.put("a", 1);
//! cache.get(&"a");
//! cache.put("b", 2);
//!
//! // A one-shot newcomer loses the admission comparison against the
//! // twice-seen resident and is dropped.
//! cache.put("c", 3);
//! assert_eq!(cache.get(&"c"), None);
//! ```
//!
//! ## Sharded Predictive Cache
//!
//! ```
//! use predictive_cache::concurrent::PredictiveCache;
//! use predictive_cache::config::PredictiveCacheOptions;
//! use core::num::NonZeroUsize;
//!
//! let cache: PredictiveCache<u64, u64> = PredictiveCache::new(
//!     NonZeroUsize::new(100).unwrap(),
//!     PredictiveCacheOptions {
//!         shards: 4,
//!         prefetch_topk: 2,
//!         ..Default::default()
//!     },
//! )
//! .unwrap();
//!
//! cache.put(1, 10);
//! assert_eq!(cache.get(&1), Some(10));
//! assert_eq!(cache.num_shards(), 4);
//! ```
//!
//! ## Modules
//!
//! - [`lru`]: the bounded recency-ordered store
//! - [`sketch`]: the Count-Min frequency sketch
//! - [`tinylfu`]: the admission-gated cache built from the two
//! - [`predictor`]: the Markov transition model
//! - [`concurrent`]: lock-striped sharded compositions (feature
//!   `concurrent`)
//! - [`config`]: configuration structures
//! - [`metrics`]: counter collection and the [`CacheMetrics`] trait
//! - [`error`]: construction errors
//!
//! [`CacheMetrics`]: metrics::CacheMetrics

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

/// Cache entry type holding key, value and monitoring timestamps.
pub mod entry;

/// Doubly linked list with in-place reordering.
///
/// Internal infrastructure: exposes raw-pointer operations that require
/// careful invariant maintenance. Use the cache types instead.
pub(crate) mod list;

/// Configuration structures for the cache types.
pub mod config;

/// Construction error types.
pub mod error;

/// Bounded recency-ordered store with O(1) operations.
pub mod lru;

/// Count-Min frequency sketch with saturating counters and halving
/// decay.
pub mod sketch;

/// LRU cache with TinyLFU admission.
pub mod tinylfu;

/// First-order Markov transition model with thresholded top-K ranking.
pub mod predictor;

/// Count-based metrics collection.
pub mod metrics;

/// Lock-striped concurrent cache compositions.
///
/// Available when the `concurrent` feature is enabled.
#[cfg(feature = "concurrent")]
pub mod concurrent;

// Re-export the main types
pub use entry::CacheEntry;
pub use error::ConfigError;
pub use lru::LruStore;
pub use predictor::MarkovPredictor;
pub use sketch::FrequencySketch;
pub use tinylfu::TinyLfuCache;

#[cfg(feature = "concurrent")]
pub use concurrent::{ConcurrentTinyLfuCache, PredictiveCache};
