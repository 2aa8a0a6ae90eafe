//! First-Order Markov Transition Predictor
//!
//! Learns which key tends to be accessed after which, and ranks the
//! likely successors of a key so the sharded cache can prefetch them.
//!
//! # Model
//!
//! ```text
//! observe(prev, cur):
//!
//!   transitions: prev ──▶ { cur₁: 12, cur₂: 3, cur₃: 1 }
//!   totals:      prev ──▶ 16
//!
//! top_k_next(cur, k, min_count, min_prob):
//!
//!   candidates = successors with count ≥ min_count
//!                and count / total ≥ min_prob
//!   sorted by descending probability, first k returned
//! ```
//!
//! Counts are saturating unsigned integers; probabilities are `f64`.
//! The model grows with the number of distinct transitions observed and
//! is bounded only by [`decay_half`](MarkovPredictor::decay_half);
//! callers are expected to invoke it periodically.

extern crate alloc;

use alloc::vec::Vec;
use core::borrow::Borrow;
use core::cmp::Ordering;
use core::hash::{BuildHasher, Hash};

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// A first-order Markov model over key transitions.
///
/// For every source key the model keeps a successor histogram and a
/// total observation count, with the invariant that each source's total
/// equals the sum of its successor counts, after `observe` and after
/// `decay_half` alike.
///
/// # Example
///
/// ```
/// use predictive_cache::MarkovPredictor;
///
/// let mut model: MarkovPredictor<u32> = MarkovPredictor::new();
/// for _ in 0..5 {
///     model.observe(1, 2);
/// }
/// model.observe(1, 3);
///
/// // 2 follows 1 five times out of six
/// assert_eq!(model.top_k_next(&1, 2, 4, 0.5), vec![2]);
/// ```
pub struct MarkovPredictor<K, S = DefaultHashBuilder> {
    transitions: HashMap<K, HashMap<K, u32, S>, S>,
    totals: HashMap<K, u32, S>,
    hash_builder: S,
}

impl<K: Hash + Eq + Clone, S: BuildHasher + Clone + Default> MarkovPredictor<K, S> {
    /// Creates an empty model with the default hasher.
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K: Hash + Eq + Clone, S: BuildHasher + Clone + Default> Default for MarkovPredictor<K, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq + Clone, S: BuildHasher + Clone> MarkovPredictor<K, S> {
    /// Creates an empty model using the given hash builder for all
    /// internal maps.
    pub fn with_hasher(hash_builder: S) -> Self {
        MarkovPredictor {
            transitions: HashMap::with_hasher(hash_builder.clone()),
            totals: HashMap::with_hasher(hash_builder.clone()),
            hash_builder,
        }
    }

    /// Records that `cur` was accessed immediately after `prev`.
    pub fn observe(&mut self, prev: K, cur: K) {
        let hash_builder = self.hash_builder.clone();
        let successors = self
            .transitions
            .entry(prev.clone())
            .or_insert_with(|| HashMap::with_hasher(hash_builder));
        let count = successors.entry(cur).or_insert(0);
        *count = count.saturating_add(1);

        let total = self.totals.entry(prev).or_insert(0);
        *total = total.saturating_add(1);
    }

    /// Ranks the successors of `cur`.
    ///
    /// Keeps successors whose count is at least `min_count` and whose
    /// probability (count over the source's total) is at least
    /// `min_prob`, sorts them by descending probability and returns at
    /// most `k` keys. Ties may come back in any order.
    ///
    /// Returns an empty vector when `cur` was never observed as a
    /// source, its total is zero, or `k` is zero.
    pub fn top_k_next<Q>(&self, cur: &Q, k: usize, min_count: u32, min_prob: f64) -> Vec<K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let Some(successors) = self.transitions.get(cur) else {
            return Vec::new();
        };
        let total = self.totals.get(cur).copied().unwrap_or(0);
        if total == 0 || k == 0 {
            return Vec::new();
        }
        let total = total as f64;

        let mut candidates: Vec<(&K, f64)> = successors
            .iter()
            .filter(|&(_, &count)| count >= min_count)
            .map(|(next, &count)| (next, count as f64 / total))
            .filter(|&(_, p)| p >= min_prob)
            .collect();

        candidates.sort_unstable_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        candidates.truncate(k);
        candidates.into_iter().map(|(next, _)| next.clone()).collect()
    }

    /// Halves every transition count, dropping successors that reach
    /// zero and sources that lose all successors.
    ///
    /// Totals are recomputed from the surviving counts, so
    /// `total(prev)` still equals the sum over that source's successor
    /// counts when this returns.
    pub fn decay_half(&mut self) {
        let totals = &mut self.totals;
        self.transitions.retain(|source, successors| {
            successors.retain(|_, count| {
                *count >>= 1;
                *count > 0
            });
            let total = successors
                .values()
                .fold(0u32, |acc, count| acc.saturating_add(*count));
            if total == 0 {
                totals.remove(source);
                false
            } else {
                totals.insert(source.clone(), total);
                true
            }
        });
    }

    /// Returns the total observation count for a source key.
    pub fn total<Q>(&self, source: &Q) -> u32
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.totals.get(source).copied().unwrap_or(0)
    }

    /// Returns the observed count of the transition `source → next`.
    pub fn successor_count<Q>(&self, source: &Q, next: &Q) -> u32
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.transitions
            .get(source)
            .and_then(|successors| successors.get(next))
            .copied()
            .unwrap_or(0)
    }

    /// Returns the number of distinct source keys currently tracked.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Returns `true` if no transitions are tracked.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Drops all learned transitions.
    pub fn clear(&mut self) {
        self.transitions.clear();
        self.totals.clear();
    }
}

impl<K, S> core::fmt::Debug for MarkovPredictor<K, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MarkovPredictor")
            .field("sources", &self.transitions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn model() -> MarkovPredictor<u32> {
        MarkovPredictor::new()
    }

    #[test]
    fn test_observe_counts_and_totals() {
        let mut m = model();
        m.observe(1, 2);
        m.observe(1, 2);
        m.observe(1, 3);

        assert_eq!(m.successor_count(&1, &2), 2);
        assert_eq!(m.successor_count(&1, &3), 1);
        assert_eq!(m.total(&1), 3);
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_totals_match_successor_sums() {
        let mut m = model();
        for source in 0..4u32 {
            for next in 0..6u32 {
                for _ in 0..(next + 1) {
                    m.observe(source, next);
                }
            }
        }

        for source in 0..4u32 {
            let sum: u32 = (0..6u32).map(|next| m.successor_count(&source, &next)).sum();
            assert_eq!(m.total(&source), sum);
        }
    }

    #[test]
    fn test_top_k_unknown_source_is_empty() {
        let m = model();
        assert!(m.top_k_next(&9, 3, 1, 0.0).is_empty());
    }

    #[test]
    fn test_top_k_orders_by_probability() {
        let mut m = model();
        for _ in 0..6 {
            m.observe(1, 2);
        }
        for _ in 0..3 {
            m.observe(1, 3);
        }
        m.observe(1, 4);

        // p(2) = 0.6, p(3) = 0.3, p(4) = 0.1
        assert_eq!(m.top_k_next(&1, 3, 1, 0.0), vec![2, 3, 4]);
        assert_eq!(m.top_k_next(&1, 2, 1, 0.0), vec![2, 3]);
        assert_eq!(m.top_k_next(&1, 1, 1, 0.0), vec![2]);
        assert!(m.top_k_next(&1, 0, 1, 0.0).is_empty());
    }

    #[test]
    fn test_top_k_count_threshold() {
        let mut m = model();
        for _ in 0..5 {
            m.observe(1, 2);
        }
        m.observe(1, 3);

        // 3 was only seen once, below the count floor
        assert_eq!(m.top_k_next(&1, 5, 2, 0.0), vec![2]);
    }

    #[test]
    fn test_top_k_probability_threshold() {
        let mut m = model();
        for _ in 0..9 {
            m.observe(1, 2);
        }
        m.observe(1, 3);

        // p(3) = 0.1 < 0.2
        assert_eq!(m.top_k_next(&1, 5, 1, 0.2), vec![2]);
        // Both pass a permissive floor
        assert_eq!(m.top_k_next(&1, 5, 1, 0.05), vec![2, 3]);
    }

    #[test]
    fn test_decay_halves_counts() {
        let mut m = model();
        for _ in 0..8 {
            m.observe(1, 2);
        }
        for _ in 0..3 {
            m.observe(1, 3);
        }

        m.decay_half();

        assert_eq!(m.successor_count(&1, &2), 4);
        assert_eq!(m.successor_count(&1, &3), 1);
        assert_eq!(m.total(&1), 5);
    }

    #[test]
    fn test_decay_preserves_totals_invariant() {
        let mut m = model();
        // Odd counts make independent halving diverge from the sum
        for _ in 0..3 {
            m.observe(1, 2);
        }
        for _ in 0..3 {
            m.observe(1, 3);
        }
        assert_eq!(m.total(&1), 6);

        m.decay_half();

        let sum = m.successor_count(&1, &2) + m.successor_count(&1, &3);
        assert_eq!(sum, 2);
        assert_eq!(m.total(&1), sum);
    }

    #[test]
    fn test_decay_drops_zeroed_entries() {
        let mut m = model();
        m.observe(1, 2);
        m.observe(3, 4);
        m.observe(3, 4);

        m.decay_half();

        // 1 → 2 had count 1 and decays away entirely
        assert_eq!(m.successor_count(&1, &2), 0);
        assert_eq!(m.total(&1), 0);
        assert!(m.top_k_next(&1, 3, 1, 0.0).is_empty());

        // 3 → 4 survives with count 1
        assert_eq!(m.successor_count(&3, &4), 1);
        assert_eq!(m.total(&3), 1);
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_decay_to_empty() {
        let mut m = model();
        m.observe(1, 2);
        m.decay_half();
        assert!(m.is_empty());
        m.decay_half();
        assert!(m.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut m = model();
        m.observe(1, 2);
        m.observe(2, 3);
        assert!(!m.is_empty());

        m.clear();
        assert!(m.is_empty());
        assert_eq!(m.total(&1), 0);
    }

    #[test]
    fn test_probabilities_after_decay_still_rank() {
        let mut m = model();
        for _ in 0..8 {
            m.observe(1, 2);
        }
        for _ in 0..4 {
            m.observe(1, 3);
        }

        m.decay_half();

        // Counts 4 and 2, total 6: p(2) ≈ 0.67, p(3) ≈ 0.33
        assert_eq!(m.top_k_next(&1, 2, 1, 0.0), vec![2, 3]);
    }
}
