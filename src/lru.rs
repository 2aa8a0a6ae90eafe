//! Recency-Ordered Store
//!
//! A bounded mapping that keeps its entries ordered from most recently
//! to least recently touched, with O(1) lookup, insertion, promotion and
//! eviction. This is the recency half of the admitting cache; the
//! admission filter in [`crate::tinylfu`] layers frequency estimates on
//! top of it.
//!
//! # Data Structure
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                         LruStore                               │
//! │                                                                │
//! │  HashMap<K, *Node>          Doubly-Linked List                 │
//! │  ┌──────────────┐          ┌────────────────────────────┐      │
//! │  │ "apple" ──────────────▶ │ MRU ◀──▶ ... ◀──▶ LRU      │      │
//! │  │ "banana" ─────────────▶ │  ▲                  │      │      │
//! │  │ "cherry" ─────────────▶ │  │                  ▼      │      │
//! │  └──────────────┘          │ head             tail      │      │
//! │                            └────────────────────────────┘      │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **HashMap**: O(1) key lookup, storing pointers to list nodes
//! - **Linked list**: access order; promotion is a pointer splice and
//!   never reallocates
//!
//! # Operations
//!
//! | Operation | Action | Time |
//! |-----------|--------|------|
//! | `get` / `get_mut` | Promote the entry to the MRU position | O(1) |
//! | `put` | Replace in place if present, else insert at MRU; evict the LRU entry on overflow | O(1) |
//! | `remove` | Unlink the node, drop the index slot | O(1) |
//! | `peek_lru` | Borrow the least-recent key without promoting | O(1) |
//!
//! Inserting a key that is already present never causes an eviction.
//!
//! # Thread Safety
//!
//! `LruStore` is not thread-safe on its own. The concurrent cache types
//! wrap it (through the admitting segment) in per-shard mutexes.

extern crate alloc;

use crate::entry::CacheEntry;
use crate::list::{List, Node};
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::mem;
use core::num::NonZeroUsize;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// A bounded recency-ordered store with O(1) operations.
///
/// Keys live both in the index map and inside their list entry; the
/// duplicate lets an evicted tail node clean up its own index slot.
/// Eviction moves the displaced entry out of its node, so values do not
/// need to be `Clone`.
///
/// # Safety
///
/// The `map` field holds raw pointers into `list`. A pointer is valid
/// as long as:
/// - it was obtained from this store's `list.add()`,
/// - the node has not been removed from the list,
/// - the store has not been dropped.
///
/// # Example
///
/// ```
/// use predictive_cache::LruStore;
/// use core::num::NonZeroUsize;
///
/// let mut store = LruStore::new(NonZeroUsize::new(2).unwrap());
///
/// store.put("apple", 1);
/// store.put("banana", 2);
/// assert_eq!(store.get(&"apple"), Some(&1));
///
/// // "banana" is now least-recent, so it is the one evicted
/// let evicted = store.put("cherry", 3);
/// assert_eq!(evicted, Some(("banana", 2)));
/// assert_eq!(store.get(&"banana"), None);
/// ```
pub struct LruStore<K, V, S = DefaultHashBuilder> {
    cap: NonZeroUsize,
    list: List<CacheEntry<K, V>>,
    map: HashMap<K, *mut Node<CacheEntry<K, V>>, S>,
}

// SAFETY: LruStore owns all data; the raw pointers in `map` point only to
// nodes owned by `list`. Sending the store moves both together.
unsafe impl<K: Send, V: Send, S: Send> Send for LruStore<K, V, S> {}

// SAFETY: all mutation requires &mut self; shared references cannot cause
// data races.
unsafe impl<K: Send, V: Send, S: Sync> Sync for LruStore<K, V, S> {}

impl<K: Hash + Eq, V> LruStore<K, V> {
    /// Creates a new store with the given capacity and the default
    /// hasher.
    pub fn new(cap: NonZeroUsize) -> LruStore<K, V, DefaultHashBuilder> {
        LruStore::with_hasher(cap, DefaultHashBuilder::default())
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> LruStore<K, V, S> {
    /// Creates a new store with the given capacity and hash builder.
    pub fn with_hasher(cap: NonZeroUsize, hash_builder: S) -> Self {
        let map_capacity = cap.get().next_power_of_two();
        LruStore {
            cap,
            list: List::new(cap),
            map: HashMap::with_capacity_and_hasher(map_capacity, hash_builder),
        }
    }

    /// Returns the maximum number of entries the store can hold.
    #[inline]
    pub fn cap(&self) -> NonZeroUsize {
        self.cap
    }

    /// Returns the current number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the store contains no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Retrieves a reference to the value for the given key, promoting
    /// the entry to the most-recent position.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if let Some(node) = self.map.get(key).copied() {
            unsafe {
                // SAFETY: node comes from our map
                self.list.move_to_front(node);
                let entry = (*node).get_value_mut();
                entry.touch();
                Some(&entry.value)
            }
        } else {
            None
        }
    }

    /// Retrieves a mutable reference to the value for the given key,
    /// promoting the entry to the most-recent position.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.map.get(key).copied()?;
        unsafe {
            // SAFETY: node comes from our map
            self.list.move_to_front(node);
            let entry = (*node).get_value_mut();
            entry.touch();
            Some(&mut entry.value)
        }
    }

    /// Returns `true` if the key is present, without promoting it.
    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.contains_key(key)
    }

    /// Borrows the least-recent key, the entry that `put` would evict
    /// next. Does not change recency order.
    pub fn peek_lru(&self) -> Option<&K> {
        self.list.peek_last().map(|entry| &entry.key)
    }

    /// Removes a key from the store, returning its value if present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.map.remove(key)?;
        // SAFETY: node comes from our map and was linked until now
        let node = unsafe { self.list.remove(node) }?;
        // SAFETY: the node was just detached and holds an initialized value
        let entry = unsafe { node.into_value() };
        Some(entry.value)
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.map.clear();
        self.list.clear();
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher> LruStore<K, V, S> {
    /// Inserts a key-value pair.
    ///
    /// If the key is already present, the value is replaced in place and
    /// the entry moves to the most-recent position; the previous pair is
    /// returned and nothing is evicted. Otherwise the pair is inserted
    /// as most-recent, and if the store was full the least-recent entry
    /// is evicted and returned.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&node) = self.map.get(&key) {
            unsafe {
                // SAFETY: node comes from our map
                self.list.move_to_front(node);
                let entry = (*node).get_value_mut();
                let old_key = mem::replace(&mut entry.key, key);
                let old_value = mem::replace(&mut entry.value, value);
                entry.touch();
                return Some((old_key, old_value));
            }
        }

        let mut evicted = None;
        while self.map.len() >= self.cap.get() {
            match self.list.remove_last() {
                Some(node) => {
                    // SAFETY: the node was just detached from the list
                    let entry = unsafe { node.into_value() };
                    self.map.remove(&entry.key);
                    evicted = Some((entry.key, entry.value));
                }
                None => break,
            }
        }

        if let Some(node) = self.list.add(CacheEntry::new(key.clone(), value)) {
            self.map.insert(key, node);
        }

        evicted
    }
}

impl<K, V, S> core::fmt::Debug for LruStore<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LruStore")
            .field("capacity", &self.cap)
            .field("len", &self.map.len())
            .finish()
    }
}
