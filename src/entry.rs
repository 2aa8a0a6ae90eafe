//! Cache Entry Type
//!
//! Provides the `CacheEntry<K, V>` structure stored in the recency list:
//! the key, the value, and a pair of monitoring timestamps. The key is
//! kept inside the entry so that an evicted tail node can be mapped back
//! to its index slot without an extra lookup structure.
//!
//! # Thread Safety
//!
//! Timestamps are plain `u64` values; entries are only ever mutated
//! through `&mut` access, and the concurrent cache types serialize that
//! access behind their shard mutexes.

extern crate alloc;

use core::fmt;

/// An entry in the recency-ordered store.
///
/// Holds the cached key/value pair plus creation and last-access
/// timestamps. Recency itself is implicit in the entry's list position,
/// so no further per-entry metadata is needed.
///
/// Timestamps are nanoseconds since the UNIX epoch when the `std`
/// feature is enabled and 0 otherwise.
pub struct CacheEntry<K, V> {
    /// The cached key.
    pub key: K,

    /// The cached value.
    pub value: V,

    /// Last access timestamp.
    last_accessed: u64,

    /// Creation timestamp.
    create_time: u64,
}

impl<K, V> CacheEntry<K, V> {
    /// Creates a new entry, stamping both timestamps with the current
    /// time.
    #[inline]
    pub fn new(key: K, value: V) -> Self {
        let now = Self::now_nanos();
        Self {
            key,
            value,
            last_accessed: now,
            create_time: now,
        }
    }

    /// Updates the last-accessed timestamp to the current time.
    #[inline]
    pub fn touch(&mut self) {
        self.last_accessed = Self::now_nanos();
    }

    /// Returns the last-accessed timestamp in nanoseconds.
    #[inline]
    pub fn last_accessed(&self) -> u64 {
        self.last_accessed
    }

    /// Returns the creation timestamp in nanoseconds.
    #[inline]
    pub fn create_time(&self) -> u64 {
        self.create_time
    }

    /// Returns the age of this entry in nanoseconds.
    ///
    /// Returns 0 in no_std environments where no clock is available.
    #[inline]
    pub fn age_nanos(&self) -> u64 {
        Self::now_nanos().saturating_sub(self.create_time)
    }

    /// Returns the time since the last access in nanoseconds.
    ///
    /// Returns 0 in no_std environments where no clock is available.
    #[inline]
    pub fn idle_nanos(&self) -> u64 {
        Self::now_nanos().saturating_sub(self.last_accessed)
    }

    /// Returns the current time in nanoseconds since the UNIX epoch.
    #[cfg(feature = "std")]
    #[inline]
    fn now_nanos() -> u64 {
        extern crate std;
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }

    /// Returns 0 in no_std environments where system time is not
    /// available.
    #[cfg(not(feature = "std"))]
    #[inline]
    fn now_nanos() -> u64 {
        0
    }
}

impl<K: Clone, V: Clone> Clone for CacheEntry<K, V> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            value: self.value.clone(),
            last_accessed: self.last_accessed,
            create_time: self.create_time,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for CacheEntry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("last_accessed", &self.last_accessed)
            .field("create_time", &self.create_time)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use super::*;
    use alloc::format;
    use alloc::vec;

    #[test]
    fn test_new_entry() {
        let entry: CacheEntry<&str, i32> = CacheEntry::new("key", 42);
        assert_eq!(entry.key, "key");
        assert_eq!(entry.value, 42);
        assert_eq!(entry.create_time(), entry.last_accessed());
    }

    #[test]
    fn test_touch_updates_last_accessed() {
        let mut entry: CacheEntry<&str, i32> = CacheEntry::new("key", 42);
        let initial = entry.last_accessed();
        entry.touch();
        // In no_std mode both are 0, with std the touch is never earlier
        assert!(entry.last_accessed() >= initial);
    }

    #[test]
    fn test_age_and_idle_do_not_underflow() {
        let mut entry: CacheEntry<&str, i32> = CacheEntry::new("key", 42);
        let _age = entry.age_nanos();
        let _idle = entry.idle_nanos();
        entry.touch();
        let _idle_after = entry.idle_nanos();
    }

    #[test]
    fn test_clone_entry() {
        let entry = CacheEntry::new("key", vec![1, 2, 3]);
        let cloned = entry.clone();

        assert_eq!(cloned.key, entry.key);
        assert_eq!(cloned.value, entry.value);
        assert_eq!(cloned.last_accessed(), entry.last_accessed());
        assert_eq!(cloned.create_time(), entry.create_time());
    }

    #[test]
    fn test_debug_impl() {
        let entry: CacheEntry<&str, i32> = CacheEntry::new("key", 42);
        let debug_str = format!("{:?}", entry);
        assert!(debug_str.contains("CacheEntry"));
        assert!(debug_str.contains("key"));
        assert!(debug_str.contains("42"));
    }
}
