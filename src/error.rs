//! Error types.
//!
//! The only fallible surface of this crate is construction: a sharded
//! cache cannot be built with zero shards, or with so many shards that a
//! shard's slice of the capacity would round down to zero entries. All
//! steady-state operations are infallible: "key not present" is an
//! ordinary `None`, and a newcomer turned away by the admission filter
//! is silent.

extern crate alloc;

use alloc::string::String;
use core::fmt;

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by the fallible constructors of the sharded cache types.
/// Carries a human-readable description of the parameter that failed
/// validation.
///
/// # Example
///
/// ```
/// use predictive_cache::concurrent::PredictiveCache;
/// use predictive_cache::config::PredictiveCacheOptions;
/// use core::num::NonZeroUsize;
///
/// let options = PredictiveCacheOptions {
///     shards: 0,
///     ..Default::default()
/// };
/// let err = PredictiveCache::<u64, u64>::new(NonZeroUsize::new(100).unwrap(), options)
///     .unwrap_err();
/// assert!(err.to_string().contains("shard"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::ToString;

    #[test]
    fn test_display_shows_message() {
        let err = ConfigError::new("shard count must be greater than 0");
        assert_eq!(err.to_string(), "shard count must be greater than 0");
    }

    #[test]
    fn test_debug_includes_message() {
        let err = ConfigError::new("bad capacity");
        let dbg = format!("{:?}", err);
        assert!(dbg.contains("bad capacity"));
    }

    #[test]
    fn test_message_accessor() {
        let err = ConfigError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn test_clone_and_eq() {
        let a = ConfigError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn test_implements_error() {
        fn assert_error<T: core::error::Error>() {}
        assert_error::<ConfigError>();
    }
}
