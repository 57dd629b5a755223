//! Configuration for the dataset cache.

use std::time::Duration;

/// Slot name the restaurant listing is persisted under.
pub const DEFAULT_KEY: &str = "restaurantData";

/// Default time-to-live for a cached dataset (one hour).
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Configuration for the dataset cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Value slot name. The timestamp slot is derived from it.
    pub key: String,

    /// How long an entry may be served after it was fetched.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_KEY.to_string(),
            ttl: DEFAULT_TTL,
        }
    }
}

impl CacheConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value slot name.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Set the TTL for cached entries.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// TTL in epoch-millisecond units, saturating at `i64::MAX`.
    pub fn ttl_millis(&self) -> i64 {
        i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX)
    }
}
