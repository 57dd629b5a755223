//! TTL-bounded cache for the tablegate dataset.
//!
//! This crate provides:
//! - Slot stores: flat string maps in memory or on disk
//! - A [`CacheStore`] that keeps a value and its fetch timestamp in two slots
//! - Pure freshness checks with an explicit `now`
//!
//! # Example
//!
//! ```rust
//! use tablegate_cache::{CacheKey, CacheStore, ONE_HOUR_MILLIS};
//!
//! let cache = CacheStore::in_memory();
//! let key = CacheKey::new("restaurantData");
//!
//! cache.write(&key, &vec!["Masque"], 1_000);
//! let entry = cache.read::<Vec<String>>(&key).unwrap();
//! assert!(entry.is_fresh(ONE_HOUR_MILLIS, 2_000));
//! ```

mod cache;
mod config;
mod error;
mod persistence;
mod ttl;

pub use cache::{CacheEntry, CacheKey, CacheStore, is_fresh};
pub use config::{CacheConfig, DEFAULT_KEY, DEFAULT_TTL};
pub use error::{Error, Result};
pub use persistence::{FileStore, MemoryStore, SlotStore};
pub use ttl::{ONE_HOUR_MILLIS, age_millis, is_fresh_at, remaining_millis};
