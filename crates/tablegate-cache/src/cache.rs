//! TTL-bounded dataset cache over a slot store.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};

use crate::persistence::{MemoryStore, SlotStore};
use crate::ttl;

/// Suffix appended to a value slot name to form its timestamp slot.
const TIMESTAMP_SUFFIX: &str = "Timestamp";

/// Names of the two slots an entry occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    value: String,
    timestamp: String,
}

impl CacheKey {
    /// Key whose timestamp slot is `<name>Timestamp`.
    pub fn new(name: impl Into<String>) -> Self {
        let value = name.into();
        let timestamp = format!("{}{}", value, TIMESTAMP_SUFFIX);
        Self { value, timestamp }
    }

    /// Slot holding the serialized value.
    pub fn value_slot(&self) -> &str {
        &self.value
    }

    /// Slot holding the fetch time in epoch milliseconds.
    pub fn timestamp_slot(&self) -> &str {
        &self.timestamp
    }
}

/// A cached value and the time it was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    /// Cached value.
    pub value: T,

    /// When the value was fetched, in epoch milliseconds.
    pub fetched_at: i64,
}

impl<T> CacheEntry<T> {
    /// Create a new cache entry.
    pub fn new(value: T, fetched_at: i64) -> Self {
        Self { value, fetched_at }
    }

    /// Whether this entry may still be served at `now`.
    pub fn is_fresh(&self, ttl_millis: i64, now: i64) -> bool {
        is_fresh(self, ttl_millis, now)
    }
}

/// Freshness check: `now - entry.fetched_at < ttl_millis`.
pub fn is_fresh<T>(entry: &CacheEntry<T>, ttl_millis: i64, now: i64) -> bool {
    ttl::is_fresh_at(entry.fetched_at, ttl_millis, now)
}

/// Dataset cache handle.
///
/// Construct one at startup and clone it into whatever needs it; clones share
/// the underlying store. Every operation absorbs storage faults: a read that
/// cannot be completed or decoded is reported as absent, and failed writes
/// are logged.
///
/// Expiry never deletes anything. A stale entry stays in storage until it is
/// replaced by a newer write or removed by [`invalidate`](Self::invalidate).
#[derive(Clone)]
pub struct CacheStore {
    slots: Arc<dyn SlotStore>,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore").finish_non_exhaustive()
    }
}

impl CacheStore {
    /// Create a cache over the given slot store.
    pub fn new(slots: impl SlotStore + 'static) -> Self {
        Self {
            slots: Arc::new(slots),
        }
    }

    /// Create a cache over an already shared slot store.
    pub fn from_shared(slots: Arc<dyn SlotStore>) -> Self {
        Self { slots }
    }

    /// Create a cache backed by process memory.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// The underlying slot store.
    pub fn slots(&self) -> &Arc<dyn SlotStore> {
        &self.slots
    }

    /// Read only the timestamp slot.
    ///
    /// Lets callers evaluate freshness without decoding the value.
    pub fn fetched_at(&self, key: &CacheKey) -> Option<i64> {
        let raw = match self.slots.get(key.timestamp_slot()) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(slot = key.timestamp_slot(), error = %e, "Cache timestamp unreadable, treating as absent");
                return None;
            }
        };
        parse_stamp(key, &raw)
    }

    /// Read the entry stored under `key` without evaluating freshness.
    ///
    /// Both slots come from one [`SlotStore::get_pair`] call, so a concurrent
    /// write is never seen half-applied. Returns `None` when either slot is
    /// missing or the value does not decode.
    pub fn read<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<CacheEntry<T>> {
        let (raw, stamp) = match self.slots.get_pair(key.value_slot(), key.timestamp_slot()) {
            Ok(pair) => pair?,
            Err(e) => {
                warn!(key = key.value_slot(), error = %e, "Cache entry unreadable, treating as absent");
                return None;
            }
        };
        let fetched_at = parse_stamp(key, &stamp)?;

        match serde_json::from_str(&raw) {
            Ok(value) => {
                trace!(slot = key.value_slot(), bytes = raw.len(), "Cache value decoded");
                Some(CacheEntry::new(value, fetched_at))
            }
            Err(e) => {
                warn!(slot = key.value_slot(), error = %e, "Corrupt cache value, treating as absent");
                None
            }
        }
    }

    /// Read the entry only if it is fresh at `now`.
    ///
    /// A stale timestamp short-circuits before the value slot is touched.
    pub fn read_fresh<T: DeserializeOwned>(
        &self,
        key: &CacheKey,
        ttl_millis: i64,
        now: i64,
    ) -> Option<CacheEntry<T>> {
        let fetched_at = self.fetched_at(key)?;
        if !ttl::is_fresh_at(fetched_at, ttl_millis, now) {
            debug!(
                key = key.value_slot(),
                age_ms = ttl::age_millis(fetched_at, now),
                "Cache entry stale"
            );
            return None;
        }
        // The pair read may see a newer write than the stamp checked above.
        self.read(key)
            .filter(|entry: &CacheEntry<T>| entry.is_fresh(ttl_millis, now))
    }

    /// Replace the entry under `key` with `value` fetched at `now`.
    ///
    /// Returns whether the entry was persisted. On failure the previous entry
    /// may be gone, but a reader never sees a mismatched value and timestamp.
    pub fn write<T: Serialize>(&self, key: &CacheKey, value: &T, now: i64) -> bool {
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(key = key.value_slot(), error = %e, "Cache value not serializable, skipping write");
                return false;
            }
        };

        match self.slots.set_pair(
            key.value_slot(),
            &encoded,
            key.timestamp_slot(),
            &now.to_string(),
        ) {
            Ok(()) => {
                debug!(key = key.value_slot(), fetched_at = now, bytes = encoded.len(), "Cache entry written");
                true
            }
            Err(e) => {
                warn!(key = key.value_slot(), error = %e, "Cache write failed");
                false
            }
        }
    }

    /// Remove both slots of `key` unconditionally.
    pub fn invalidate(&self, key: &CacheKey) {
        match self
            .slots
            .remove_pair(key.value_slot(), key.timestamp_slot())
        {
            Ok(()) => debug!(key = key.value_slot(), "Cache entry invalidated"),
            Err(e) => warn!(key = key.value_slot(), error = %e, "Cache invalidation failed"),
        }
    }
}

fn parse_stamp(key: &CacheKey, raw: &str) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(ts) => Some(ts),
        Err(_) => {
            warn!(slot = key.timestamp_slot(), raw = %raw, "Corrupt cache timestamp, treating as absent");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::FileStore;
    use crate::ttl::ONE_HOUR_MILLIS;

    const NOW: i64 = 1_700_000_000_000;

    fn key() -> CacheKey {
        CacheKey::new("restaurantData")
    }

    #[test]
    fn test_key_layout() {
        let key = key();
        assert_eq!(key.value_slot(), "restaurantData");
        assert_eq!(key.timestamp_slot(), "restaurantDataTimestamp");
    }

    #[test]
    fn test_read_absent() {
        let cache = CacheStore::in_memory();
        assert_eq!(cache.read::<Vec<String>>(&key()), None);
        assert_eq!(cache.fetched_at(&key()), None);
    }

    #[test]
    fn test_write_then_read() {
        let cache = CacheStore::in_memory();
        let value = vec!["Masque".to_string(), "Trishna".to_string()];

        assert!(cache.write(&key(), &value, NOW));

        let entry = cache.read::<Vec<String>>(&key()).unwrap();
        assert_eq!(entry.value, value);
        assert_eq!(entry.fetched_at, NOW);
        assert!(entry.is_fresh(ONE_HOUR_MILLIS, NOW));
    }

    #[test]
    fn test_fresh_until_ttl_elapses() {
        let cache = CacheStore::in_memory();
        cache.write(&key(), &vec![1, 2, 3], NOW);
        let entry = cache.read::<Vec<i32>>(&key()).unwrap();

        assert!(is_fresh(&entry, ONE_HOUR_MILLIS, NOW + ONE_HOUR_MILLIS - 1));
        assert!(!is_fresh(&entry, ONE_HOUR_MILLIS, NOW + ONE_HOUR_MILLIS));
    }

    #[test]
    fn test_expiry_does_not_erase() {
        let cache = CacheStore::in_memory();
        cache.write(&key(), &"listing", NOW);

        let later = NOW + 2 * ONE_HOUR_MILLIS;
        assert_eq!(cache.read_fresh::<String>(&key(), ONE_HOUR_MILLIS, later), None);

        // Still stored, just not servable.
        let entry = cache.read::<String>(&key()).unwrap();
        assert_eq!(entry.value, "listing");
    }

    #[test]
    fn test_read_fresh_skips_decoding_stale_value() {
        let cache = CacheStore::in_memory();
        let k = key();
        cache.slots().set(k.value_slot(), "not json").unwrap();
        cache
            .slots()
            .set(k.timestamp_slot(), &(NOW - 2 * ONE_HOUR_MILLIS).to_string())
            .unwrap();

        assert_eq!(cache.read_fresh::<Vec<i32>>(&k, ONE_HOUR_MILLIS, NOW), None);
        assert_eq!(cache.fetched_at(&k), Some(NOW - 2 * ONE_HOUR_MILLIS));
    }

    #[test]
    fn test_missing_timestamp_reads_absent() {
        let cache = CacheStore::in_memory();
        let k = key();
        cache.slots().set(k.value_slot(), "[1,2]").unwrap();

        assert_eq!(cache.read::<Vec<i32>>(&k), None);
    }

    #[test]
    fn test_missing_value_reads_absent() {
        let cache = CacheStore::in_memory();
        let k = key();
        cache.slots().set(k.timestamp_slot(), &NOW.to_string()).unwrap();

        assert_eq!(cache.read::<Vec<i32>>(&k), None);
    }

    #[test]
    fn test_corrupt_value_reads_absent() {
        let cache = CacheStore::in_memory();
        let k = key();
        cache.slots().set(k.value_slot(), "{\"restaurants\": [").unwrap();
        cache.slots().set(k.timestamp_slot(), &NOW.to_string()).unwrap();

        assert_eq!(cache.read::<Vec<i32>>(&k), None);
        assert_eq!(cache.read_fresh::<Vec<i32>>(&k, ONE_HOUR_MILLIS, NOW), None);
    }

    #[test]
    fn test_corrupt_timestamp_reads_absent() {
        let cache = CacheStore::in_memory();
        let k = key();
        cache.slots().set(k.value_slot(), "[1]").unwrap();
        cache.slots().set(k.timestamp_slot(), "yesterday").unwrap();

        assert_eq!(cache.read::<Vec<i32>>(&k), None);
    }

    #[test]
    fn test_write_replaces_previous_entry() {
        let cache = CacheStore::in_memory();
        cache.write(&key(), &vec!["old"], NOW - 1000);
        cache.write(&key(), &vec!["new"], NOW);

        let entry = cache.read::<Vec<String>>(&key()).unwrap();
        assert_eq!(entry.value, vec!["new"]);
        assert_eq!(entry.fetched_at, NOW);
    }

    #[test]
    fn test_invalidate_removes_both_slots() {
        let cache = CacheStore::in_memory();
        let k = key();
        cache.write(&k, &vec![1], NOW);

        cache.invalidate(&k);

        assert_eq!(cache.slots().get(k.value_slot()).unwrap(), None);
        assert_eq!(cache.slots().get(k.timestamp_slot()).unwrap(), None);
        assert_eq!(cache.read::<Vec<i32>>(&k), None);

        // Invalidating an absent key is fine.
        cache.invalidate(&k);
    }

    #[test]
    fn test_clones_share_storage() {
        let cache = CacheStore::in_memory();
        let other = cache.clone();

        cache.write(&key(), &42, NOW);
        assert_eq!(other.read::<i32>(&key()).unwrap().value, 42);

        other.invalidate(&key());
        assert_eq!(cache.read::<i32>(&key()), None);
    }

    #[test]
    fn test_read_uses_one_pair_read() {
        // A store whose single-slot reads disagree with its pair read: the
        // cache must take value and timestamp from the pair.
        struct PairOnly(MemoryStore);

        impl SlotStore for PairOnly {
            fn get(&self, slot: &str) -> crate::Result<Option<String>> {
                if slot == "restaurantData" {
                    return Ok(Some("[\"torn\"]".to_string()));
                }
                self.0.get(slot)
            }
            fn set(&self, slot: &str, value: &str) -> crate::Result<()> {
                self.0.set(slot, value)
            }
            fn remove(&self, slot: &str) -> crate::Result<()> {
                self.0.remove(slot)
            }
            fn get_pair(
                &self,
                value_slot: &str,
                stamp_slot: &str,
            ) -> crate::Result<Option<(String, String)>> {
                self.0.get_pair(value_slot, stamp_slot)
            }
        }

        let cache = CacheStore::new(PairOnly(MemoryStore::new()));
        cache.write(&key(), &vec!["whole"], NOW);

        let entry = cache.read::<Vec<String>>(&key()).unwrap();
        assert_eq!(entry.value, vec!["whole"]);
        let entry = cache
            .read_fresh::<Vec<String>>(&key(), ONE_HOUR_MILLIS, NOW)
            .unwrap();
        assert_eq!(entry.value, vec!["whole"]);
    }

    #[test]
    fn test_file_backed_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(FileStore::new(dir.path()));
        cache.write(&key(), &vec!["Masque"], NOW);

        let reopened = CacheStore::new(FileStore::new(dir.path()));
        let entry = reopened.read::<Vec<String>>(&key()).unwrap();
        assert_eq!(entry.value, vec!["Masque"]);
        assert_eq!(entry.fetched_at, NOW);

        assert_eq!(
            std::fs::read_to_string(dir.path().join("restaurantDataTimestamp")).unwrap(),
            NOW.to_string()
        );
    }
}
