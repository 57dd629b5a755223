//! TTL arithmetic on epoch-millisecond timestamps.
//!
//! Every function takes `now` explicitly so callers (and tests) control time.

/// One hour in milliseconds.
pub const ONE_HOUR_MILLIS: i64 = 60 * 60 * 1000;

/// Whether a value fetched at `fetched_at` may still be served at `now`.
///
/// Fresh iff `now - fetched_at < ttl_millis`. A timestamp in the future
/// (clock moved backwards) counts as fresh.
pub fn is_fresh_at(fetched_at: i64, ttl_millis: i64, now: i64) -> bool {
    now.saturating_sub(fetched_at) < ttl_millis
}

/// Milliseconds elapsed since `fetched_at`, clamped at zero.
pub fn age_millis(fetched_at: i64, now: i64) -> i64 {
    now.saturating_sub(fetched_at).max(0)
}

/// Milliseconds until the entry turns stale, or zero if it already has.
pub fn remaining_millis(fetched_at: i64, ttl_millis: i64, now: i64) -> i64 {
    fetched_at
        .saturating_add(ttl_millis)
        .saturating_sub(now)
        .max(0)
}
