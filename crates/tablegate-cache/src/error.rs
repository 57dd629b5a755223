//! Error types for slot storage operations.

/// Error type for slot storage operations.
///
/// These never reach callers of [`CacheStore`](crate::CacheStore); it logs
/// and absorbs them. They surface only from direct [`SlotStore`](crate::SlotStore) use.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Slot name cannot be used as a storage key.
    #[error("invalid slot name: {0:?}")]
    InvalidSlot(String),

    /// Filesystem error from a file-backed store.
    #[error("slot IO error for '{slot}': {source}")]
    Io {
        slot: String,
        source: std::io::Error,
    },

    /// Value could not be serialized for storage.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for slot storage operations.
pub type Result<T> = std::result::Result<T, Error>;
