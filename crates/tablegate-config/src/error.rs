//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The cache key would overwrite another slot in the same store.
    #[error("cache key '{0}' is reserved; choose another [cache] key")]
    ReservedCacheKey(String),

    /// No server URL from flags, environment or config files.
    #[error("no server URL configured; pass --server or set [server] base_url")]
    NoServerUrl,
}
