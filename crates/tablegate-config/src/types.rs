//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [server]
//! base_url = "http://localhost:5000/api"
//! timeout_secs = 30
//!
//! [cache]
//! ttl_secs = 3600
//!
//! [session]
//! entry_point = "/"
//! unverifiable_retries = 0
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::ConfigError;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default cache TTL (one hour).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Default value slot name for the dataset.
pub const DEFAULT_CACHE_KEY: &str = "restaurantData";

/// Default redirect target for denied navigation.
pub const DEFAULT_ENTRY_POINT: &str = "/";

/// Slot holding the saved session cookie, next to the cache slots.
pub const SESSION_COOKIE_SLOT: &str = "sessionCookie";

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g., project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Backend connection settings.
    pub server: Option<ServerConfig>,

    /// Dataset cache settings.
    pub cache: Option<CacheSection>,

    /// Session and guard settings.
    pub session: Option<SessionSection>,
}

impl GateConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Reject settings that cannot work together.
    ///
    /// The cache shares its slot store with the saved session cookie, so the
    /// cache key may not name that slot.
    pub fn validate(&self) -> crate::Result<()> {
        let key = self.cache_key();
        if key.is_empty() || key == SESSION_COOKIE_SLOT {
            return Err(ConfigError::ReservedCacheKey(key.to_string()));
        }
        Ok(())
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Sections merge field by field so an override file only needs the keys
    /// it changes.
    pub fn merge(&mut self, other: GateConfig) {
        if let Some(server) = other.server {
            let base = self.server.get_or_insert_with(ServerConfig::default);
            if server.base_url.is_some() {
                base.base_url = server.base_url;
            }
            if server.timeout_secs.is_some() {
                base.timeout_secs = server.timeout_secs;
            }
            if server.user_agent.is_some() {
                base.user_agent = server.user_agent;
            }
        }

        if let Some(cache) = other.cache {
            let base = self.cache.get_or_insert_with(CacheSection::default);
            if cache.dir.is_some() {
                base.dir = cache.dir;
            }
            if cache.ttl_secs.is_some() {
                base.ttl_secs = cache.ttl_secs;
            }
            if cache.key.is_some() {
                base.key = cache.key;
            }
        }

        if let Some(session) = other.session {
            let base = self.session.get_or_insert_with(SessionSection::default);
            if session.entry_point.is_some() {
                base.entry_point = session.entry_point;
            }
            if session.unverifiable_retries.is_some() {
                base.unverifiable_retries = session.unverifiable_retries;
            }
        }
    }

    /// Configured backend URL, if any.
    pub fn base_url(&self) -> Option<&str> {
        self.server.as_ref()?.base_url.as_deref()
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        let secs = self
            .server
            .as_ref()
            .and_then(|s| s.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// Custom user agent, if any.
    pub fn user_agent(&self) -> Option<&str> {
        self.server.as_ref()?.user_agent.as_deref()
    }

    /// Cache TTL.
    pub fn cache_ttl(&self) -> Duration {
        let secs = self
            .cache
            .as_ref()
            .and_then(|c| c.ttl_secs)
            .unwrap_or(DEFAULT_CACHE_TTL_SECS);
        Duration::from_secs(secs)
    }

    /// Value slot name for the dataset.
    pub fn cache_key(&self) -> &str {
        self.cache
            .as_ref()
            .and_then(|c| c.key.as_deref())
            .unwrap_or(DEFAULT_CACHE_KEY)
    }

    /// Explicit cache directory, if configured.
    pub fn cache_dir(&self) -> Option<&PathBuf> {
        self.cache.as_ref()?.dir.as_ref()
    }

    /// Where denied navigation is redirected.
    pub fn entry_point(&self) -> &str {
        self.session
            .as_ref()
            .and_then(|s| s.entry_point.as_deref())
            .unwrap_or(DEFAULT_ENTRY_POINT)
    }

    /// Extra attempts for session checks that could not reach a verdict.
    pub fn unverifiable_retries(&self) -> u32 {
        self.session
            .as_ref()
            .and_then(|s| s.unverifiable_retries)
            .unwrap_or(0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sections
// ─────────────────────────────────────────────────────────────────────────────

/// `[server]` section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Backend base URL, including any `/api` prefix.
    pub base_url: Option<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,

    /// User agent sent with every request.
    pub user_agent: Option<String>,
}

/// `[cache]` section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    /// Directory holding the cache slot files.
    pub dir: Option<PathBuf>,

    /// Seconds a fetched dataset may be served from cache.
    pub ttl_secs: Option<u64>,

    /// Value slot name; the timestamp slot is `<key>Timestamp`.
    pub key: Option<String>,
}

/// `[session]` section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Public entry point denied navigation is sent to.
    pub entry_point: Option<String>,

    /// How many times to repeat a session check that failed in transport.
    pub unverifiable_retries: Option<u32>,
}
