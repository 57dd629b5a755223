//! CLI command handlers.

pub mod auth;
pub mod cache;
pub mod restaurants;
pub mod status;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tablegate_cache::{CacheConfig, CacheStore, FileStore, SlotStore};
use tablegate_client::GateClient;
use tablegate_config::{ConfigError, GateConfig, SESSION_COOKIE_SLOT};
use tablegate_core::SessionOracle;
use tracing::{debug, warn};

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Server URL from `--server` or the environment.
    pub server_url: Option<String>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
    /// Merged configuration files.
    pub config: GateConfig,
    /// Data directory for the slot store and logs.
    pub data_dir: PathBuf,
}

impl Context {
    /// Resolve the backend URL: flag or environment, then config files.
    pub fn server_url(&self) -> Result<&str> {
        self.server_url
            .as_deref()
            .or_else(|| self.config.base_url())
            .ok_or_else(|| ConfigError::NoServerUrl.into())
    }

    /// Slot store shared by the dataset cache and the session cookie.
    pub fn slots(&self) -> Arc<FileStore> {
        let dir = self
            .config
            .cache_dir()
            .cloned()
            .unwrap_or_else(|| self.data_dir.join("cache"));
        Arc::new(FileStore::new(dir))
    }

    /// Dataset cache over the slot store.
    pub fn cache(&self) -> CacheStore {
        CacheStore::from_shared(self.slots())
    }

    /// Cache key and TTL from config.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .with_key(self.config.cache_key())
            .with_ttl(self.config.cache_ttl())
    }

    /// Build a client carrying the saved session cookie, if any.
    pub fn client(&self) -> Result<GateClient> {
        let mut builder = GateClient::builder()
            .base_url(self.server_url()?)
            .timeout(self.config.timeout());

        if let Some(agent) = self.config.user_agent() {
            builder = builder.user_agent(agent);
        }

        match self.slots().get(SESSION_COOKIE_SLOT) {
            Ok(Some(cookie)) => {
                debug!("Using saved session cookie");
                builder = builder.session_cookie(cookie);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Saved session cookie unreadable, ignoring"),
        }

        builder.build().context("Failed to create client")
    }

    /// Session oracle over `client`, with retries from config.
    pub fn oracle(&self, client: GateClient) -> SessionOracle<GateClient> {
        SessionOracle::new(client).with_unverifiable_retries(self.config.unverifiable_retries())
    }

    /// Persist the client's session cookie for later runs.
    pub fn save_session(&self, client: &GateClient) -> Result<()> {
        let slots = self.slots();
        match client.session_cookie() {
            Some(cookie) => slots.set(SESSION_COOKIE_SLOT, &cookie)?,
            None => slots.remove(SESSION_COOKIE_SLOT)?,
        }
        Ok(())
    }

    /// Forget the saved session cookie.
    pub fn clear_session(&self) -> Result<()> {
        self.slots().remove(SESSION_COOKIE_SLOT)?;
        Ok(())
    }

    /// Spinner shown while a request is outstanding. Hidden in JSON mode.
    pub fn spinner(&self, message: &str) -> ProgressBar {
        if self.json_output {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(dir: &std::path::Path) -> Context {
        Context {
            server_url: None,
            json_output: true,
            verbose: false,
            config: GateConfig::default(),
            data_dir: dir.to_path_buf(),
        }
    }

    #[test]
    fn test_server_url_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path());
        assert!(ctx.server_url().is_err());

        ctx.config = GateConfig::from_toml("[server]\nbase_url = \"http://config/api\"\n").unwrap();
        assert_eq!(ctx.server_url().unwrap(), "http://config/api");

        ctx.server_url = Some("http://flag/api".to_string());
        assert_eq!(ctx.server_url().unwrap(), "http://flag/api");
    }

    #[test]
    fn test_saved_cookie_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path());
        ctx.server_url = Some("http://localhost:5000/api".to_string());

        ctx.slots()
            .set(SESSION_COOKIE_SLOT, "access_token_cookie=abc")
            .unwrap();
        let client = ctx.client().unwrap();
        assert_eq!(
            client.session_cookie().as_deref(),
            Some("access_token_cookie=abc")
        );

        ctx.clear_session().unwrap();
        assert_eq!(ctx.slots().get(SESSION_COOKIE_SLOT).unwrap(), None);
    }

    #[test]
    fn test_cache_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path());
        ctx.config = GateConfig::from_toml("[cache]\nttl_secs = 60\nkey = \"listing\"\n").unwrap();

        let config = ctx.cache_config();
        assert_eq!(config.key, "listing");
        assert_eq!(config.ttl_millis(), 60_000);
    }
}
