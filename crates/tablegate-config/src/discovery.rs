//! Config file discovery and layered merging.
//!
//! Resolution order (later overrides earlier):
//! 1. `~/.config/tablegate/config.toml` (XDG user config)
//! 2. `./tablegate.toml` (project-local)
//! 3. CLI arguments (handled externally)

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{ConfigError, GateConfig, Result};

/// Default config filename for project-local config.
const PROJECT_CONFIG_FILE: &str = "tablegate.toml";

/// Default config filename within XDG config directory.
const USER_CONFIG_FILE: &str = "config.toml";

/// Application name for XDG directory resolution.
const APP_NAME: &str = "tablegate";

/// Environment variable to override the config directory.
const CONFIG_DIR_ENV: &str = "TABLEGATE_CONFIG_DIR";

/// Environment variable to override the data directory (cache, session cookie).
const DATA_DIR_ENV: &str = "TABLEGATE_DATA_DIR";

/// Tracks where each config layer was loaded from.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Path to the config file.
    pub path: PathBuf,
    /// Whether the file was found and loaded.
    pub loaded: bool,
}

/// Result of config discovery and loading.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The merged configuration.
    pub config: GateConfig,
    /// Sources that were checked, in order of precedence (lowest first).
    pub sources: Vec<ConfigSource>,
    /// Warnings generated during loading (e.g., unparseable layers).
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Get paths of sources that were actually loaded.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
            .collect()
    }
}

/// Load configuration by discovering and merging all config layers.
pub fn load_config(project_dir: Option<&Path>) -> Result<LoadedConfig> {
    load_config_with_options(project_dir, None)
}

/// Load configuration with explicit control over the user config directory.
///
/// `config_dir` overrides both `TABLEGATE_CONFIG_DIR` and the platform default.
pub fn load_config_with_options(
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
) -> Result<LoadedConfig> {
    let mut config = GateConfig::new();
    let mut sources = Vec::new();
    let mut warnings = Vec::new();

    // 1. User config
    let user_config_path = match config_dir {
        Some(dir) => Some(dir.join(USER_CONFIG_FILE)),
        None => xdg_config_path(),
    };
    if let Some(path) = user_config_path {
        sources.push(load_layer(&mut config, &path, &mut warnings));
    }

    // 2. Project-local config
    let project_path = project_dir
        .map(|d| d.join(PROJECT_CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE));
    sources.push(load_layer(&mut config, &project_path, &mut warnings));

    config.validate()?;

    Ok(LoadedConfig {
        config,
        sources,
        warnings,
    })
}

/// Load config from a specific file path (no discovery).
pub fn load_config_file(path: &Path) -> Result<GateConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    GateConfig::from_toml(&contents)
}

/// Get the XDG config file path for tablegate.
pub fn xdg_config_path() -> Option<PathBuf> {
    xdg_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// Get the config directory for tablegate.
///
/// Checks `TABLEGATE_CONFIG_DIR` first, then the platform default.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dir_from_env(CONFIG_DIR_ENV).or_else(|| dirs::config_dir().map(|d| d.join(APP_NAME)))
}

/// Get the data directory (cache slots, saved session cookie, logs).
///
/// Checks `TABLEGATE_DATA_DIR` first, then the platform's local data dir.
pub fn data_dir() -> Option<PathBuf> {
    dir_from_env(DATA_DIR_ENV).or_else(|| dirs::data_local_dir().map(|d| d.join(APP_NAME)))
}

fn dir_from_env(var: &str) -> Option<PathBuf> {
    match std::env::var(var) {
        Ok(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => None,
    }
}

/// Try to load a config file and merge it into the existing config.
///
/// A missing file is skipped; an unreadable or invalid one becomes a warning.
fn load_layer(config: &mut GateConfig, path: &Path, warnings: &mut Vec<String>) -> ConfigSource {
    if !path.is_file() {
        return ConfigSource {
            path: path.to_path_buf(),
            loaded: false,
        };
    }

    match load_config_file(path) {
        Ok(layer) => {
            debug!(path = %path.display(), "Loaded config layer");
            config.merge(layer);
            ConfigSource {
                path: path.to_path_buf(),
                loaded: true,
            }
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping config layer");
            warnings.push(format!("Failed to load {}: {}", path.display(), e));
            ConfigSource {
                path: path.to_path_buf(),
                loaded: false,
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_xdg_config_path_shape() {
        if std::env::var(CONFIG_DIR_ENV).is_ok() {
            return;
        }
        if let Some(p) = xdg_config_path() {
            assert!(p.ends_with("tablegate/config.toml"));
        }
    }

    #[test]
    fn test_load_config_file_not_found() {
        let err = load_config_file(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is not valid toml {{{{").unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_no_files() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();

        let loaded = load_config_with_options(Some(project.path()), Some(user.path())).unwrap();
        assert_eq!(loaded.config, GateConfig::default());
        assert!(loaded.loaded_from().is_empty());
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_load_config_layered_merge() {
        let user = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();

        fs::write(
            user.path().join("config.toml"),
            r#"
[server]
base_url = "http://localhost:5000/api"
timeout_secs = 5

[cache]
ttl_secs = 600
"#,
        )
        .unwrap();
        fs::write(
            project.path().join("tablegate.toml"),
            r#"
[server]
base_url = "https://staging.example.com/api"
"#,
        )
        .unwrap();

        let loaded = load_config_with_options(Some(project.path()), Some(user.path())).unwrap();
        let config = &loaded.config;

        assert_eq!(config.base_url(), Some("https://staging.example.com/api"));
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.cache_ttl(), Duration::from_secs(600));
        assert_eq!(loaded.loaded_from().len(), 2);
    }

    #[test]
    fn test_invalid_layer_becomes_warning() {
        let user = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        fs::write(user.path().join("config.toml"), "[server\nbase_url=").unwrap();

        let loaded = load_config_with_options(Some(project.path()), Some(user.path())).unwrap();
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.loaded_from().is_empty());
    }

    #[test]
    fn test_reserved_cache_key_fails_loading() {
        let user = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        fs::write(
            project.path().join("tablegate.toml"),
            "[cache]\nkey = \"sessionCookie\"\n",
        )
        .unwrap();

        let err = load_config_with_options(Some(project.path()), Some(user.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ReservedCacheKey(_)));
    }

    #[test]
    fn test_load_single_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[session]\nentry_point = \"/welcome\"\n").unwrap();

        let loaded = load_config_file(&path).unwrap();
        assert_eq!(loaded.entry_point(), "/welcome");
    }
}
