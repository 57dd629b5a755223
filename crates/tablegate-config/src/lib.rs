//! Configuration system for tablegate.
//!
//! Provides TOML-based configuration with:
//! - `[server]`: backend base URL, request timeout, user agent
//! - `[cache]`: cache directory, TTL and slot name
//! - `[session]`: redirect target and retry policy for unverifiable checks
//!
//! Files are layered: the user config (`~/.config/tablegate/config.toml`)
//! first, then a project-local `tablegate.toml` on top.

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    data_dir, load_config, load_config_file, load_config_with_options,
    xdg_config_dir, xdg_config_path, ConfigSource, LoadedConfig,
};
pub use error::{ConfigError, Result};
pub use types::*;
