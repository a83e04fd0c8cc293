//! core::config
//!
//! Configuration schema and loading.
//!
//! # Locations
//!
//! Searched in order, first hit wins:
//! 1. An explicit path (the `--config` flag)
//! 2. `$DASHSYNC_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/dashsync/config.toml`
//! 4. `~/.dashsync/config.toml`
//!
//! A relative `private_key` is resolved against the directory holding the
//! config file.
//!
//! # Example
//!
//! ```no_run
//! use dashsync::core::config::load;
//!
//! let loaded = load(None).unwrap();
//! println!("remote: {}", loaded.config.remote_url);
//! println!("from: {}", loaded.path.display());
//! ```

pub mod schema;

pub use schema::{AgentConfig, DEFAULT_PRINCIPAL};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "DASHSYNC_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("no config file found (searched: {})", display_paths(.searched))]
    NotFound { searched: Vec<PathBuf> },
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "nothing".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A validated config and where it came from.
#[derive(Debug)]
pub struct LoadedConfig {
    /// The loaded configuration.
    pub config: AgentConfig,
    /// The file it was read from.
    pub path: PathBuf,
}

/// Locate, read, and validate the agent configuration.
///
/// # Errors
///
/// - [`ConfigError::NotFound`] if no candidate location holds a file
/// - [`ConfigError::ReadError`] / [`ConfigError::ParseError`] for an
///   unreadable or malformed file
/// - [`ConfigError::InvalidValue`] if validation fails
pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let path = locate(explicit)?;
    let config = read_config(&path)?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(LoadedConfig { config, path })
}

/// Read and validate a config file at a known path.
pub fn read_config(path: &Path) -> Result<AgentConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut config: AgentConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if config.private_key.is_relative() {
        if let Some(dir) = path.parent() {
            config.private_key = dir.join(&config.private_key);
        }
    }

    config.validate()?;
    Ok(config)
}

/// Find the config file to use.
fn locate(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    // An explicit path is used as-is, so a typo surfaces as a read error.
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let candidates = candidate_paths();
    if let Some(found) = candidates.iter().find(|p| p.is_file()) {
        return Ok(found.clone());
    }
    Err(ConfigError::NotFound {
        searched: candidates,
    })
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(path) = std::env::var(CONFIG_ENV) {
        paths.push(PathBuf::from(path));
    }
    if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
        paths.push(PathBuf::from(xdg_home).join("dashsync/config.toml"));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".dashsync/config.toml"));
    }

    paths
}
