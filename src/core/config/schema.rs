//! core::config::schema
//!
//! Configuration schema for one sync agent.
//!
//! # Validation
//!
//! Values are validated after parsing: the remote URL must be set, the
//! branch must be a valid branch name, and the principal must be set.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::BranchName;
use crate::identity::HostKeyPolicy;

/// Principal presented to SSH remotes unless configured otherwise.
pub const DEFAULT_PRINCIPAL: &str = "git";

/// Settings for one repository sync agent.
///
/// Constructed once and passed by reference; nothing mutates it after load.
///
/// # Example
///
/// ```toml
/// remote_url = "git@git.example.com:ops/dashboards.git"
/// private_key = "/etc/dashsync/id_ed25519"
/// branch = "main"
///
/// [host_key]
/// policy = "verify"
/// ```
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// URL of the single remote (`origin`)
    pub remote_url: String,

    /// Path to the private key file
    pub private_key: PathBuf,

    /// Passphrase for an encrypted private key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,

    /// Branch to clone, pull and push
    #[serde(default = "BranchName::main")]
    pub branch: BranchName,

    /// SSH user name bound to the key
    #[serde(default = "default_principal")]
    pub principal: String,

    /// Commit even when staging finds no difference from HEAD
    #[serde(default)]
    pub allow_empty_commits: bool,

    /// Host key verification policy
    #[serde(default)]
    pub host_key: HostKeyPolicy,
}

fn default_principal() -> String {
    DEFAULT_PRINCIPAL.to_string()
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("remote_url", &self.remote_url)
            .field("private_key", &self.private_key)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .field("branch", &self.branch)
            .field("principal", &self.principal)
            .field("allow_empty_commits", &self.allow_empty_commits)
            .field("host_key", &self.host_key)
            .finish()
    }
}

impl AgentConfig {
    /// Config with defaults for everything except the remote and key.
    pub fn new(remote_url: impl Into<String>, private_key: impl Into<PathBuf>) -> Self {
        Self {
            remote_url: remote_url.into(),
            private_key: private_key.into(),
            passphrase: None,
            branch: BranchName::main(),
            principal: default_principal(),
            allow_empty_commits: false,
            host_key: HostKeyPolicy::default(),
        }
    }

    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.remote_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "remote_url cannot be empty".to_string(),
            ));
        }

        if self.private_key.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue(
                "private_key cannot be empty".to_string(),
            ));
        }

        if self.principal.is_empty() {
            return Err(ConfigError::InvalidValue(
                "principal cannot be empty".to_string(),
            ));
        }

        self.host_key
            .validate()
            .map_err(|e| ConfigError::InvalidValue(format!("invalid host_key: {e}")))?;

        Ok(())
    }
}
