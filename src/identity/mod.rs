//! identity
//!
//! Key-based credential used for every authenticated remote operation.
//!
//! # Responsibilities
//!
//! - Read private key material once, at construction, and fail fast if
//!   it is unreadable or not a private key
//! - Answer libgit2 credential requests with the key and the fixed principal
//! - Apply the configured [`HostKeyPolicy`] to host certificates
//!
//! # Security
//!
//! - Key material and passphrase are wiped from memory on drop
//! - Neither is ever logged, printed, or included in error messages
//! - [`HostKeyPolicy::AcceptAny`] disables man-in-the-middle protection;
//!   building a credential with it logs a warning
//!
//! # Example
//!
//! ```ignore
//! use dashsync::identity::{Credential, HostKeyPolicy};
//! use std::path::Path;
//!
//! let credential = Credential::from_key_file(
//!     Path::new("/etc/dashsync/id_ed25519"),
//!     "git",
//!     None,
//!     HostKeyPolicy::Verify,
//! )?;
//! ```

mod host_key;

pub use host_key::{format_fingerprint, HostKeyPolicy};

use std::path::{Path, PathBuf};

use git2::{Cred, CredentialType, RemoteCallbacks};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::core::config::AgentConfig;

/// Errors from building a credential.
///
/// Messages name the key file but never its contents.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The key file could not be read.
    #[error("cannot read private key '{path}': {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The key file does not hold usable private key material.
    #[error("malformed private key '{path}': {reason}")]
    Malformed { path: PathBuf, reason: String },

    /// The principal name is empty.
    #[error("credential principal cannot be empty")]
    EmptyPrincipal,
}

/// An SSH key identity bound to a fixed principal.
///
/// Immutable once constructed.
pub struct Credential {
    principal: String,
    key: Zeroizing<String>,
    passphrase: Option<Zeroizing<String>>,
    host_key: HostKeyPolicy,
    source: PathBuf,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("principal", &self.principal)
            .field("source", &self.source)
            .field("host_key", &self.host_key)
            .finish_non_exhaustive()
    }
}

impl Credential {
    /// Build a credential from the identity settings of an agent config.
    pub fn from_config(config: &AgentConfig) -> Result<Self, IdentityError> {
        Self::from_key_file(
            &config.private_key,
            config.principal.clone(),
            config.passphrase.as_deref(),
            config.host_key.clone(),
        )
    }

    /// Read a private key file and bind it to `principal`.
    ///
    /// # Errors
    ///
    /// - [`IdentityError::Unreadable`] if the file cannot be read
    /// - [`IdentityError::Malformed`] if it is not PEM/OpenSSH private key
    ///   text, or is encrypted and no passphrase was given
    /// - [`IdentityError::EmptyPrincipal`] if `principal` is empty
    pub fn from_key_file(
        path: &Path,
        principal: impl Into<String>,
        passphrase: Option<&str>,
        host_key: HostKeyPolicy,
    ) -> Result<Self, IdentityError> {
        let principal = principal.into();
        if principal.is_empty() {
            return Err(IdentityError::EmptyPrincipal);
        }

        let bytes = Zeroizing::new(std::fs::read(path).map_err(|source| {
            IdentityError::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        })?);
        let key = Zeroizing::new(
            String::from_utf8(bytes.to_vec()).map_err(|_| IdentityError::Malformed {
                path: path.to_path_buf(),
                reason: "key file is not text".into(),
            })?,
        );

        check_key_material(&key, passphrase.is_some()).map_err(|reason| {
            IdentityError::Malformed {
                path: path.to_path_buf(),
                reason,
            }
        })?;

        if host_key.is_insecure() {
            tracing::warn!(
                key = %path.display(),
                "host key verification disabled; remote identity is not checked"
            );
        }

        Ok(Self {
            principal,
            key,
            passphrase: passphrase.map(|p| Zeroizing::new(p.to_string())),
            host_key,
            source: path.to_path_buf(),
        })
    }

    /// The fixed principal name presented to the remote.
    pub fn principal(&self) -> &str {
        &self.principal
    }

    /// The host key policy applied on every connection.
    pub fn host_key_policy(&self) -> &HostKeyPolicy {
        &self.host_key
    }

    /// Path the key material was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Callbacks that authenticate with this credential.
    ///
    /// A fresh set is needed per operation: the key is offered once, and a
    /// second request within the same operation fails instead of looping.
    pub(crate) fn remote_callbacks(&self) -> RemoteCallbacks<'_> {
        let mut callbacks = RemoteCallbacks::new();
        let mut key_offered = false;

        callbacks.credentials(move |url, _username_from_url, allowed| {
            if allowed.contains(CredentialType::USERNAME) {
                return Cred::username(&self.principal);
            }
            if !allowed.contains(CredentialType::SSH_KEY) {
                tracing::error!(url, ?allowed, "remote does not accept key authentication");
                return Err(git2::Error::from_str(
                    "remote does not accept SSH key authentication",
                ));
            }
            if key_offered {
                tracing::error!(url, principal = %self.principal, "private key rejected by remote");
                return Err(git2::Error::from_str("authentication failed: key rejected"));
            }
            key_offered = true;

            Cred::ssh_key_from_memory(
                &self.principal,
                None,
                &self.key,
                self.passphrase.as_deref().map(String::as_str),
            )
        });

        callbacks.certificate_check(move |cert, host| self.host_key.check(cert, host));

        callbacks
    }
}

/// Structural check of private key text.
///
/// Accepts PEM (`-----BEGIN ... PRIVATE KEY-----`) and OpenSSH armored
/// keys. Encrypted PEM keys require a passphrase.
fn check_key_material(key: &str, has_passphrase: bool) -> Result<(), String> {
    let mut lines = key.lines().map(str::trim).filter(|l| !l.is_empty());

    let header = lines.next().ok_or("key file is empty")?;
    let label = header
        .strip_prefix("-----BEGIN ")
        .and_then(|rest| rest.strip_suffix("-----"))
        .filter(|label| label.ends_with("PRIVATE KEY"))
        .ok_or("missing private key header")?;

    let footer = format!("-----END {label}-----");
    let mut body_lines = 0usize;
    let mut encrypted = label.starts_with("ENCRYPTED");
    let mut closed = false;
    for line in lines {
        if line == footer {
            closed = true;
            break;
        }
        if line.starts_with("Proc-Type:") && line.contains("ENCRYPTED") {
            encrypted = true;
        }
        body_lines += 1;
    }

    if !closed {
        return Err(format!("missing '{footer}' footer"));
    }
    if body_lines == 0 {
        return Err("key body is empty".into());
    }
    if encrypted && !has_passphrase {
        return Err("key is encrypted but no passphrase is configured".into());
    }

    Ok(())
}
