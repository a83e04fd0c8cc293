//! identity::host_key
//!
//! Host key verification policy for SSH transports.
//!
//! # Policies
//!
//! - [`HostKeyPolicy::Verify`] (default): libgit2 checks the host key
//!   against the user's known hosts.
//! - [`HostKeyPolicy::Pinned`]: only hosts whose SHA-256 key fingerprint
//!   is listed are accepted. Fingerprints use the OpenSSH form
//!   `SHA256:<base64>`, as printed by `ssh-keygen -lf`.
//! - [`HostKeyPolicy::AcceptAny`]: no verification at all. This removes
//!   man-in-the-middle protection and must be chosen explicitly.
//!
//! # Example
//!
//! ```toml
//! [host_key]
//! policy = "pinned"
//! fingerprints = ["SHA256:nThbg6kXUpJWGl7E1IGOCspRomTxdCARLviKw6E5SY8"]
//! ```

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use git2::cert::Cert;
use git2::CertificateCheckStatus;
use serde::{Deserialize, Serialize};

const FINGERPRINT_PREFIX: &str = "SHA256:";

/// How the identity treats the remote's SSH host key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "kebab-case")]
pub enum HostKeyPolicy {
    /// Defer to libgit2's known-hosts verification.
    #[default]
    Verify,

    /// Accept only the listed SHA-256 fingerprints.
    Pinned {
        /// OpenSSH-style fingerprints (`SHA256:<base64>`).
        fingerprints: Vec<String>,
    },

    /// Accept any host key. Insecure.
    AcceptAny,
}

impl HostKeyPolicy {
    /// Whether this policy skips host key verification entirely.
    pub fn is_insecure(&self) -> bool {
        matches!(self, HostKeyPolicy::AcceptAny)
    }

    /// Check that pinned fingerprints are well-formed.
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if let HostKeyPolicy::Pinned { fingerprints } = self {
            if fingerprints.is_empty() {
                return Err("pinned host key policy needs at least one fingerprint".into());
            }
            for fp in fingerprints {
                decode_fingerprint(fp)?;
            }
        }
        Ok(())
    }

    /// Decide on a certificate presented during a transport handshake.
    pub(crate) fn check(
        &self,
        cert: &Cert<'_>,
        host: &str,
    ) -> Result<CertificateCheckStatus, git2::Error> {
        match self {
            HostKeyPolicy::Verify => Ok(CertificateCheckStatus::CertificatePassthrough),
            HostKeyPolicy::AcceptAny => Ok(CertificateCheckStatus::CertificateOk),
            HostKeyPolicy::Pinned { .. } => {
                // Only SSH host keys are pinned; TLS certificates keep normal validation.
                let Some(hostkey) = cert.as_hostkey() else {
                    return Ok(CertificateCheckStatus::CertificatePassthrough);
                };
                if self.is_pinned(hostkey.hash_sha256()) {
                    Ok(CertificateCheckStatus::CertificateOk)
                } else {
                    tracing::error!(host, "host key does not match any pinned fingerprint");
                    Err(git2::Error::from_str(&format!(
                        "host key for {host} does not match any pinned fingerprint"
                    )))
                }
            }
        }
    }

    /// Whether a presented SHA-256 host key hash is in the pinned set.
    ///
    /// Always false for policies other than `Pinned`, and for hosts that
    /// did not present a SHA-256 hash.
    pub(crate) fn is_pinned(&self, sha256: Option<&[u8; 32]>) -> bool {
        let (HostKeyPolicy::Pinned { fingerprints }, Some(hash)) = (self, sha256) else {
            return false;
        };
        fingerprints
            .iter()
            .filter_map(|fp| decode_fingerprint(fp).ok())
            .any(|pinned| pinned == *hash)
    }
}

/// Render a SHA-256 host key hash the way OpenSSH prints it.
pub fn format_fingerprint(hash: &[u8; 32]) -> String {
    format!("{FINGERPRINT_PREFIX}{}", STANDARD_NO_PAD.encode(hash))
}

fn decode_fingerprint(fingerprint: &str) -> Result<[u8; 32], String> {
    let encoded = fingerprint
        .strip_prefix(FINGERPRINT_PREFIX)
        .ok_or_else(|| format!("fingerprint '{fingerprint}' must start with '{FINGERPRINT_PREFIX}'"))?
        .trim_end_matches('=');

    let bytes = STANDARD_NO_PAD
        .decode(encoded)
        .map_err(|e| format!("fingerprint '{fingerprint}' is not valid base64: {e}"))?;

    bytes
        .try_into()
        .map_err(|_| format!("fingerprint '{fingerprint}' is not a SHA-256 digest"))
}
