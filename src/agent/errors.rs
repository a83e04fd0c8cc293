//! agent::errors
//!
//! Per-operation errors of the sync agent, tagged with a severity.
//!
//! # Severity
//!
//! Operations that mutate the workspace or the remote fail with
//! [`Severity::Fatal`]: the sync cycle cannot continue and the caller
//! should stop it. Two read-mostly operations fail with
//! [`Severity::Recoverable`]: a fetch that hits a real error, and the
//! latest-commit lookup. Nothing here exits the process; the caller
//! decides.

use thiserror::Error;

use crate::core::config::ConfigError;
use crate::git::{GitError, LookupError};
use crate::identity::IdentityError;
use crate::workspace::WorkspaceError;

/// How a failed operation affects the sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The cycle must stop; state may be partially applied.
    Fatal,
    /// The caller may retry or continue with its own policy.
    Recoverable,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Fatal => f.write_str("fatal"),
            Severity::Recoverable => f.write_str("recoverable"),
        }
    }
}

/// Errors from sync agent operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The agent configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The credential could not be built.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// A workspace filesystem operation failed.
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    /// Cloning the remote failed.
    #[error("clone of {url} at {branch} failed: {source}")]
    Clone {
        url: String,
        branch: String,
        #[source]
        source: GitError,
    },

    /// Fetching failed for a reason other than being up to date.
    #[error("fetch failed: {0}")]
    Fetch(#[source] GitError),

    /// Pulling failed for a reason other than being up to date.
    #[error("pull failed: {0}")]
    Pull(#[source] GitError),

    /// Staging or committing the working tree failed.
    #[error("commit failed: {0}")]
    Commit(#[source] GitError),

    /// Pushing failed.
    #[error("push failed: {0}")]
    Push(#[source] GitError),

    /// HEAD or its commit could not be resolved.
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl SyncError {
    /// Severity of this failure for the sync cycle.
    pub fn severity(&self) -> Severity {
        match self {
            SyncError::Fetch(_) | SyncError::Lookup(_) => Severity::Recoverable,
            SyncError::Config(_)
            | SyncError::Identity(_)
            | SyncError::Workspace(_)
            | SyncError::Clone { .. }
            | SyncError::Pull(_)
            | SyncError::Commit(_)
            | SyncError::Push(_) => Severity::Fatal,
        }
    }

    /// Whether the sync cycle must stop.
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}
