//! git::errors
//!
//! git2 failures normalized into typed categories.

use thiserror::Error;

/// Errors from repository operations.
///
/// The categorization lets the agent attach a severity per operation and
/// lets callers tell authentication problems from transport problems
/// without parsing libgit2 messages.
#[derive(Debug, Error)]
pub enum GitError {
    /// Requested ref (usually the branch) does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// The repository has no working directory.
    #[error("working tree cannot be resolved: repository is bare")]
    BareRepo,

    /// The remote rejected the credential, or none was acceptable.
    #[error("authentication failed: {message}")]
    Auth {
        /// libgit2's description
        message: String,
    },

    /// The remote host key or certificate was refused.
    #[error("host verification failed: {message}")]
    HostVerification {
        /// libgit2's description
        message: String,
    },

    /// Network or protocol failure talking to the remote.
    #[error("transport error during {operation}: {message}")]
    Transport {
        /// The operation that was running
        operation: String,
        /// libgit2's description
        message: String,
    },

    /// Local and remote history diverged; only fast-forwards are applied.
    #[error("cannot fast-forward {branch}: local and remote history diverged")]
    NotFastForward {
        /// The branch being pulled
        branch: String,
    },

    /// The remote refused to update a ref during push.
    #[error("push of {refname} rejected: {message}")]
    PushRejected {
        /// The ref that was rejected
        refname: String,
        /// The server's reason
        message: String,
    },

    /// HEAD could not be resolved after an operation that should leave it set.
    #[error("cannot resolve HEAD: {0}")]
    HeadUnresolved(#[from] super::LookupError),

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with context.
    ///
    /// `context` names the operation, or the ref for lookups under `refs/`.
    pub(crate) fn from_git2(err: git2::Error, context: &str) -> Self {
        match (err.code(), err.class()) {
            (git2::ErrorCode::Auth, _) => GitError::Auth {
                message: err.message().to_string(),
            },
            (git2::ErrorCode::Certificate, _) => GitError::HostVerification {
                message: err.message().to_string(),
            },
            (git2::ErrorCode::NotFound, _) if context.starts_with("refs/") => {
                GitError::RefNotFound {
                    refname: context.to_string(),
                }
            }
            (_, git2::ErrorClass::Net | git2::ErrorClass::Ssh | git2::ErrorClass::Http) => {
                GitError::Transport {
                    operation: context.to_string(),
                    message: err.message().to_string(),
                }
            }
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{ErrorClass, ErrorCode};

    fn err(code: ErrorCode, class: ErrorClass) -> git2::Error {
        git2::Error::new(code, class, "boom")
    }

    #[test]
    fn auth_errors_categorized() {
        let e = GitError::from_git2(err(ErrorCode::Auth, ErrorClass::Ssh), "fetch");
        assert!(matches!(e, GitError::Auth { .. }));
    }

    #[test]
    fn certificate_errors_categorized() {
        let e = GitError::from_git2(err(ErrorCode::Certificate, ErrorClass::Ssh), "clone");
        assert!(matches!(e, GitError::HostVerification { .. }));
    }

    #[test]
    fn not_found_under_refs_is_ref_not_found() {
        let e = GitError::from_git2(
            err(ErrorCode::NotFound, ErrorClass::Reference),
            "refs/heads/main",
        );
        match e {
            GitError::RefNotFound { refname } => assert_eq!(refname, "refs/heads/main"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn not_found_elsewhere_is_internal() {
        let e = GitError::from_git2(err(ErrorCode::NotFound, ErrorClass::Os), "clone");
        assert!(matches!(e, GitError::Internal { .. }));
        assert!(e.to_string().contains("clone: boom"));
    }

    #[test]
    fn network_class_is_transport() {
        let e = GitError::from_git2(err(ErrorCode::GenericError, ErrorClass::Net), "push");
        match e {
            GitError::Transport { operation, .. } => assert_eq!(operation, "push"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
