//! agent
//!
//! The repository sync agent: one credential, one workspace, one remote.
//!
//! # Architecture
//!
//! [`RepositorySyncAgent`] owns its [`AgentConfig`], [`Credential`] and
//! [`Workspace`], all fixed for its lifetime. It does not own the
//! repository: [`RepositorySyncAgent::clone_repo`] hands out a
//! [`RemoteHandle`] and every later operation takes it back explicitly.
//!
//! # Failure handling
//!
//! Every operation returns a [`SyncError`] tagged with a [`Severity`].
//! Mutating operations fail as fatal and are logged at error level.
//! Fetch and the latest-commit lookup degrade gracefully; an up-to-date
//! fetch or pull is a successful outcome, not an error.
//!
//! # Example
//!
//! ```ignore
//! use dashsync::agent::RepositorySyncAgent;
//! use dashsync::core::config::AgentConfig;
//!
//! let agent = RepositorySyncAgent::new(AgentConfig::new(url, "/etc/dashsync/id_ed25519"))?;
//! let mut handle = agent.clone_repo()?;
//! agent.add_file_with_content(&"team/cpu.json".try_into()?, br#"{"panels":[]}"#)?;
//! agent.commit_worktree(&mut handle, "v1.2.3")?;
//! agent.push(&mut handle)?;
//! ```

mod errors;

pub use errors::{Severity, SyncError};

use crate::core::config::AgentConfig;
use crate::core::types::{BranchName, CommitId, WorkspacePath};
use crate::git::{
    CommitOutcome, FetchStatus, LookupError, PullOutcome, RemoteHandle, AUTHOR_NAME,
};
use crate::identity::Credential;
use crate::workspace::{FileSnapshot, Workspace};

/// Result of one [`RepositorySyncAgent::synchronize`] cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// HEAD after the pull that opened the cycle
    pub pulled_head: CommitId,
    /// What the commit step did
    pub commit: CommitOutcome,
    /// Whether the branch was pushed
    pub pushed: bool,
}

/// Synchronizes one remote branch through an ephemeral workspace.
///
/// Operations block until the network round-trip completes. The agent
/// holds no locks; callers serialize operations against one agent.
#[derive(Debug)]
pub struct RepositorySyncAgent {
    config: AgentConfig,
    credential: Credential,
    workspace: Workspace,
}

impl RepositorySyncAgent {
    /// Build the credential and the workspace for `config`.
    ///
    /// # Errors
    ///
    /// Fatal: an invalid config, an unusable private key, or a workspace
    /// that cannot be created.
    pub fn new(config: AgentConfig) -> Result<Self, SyncError> {
        config.validate().map_err(|e| fatal(SyncError::Config(e)))?;
        let credential = Credential::from_config(&config).map_err(|e| fatal(e.into()))?;
        Self::with_credential(config, credential)
    }

    /// Build an agent around an already constructed credential.
    pub fn with_credential(config: AgentConfig, credential: Credential) -> Result<Self, SyncError> {
        let workspace = Workspace::new().map_err(|e| fatal(e.into()))?;
        tracing::debug!(
            remote = %config.remote_url,
            branch = %config.branch,
            workspace = %workspace.root().display(),
            "agent ready"
        );
        Ok(Self {
            config,
            credential,
            workspace,
        })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Clone the configured branch into the workspace.
    pub fn clone_repo(&self) -> Result<RemoteHandle, SyncError> {
        self.clone_branch(&self.config.branch)
    }

    /// Clone the configured remote at `branch` into the workspace.
    ///
    /// A workspace holds one working tree; cloning twice into the same
    /// agent fails.
    ///
    /// # Errors
    ///
    /// Fatal [`SyncError::Clone`] on any transport, authentication or
    /// reference error.
    pub fn clone_branch(&self, branch: &BranchName) -> Result<RemoteHandle, SyncError> {
        let url = &self.config.remote_url;
        let handle =
            RemoteHandle::clone_branch(url, branch, self.workspace.tree(), &self.credential)
                .map_err(|source| {
                    fatal(SyncError::Clone {
                        url: url.clone(),
                        branch: branch.to_string(),
                        source,
                    })
                })?;

        tracing::info!(url = %url, branch = %branch, "repo cloned");
        Ok(handle)
    }

    /// Fetch `origin`.
    ///
    /// # Errors
    ///
    /// Recoverable [`SyncError::Fetch`]; an up-to-date fetch is
    /// `Ok(FetchStatus::UpToDate)`.
    pub fn fetch(&self, handle: &mut RemoteHandle) -> Result<FetchStatus, SyncError> {
        match handle.fetch(&self.credential) {
            Ok(status) => {
                tracing::debug!(status = %status, "fetched");
                Ok(status)
            }
            Err(e) => {
                tracing::warn!(error = %e, "fetch failed");
                Err(SyncError::Fetch(e))
            }
        }
    }

    /// Fast-forward the working tree to `origin` and return HEAD.
    ///
    /// # Errors
    ///
    /// Fatal [`SyncError::Pull`] if the worktree cannot be resolved or the
    /// pull fails for a reason other than being up to date.
    pub fn pull(&self, handle: &mut RemoteHandle) -> Result<CommitId, SyncError> {
        let result = handle
            .pull(&self.credential)
            .map_err(|e| fatal(SyncError::Pull(e)))?;

        match result.outcome {
            PullOutcome::UpToDate => tracing::info!(status = "up-to-date", "pull"),
            PullOutcome::FastForwarded => {
                tracing::info!(head = %result.head.short(12), "pulled")
            }
        }
        Ok(result.head)
    }

    /// Push the tracked branch to `origin`.
    ///
    /// # Errors
    ///
    /// Fatal [`SyncError::Push`] on any failure, including rejection.
    pub fn push(&self, handle: &mut RemoteHandle) -> Result<(), SyncError> {
        handle
            .push(&self.credential)
            .map_err(|e| fatal(SyncError::Push(e)))?;
        tracing::info!(branch = %handle.branch(), "pushed");
        Ok(())
    }

    /// Resolve HEAD to its commit id.
    ///
    /// Never logged as a failure; a fresh repository with no commits is
    /// an expected [`LookupError`] for some callers.
    pub fn latest_commit_id(&self, handle: &RemoteHandle) -> Result<CommitId, LookupError> {
        handle.latest_commit_id()
    }

    /// Create or truncate `path` in the workspace and write `content`.
    ///
    /// # Errors
    ///
    /// Fatal [`SyncError::Workspace`] on any filesystem failure.
    pub fn add_file_with_content(
        &self,
        path: &WorkspacePath,
        content: impl AsRef<[u8]>,
    ) -> Result<(), SyncError> {
        self.workspace
            .write_file(path, content.as_ref())
            .map_err(|e| fatal(e.into()))
    }

    /// Stage the whole working tree and commit it with `tag`.
    ///
    /// Author and committer are always [`AUTHOR_NAME`].
    ///
    /// With `allow_empty_commits` off, an unchanged tree yields
    /// [`CommitOutcome::NothingToCommit`].
    ///
    /// # Errors
    ///
    /// Fatal [`SyncError::Commit`] on worktree resolution or commit failure.
    pub fn commit_worktree(
        &self,
        handle: &mut RemoteHandle,
        tag: &str,
    ) -> Result<CommitOutcome, SyncError> {
        handle
            .commit_all(AUTHOR_NAME, tag, self.config.allow_empty_commits)
            .map_err(|e| fatal(SyncError::Commit(e)))
    }

    /// Read the two-level directory → file → bytes snapshot.
    ///
    /// # Errors
    ///
    /// Fatal [`SyncError::Workspace`] on any listing or read failure.
    pub fn file_content(&self) -> Result<FileSnapshot, SyncError> {
        let snapshot = self.workspace.snapshot().map_err(|e| fatal(e.into()))?;
        tracing::debug!(
            dirs = snapshot.dirs().count(),
            files = snapshot.file_count(),
            "read workspace"
        );
        Ok(snapshot)
    }

    /// Run one sync cycle: pull, write `files`, commit, push.
    ///
    /// Push only happens when a commit was created.
    pub fn synchronize<I, C>(
        &self,
        handle: &mut RemoteHandle,
        files: I,
        tag: &str,
    ) -> Result<SyncOutcome, SyncError>
    where
        I: IntoIterator<Item = (WorkspacePath, C)>,
        C: AsRef<[u8]>,
    {
        let pulled_head = self.pull(handle)?;

        let mut written = 0usize;
        for (path, content) in files {
            self.add_file_with_content(&path, content)?;
            written += 1;
        }
        tracing::debug!(files = written, "materialized");

        let commit = self.commit_worktree(handle, tag)?;
        let pushed = match commit {
            CommitOutcome::Committed(_) => {
                self.push(handle)?;
                true
            }
            CommitOutcome::NothingToCommit => false,
        };

        Ok(SyncOutcome {
            pulled_head,
            commit,
            pushed,
        })
    }
}

/// Log a fatal failure before handing it to the caller.
fn fatal(err: SyncError) -> SyncError {
    tracing::error!(error = %err, severity = %err.severity(), "sync operation failed");
    err
}
