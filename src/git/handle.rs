//! git::handle
//!
//! The live repository reference produced by a clone.

use std::path::Path;

use thiserror::Error;

use super::GitError;
use crate::core::types::{BranchName, CommitId};

/// Which step of a HEAD lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStage {
    /// HEAD could not be resolved (e.g. no commits yet).
    Head,
    /// HEAD resolved, but its commit object could not be read.
    CommitObject,
}

impl LookupStage {
    /// Human-readable cause naming the failed step.
    pub fn cause(&self) -> &'static str {
        match self {
            LookupStage::Head => "cannot resolve head of repository",
            LookupStage::CommitObject => "cannot access commit by hash",
        }
    }
}

impl std::fmt::Display for LookupStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.cause())
    }
}

/// Structured failure of a latest-commit lookup.
///
/// Callers decide the recovery policy; a fresh repository with no commits
/// reports [`LookupStage::Head`].
#[derive(Debug, Clone, Error)]
#[error("{stage}: {message}")]
pub struct LookupError {
    stage: LookupStage,
    message: String,
}

impl LookupError {
    fn new(stage: LookupStage, err: &git2::Error) -> Self {
        Self {
            stage,
            message: err.message().to_string(),
        }
    }

    /// The step that failed.
    pub fn stage(&self) -> LookupStage {
        self.stage
    }

    /// Human-readable cause naming the failed step.
    pub fn cause(&self) -> &'static str {
        self.stage.cause()
    }

    /// The underlying libgit2 message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Information about a commit.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    /// The commit id
    pub id: CommitId,
    /// First line of the commit message
    pub summary: String,
    /// Full commit message
    pub message: String,
    /// Author name
    pub author_name: String,
    /// Author email
    pub author_email: String,
    /// Author timestamp
    pub author_time: chrono::DateTime<chrono::Utc>,
}

/// A cloned repository bound to its workspace and tracked branch.
///
/// Not owned by the agent: Clone hands it out and every later operation
/// takes it back explicitly. Mutating operations need `&mut`, so one
/// handle cannot be used by two operations at once.
pub struct RemoteHandle {
    pub(super) repo: git2::Repository,
    pub(super) branch: BranchName,
}

impl std::fmt::Debug for RemoteHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteHandle")
            .field("path", &self.repo.path())
            .field("branch", &self.branch)
            .finish()
    }
}

impl RemoteHandle {
    pub(crate) fn new(repo: git2::Repository, branch: BranchName) -> Self {
        Self { repo, branch }
    }

    /// The branch this handle clones, pulls and pushes.
    pub fn branch(&self) -> &BranchName {
        &self.branch
    }

    /// Resolve the working tree root.
    ///
    /// # Errors
    ///
    /// [`GitError::BareRepo`] if the repository has no working directory.
    pub fn workdir(&self) -> Result<&Path, GitError> {
        self.repo.workdir().ok_or(GitError::BareRepo)
    }

    /// Resolve HEAD to the id of its commit.
    ///
    /// # Errors
    ///
    /// A [`LookupError`] tagged with the step that failed.
    pub fn latest_commit_id(&self) -> Result<CommitId, LookupError> {
        let head = self
            .repo
            .head()
            .map_err(|e| LookupError::new(LookupStage::Head, &e))?;

        let target = head.target().ok_or_else(|| LookupError {
            stage: LookupStage::Head,
            message: "HEAD is not a direct reference".to_string(),
        })?;

        let commit = self
            .repo
            .find_commit(target)
            .map_err(|e| LookupError::new(LookupStage::CommitObject, &e))?;

        Ok(CommitId::from_git2(commit.id()))
    }

    /// Read summary, message and author of a commit.
    ///
    /// # Errors
    ///
    /// [`GitError::Internal`] if the id is not a commit in this repository.
    pub fn commit_info(&self, id: &CommitId) -> Result<CommitInfo, GitError> {
        let oid = id
            .to_git2()
            .map_err(|e| GitError::from_git2(e, id.as_str()))?;
        let commit = self
            .repo
            .find_commit(oid)
            .map_err(|e| GitError::from_git2(e, id.as_str()))?;

        let author = commit.author();
        let author_time = chrono::DateTime::from_timestamp(author.when().seconds(), 0)
            .unwrap_or(chrono::DateTime::UNIX_EPOCH);

        Ok(CommitInfo {
            id: id.clone(),
            summary: commit.summary().unwrap_or("").to_string(),
            message: commit.message().unwrap_or("").to_string(),
            author_name: author.name().unwrap_or("").to_string(),
            author_email: author.email().unwrap_or("").to_string(),
            author_time,
        })
    }
}
