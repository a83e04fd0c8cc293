//! git::remote
//!
//! Clone, fetch, pull and push against the single `origin` remote.
//!
//! # Up-to-date handling
//!
//! libgit2 reports nothing special when a fetch brings no change, so
//! "already up to date" is decided here by comparing state before and
//! after: remote-tracking refs for fetch, merge analysis for pull. It is
//! always a successful outcome, never an error.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{FetchOptions, PushOptions};

use super::{GitError, RemoteHandle};
use crate::core::types::{BranchName, CommitId};
use crate::identity::Credential;

/// Name of the only remote the agent talks to.
pub const ORIGIN: &str = "origin";

/// Outcome of a successful fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// At least one remote-tracking ref moved.
    Updated,
    /// Nothing changed on the remote.
    UpToDate,
}

impl FetchStatus {
    /// Status string reported to callers: empty after an update,
    /// `"up-to-date"` when nothing changed.
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchStatus::Updated => "",
            FetchStatus::UpToDate => "up-to-date",
        }
    }

    /// Whether the fetch was a no-op.
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, FetchStatus::UpToDate)
    }
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a pull did to the local branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    /// The local branch already contained the remote branch.
    UpToDate,
    /// The local branch was moved forward to the remote branch.
    FastForwarded,
}

/// Result of a pull: what happened and where HEAD ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullResult {
    pub outcome: PullOutcome,
    pub head: CommitId,
}

impl RemoteHandle {
    /// Clone `url` at `branch` into `dest`.
    ///
    /// `dest` must not exist or be an empty directory.
    pub fn clone_branch(
        url: &str,
        branch: &BranchName,
        dest: &Path,
        credential: &Credential,
    ) -> Result<Self, GitError> {
        let mut fetch = FetchOptions::new();
        fetch.remote_callbacks(credential.remote_callbacks());

        let repo = RepoBuilder::new()
            .branch(branch.as_str())
            .fetch_options(fetch)
            .clone(url, dest)
            .map_err(|e| GitError::from_git2(e, "clone"))?;

        Ok(Self::new(repo, branch.clone()))
    }

    /// Fetch `origin` with its configured refspecs.
    ///
    /// # Errors
    ///
    /// Any transport, authentication or repository error. A fetch that
    /// changes nothing is `Ok(FetchStatus::UpToDate)`.
    pub fn fetch(&mut self, credential: &Credential) -> Result<FetchStatus, GitError> {
        let before = self.tracking_refs()?;

        let mut remote = self
            .repo
            .find_remote(ORIGIN)
            .map_err(|e| GitError::from_git2(e, "find remote origin"))?;
        let mut opts = FetchOptions::new();
        opts.remote_callbacks(credential.remote_callbacks());
        remote
            .fetch(&[] as &[&str], Some(&mut opts), None)
            .map_err(|e| GitError::from_git2(e, "fetch"))?;

        let after = self.tracking_refs()?;
        if before == after {
            Ok(FetchStatus::UpToDate)
        } else {
            Ok(FetchStatus::Updated)
        }
    }

    /// Fetch the tracked branch and fast-forward the working tree to it.
    ///
    /// Local uncommitted changes to tracked files are overwritten by the
    /// checkout; pull before writing new content.
    ///
    /// # Errors
    ///
    /// - [`GitError::BareRepo`] if the working tree cannot be resolved
    /// - [`GitError::NotFastForward`] if local and remote diverged
    /// - transport, authentication or repository errors
    pub fn pull(&mut self, credential: &Credential) -> Result<PullResult, GitError> {
        self.workdir()?;

        let mut remote = self
            .repo
            .find_remote(ORIGIN)
            .map_err(|e| GitError::from_git2(e, "find remote origin"))?;
        let mut opts = FetchOptions::new();
        opts.remote_callbacks(credential.remote_callbacks());
        remote
            .fetch(&[self.branch.as_str()], Some(&mut opts), None)
            .map_err(|e| GitError::from_git2(e, "pull"))?;

        let fetch_head = self
            .repo
            .find_reference("FETCH_HEAD")
            .map_err(|e| GitError::from_git2(e, "FETCH_HEAD"))?;
        let incoming = self
            .repo
            .reference_to_annotated_commit(&fetch_head)
            .map_err(|e| GitError::from_git2(e, "FETCH_HEAD"))?;
        let (analysis, _) = self
            .repo
            .merge_analysis(&[&incoming])
            .map_err(|e| GitError::from_git2(e, "merge analysis"))?;

        let outcome = if analysis.is_up_to_date() {
            PullOutcome::UpToDate
        } else if analysis.is_fast_forward() || analysis.is_unborn() {
            self.fast_forward(incoming.id())?;
            PullOutcome::FastForwarded
        } else {
            return Err(GitError::NotFastForward {
                branch: self.branch.to_string(),
            });
        };

        let head = self.latest_commit_id()?;
        Ok(PullResult { outcome, head })
    }

    /// Move the tracked branch to `target`, make it HEAD, and check it out.
    fn fast_forward(&self, target: git2::Oid) -> Result<(), GitError> {
        let refname = self.branch.refname();
        let reflog = format!("dashsync: fast-forward to {target}");

        match self.repo.find_reference(&refname) {
            Ok(mut reference) => {
                reference
                    .set_target(target, &reflog)
                    .map_err(|e| GitError::from_git2(e, &refname))?;
            }
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                self.repo
                    .reference(&refname, target, false, &reflog)
                    .map_err(|e| GitError::from_git2(e, &refname))?;
            }
            Err(e) => return Err(GitError::from_git2(e, &refname)),
        }

        self.repo
            .set_head(&refname)
            .map_err(|e| GitError::from_git2(e, &refname))?;

        let mut checkout = CheckoutBuilder::new();
        checkout.force();
        self.repo
            .checkout_head(Some(&mut checkout))
            .map_err(|e| GitError::from_git2(e, "checkout"))
    }

    /// Push the tracked branch to `origin`.
    ///
    /// # Errors
    ///
    /// [`GitError::PushRejected`] if the remote refuses the update, or any
    /// transport, authentication or repository error.
    pub fn push(&mut self, credential: &Credential) -> Result<(), GitError> {
        let refname = self.branch.refname();
        let rejection: RefCell<Option<String>> = RefCell::new(None);

        let mut remote = self
            .repo
            .find_remote(ORIGIN)
            .map_err(|e| GitError::from_git2(e, "find remote origin"))?;

        let mut callbacks = credential.remote_callbacks();
        callbacks.push_update_reference(|_refname, status| {
            if let Some(message) = status {
                *rejection.borrow_mut() = Some(message.to_string());
            }
            Ok(())
        });
        let mut opts = PushOptions::new();
        opts.remote_callbacks(callbacks);

        remote
            .push(&[self.branch.push_refspec()], Some(&mut opts))
            .map_err(|e| match e.code() {
                git2::ErrorCode::NotFastForward => GitError::PushRejected {
                    refname: refname.clone(),
                    message: e.message().to_string(),
                },
                _ => GitError::from_git2(e, "push"),
            })?;
        drop(opts);

        match rejection.into_inner() {
            Some(message) => Err(GitError::PushRejected { refname, message }),
            None => Ok(()),
        }
    }

    /// Snapshot of `refs/remotes/origin/*` targets.
    fn tracking_refs(&self) -> Result<BTreeMap<String, git2::Oid>, GitError> {
        let glob = format!("refs/remotes/{ORIGIN}/*");
        let references = self
            .repo
            .references_glob(&glob)
            .map_err(|e| GitError::from_git2(e, &glob))?;

        let mut refs = BTreeMap::new();
        for reference in references {
            let reference = reference.map_err(|e| GitError::from_git2(e, &glob))?;
            if let (Some(name), Some(target)) = (reference.name(), reference.target()) {
                refs.insert(name.to_string(), target);
            }
        }
        Ok(refs)
    }
}
