//! git::commit
//!
//! Stage everything in the working tree and record a sync commit.

use git2::{IndexAddOption, Signature, StatusOptions};

use super::{GitError, RemoteHandle};
use crate::core::types::CommitId;

/// Author and committer name of every sync commit.
pub const AUTHOR_NAME: &str = "dashsync-agent";

/// Build the message of a sync commit for `tag`.
///
/// The tag is embedded verbatim between angle brackets.
///
/// # Example
///
/// ```
/// use dashsync::git::commit_message;
///
/// assert_eq!(
///     commit_message("v1.2.3"),
///     "Synchronized Dashboards with tag <v1.2.3>"
/// );
/// ```
pub fn commit_message(tag: &str) -> String {
    format!("Synchronized Dashboards with tag <{tag}>")
}

/// Outcome of a commit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A new commit was created.
    Committed(CommitId),
    /// The staged tree equals HEAD's tree and empty commits are disabled.
    NothingToCommit,
}

impl CommitOutcome {
    /// The new commit, if one was created.
    pub fn commit_id(&self) -> Option<&CommitId> {
        match self {
            CommitOutcome::Committed(id) => Some(id),
            CommitOutcome::NothingToCommit => None,
        }
    }
}

/// Summary of working tree status.
///
/// Logged for diagnostics; commit decisions compare trees instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeStatus {
    /// Number of staged changes
    pub staged: usize,
    /// Number of unstaged changes to tracked files
    pub unstaged: usize,
    /// Number of untracked files
    pub untracked: usize,
    /// Whether there are unresolved conflicts
    pub has_conflicts: bool,
}

impl WorktreeStatus {
    /// Check if the worktree is completely clean (no changes at all).
    pub fn is_clean(&self) -> bool {
        self.staged == 0 && self.unstaged == 0 && self.untracked == 0 && !self.has_conflicts
    }
}

impl std::fmt::Display for WorktreeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "staged={} unstaged={} untracked={} conflicts={}",
            self.staged, self.unstaged, self.untracked, self.has_conflicts
        )
    }
}

impl RemoteHandle {
    /// Summarize the working tree against the index and HEAD.
    pub fn worktree_status(&self) -> Result<WorktreeStatus, GitError> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true).include_ignored(false);

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(|e| GitError::from_git2(e, "status"))?;

        let mut result = WorktreeStatus::default();
        for entry in statuses.iter() {
            let status = entry.status();

            if status.is_conflicted() {
                result.has_conflicts = true;
            }
            if status.is_index_new()
                || status.is_index_modified()
                || status.is_index_deleted()
                || status.is_index_renamed()
                || status.is_index_typechange()
            {
                result.staged += 1;
            }
            if status.is_wt_modified()
                || status.is_wt_deleted()
                || status.is_wt_renamed()
                || status.is_wt_typechange()
            {
                result.unstaged += 1;
            }
            if status.is_wt_new() {
                result.untracked += 1;
            }
        }

        Ok(result)
    }

    /// Stage every path in the working tree and commit it.
    ///
    /// Additions, modifications and deletions are all staged, ignore rules
    /// notwithstanding. Author and
    /// committer are `author_name` at the current time; the message
    /// embeds `tag`. When the staged tree equals HEAD's tree and
    /// `allow_empty` is false, no commit is made.
    ///
    /// # Errors
    ///
    /// - [`GitError::BareRepo`] if the working tree cannot be resolved
    /// - any index, object or ref error while committing
    pub fn commit_all(
        &mut self,
        author_name: &str,
        tag: &str,
        allow_empty: bool,
    ) -> Result<CommitOutcome, GitError> {
        self.workdir()?;

        let mut index = self
            .repo
            .index()
            .map_err(|e| GitError::from_git2(e, "index"))?;
        // Written content is committed even when the tree's .gitignore matches it.
        index
            .add_all(["*"], IndexAddOption::FORCE, None)
            .map_err(|e| GitError::from_git2(e, "stage"))?;
        index
            .update_all(["*"], None)
            .map_err(|e| GitError::from_git2(e, "stage"))?;
        index
            .write()
            .map_err(|e| GitError::from_git2(e, "index"))?;

        let status = self.worktree_status()?;
        tracing::debug!(status = %status, "worktree status");

        let tree_id = index
            .write_tree()
            .map_err(|e| GitError::from_git2(e, "write tree"))?;
        let tree = self
            .repo
            .find_tree(tree_id)
            .map_err(|e| GitError::from_git2(e, "write tree"))?;

        let parent = match self.repo.head() {
            Ok(head) => Some(
                head.peel_to_commit()
                    .map_err(|e| GitError::from_git2(e, "HEAD"))?,
            ),
            Err(e)
                if e.code() == git2::ErrorCode::UnbornBranch
                    || e.code() == git2::ErrorCode::NotFound =>
            {
                None
            }
            Err(e) => return Err(GitError::from_git2(e, "HEAD")),
        };

        if !allow_empty && parent.as_ref().is_some_and(|p| p.tree_id() == tree_id) {
            tracing::info!(tag, "no changes to commit");
            return Ok(CommitOutcome::NothingToCommit);
        }

        // libgit2 requires an email; the agent has none, so the name stands in.
        let signature = Signature::now(author_name, author_name)
            .map_err(|e| GitError::from_git2(e, "signature"))?;
        let message = commit_message(tag);
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, &message, &tree, &parents)
            .map_err(|e| GitError::from_git2(e, "commit"))?;

        let id = CommitId::from_git2(oid);
        tracing::info!(commit = %id, tag, "committed worktree");
        Ok(CommitOutcome::Committed(id))
    }
}
