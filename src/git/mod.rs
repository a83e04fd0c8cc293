//! git
//!
//! Repository operations for the sync agent, built on `git2`.
//!
//! # Architecture
//!
//! [`RemoteHandle`] is the doorway to a cloned repository. Every
//! repository read and write flows through it; only [`crate::identity`]
//! additionally touches `git2`, to build transport callbacks.
//!
//! # Responsibilities
//!
//! - Clone one branch of one remote (`origin`)
//! - Fetch, pull (fast-forward only) and push that branch
//! - Stage the whole working tree and commit it
//! - Resolve HEAD to its commit id, with structured failure stages
//!
//! # Invariants
//!
//! - A handle is only created by a clone; nothing re-clones implicitly
//! - "Already up to date" is an outcome, never an error
//! - Errors are normalized into [`GitError`] categories
//!
//! # Example
//!
//! ```ignore
//! use dashsync::git::RemoteHandle;
//!
//! let mut handle = RemoteHandle::clone_branch(url, &branch, workspace.tree(), &credential)?;
//! let status = handle.fetch(&credential)?;
//! println!("fetch: {status:?}");
//! let head = handle.latest_commit_id()?;
//! ```

mod commit;
mod errors;
mod handle;
mod remote;

pub use commit::{commit_message, CommitOutcome, WorktreeStatus, AUTHOR_NAME};
pub use errors::GitError;
pub use handle::{CommitInfo, LookupError, LookupStage, RemoteHandle};
pub use remote::{FetchStatus, PullOutcome, PullResult, ORIGIN};
