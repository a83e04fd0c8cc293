//! core::types
//!
//! Strong types for the values that cross the agent boundary.
//!
//! # Types
//!
//! - [`BranchName`] - Validated Git branch name
//! - [`CommitId`] - Content-derived commit identifier (hex SHA)
//! - [`WorkspacePath`] - Relative file path inside the ephemeral workspace
//!
//! # Validation
//!
//! These types enforce validity at construction time, so the git layer
//! never sees a branch name it would reject or a path that escapes the
//! workspace.
//!
//! # Examples
//!
//! ```
//! use dashsync::core::types::{BranchName, CommitId, WorkspacePath};
//!
//! let branch = BranchName::new("main").unwrap();
//! assert_eq!(branch.refname(), "refs/heads/main");
//!
//! let path = WorkspacePath::new("dashboards/home.json").unwrap();
//! assert_eq!(path.as_str(), "dashboards/home.json");
//!
//! assert!(BranchName::new("invalid..name").is_err());
//! assert!(CommitId::new("not-a-sha").is_err());
//! assert!(WorkspacePath::new("../escape").is_err());
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid commit id: {0}")]
    InvalidCommitId(String),

    #[error("invalid workspace path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
}

/// A validated Git branch name.
///
/// Follows the rules of `git check-ref-format --branch`:
/// - Cannot be empty or exactly `@`
/// - No component may start with `.` or end with `.lock`
/// - Cannot start with `-` or end with `/`
/// - Cannot contain `..`, `@{`, `//`, ASCII control characters,
///   or any of ` ~^:\?*[`
///
/// # Example
///
/// ```
/// use dashsync::core::types::BranchName;
///
/// let name = BranchName::new("release/2024-q1").unwrap();
/// assert_eq!(name.as_str(), "release/2024-q1");
///
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new("has space").is_err());
/// assert!(BranchName::new("topic.lock").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        let reject = |msg: &str| Err(TypeError::InvalidBranchName(msg.to_string()));

        if name.is_empty() {
            return reject("branch name cannot be empty");
        }
        if name == "@" {
            return reject("branch name cannot be '@' (reserved)");
        }
        if name.starts_with('-') {
            return reject("branch name cannot start with '-'");
        }
        if name.ends_with('/') {
            return reject("branch name cannot end with '/'");
        }
        for forbidden in ["..", "@{", "//"] {
            if name.contains(forbidden) {
                return Err(TypeError::InvalidBranchName(format!(
                    "branch name cannot contain '{forbidden}'"
                )));
            }
        }

        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
            return Err(TypeError::InvalidBranchName(format!(
                "branch name cannot contain '{c}'"
            )));
        }
        if name.chars().any(|c| c.is_ascii_control()) {
            return reject("branch name cannot contain control characters");
        }

        for component in name.split('/') {
            if component.starts_with('.') {
                return reject("path component cannot start with '.'");
            }
            if component.ends_with(".lock") {
                return reject("path component cannot end with '.lock'");
            }
        }

        Ok(())
    }

    /// The conventional default branch, `main`.
    pub fn main() -> Self {
        Self("main".to_string())
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The full ref name of this branch (`refs/heads/<branch>`).
    pub fn refname(&self) -> String {
        format!("refs/heads/{}", self.0)
    }

    /// Push refspec updating the same branch on the remote.
    pub fn push_refspec(&self) -> String {
        let refname = self.refname();
        format!("{refname}:{refname}")
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The identifier of a commit reachable from HEAD.
///
/// Normalized to lowercase hex; both SHA-1 (40) and SHA-256 (64) lengths
/// are accepted.
///
/// # Example
///
/// ```
/// use dashsync::core::types::CommitId;
///
/// let id = CommitId::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(id.as_str(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(id.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitId(String);

impl CommitId {
    /// Create a new validated commit id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidCommitId` if the string is not a hex object id.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into().to_ascii_lowercase();
        if id.len() != 40 && id.len() != 64 {
            return Err(TypeError::InvalidCommitId(format!(
                "expected 40 or 64 hex characters, got {}",
                id.len()
            )));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidCommitId(
                "commit id must be hexadecimal".into(),
            ));
        }
        Ok(Self(id))
    }

    pub(crate) fn from_git2(oid: git2::Oid) -> Self {
        Self(oid.to_string())
    }

    pub(crate) fn to_git2(&self) -> Result<git2::Oid, git2::Error> {
        git2::Oid::from_str(&self.0)
    }

    /// Abbreviated form: the first `len` characters.
    pub fn short(&self, len: usize) -> &str {
        &self.0[..len.min(self.0.len())]
    }

    /// Get the commit id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CommitId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<CommitId> for String {
    fn from(id: CommitId) -> Self {
        id.0
    }
}

impl AsRef<str> for CommitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A relative path inside the workspace tree.
///
/// Paths use `/` as separator, must be relative, may not contain `.` or
/// `..` components, and may not address the repository's `.git` directory.
/// Validation happens before anything touches the filesystem, so a
/// `WorkspacePath` can never escape the workspace root.
///
/// # Example
///
/// ```
/// use dashsync::core::types::WorkspacePath;
///
/// let p = WorkspacePath::new("folder/dash.json").unwrap();
/// assert_eq!(p.parent_dir(), Some("folder"));
///
/// let root = WorkspacePath::new("top.json").unwrap();
/// assert_eq!(root.parent_dir(), None);
///
/// assert!(WorkspacePath::new("/etc/passwd").is_err());
/// assert!(WorkspacePath::new(".git/config").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WorkspacePath(String);

impl WorkspacePath {
    /// Name of the repository metadata directory hidden from the workspace view.
    pub const GIT_DIR: &'static str = ".git";

    /// Create a new validated workspace path.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidPath` for empty, absolute, traversing or
    /// `.git` paths, and for paths containing NUL or backslashes.
    pub fn new(path: impl Into<String>) -> Result<Self, TypeError> {
        let path = path.into();
        Self::validate(&path)?;
        Ok(Self(path))
    }

    fn validate(path: &str) -> Result<(), TypeError> {
        let reject = |reason: &str| {
            Err(TypeError::InvalidPath {
                path: path.to_string(),
                reason: reason.to_string(),
            })
        };

        if path.is_empty() {
            return reject("path cannot be empty");
        }
        if path.contains('\0') {
            return reject("path cannot contain NUL");
        }
        if path.contains('\\') {
            return reject("path must use '/' separators");
        }
        if path.ends_with('/') {
            return reject("path must name a file");
        }

        if path.starts_with('/') {
            return reject("path must be relative");
        }

        for (i, component) in path.split('/').enumerate() {
            match component {
                "" => return reject("path cannot contain empty components"),
                "." => return reject("path cannot contain '.'"),
                ".." => return reject("path cannot contain '..'"),
                Self::GIT_DIR if i == 0 => {
                    return reject("path cannot address the .git directory")
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Get the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The directory part of the path, if the file is not at the root.
    pub fn parent_dir(&self) -> Option<&str> {
        self.0.rsplit_once('/').map(|(dir, _)| dir)
    }
}

impl TryFrom<String> for WorkspacePath {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for WorkspacePath {
    type Error = TypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<WorkspacePath> for String {
    fn from(path: WorkspacePath) -> Self {
        path.0
    }
}

impl AsRef<Path> for WorkspacePath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl std::fmt::Display for WorkspacePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod branch_name {
        use super::*;

        #[test]
        fn accepts_common_names() {
            for name in ["main", "master", "feature/dashboards", "v1.2", "user@topic"] {
                assert!(BranchName::new(name).is_ok(), "{name} should be valid");
            }
        }

        #[test]
        fn rejects_invalid_names() {
            for name in [
                "", "@", "-lead", "trail/", "a..b", "a@{b", "a//b", "sp ace", "ti~lde",
                ".hidden", "dir/.hidden", "x.lock", "dir/x.lock", "ctl\x07",
            ] {
                assert!(BranchName::new(name).is_err(), "{name:?} should be invalid");
            }
        }

        #[test]
        fn refname_and_refspec() {
            let branch = BranchName::new("main").unwrap();
            assert_eq!(branch.refname(), "refs/heads/main");
            assert_eq!(branch.push_refspec(), "refs/heads/main:refs/heads/main");
        }

        #[test]
        fn deserializes_with_validation() {
            let ok: BranchName = serde_json::from_str("\"main\"").unwrap();
            assert_eq!(ok.as_str(), "main");
            assert!(serde_json::from_str::<BranchName>("\"bad..name\"").is_err());
        }
    }

    mod commit_id {
        use super::*;

        #[test]
        fn normalizes_to_lowercase() {
            let id = CommitId::new("ABCDEF0123456789ABCDEF0123456789ABCDEF01").unwrap();
            assert_eq!(id.as_str(), "abcdef0123456789abcdef0123456789abcdef01");
        }

        #[test]
        fn accepts_sha256_length() {
            assert!(CommitId::new("a".repeat(64)).is_ok());
        }

        #[test]
        fn rejects_wrong_length_and_non_hex() {
            assert!(CommitId::new("abc").is_err());
            assert!(CommitId::new("g".repeat(40)).is_err());
        }

        #[test]
        fn short_clamps_to_length() {
            let id = CommitId::new("a".repeat(40)).unwrap();
            assert_eq!(id.short(7), "aaaaaaa");
            assert_eq!(id.short(100).len(), 40);
        }

        #[test]
        fn git2_conversion_round_trips() {
            let oid = git2::Oid::from_str("0123456789abcdef0123456789abcdef01234567").unwrap();
            let id = CommitId::from_git2(oid);
            assert_eq!(id.to_git2().unwrap(), oid);
        }
    }

    mod workspace_path {
        use super::*;

        #[test]
        fn accepts_nested_and_root_files() {
            assert!(WorkspacePath::new("dir/a.txt").is_ok());
            assert!(WorkspacePath::new("a.txt").is_ok());
            assert!(WorkspacePath::new("dir/sub/a.txt").is_ok());
            assert!(WorkspacePath::new(".gitignore").is_ok());
            assert!(WorkspacePath::new("dir/.git").is_ok());
        }

        #[test]
        fn rejects_escapes() {
            for path in [
                "", "/abs", "../up", "dir/../../up", "./a", "a/./b", "dir//a", "dir/", "a\\b",
            ] {
                assert!(WorkspacePath::new(path).is_err(), "{path:?} should be invalid");
            }
        }

        #[test]
        fn rejects_git_dir() {
            let err = WorkspacePath::new(".git/HEAD").unwrap_err();
            assert!(matches!(err, TypeError::InvalidPath { .. }));
            assert!(WorkspacePath::new(".git").is_err());
        }

        #[test]
        fn parent_dir() {
            assert_eq!(WorkspacePath::new("d/f").unwrap().parent_dir(), Some("d"));
            assert_eq!(WorkspacePath::new("d/e/f").unwrap().parent_dir(), Some("d/e"));
            assert_eq!(WorkspacePath::new("f").unwrap().parent_dir(), None);
        }
    }
}
