//! workspace
//!
//! Ephemeral working copy for one sync cycle.
//!
//! # Layout
//!
//! A private temporary directory, removed when the [`Workspace`] is
//! dropped. The working tree lives in its `tree/` subdirectory, which is
//! created by the clone. The repository's object store is the `.git`
//! directory inside the tree; it never outlives the workspace.
//!
//! # Filesystem view
//!
//! The `.git` directory is not part of the view: it cannot be written
//! through [`Workspace::write_file`] and never shows up in a
//! [`FileSnapshot`].
//!
//! # Invariants
//!
//! - Writes never leave the tree: paths are validated [`WorkspacePath`]s and
//!   symlinked ancestors are refused
//! - Snapshots enumerate exactly one directory level below the root
//! - Nothing is shared between workspaces

mod snapshot;

pub use snapshot::FileSnapshot;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;

use crate::core::types::WorkspacePath;

const TREE_DIR: &str = "tree";

/// Errors from workspace filesystem operations.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// The temporary directory backing the workspace could not be created.
    #[error("cannot create workspace: {0}")]
    Create(#[source] std::io::Error),

    /// An I/O error, with the path it happened at.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A write would pass through a symbolic link.
    #[error("refusing to write through symlink at {path}")]
    SymlinkInPath { path: PathBuf },

    /// A directory or file name is not valid UTF-8.
    #[error("name is not valid UTF-8: {path}")]
    NonUtf8Name { path: PathBuf },
}

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> WorkspaceError {
    WorkspaceError::Io {
        path: path.into(),
        source,
    }
}

/// Temporary working copy owned by one agent.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    tree: PathBuf,
}

impl Workspace {
    /// Create an empty workspace.
    ///
    /// # Errors
    ///
    /// [`WorkspaceError::Create`] if no temporary directory can be made.
    pub fn new() -> Result<Self, WorkspaceError> {
        let dir = tempfile::Builder::new()
            .prefix("dashsync-")
            .tempdir()
            .map_err(WorkspaceError::Create)?;
        let tree = dir.path().join(TREE_DIR);
        tracing::debug!(path = %dir.path().display(), "created workspace");
        Ok(Self { dir, tree })
    }

    /// Root of the working tree.
    ///
    /// Does not exist until a clone (or a write) creates it.
    pub fn tree(&self) -> &Path {
        &self.tree
    }

    /// Root of the temporary directory holding the tree.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Create or truncate the file at `path` and write `content` to it.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// - [`WorkspaceError::SymlinkInPath`] if an existing ancestor is a symlink
    /// - [`WorkspaceError::Io`] if a directory or the file cannot be written
    pub fn write_file(&self, path: &WorkspacePath, content: &[u8]) -> Result<(), WorkspaceError> {
        let target = self.tree.join(path);
        self.refuse_symlinks(path)?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }

        let mut file = fs::File::create(&target).map_err(|e| io_err(&target, e))?;
        file.write_all(content).map_err(|e| io_err(&target, e))?;
        file.sync_all().map_err(|e| io_err(&target, e))?;

        tracing::debug!(path = %path, bytes = content.len(), "wrote file");
        Ok(())
    }

    /// Check every existing component of `path` below the tree root.
    fn refuse_symlinks(&self, path: &WorkspacePath) -> Result<(), WorkspaceError> {
        let mut current = self.tree.clone();
        for component in path.as_str().split('/') {
            current.push(component);
            match fs::symlink_metadata(&current) {
                Ok(meta) if meta.file_type().is_symlink() => {
                    return Err(WorkspaceError::SymlinkInPath { path: current });
                }
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => break,
                Err(e) => return Err(io_err(&current, e)),
            }
        }
        Ok(())
    }

    /// Read the two-level snapshot of the tree.
    ///
    /// Enumerates the directories at the root (skipping `.git`), then the
    /// regular files directly inside each of them. Root-level files,
    /// nested directories and symlinks are skipped. A tree that does not
    /// exist yet yields an empty snapshot.
    ///
    /// # Errors
    ///
    /// - [`WorkspaceError::Io`] on any listing or read failure
    /// - [`WorkspaceError::NonUtf8Name`] for names that are not UTF-8
    pub fn snapshot(&self) -> Result<FileSnapshot, WorkspaceError> {
        let mut snapshot = FileSnapshot::new();

        let entries = match fs::read_dir(&self.tree) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(snapshot),
            Err(e) => return Err(io_err(&self.tree, e)),
        };

        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_err(&self.tree, e))?;
            let file_type = entry.file_type().map_err(|e| io_err(entry.path(), e))?;
            if !file_type.is_dir() {
                continue;
            }
            let name = utf8_name(&entry)?;
            if name == WorkspacePath::GIT_DIR {
                continue;
            }
            dirs.push(name);
        }

        for dir in dirs {
            snapshot.add_dir(dir.clone());
            let dir_path = self.tree.join(&dir);

            for entry in fs::read_dir(&dir_path).map_err(|e| io_err(&dir_path, e))? {
                let entry = entry.map_err(|e| io_err(&dir_path, e))?;
                let file_type = entry.file_type().map_err(|e| io_err(entry.path(), e))?;
                let name = utf8_name(&entry)?;
                tracing::debug!(dir = %dir, file = %name, "snapshot entry");

                if file_type.is_dir() {
                    continue;
                }
                if !file_type.is_file() {
                    tracing::debug!(dir = %dir, file = %name, "skipping non-regular file");
                    continue;
                }

                let path = entry.path();
                let content = fs::read(&path).map_err(|e| io_err(&path, e))?;
                snapshot.insert(dir.clone(), name, content);
            }
        }

        Ok(snapshot)
    }
}

fn utf8_name(entry: &fs::DirEntry) -> Result<String, WorkspaceError> {
    entry
        .file_name()
        .into_string()
        .map_err(|_| WorkspaceError::NonUtf8Name { path: entry.path() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(p: &str) -> WorkspacePath {
        WorkspacePath::new(p).unwrap()
    }

    #[test]
    fn new_workspace_is_empty() {
        let ws = Workspace::new().unwrap();
        assert!(ws.root().is_dir());
        assert!(!ws.tree().exists());
        assert!(ws.snapshot().unwrap().is_empty());
    }

    #[test]
    fn dropped_workspace_is_removed() {
        let ws = Workspace::new().unwrap();
        let root = ws.root().to_path_buf();
        drop(ws);
        assert!(!root.exists());
    }

    #[test]
    fn workspaces_are_independent() {
        let a = Workspace::new().unwrap();
        let b = Workspace::new().unwrap();
        a.write_file(&path("dir/a.txt"), b"hello").unwrap();
        assert!(b.snapshot().unwrap().is_empty());
    }

    #[test]
    fn write_then_snapshot() {
        let ws = Workspace::new().unwrap();
        ws.write_file(&path("dir/a.txt"), b"hello").unwrap();

        let snapshot = ws.snapshot().unwrap();
        assert_eq!(snapshot.get("dir", "a.txt"), Some(&b"hello"[..]));
        assert_eq!(snapshot.file_count(), 1);
    }

    #[test]
    fn write_truncates_existing_file() {
        let ws = Workspace::new().unwrap();
        ws.write_file(&path("dir/a.txt"), b"a much longer body").unwrap();
        ws.write_file(&path("dir/a.txt"), b"short").unwrap();
        assert_eq!(ws.snapshot().unwrap().get("dir", "a.txt"), Some(&b"short"[..]));
    }

    #[test]
    fn root_files_excluded() {
        let ws = Workspace::new().unwrap();
        ws.write_file(&path("root.txt"), b"top").unwrap();
        ws.write_file(&path("dir/a.txt"), b"hello").unwrap();

        let snapshot = ws.snapshot().unwrap();
        assert_eq!(snapshot.dirs().collect::<Vec<_>>(), ["dir"]);
        assert_eq!(snapshot.file_count(), 1);
    }

    #[test]
    fn nested_directories_not_descended() {
        let ws = Workspace::new().unwrap();
        ws.write_file(&path("dir/a.txt"), b"a").unwrap();
        ws.write_file(&path("dir/nested/deep.txt"), b"deep").unwrap();

        let snapshot = ws.snapshot().unwrap();
        let files: Vec<_> = snapshot.dir("dir").unwrap().keys().cloned().collect();
        assert_eq!(files, ["a.txt"]);
    }

    #[test]
    fn git_dir_hidden_from_snapshot() {
        let ws = Workspace::new().unwrap();
        fs::create_dir_all(ws.tree().join(".git")).unwrap();
        fs::write(ws.tree().join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();

        assert!(ws.snapshot().unwrap().is_empty());
    }

    #[test]
    fn directory_without_files_listed_empty() {
        let ws = Workspace::new().unwrap();
        ws.write_file(&path("dir/nested/deep.txt"), b"deep").unwrap();
        let snapshot = ws.snapshot().unwrap();
        assert!(snapshot.dir("dir").unwrap().is_empty());
    }

    #[test]
    fn writing_over_directory_fails() {
        let ws = Workspace::new().unwrap();
        ws.write_file(&path("dir/sub/a.txt"), b"a").unwrap();
        let err = ws.write_file(&path("dir/sub"), b"x").unwrap_err();
        assert!(matches!(err, WorkspaceError::Io { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn refuses_symlinked_ancestor() {
        let ws = Workspace::new().unwrap();
        let outside = TempDir::new().unwrap();
        fs::create_dir_all(ws.tree()).unwrap();
        std::os::unix::fs::symlink(outside.path(), ws.tree().join("link")).unwrap();

        let err = ws.write_file(&path("link/escape.txt"), b"x").unwrap_err();
        assert!(matches!(err, WorkspaceError::SymlinkInPath { .. }));
        assert!(!outside.path().join("escape.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_files_skipped_in_snapshot() {
        let ws = Workspace::new().unwrap();
        ws.write_file(&path("dir/real.txt"), b"real").unwrap();
        std::os::unix::fs::symlink("/etc/hostname", ws.tree().join("dir/link.txt")).unwrap();

        let snapshot = ws.snapshot().unwrap();
        assert!(snapshot.get("dir", "link.txt").is_none());
        assert_eq!(snapshot.get("dir", "real.txt"), Some(&b"real"[..]));
    }
}
