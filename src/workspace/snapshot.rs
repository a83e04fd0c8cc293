//! workspace::snapshot
//!
//! Two-level view of the working tree: directory → file → bytes.

use std::collections::BTreeMap;

use serde::Serialize;

/// Files directly inside each top-level directory of the workspace.
///
/// Only one level is represented: files at the workspace root and
/// anything below a top-level directory's immediate children are absent.
/// A directory with no files still appears, mapped to an empty set.
/// No file metadata is kept.
///
/// # Example
///
/// ```
/// use dashsync::workspace::FileSnapshot;
///
/// let mut snapshot = FileSnapshot::new();
/// snapshot.insert("team-a", "overview.json", b"{}".to_vec());
///
/// assert_eq!(snapshot.get("team-a", "overview.json"), Some(&b"{}"[..]));
/// assert_eq!(snapshot.file_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FileSnapshot(BTreeMap<String, BTreeMap<String, Vec<u8>>>);

impl FileSnapshot {
    /// An empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a directory, even if it holds no files.
    pub fn add_dir(&mut self, dir: impl Into<String>) {
        self.0.entry(dir.into()).or_default();
    }

    /// Record a file's content under its directory.
    pub fn insert(&mut self, dir: impl Into<String>, file: impl Into<String>, content: Vec<u8>) {
        self.0
            .entry(dir.into())
            .or_default()
            .insert(file.into(), content);
    }

    /// Content of `dir/file`, if present.
    pub fn get(&self, dir: &str, file: &str) -> Option<&[u8]> {
        self.0.get(dir)?.get(file).map(Vec::as_slice)
    }

    /// Files of one directory.
    pub fn dir(&self, dir: &str) -> Option<&BTreeMap<String, Vec<u8>>> {
        self.0.get(dir)
    }

    /// Directory names, sorted.
    pub fn dirs(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Every `(dir, file, content)` triple, sorted by directory then file.
    pub fn files(&self) -> impl Iterator<Item = (&str, &str, &[u8])> {
        self.0.iter().flat_map(|(dir, files)| {
            files
                .iter()
                .map(move |(file, content)| (dir.as_str(), file.as_str(), content.as_slice()))
        })
    }

    /// Total number of files across all directories.
    pub fn file_count(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    /// Whether no directory was found.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Same shape with content decoded as UTF-8 (lossy), for display.
    pub fn to_text(&self) -> BTreeMap<String, BTreeMap<String, String>> {
        self.0
            .iter()
            .map(|(dir, files)| {
                let files = files
                    .iter()
                    .map(|(name, bytes)| (name.clone(), String::from_utf8_lossy(bytes).into_owned()))
                    .collect();
                (dir.clone(), files)
            })
            .collect()
    }

    /// The underlying nested map.
    pub fn into_inner(self) -> BTreeMap<String, BTreeMap<String, Vec<u8>>> {
        self.0
    }
}

impl From<BTreeMap<String, BTreeMap<String, Vec<u8>>>> for FileSnapshot {
    fn from(map: BTreeMap<String, BTreeMap<String, Vec<u8>>>) -> Self {
        Self(map)
    }
}
