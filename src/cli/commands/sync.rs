//! sync command - Commit a directory of files to the remote branch
//!
//! The source directory mirrors the repository layout the agent reads
//! back: `<source>/<dir>/<file>`. Only that level is synchronized, so a
//! `sync` followed by a `snapshot` shows exactly the files that were sent.

use std::fs;
use std::path::Path;

use super::build_agent;
use crate::cli::Context;
use crate::core::types::WorkspacePath;
use crate::git::CommitOutcome;
use anyhow::{bail, Context as _, Result};

/// Clone, materialize `source`, commit with `tag`, and push.
pub fn sync(ctx: &Context, source: &Path, tag: &str) -> Result<()> {
    if tag.chars().any(char::is_control) {
        bail!("tag must not contain control characters");
    }

    let files = collect_sources(source)?;
    if files.is_empty() {
        bail!("no files found under '{}'", source.display());
    }

    let agent = build_agent(ctx)?;
    let mut handle = agent.clone_repo()?;
    let outcome = agent.synchronize(&mut handle, files, tag)?;

    match outcome.commit {
        CommitOutcome::Committed(id) => {
            println!("Committed {} with tag <{}>", id.short(12), tag);
            if outcome.pushed {
                println!("Pushed {}", handle.branch());
            }
        }
        CommitOutcome::NothingToCommit => {
            println!(
                "Nothing to commit; {} is already at {}",
                handle.branch(),
                outcome.pulled_head.short(12)
            );
        }
    }
    Ok(())
}

/// Read `<source>/<dir>/<file>` entries into workspace paths.
///
/// Files at the top of `source`, nested directories, symlinks and
/// dot-directories are skipped.
pub fn collect_sources(source: &Path) -> Result<Vec<(WorkspacePath, Vec<u8>)>> {
    let mut files = Vec::new();

    let mut dirs = Vec::new();
    for entry in fs::read_dir(source)
        .with_context(|| format!("cannot read source directory '{}'", source.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry
            .file_name()
            .into_string()
            .map_err(|n| anyhow::anyhow!("directory name is not UTF-8: {n:?}"))?;
        if name.starts_with('.') {
            continue;
        }
        dirs.push(name);
    }
    dirs.sort();

    for dir in dirs {
        let dir_path = source.join(&dir);
        let mut names = Vec::new();
        for entry in fs::read_dir(&dir_path)
            .with_context(|| format!("cannot read '{}'", dir_path.display()))?
        {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry
                .file_name()
                .into_string()
                .map_err(|n| anyhow::anyhow!("file name is not UTF-8: {n:?}"))?;
            names.push(name);
        }
        names.sort();

        for name in names {
            let path = WorkspacePath::new(format!("{dir}/{name}"))
                .with_context(|| format!("invalid file name '{dir}/{name}'"))?;
            let file = dir_path.join(&name);
            let content =
                fs::read(&file).with_context(|| format!("cannot read '{}'", file.display()))?;
            files.push((path, content));
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn collects_one_level_of_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("team/nested")).unwrap();
        fs::create_dir_all(root.join(".hidden")).unwrap();
        fs::write(root.join("top.json"), "top").unwrap();
        fs::write(root.join("team/b.json"), "b").unwrap();
        fs::write(root.join("team/a.json"), "a").unwrap();
        fs::write(root.join("team/nested/deep.json"), "deep").unwrap();
        fs::write(root.join(".hidden/x.json"), "x").unwrap();

        let files = collect_sources(root).unwrap();
        let paths: Vec<_> = files.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(paths, ["team/a.json", "team/b.json"]);
        assert_eq!(files[0].1, b"a");
    }

    #[test]
    fn missing_source_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(collect_sources(&dir.path().join("absent")).is_err());
    }
}
