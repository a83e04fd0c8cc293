//! head command - Print the latest commit of the configured branch

use super::build_agent;
use crate::cli::Context;
use anyhow::{Context as _, Result};

/// Clone the configured branch and print its HEAD commit.
pub fn head(ctx: &Context, id_only: bool) -> Result<()> {
    let agent = build_agent(ctx)?;
    let handle = agent.clone_repo()?;

    let id = agent
        .latest_commit_id(&handle)
        .with_context(|| format!("no commit on branch '{}'", handle.branch()))?;

    if id_only {
        println!("{id}");
        return Ok(());
    }

    let info = handle
        .commit_info(&id)
        .with_context(|| format!("failed to read commit {}", id.short(12)))?;
    println!("{} {}", id.short(12), info.summary);
    println!(
        "Author: {} ({})",
        info.author_name,
        info.author_time.format("%Y-%m-%d %H:%M:%S UTC")
    );
    Ok(())
}
