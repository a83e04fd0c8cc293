//! snapshot command - Print the repository content as JSON

use super::build_agent;
use crate::cli::Context;
use anyhow::{Context as _, Result};

/// Clone the configured branch and print its two-level file snapshot.
pub fn snapshot(ctx: &Context, pretty: bool) -> Result<()> {
    let agent = build_agent(ctx)?;
    let _handle = agent.clone_repo()?;

    let text = agent.file_content()?.to_text();
    let json = if pretty {
        serde_json::to_string_pretty(&text)
    } else {
        serde_json::to_string(&text)
    }
    .context("failed to serialize snapshot")?;

    println!("{json}");
    Ok(())
}
