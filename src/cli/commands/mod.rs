//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads the agent config and builds the agent
//! 2. Clones the configured branch into the agent's workspace
//! 3. Runs agent operations and prints the result on stdout
//!
//! Logs go to stderr, so stdout stays machine-readable.

mod head;
mod snapshot;
mod sync;

pub use head::head;
pub use snapshot::snapshot;
pub use sync::{collect_sources, sync};

use super::args::Command;
use super::Context;
use crate::agent::RepositorySyncAgent;
use crate::core::config;
use anyhow::{Context as _, Result};

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Sync { source, tag } => sync(ctx, &source, &tag),
        Command::Snapshot { pretty } => snapshot(ctx, pretty),
        Command::Head { id_only } => head(ctx, id_only),
    }
}

/// Load the config and build an agent from it.
fn build_agent(ctx: &Context) -> Result<RepositorySyncAgent> {
    let loaded = config::load(ctx.config.as_deref()).context("failed to load config")?;
    RepositorySyncAgent::new(loaded.config).context("failed to initialize sync agent")
}
