//! cli
//!
//! Command-line interface layer for dsync.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the log subscriber
//! - Load the agent config and delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. Handlers build a
//! [`RepositorySyncAgent`](crate::agent::RepositorySyncAgent) and call its
//! operations; they never touch `git2` or the workspace directly.

pub mod args;
pub mod commands;

pub use args::Cli;

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    /// Explicit config file, if given on the command line
    pub config: Option<PathBuf>,
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.debug, cli.log_json);

    let ctx = Context {
        config: cli.config.clone(),
    };

    commands::dispatch(cli.command, &ctx)
}

/// Install the global log subscriber, writing to stderr.
///
/// `RUST_LOG` wins over the default filter; `--debug` raises the default
/// for this crate to debug.
fn init_tracing(debug: bool, json: bool) {
    let default = if debug { "dashsync=debug,info" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
