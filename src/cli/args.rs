//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Use this config file instead of searching
//! - `--debug`: Enable debug logging
//! - `--log-json`: Emit log events as JSON lines

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// dsync - synchronize dashboard files into a git repository over SSH
#[derive(Parser, Debug)]
#[command(name = "dsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the agent config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Commit a directory of files to the remote branch
    #[command(
        name = "sync",
        long_about = "Clone the configured branch, write files from a source directory \
            into it, commit them with a tag, and push.\n\n\
            The source directory has the same two-level shape as the repository: \
            each subdirectory holds files, and only files directly inside a \
            subdirectory are synchronized. Nothing is pushed when the files \
            match what the branch already holds.",
        after_help = "\
EXAMPLES:
    # Publish exported dashboards under release tag v1.2.3
    dsync sync --source ./export --tag v1.2.3

    # Same, with an explicit config file and debug logs
    dsync --config /etc/dashsync/config.toml --debug sync --source ./export --tag v1.2.3"
    )]
    Sync {
        /// Directory whose subdirectories hold the files to synchronize
        #[arg(long, value_name = "DIR")]
        source: PathBuf,

        /// Tag recorded in the commit message
        #[arg(long)]
        tag: String,
    },

    /// Print the repository content as JSON
    #[command(
        name = "snapshot",
        long_about = "Clone the configured branch and print its files as a JSON object \
            mapping directory name to file name to content.\n\n\
            Only one level of directories is listed; files at the root and \
            nested directories are left out. Content that is not valid UTF-8 \
            is converted lossily."
    )]
    Snapshot {
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the latest commit of the configured branch
    Head {
        /// Print only the commit id
        #[arg(long)]
        id_only: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_sync_with_global_flags() {
        let cli = Cli::try_parse_from([
            "dsync", "sync", "--source", "export", "--tag", "v1", "--debug", "--config", "c.toml",
        ])
        .unwrap();
        assert!(cli.debug);
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        match cli.command {
            Command::Sync { source, tag } => {
                assert_eq!(source, PathBuf::from("export"));
                assert_eq!(tag, "v1");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn sync_requires_tag() {
        assert!(Cli::try_parse_from(["dsync", "sync", "--source", "export"]).is_err());
    }
}
