//! dashsync - repository synchronization agent
//!
//! dashsync keeps a directory of generated files (dashboards, typically) in
//! a git branch. One agent clones a single remote branch over SSH into an
//! ephemeral workspace, writes files into it, commits them under a tag,
//! and pushes. It can also read the branch back as a two-level
//! directory → file → bytes snapshot.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, drives the agent)
//! - [`agent`] - The sync agent and its severity-tagged errors
//! - [`core`] - Domain types and configuration
//! - [`git`] - All repository operations, via `git2`
//! - [`identity`] - SSH key credential and host key policy
//! - [`workspace`] - Temporary working copy and snapshot reads
//!
//! # Invariants
//!
//! 1. An agent's config, credential and workspace never change after construction
//! 2. A repository handle comes from a clone and is passed to every later operation
//! 3. "Already up to date" is a successful outcome, never an error
//! 4. Nothing exits the process below the binary; errors carry a severity

pub mod agent;
pub mod cli;
pub mod core;
pub mod git;
pub mod identity;
pub mod workspace;
