//! core
//!
//! Core domain types and configuration for the sync agent.
//!
//! # Modules
//!
//! - [`types`] - Strong types: BranchName, CommitId, WorkspacePath
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at construction time
//! - Configuration is strict and immutable once loaded

pub mod config;
pub mod types;
