//! Shared test utilities for the docpub workspace.
//!
//! Dev-dependency only, never published. Because it depends on
//! `docpub-core`, use it from integration tests (`tests/`), not from unit
//! tests inside `docpub-core`.
//!
//! # Modules
//!
//! - [`remote`]: [`MemoryRemote`], an in-memory remote repository with call
//!   counters and failure injection
//! - [`vault`]: [`MemoryVault`], an in-memory local document store
//! - [`workspace`]: [`TestWorkspace`], a temporary state file plus helpers

pub mod remote;
pub mod vault;
pub mod workspace;

pub use remote::{Commit, MemoryRemote, Op};
pub use vault::MemoryVault;
pub use workspace::TestWorkspace;
