//! Publication synchronization engine for docpub
//!
//! Keeps a set of local documents in step with one or more git-backed remote
//! repositories ("targets"), implementing:
//!
//! - **Path mapping**: canonical remote paths from local document paths
//! - **Directory tree cache**: a lazily expanded, time-boxed model of the
//!   remote directory structure
//! - **Publish records**: durable per-(document, target) publication state,
//!   reconciled against local document existence
//! - **PublicationCoordinator**: publish, republish, pull, delete-remote and
//!   directory browsing with optimistic concurrency via version tags
//!
//! # Architecture
//!
//! ```text
//!               host application
//!                      |
//!           PublicationCoordinator
//!          /       |         |      \
//!     path    tree cache   history   config
//!                  |                    |
//!        RemoteRepository          docpub-fs
//! ```
//!
//! The transport behind [`RemoteRepository`] and the host's document store
//! behind [`docpub_fs::LocalDocuments`] are supplied by the caller.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod history;
pub mod logging;
pub mod path;
pub mod remote;
pub mod state;
pub mod tree;

pub use config::{PathMappingPolicy, Platform, Settings, SettingsStore, Target};
pub use coordinator::{PublicationCoordinator, PublicationState};
pub use error::{Error, Result};
pub use history::{PublishHistory, PublishRecord, PublishRecordStore, PublishStatus};
pub use path::normalize;
pub use remote::{EntryKind, RemoteEntry, RemoteError, RemoteRepository, WriteOutcome};
pub use state::StateFile;
pub use tree::{DirectoryNode, DirectoryTree, DirectoryTreeCache, ExpansionState, NodeId};
