//! Remote directory browsing
//!
//! [`DirectoryTree`] is an arena of [`DirectoryNode`]s addressed by
//! [`NodeId`]; [`DirectoryTreeCache`] owns at most one tree, for one target,
//! and expands it lazily one level at a time.

mod cache;
mod node;

pub use cache::{DEFAULT_TTL, DirectoryTreeCache};
pub use node::{DirectoryNode, DirectoryTree, ExpansionState, NodeId};
