//! Time-boxed cache of the remote directory tree
//!
//! Holds at most one [`DirectoryTree`], built for one [`Target`]. An entry is
//! served only while it is younger than the TTL and was built from a target
//! equal to the caller's, so a changed content root, repository or branch
//! under the same id forces a fresh listing.

use super::node::{DirectoryNode, DirectoryTree, ExpansionState, NodeId};
use crate::config::Target;
use crate::remote::{EntryKind, RemoteRepository};
use crate::{Error, Result};
use futures::future::join_all;
use std::time::Duration;
use tokio::time::Instant;

/// How long a listing stays fresh.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug)]
struct DirectoryCacheEntry {
    tree: DirectoryTree,
    captured_at: Instant,
    /// Configuration the tree was listed with
    target: Target,
}

/// Single-entry cache of the remote directory tree for one target.
///
/// The entry is rebuilt when it outlives its TTL or when asked for a
/// different target. A stale entry for the same target is kept around so a
/// failed refresh can still serve the last known tree; nodes of a stale tree
/// are read-only and cannot be expanded.
#[derive(Debug)]
pub struct DirectoryTreeCache {
    ttl: Duration,
    entry: Option<DirectoryCacheEntry>,
}

impl Default for DirectoryTreeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryTreeCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether the live entry may be served to `target` without a refresh.
    pub fn is_valid_for(&self, target: &Target) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|entry| entry.target == *target && entry.captured_at.elapsed() < self.ttl)
    }

    /// Look up a node of the live entry for `target`.
    pub fn node(&self, target: &Target, id: NodeId) -> Option<DirectoryNode> {
        self.live(target).and_then(|tree| tree.get(id)).cloned()
    }

    /// The live tree for `target`, if any.
    pub fn tree(&self, target: &Target) -> Option<&DirectoryTree> {
        self.live(target)
    }

    /// Drop the current entry, fresh or not.
    pub fn invalidate(&mut self) {
        if let Some(entry) = self.entry.take() {
            tracing::debug!(target_id = %entry.target.id, "Directory cache invalidated");
        }
    }

    /// Top-level nodes of `target`'s content root.
    pub async fn get_top_level(
        &mut self,
        remote: &dyn RemoteRepository,
        target: &Target,
    ) -> Result<Vec<DirectoryNode>> {
        if self.is_valid_for(target) {
            if let Some(entry) = &self.entry {
                tracing::debug!(target_id = %target.id, "Directory cache hit");
                return Ok(entry.tree.roots());
            }
        }

        tracing::debug!(target_id = %target.id, "Directory cache miss");
        let base = target.listing_root();
        let entries = match remote.list_contents(base, target).await {
            Ok(entries) => entries,
            Err(e) => {
                return match self.entry.as_ref().filter(|entry| entry.target == *target) {
                    Some(entry) => {
                        tracing::warn!(
                            target_id = %target.id,
                            error = %e,
                            "Listing failed, serving stale directory tree"
                        );
                        Ok(entry.tree.roots())
                    }
                    None => Err(e.into()),
                };
            }
        };

        let mut tree = DirectoryTree::from_listing(base, entries);
        mark_expandable_roots(&mut tree, remote, target).await;

        let roots = tree.roots();
        self.entry = Some(DirectoryCacheEntry {
            tree,
            captured_at: Instant::now(),
            target: target.clone(),
        });
        tracing::debug!(target_id = %target.id, entries = roots.len(), "Directory cache populated");
        Ok(roots)
    }

    /// Load the children of a directory node one level deep.
    ///
    /// Only nodes of the live entry for `target` can be expanded. A node of
    /// an expired tree (including one served as a stale fallback) fails with
    /// [`Error::NotFound`]; list the top level again to get fresh ids.
    pub async fn expand(
        &mut self,
        remote: &dyn RemoteRepository,
        target: &Target,
        id: NodeId,
    ) -> Result<Vec<DirectoryNode>> {
        let path = {
            let tree = self.live_mut(target).ok_or_else(|| stale_node(id))?;
            let node = tree
                .get_mut(id)
                .filter(|node| node.kind == EntryKind::Directory)
                .ok_or_else(|| Error::NotFound(format!("node {} is not a directory", id.index())))?;

            if node.expansion_state == ExpansionState::Expanded {
                return Ok(tree.children(id));
            }
            node.expansion_state = ExpansionState::Expanding;
            node.path.clone()
        };

        let listing = remote.list_contents(&path, target).await;

        // Another caller may have replaced the entry while the listing ran
        let Some(tree) = self.live_mut(target) else {
            return Err(stale_node(id));
        };
        match listing {
            Ok(entries) => {
                tree.insert_listing(Some(id), &path, entries);
                if let Some(node) = tree.get_mut(id) {
                    node.expansion_state = ExpansionState::Expanded;
                }
                tracing::debug!(path = %path, "Directory expanded");
                Ok(tree.children(id))
            }
            Err(e) => {
                if let Some(node) = tree.get_mut(id) {
                    node.expansion_state = ExpansionState::Unexpanded;
                }
                Err(e.into())
            }
        }
    }

    fn live(&self, target: &Target) -> Option<&DirectoryTree> {
        if !self.is_valid_for(target) {
            return None;
        }
        self.entry.as_ref().map(|entry| &entry.tree)
    }

    fn live_mut(&mut self, target: &Target) -> Option<&mut DirectoryTree> {
        if !self.is_valid_for(target) {
            return None;
        }
        self.entry.as_mut().map(|entry| &mut entry.tree)
    }
}

fn stale_node(id: NodeId) -> Error {
    Error::NotFound(format!(
        "directory node {} is not in a live tree; list the top level again",
        id.index()
    ))
}

/// Mark each unexpanded top-level directory with whether it has any entries.
async fn mark_expandable_roots(tree: &mut DirectoryTree, remote: &dyn RemoteRepository, target: &Target) {
    let directories: Vec<(NodeId, String)> = tree
        .roots()
        .into_iter()
        .filter(|node| node.is_directory() && node.expansion_state == ExpansionState::Unexpanded)
        .map(|node| (node.id, node.path))
        .collect();

    let results = join_all(
        directories
            .iter()
            .map(|(_, path)| remote.list_contents(path, target)),
    )
    .await;

    for ((id, path), result) in directories.into_iter().zip(results) {
        let has_children = match result {
            Ok(entries) => !entries.is_empty(),
            Err(e) => {
                tracing::debug!(path = %path, error = %e, "Child listing failed");
                false
            }
        };
        if let Some(node) = tree.get_mut(id) {
            node.has_expandable_children = has_children;
        }
    }
}
