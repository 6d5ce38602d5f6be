//! Remote repository capability contract
//!
//! The engine never talks HTTP itself. A host supplies an implementation of
//! [`RemoteRepository`] for each platform it supports (GitHub contents API,
//! GitLab repository files API, ...); every call names the [`Target`] it
//! operates on so one implementation can serve several targets.

use crate::config::Target;
use serde::{Deserialize, Serialize};

/// Kind of a remote directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One entry of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub name: String,
    /// Repository-relative path, slash separated
    pub path: String,
    pub kind: EntryKind,
}

impl RemoteEntry {
    pub fn file(path: impl Into<String>) -> Self {
        Self::new(path.into(), EntryKind::File)
    }

    pub fn directory(path: impl Into<String>) -> Self {
        Self::new(path.into(), EntryKind::Directory)
    }

    fn new(path: String, kind: EntryKind) -> Self {
        let path = path.trim_matches('/').to_string();
        let name = path.rsplit('/').next().unwrap_or_default().to_string();
        Self { name, path, kind }
    }
}

/// Result of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Opaque token identifying the object state after the write (a blob
    /// SHA on GitHub, a commit id on GitLab)
    pub version_tag: String,
}

/// Failures reported by a [`RemoteRepository`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("{0}")]
    Unavailable(String),

    #[error("version mismatch on {path}")]
    Conflict {
        path: String,
        expected: Option<String>,
        actual: Option<String>,
    },

    #[error("{0} does not exist on the remote")]
    NotFound(String),
}

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Operations against a remote git-backed document store.
#[async_trait::async_trait]
pub trait RemoteRepository: Send + Sync {
    /// List the direct entries of `path` ("" is the repository root).
    async fn list_contents(&self, path: &str, target: &Target) -> RemoteResult<Vec<RemoteEntry>>;

    /// Read a file's text.
    async fn read_contents(&self, path: &str, target: &Target) -> RemoteResult<String>;

    /// Create or replace a file.
    ///
    /// With `expected_version` set, the write must fail with
    /// [`RemoteError::Conflict`] unless the object's current version equals
    /// it. Without one, the write creates or overwrites unconditionally.
    async fn write(
        &self,
        path: &str,
        content: &str,
        commit_message: &str,
        target: &Target,
        expected_version: Option<&str>,
    ) -> RemoteResult<WriteOutcome>;

    /// Delete a file.
    async fn delete(&self, path: &str, commit_message: &str, target: &Target) -> RemoteResult<()>;

    /// Check that the target's repository is reachable with the configured
    /// credentials.
    ///
    /// The default lists the target's content root.
    async fn validate(&self, target: &Target) -> RemoteResult<()> {
        self.list_contents(target.listing_root(), target)
            .await
            .map(|_| ())
    }
}

/// Commit message used when publishing `remote_path`.
pub fn update_message(remote_path: &str) -> String {
    format!("Update {}", remote_path)
}

/// Commit message used when deleting `remote_path`.
pub fn delete_message(remote_path: &str) -> String {
    format!("Delete {}", remote_path)
}
