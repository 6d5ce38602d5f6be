//! In-memory [`RemoteRepository`] implementation.
//!
//! Files live in a map with a version tag each. Tags are `v1`, `v2`, ... from
//! a counter shared across all files, so every write produces a tag never seen
//! before. Every trait call is counted per [`Op`], and failures can be queued
//! per operation.

use async_trait::async_trait;
use docpub_core::Target;
use docpub_core::remote::{RemoteEntry, RemoteError, RemoteRepository, RemoteResult, WriteOutcome};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::Mutex;

/// Remote operations, for call counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Read,
    Write,
    Delete,
}

#[derive(Debug, Clone)]
struct StoredFile {
    content: String,
    version: String,
}

/// A committed write, as the remote saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub path: String,
    pub message: String,
    pub branch: String,
}

#[derive(Debug, Default)]
struct Inner {
    files: BTreeMap<String, StoredFile>,
    directories: BTreeSet<String>,
    next_version: u64,
    calls: HashMap<Op, usize>,
    listed: Vec<String>,
    commits: Vec<Commit>,
    failures: HashMap<Op, VecDeque<RemoteError>>,
    offline: bool,
}

impl Inner {
    fn next_version(&mut self) -> String {
        self.next_version += 1;
        format!("v{}", self.next_version)
    }

    fn begin(&mut self, op: Op) -> RemoteResult<()> {
        *self.calls.entry(op).or_default() += 1;
        if self.offline {
            return Err(RemoteError::Unavailable("remote is offline".into()));
        }
        match self.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// In-memory remote repository shared by every target.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    inner: Mutex<Inner>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Self::put`].
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.put(path, content);
        self
    }

    /// Builder form of [`Self::add_directory`].
    pub fn with_directory(self, path: &str) -> Self {
        self.add_directory(path);
        self
    }

    /// Store a file without counting a call, as a second actor would.
    ///
    /// Returns the new version tag.
    pub fn put(&self, path: &str, content: &str) -> String {
        let mut inner = self.inner.lock().unwrap();
        let version = inner.next_version();
        inner.files.insert(
            path.trim_matches('/').to_string(),
            StoredFile {
                content: content.to_string(),
                version: version.clone(),
            },
        );
        version
    }

    /// Register a directory that exists even without files.
    pub fn add_directory(&self, path: &str) {
        self.inner
            .lock()
            .unwrap()
            .directories
            .insert(path.trim_matches('/').to_string());
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .files
            .get(path)
            .map(|f| f.content.clone())
    }

    pub fn version(&self, path: &str) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .files
            .get(path)
            .map(|f| f.version.clone())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.inner.lock().unwrap().files.contains_key(path)
    }

    /// Remove a file without counting a call.
    pub fn remove(&self, path: &str) {
        self.inner.lock().unwrap().files.remove(path);
    }

    /// Number of calls made for `op` so far.
    pub fn calls(&self, op: Op) -> usize {
        self.inner
            .lock()
            .unwrap()
            .calls
            .get(&op)
            .copied()
            .unwrap_or(0)
    }

    /// Paths passed to `list_contents`, in call order.
    pub fn listed_paths(&self) -> Vec<String> {
        self.inner.lock().unwrap().listed.clone()
    }

    pub fn commits(&self) -> Vec<Commit> {
        self.inner.lock().unwrap().commits.clone()
    }

    pub fn reset_calls(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.clear();
        inner.listed.clear();
    }

    /// Make the next call of `op` fail with `error`.
    pub fn fail_next(&self, op: Op, error: RemoteError) {
        self.inner
            .lock()
            .unwrap()
            .failures
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Fail every call with [`RemoteError::Unavailable`] while set.
    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().unwrap().offline = offline;
    }
}

#[async_trait]
impl RemoteRepository for MemoryRemote {
    async fn list_contents(&self, path: &str, _target: &Target) -> RemoteResult<Vec<RemoteEntry>> {
        let mut inner = self.inner.lock().unwrap();
        inner.listed.push(path.to_string());
        inner.begin(Op::List)?;

        let base = path.trim_matches('/');
        let mut entries: BTreeMap<String, RemoteEntry> = BTreeMap::new();
        let known = inner
            .files
            .keys()
            .map(|p| (p.as_str(), false))
            .chain(inner.directories.iter().map(|p| (p.as_str(), true)));

        for (full, is_directory) in known {
            let relative = if base.is_empty() {
                full
            } else {
                match full.strip_prefix(base).and_then(|rest| rest.strip_prefix('/')) {
                    Some(rest) => rest,
                    None => continue,
                }
            };
            let (first, rest) = match relative.split_once('/') {
                Some((first, rest)) => (first, Some(rest)),
                None => (relative, None),
            };
            if first.is_empty() {
                continue;
            }
            let child = if base.is_empty() {
                first.to_string()
            } else {
                format!("{}/{}", base, first)
            };
            let entry = if rest.is_some() || is_directory {
                RemoteEntry::directory(child.clone())
            } else {
                RemoteEntry::file(child.clone())
            };
            entries.insert(child, entry);
        }

        if entries.is_empty() && !base.is_empty() && !inner.directories.contains(base) {
            return Err(RemoteError::NotFound(base.to_string()));
        }
        Ok(entries.into_values().collect())
    }

    async fn read_contents(&self, path: &str, _target: &Target) -> RemoteResult<String> {
        let mut inner = self.inner.lock().unwrap();
        inner.begin(Op::Read)?;
        inner
            .files
            .get(path)
            .map(|f| f.content.clone())
            .ok_or_else(|| RemoteError::NotFound(path.to_string()))
    }

    async fn write(
        &self,
        path: &str,
        content: &str,
        commit_message: &str,
        target: &Target,
        expected_version: Option<&str>,
    ) -> RemoteResult<WriteOutcome> {
        let mut inner = self.inner.lock().unwrap();
        inner.begin(Op::Write)?;

        let current = inner.files.get(path).map(|f| f.version.clone());
        if let Some(expected) = expected_version {
            if current.as_deref() != Some(expected) {
                return Err(RemoteError::Conflict {
                    path: path.to_string(),
                    expected: Some(expected.to_string()),
                    actual: current,
                });
            }
        }

        let version = inner.next_version();
        inner.files.insert(
            path.to_string(),
            StoredFile {
                content: content.to_string(),
                version: version.clone(),
            },
        );
        inner.commits.push(Commit {
            path: path.to_string(),
            message: commit_message.to_string(),
            branch: target.branch.clone(),
        });
        Ok(WriteOutcome {
            version_tag: version,
        })
    }

    async fn delete(&self, path: &str, commit_message: &str, target: &Target) -> RemoteResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.begin(Op::Delete)?;
        if inner.files.remove(path).is_none() {
            return Err(RemoteError::NotFound(path.to_string()));
        }
        inner.commits.push(Commit {
            path: path.to_string(),
            message: commit_message.to_string(),
            branch: target.branch.clone(),
        });
        Ok(())
    }
}
