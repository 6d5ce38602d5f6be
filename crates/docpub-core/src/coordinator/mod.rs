//! Publication workflows
//!
//! [`PublicationCoordinator`] ties the pieces together: it resolves targets
//! from settings, maps paths, talks to the [`RemoteRepository`], and keeps the
//! [`PublishRecordStore`] in step with what happened.
//!
//! Writes carry the last recorded version tag as a precondition, so an edit
//! made on the remote by someone else surfaces as [`Error::Conflict`] instead
//! of being overwritten. Nothing is retried automatically.

mod status;

pub use status::PublicationState;

use crate::config::{Settings, SettingsStore, Target};
use crate::history::{PublishRecord, PublishRecordStore, record_key};
use crate::path::normalize;
use crate::remote::{RemoteError, RemoteRepository, delete_message, update_message};
use crate::state::StateFile;
use crate::tree::{DirectoryNode, DirectoryTreeCache, NodeId};
use crate::{Error, Result};
use docpub_fs::{LocalDocuments, compute_content_checksum};
use status::InFlight;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

/// Entry point for every publication operation.
///
/// Operations take `&self` and may run concurrently. Settings are
/// snapshotted once at the start of each operation.
pub struct PublicationCoordinator {
    remote: Arc<dyn RemoteRepository>,
    local: Arc<dyn LocalDocuments>,
    settings: RwLock<Settings>,
    settings_store: SettingsStore,
    records: Mutex<PublishRecordStore>,
    tree: tokio::sync::Mutex<DirectoryTreeCache>,
    in_flight: InFlight,
}

impl PublicationCoordinator {
    /// Load settings and publish history from `state`.
    pub fn open(
        state: StateFile,
        remote: Arc<dyn RemoteRepository>,
        local: Arc<dyn LocalDocuments>,
    ) -> Result<Self> {
        let settings_store = SettingsStore::new(state.clone());
        let settings = settings_store.load()?;
        let records = PublishRecordStore::open(state)?;
        tracing::debug!(
            targets = settings.targets.len(),
            records = records.len(),
            "Publication coordinator opened"
        );

        Ok(Self {
            remote,
            local,
            settings: RwLock::new(settings),
            settings_store,
            records: Mutex::new(records),
            tree: tokio::sync::Mutex::new(DirectoryTreeCache::new()),
            in_flight: InFlight::default(),
        })
    }

    /// Replace the directory cache, e.g. to use a different TTL.
    pub fn with_tree_cache(mut self, cache: DirectoryTreeCache) -> Self {
        self.tree = tokio::sync::Mutex::new(cache);
        self
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> Settings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Persist new settings and make them current.
    ///
    /// The directory cache is dropped when the active target or any target's
    /// configuration changes.
    pub async fn replace_settings(&self, settings: Settings) -> Result<()> {
        self.settings_store.save(&settings)?;
        let changed = {
            let mut current = self.settings.write().unwrap_or_else(PoisonError::into_inner);
            let changed = current.active_target != settings.active_target
                || current.targets != settings.targets;
            *current = settings;
            changed
        };
        if changed {
            self.tree.lock().await.invalidate();
        }
        Ok(())
    }

    /// Make `target_id` the active target.
    pub async fn switch_target(&self, target_id: &str) -> Result<()> {
        let mut next = self.settings();
        next.set_active(target_id)?;
        self.settings_store.save(&next)?;
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = next;
        self.tree.lock().await.invalidate();
        tracing::info!(target_id, "Switched active target");
        Ok(())
    }

    /// Check the target's repository and credentials with the remote.
    pub async fn validate_target(&self, target_id: &str) -> Result<()> {
        let target = self.settings().target(target_id)?.clone();
        self.remote.validate(&target).await?;
        tracing::debug!(target_id, "Target validated");
        Ok(())
    }

    /// Publish `content` for `local_path` to `target_id`.
    ///
    /// The remote path comes from the path-mapping policy, placed under
    /// `explicit_directory` when given.
    pub async fn publish(
        &self,
        content: &str,
        local_path: &str,
        target_id: &str,
        explicit_directory: Option<&str>,
    ) -> Result<PublishRecord> {
        let settings = self.settings();
        let target = settings.target(target_id)?;
        let remote_path = normalize(local_path, &settings.policy, explicit_directory);
        self.publish_to(content, local_path, target, remote_path)
            .await
    }

    /// Publish to the active target.
    pub async fn publish_active(
        &self,
        content: &str,
        local_path: &str,
        explicit_directory: Option<&str>,
    ) -> Result<PublishRecord> {
        let target_id = self.settings().active()?.id.clone();
        self.publish(content, local_path, &target_id, explicit_directory)
            .await
    }

    /// Publish the current local content again, to the path it was last
    /// published under.
    pub async fn republish(&self, local_path: &str, target_id: &str) -> Result<PublishRecord> {
        let settings = self.settings();
        let target = settings.target(target_id)?;
        let content = self.read_local(local_path)?;

        let remote_path = match self.record(local_path, target_id) {
            Some(record) => record.remote_path,
            None => normalize(local_path, &settings.policy, None),
        };
        self.publish_to(&content, local_path, target, remote_path)
            .await
    }

    /// Fetch the published remote content of `local_path`.
    pub async fn update_from_remote(&self, local_path: &str, target_id: &str) -> Result<String> {
        let target = self.settings().target(target_id)?.clone();
        let record = self.record(local_path, target_id).ok_or_else(|| {
            Error::NotFound(format!("no publish record for {} on {}", local_path, target_id))
        })?;

        let content = self
            .remote
            .read_contents(&record.remote_path, &target)
            .await?;
        tracing::debug!(
            local_path,
            remote_path = %record.remote_path,
            target_id,
            "Fetched remote content"
        );
        Ok(content)
    }

    /// Overwrite the local document with its published remote content.
    pub async fn pull(&self, local_path: &str, target_id: &str) -> Result<String> {
        if !self.local.exists(local_path) {
            return Err(Error::LocalMissing {
                path: local_path.to_string(),
            });
        }
        let content = self.update_from_remote(local_path, target_id).await?;
        self.local
            .write(local_path, &content)
            .map_err(Error::Local)?;
        tracing::info!(local_path, target_id, "Pulled remote content");
        Ok(content)
    }

    /// Delete the published copy of `local_path` and forget its record.
    ///
    /// Without a record there is nothing to delete and the call succeeds.
    pub async fn delete_remote(&self, local_path: &str, target_id: &str) -> Result<()> {
        let target = self.settings().target(target_id)?.clone();
        let Some(record) = self.record(local_path, target_id) else {
            tracing::debug!(local_path, target_id, "No publish record, nothing to delete");
            return Ok(());
        };

        let message = delete_message(&record.remote_path);
        match self
            .remote
            .delete(&record.remote_path, &message, &target)
            .await
        {
            Ok(()) => {}
            Err(RemoteError::NotFound(_)) => {
                tracing::debug!(
                    remote_path = %record.remote_path,
                    "Remote object already gone"
                );
            }
            Err(e) => return Err(e.into()),
        }

        self.lock_records().remove(local_path, target_id)?;
        tracing::info!(
            local_path,
            remote_path = %record.remote_path,
            target_id,
            "Deleted remote document"
        );
        Ok(())
    }

    /// Top-level entries of the target's content root.
    pub async fn list_directories(&self, target_id: &str) -> Result<Vec<DirectoryNode>> {
        let target = self.settings().target(target_id)?.clone();
        let mut cache = self.tree.lock().await;
        cache.get_top_level(self.remote.as_ref(), &target).await
    }

    /// Children of a directory returned by [`Self::list_directories`].
    pub async fn expand_directory(
        &self,
        target_id: &str,
        node: NodeId,
    ) -> Result<Vec<DirectoryNode>> {
        let target = self.settings().target(target_id)?.clone();
        let mut cache = self.tree.lock().await;
        cache.expand(self.remote.as_ref(), &target, node).await
    }

    /// A node of the cached tree, if the cache is live for `target_id` as
    /// currently configured.
    pub async fn directory_node(&self, target_id: &str, node: NodeId) -> Option<DirectoryNode> {
        let target = self.settings().target(target_id).ok()?.clone();
        self.tree.lock().await.node(&target, node)
    }

    /// Drop records of documents that no longer exist locally.
    pub fn reconcile(&self) -> Result<Vec<PublishRecord>> {
        let local = Arc::clone(&self.local);
        self.lock_records()
            .reconcile(|path| local.exists(path))
    }

    /// Reconcile, then list the `limit` most recent records.
    pub fn dashboard(&self, limit: usize) -> Result<Vec<PublishRecord>> {
        self.reconcile()?;
        Ok(self.lock_records().recent(limit))
    }

    pub fn status(
        &self,
        local_path: &str,
        target_id: &str,
        content: Option<&str>,
    ) -> PublicationState {
        if self.in_flight.contains(&record_key(local_path, target_id)) {
            return PublicationState::Publishing;
        }
        let Some(record) = self.record(local_path, target_id) else {
            return PublicationState::Unpublished;
        };
        if !record.is_success() {
            return PublicationState::PublishFailed {
                error: record.error.unwrap_or_default(),
            };
        }

        let up_to_date = content.and_then(|content| {
            record
                .content_hash
                .as_ref()
                .map(|hash| *hash == compute_content_checksum(content))
        });
        PublicationState::Published {
            remote_path: record.remote_path,
            up_to_date,
        }
    }

    pub fn record(&self, local_path: &str, target_id: &str) -> Option<PublishRecord> {
        self.lock_records().find(local_path, target_id)
    }

    /// Records of `local_path` on every target.
    pub fn records_for(&self, local_path: &str) -> Vec<PublishRecord> {
        self.lock_records().all_for(local_path)
    }

    pub fn records(&self) -> Vec<PublishRecord> {
        self.lock_records().all()
    }

    async fn publish_to(
        &self,
        content: &str,
        local_path: &str,
        target: &Target,
        remote_path: String,
    ) -> Result<PublishRecord> {
        if remote_path.is_empty() {
            return Err(Error::InvalidPath(local_path.to_string()));
        }
        let _publishing = self.in_flight.enter(record_key(local_path, &target.id));

        // A record for a different remote path says nothing about this one
        let previous = self
            .record(local_path, &target.id)
            .filter(|record| record.remote_path == remote_path);
        let expected = previous.as_ref().and_then(|r| r.version_tag.as_deref());

        let message = update_message(&remote_path);
        let outcome = self
            .remote
            .write(&remote_path, content, &message, target, expected)
            .await;

        match outcome {
            Ok(outcome) => {
                let record = PublishRecord::success(
                    local_path,
                    remote_path,
                    &target.id,
                    outcome.version_tag,
                    Some(compute_content_checksum(content)),
                );
                self.lock_records().upsert(record.clone())?;
                tracing::info!(
                    local_path,
                    remote_path = %record.remote_path,
                    target_id = %target.id,
                    "Published document"
                );
                Ok(record)
            }
            Err(e @ RemoteError::Conflict { .. }) => {
                tracing::warn!(
                    local_path,
                    remote_path = %remote_path,
                    target_id = %target.id,
                    "Remote changed since last publish"
                );
                Err(e.into())
            }
            Err(e) => {
                let record = PublishRecord::failed(
                    local_path,
                    remote_path,
                    &target.id,
                    e.to_string(),
                    previous.as_ref(),
                );
                tracing::warn!(
                    local_path,
                    remote_path = %record.remote_path,
                    target_id = %target.id,
                    error = %e,
                    "Publish failed"
                );
                // A store failure takes precedence over the remote error
                self.lock_records().upsert(record)?;
                Err(e.into())
            }
        }
    }

    /// Read a local document, reconciling first if it has vanished.
    fn read_local(&self, local_path: &str) -> Result<String> {
        if !self.local.exists(local_path) {
            self.reconcile()?;
            return Err(Error::LocalMissing {
                path: local_path.to_string(),
            });
        }
        self.local.read(local_path).map_err(Error::Local)
    }

    fn lock_records(&self) -> MutexGuard<'_, PublishRecordStore> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
