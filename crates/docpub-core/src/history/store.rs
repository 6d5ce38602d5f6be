//! Durable publish history kept in the `publishHistory` section

use super::record::{PublishRecord, record_key};
use crate::Result;
use crate::state::{HISTORY_SECTION, StateFile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Serialized form of the `publishHistory` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishHistory {
    #[serde(default)]
    pub records: BTreeMap<String, PublishRecord>,
}

/// Durable store of [`PublishRecord`]s, one per (local path, target).
///
/// Reads are served from memory. Every mutation reloads the section from
/// disk, applies the change, saves, and only then swaps the in-memory view,
/// so a failed save leaves the store as it was.
#[derive(Debug)]
pub struct PublishRecordStore {
    state: StateFile,
    history: PublishHistory,
}

impl PublishRecordStore {
    /// Load the store; a missing state file yields an empty store.
    pub fn open(state: StateFile) -> Result<Self> {
        let history = state.load_section(HISTORY_SECTION)?;
        Ok(Self { state, history })
    }

    /// Re-read the section from disk, picking up other writers' changes.
    pub fn reload(&mut self) -> Result<()> {
        self.history = self.state.load_section(HISTORY_SECTION)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.history.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.records.is_empty()
    }

    /// Insert or replace the record with the same key.
    pub fn upsert(&mut self, record: PublishRecord) -> Result<()> {
        tracing::debug!(
            local_path = %record.local_path,
            target_id = %record.target,
            status = ?record.status,
            "Saving publish record"
        );
        self.mutate(|history| {
            history.records.insert(record.key(), record);
            ((), true)
        })
    }

    pub fn find(&self, local_path: &str, target: &str) -> Option<PublishRecord> {
        self.history
            .records
            .get(&record_key(local_path, target))
            .cloned()
    }

    /// Records of `local_path` on every target.
    pub fn all_for(&self, local_path: &str) -> Vec<PublishRecord> {
        self.history
            .records
            .values()
            .filter(|r| r.local_path == local_path)
            .cloned()
            .collect()
    }

    pub fn all(&self) -> Vec<PublishRecord> {
        self.history.records.values().cloned().collect()
    }

    /// Most recently published first.
    pub fn recent(&self, limit: usize) -> Vec<PublishRecord> {
        let mut records = self.all();
        records.sort_by(|a, b| b.last_published_at.cmp(&a.last_published_at));
        records.truncate(limit);
        records
    }

    /// Remove one record. Absent records are not an error.
    pub fn remove(&mut self, local_path: &str, target: &str) -> Result<Option<PublishRecord>> {
        let key = record_key(local_path, target);
        if !self.history.records.contains_key(&key) {
            return Ok(None);
        }
        self.mutate(|history| {
            let removed = history.records.remove(&key);
            let changed = removed.is_some();
            (removed, changed)
        })
    }

    /// Drop every record whose local document no longer exists, on all
    /// targets, and return what was removed.
    pub fn reconcile<F>(&mut self, exists: F) -> Result<Vec<PublishRecord>>
    where
        F: Fn(&str) -> bool,
    {
        let has_missing = self
            .history
            .records
            .values()
            .any(|r| !exists(&r.local_path));
        if !has_missing {
            return Ok(Vec::new());
        }

        let removed = self.mutate(|history| {
            let (gone, kept): (BTreeMap<_, _>, BTreeMap<_, _>) =
                std::mem::take(&mut history.records)
                    .into_iter()
                    .partition(|(_, r)| !exists(&r.local_path));
            history.records = kept;
            let changed = !gone.is_empty();
            (gone.into_values().collect::<Vec<_>>(), changed)
        })?;

        for record in &removed {
            tracing::info!(
                local_path = %record.local_path,
                target_id = %record.target,
                "Removed publish record for missing document"
            );
        }
        Ok(removed)
    }

    fn mutate<R>(&mut self, apply: impl FnOnce(&mut PublishHistory) -> (R, bool)) -> Result<R> {
        let mut history: PublishHistory = self.state.load_section(HISTORY_SECTION)?;
        let (result, changed) = apply(&mut history);
        if changed {
            self.state.save_section(HISTORY_SECTION, &history)?;
        }
        self.history = history;
        Ok(result)
    }
}
