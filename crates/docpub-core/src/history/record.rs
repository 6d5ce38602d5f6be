//! One publish record per local document and target

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of the most recent publish attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    Success,
    Failed,
}

/// Durable publication state of one local document on one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRecord {
    pub local_path: String,
    pub remote_path: String,
    pub target: String,
    #[serde(rename = "lastPublished", with = "chrono::serde::ts_milliseconds")]
    pub last_published_at: DateTime<Utc>,
    pub status: PublishStatus,
    /// Remote version after the last successful write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_tag: Option<String>,
    /// `sha256:<hex>` of the content last published
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PublishRecord {
    pub fn success(
        local_path: impl Into<String>,
        remote_path: impl Into<String>,
        target: impl Into<String>,
        version_tag: impl Into<String>,
        content_hash: Option<String>,
    ) -> Self {
        Self {
            local_path: local_path.into(),
            remote_path: remote_path.into(),
            target: target.into(),
            last_published_at: Utc::now(),
            status: PublishStatus::Success,
            version_tag: Some(version_tag.into()),
            content_hash,
            error: None,
        }
    }

    /// A failed attempt, carrying over the last-good version and hash from
    /// `previous` so the next attempt still has a precondition.
    pub fn failed(
        local_path: impl Into<String>,
        remote_path: impl Into<String>,
        target: impl Into<String>,
        error: impl Into<String>,
        previous: Option<&PublishRecord>,
    ) -> Self {
        Self {
            local_path: local_path.into(),
            remote_path: remote_path.into(),
            target: target.into(),
            last_published_at: Utc::now(),
            status: PublishStatus::Failed,
            version_tag: previous.and_then(|p| p.version_tag.clone()),
            content_hash: previous.and_then(|p| p.content_hash.clone()),
            error: Some(error.into()),
        }
    }

    pub fn key(&self) -> String {
        record_key(&self.local_path, &self.target)
    }

    pub fn is_success(&self) -> bool {
        self.status == PublishStatus::Success
    }
}

/// Storage key of the record for (`local_path`, `target`).
pub fn record_key(local_path: &str, target: &str) -> String {
    format!("{}:{}", local_path, target)
}
