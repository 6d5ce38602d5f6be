//! Error types for docpub-core

use crate::remote::RemoteError;

/// Result type for docpub-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in docpub-core operations
///
/// Every variant is terminal for the single operation that produced it;
/// nothing here is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No usable target (unknown id, disabled, or no active target)
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// Network or transport failure talking to the remote repository
    #[error("Remote repository unavailable: {0}")]
    RemoteUnavailable(String),

    /// The remote object changed since the version we last recorded
    #[error("Remote {path} was modified elsewhere (expected version {expected}, found {})", actual.as_deref().unwrap_or("none"))]
    Conflict {
        path: String,
        expected: String,
        actual: Option<String>,
    },

    /// Remote object or publish record absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// The local document no longer exists
    #[error("Local document missing: {path}")]
    LocalMissing { path: String },

    /// The durable state file could not be read or written
    #[error("Publish state storage failed: {0}")]
    StoreIo(#[source] docpub_fs::Error),

    /// Reading or writing a local document failed
    #[error("Local document error: {0}")]
    Local(#[source] docpub_fs::Error),

    /// The local path normalizes to nothing publishable
    #[error("Invalid document path: {0:?}")]
    InvalidPath(String),
}

impl From<RemoteError> for Error {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Unavailable(message) => Self::RemoteUnavailable(message),
            RemoteError::NotFound(path) => Self::NotFound(path),
            RemoteError::Conflict {
                path,
                expected,
                actual,
            } => Self::Conflict {
                path,
                expected: expected.unwrap_or_else(|| "none".to_string()),
                actual,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_conflict_maps_to_conflict() {
        let err: Error = RemoteError::Conflict {
            path: "guide/a.md".into(),
            expected: Some("v1".into()),
            actual: Some("v2".into()),
        }
        .into();

        let display = err.to_string();
        assert!(matches!(err, Error::Conflict { .. }));
        assert!(display.contains("v1") && display.contains("v2"), "{}", display);
    }

    #[test]
    fn remote_unavailable_keeps_message() {
        let err: Error = RemoteError::Unavailable("connection reset".into()).into();
        assert!(matches!(err, Error::RemoteUnavailable(ref m) if m == "connection reset"));
    }
}
