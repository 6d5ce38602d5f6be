//! Per-document publication state and the in-flight publish registry

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Where one document stands on one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum PublicationState {
    /// No record exists
    Unpublished,
    /// A publish is running right now
    Publishing,
    /// The last attempt failed
    PublishFailed { error: String },
    /// The last attempt succeeded
    #[serde(rename_all = "camelCase")]
    Published {
        remote_path: String,
        /// Whether the given content matches what was published; `None` when
        /// no content was supplied or no hash was recorded
        up_to_date: Option<bool>,
    },
}

/// Keys of publishes currently awaiting the remote.
///
/// Each key counts its running publishes, so overlapping publishes of the
/// same document stay visible until the last one finishes.
#[derive(Debug, Default)]
pub(crate) struct InFlight {
    keys: Mutex<HashMap<String, usize>>,
}

impl InFlight {
    pub(crate) fn enter(&self, key: String) -> InFlightGuard<'_> {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.clone())
            .and_modify(|count| *count += 1)
            .or_insert(1);
        InFlightGuard { owner: self, key }
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }
}

/// Releases its key when the publish finishes, however it finishes.
pub(crate) struct InFlightGuard<'a> {
    owner: &'a InFlight,
    key: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut keys = self.owner.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(count) = keys.get_mut(&self.key) {
            *count -= 1;
            if *count == 0 {
                keys.remove(&self.key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_clears_key_on_drop() {
        let in_flight = InFlight::default();
        {
            let _guard = in_flight.enter("a.md:site".into());
            assert!(in_flight.contains("a.md:site"));
        }
        assert!(!in_flight.contains("a.md:site"));
    }

    #[test]
    fn overlapping_guards_keep_key_until_last_drop() {
        let in_flight = InFlight::default();
        let first = in_flight.enter("a.md:site".into());
        let second = in_flight.enter("a.md:site".into());

        drop(first);
        assert!(in_flight.contains("a.md:site"));

        drop(second);
        assert!(!in_flight.contains("a.md:site"));
    }

    #[test]
    fn published_serializes_with_tag() {
        let state = PublicationState::Published {
            remote_path: "guide/a.md".into(),
            up_to_date: Some(true),
        };
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["state"], "published");
        assert_eq!(value["remotePath"], "guide/a.md");
        assert_eq!(value["upToDate"], true);
    }
}
