//! In-memory [`LocalDocuments`] implementation.

use docpub_fs::{Error, LocalDocuments, Result};
use std::collections::BTreeMap;
use std::io;
use std::sync::Mutex;

/// Local documents held in a map keyed by vault-relative path.
#[derive(Debug, Default)]
pub struct MemoryVault {
    documents: Mutex<BTreeMap<String, String>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Self::insert`].
    pub fn with(self, path: &str, content: &str) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&self, path: &str, content: &str) {
        self.documents
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
    }

    /// Delete a document, as if the user removed it from the vault.
    pub fn remove(&self, path: &str) -> Option<String> {
        self.documents.lock().unwrap().remove(path)
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.documents.lock().unwrap().get(path).cloned()
    }
}

impl LocalDocuments for MemoryVault {
    fn exists(&self, path: &str) -> bool {
        self.documents.lock().unwrap().contains_key(path)
    }

    fn read(&self, path: &str) -> Result<String> {
        self.content(path).ok_or_else(|| {
            Error::io(path, io::Error::new(io::ErrorKind::NotFound, "no such document"))
        })
    }

    fn write(&self, path: &str, content: &str) -> Result<()> {
        self.insert(path, content);
        Ok(())
    }
}
