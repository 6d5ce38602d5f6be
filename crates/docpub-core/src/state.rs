//! The durable state file
//!
//! All persistent state lives in one JSON document keyed by section:
//!
//! ```json
//! {
//!   "settings": { "activeTarget": "site", "targets": [...], "policy": {...} },
//!   "publishHistory": { "records": { "notes/a.md:site": {...} } }
//! }
//! ```
//!
//! Each writer replaces only its own section inside a locked
//! load-modify-save, so the settings form and the record store never clobber
//! each other. Unknown sections written by other versions are preserved.

use crate::{Error, Result};
use docpub_fs::io;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Section holding [`crate::Settings`]
pub const SETTINGS_SECTION: &str = "settings";

/// Section holding [`crate::PublishHistory`]
pub const HISTORY_SECTION: &str = "publishHistory";

/// Handle on the JSON state file.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/docpub/data.json`, if the platform has a config dir.
    pub fn default_location() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("docpub").join("data.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read one section. A missing file or section yields `T::default()`.
    pub fn load_section<T>(&self, section: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let Some(content) = io::read_locked(&self.path).map_err(Error::StoreIo)? else {
            return Ok(T::default());
        };
        let mut document = parse_document(&self.path, &content).map_err(Error::StoreIo)?;
        match document.remove(section) {
            Some(Value::Null) | None => Ok(T::default()),
            Some(value) => serde_json::from_value(value)
                .map_err(|e| Error::StoreIo(parse_error(&self.path, e.to_string()))),
        }
    }

    /// Replace one section, leaving every other section untouched.
    pub fn save_section<T: Serialize>(&self, section: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| Error::StoreIo(serialize_error(&self.path, e)))?;

        io::update_atomic(&self.path, |current| {
            let mut document = match current {
                Some(content) => parse_document(&self.path, &content)?,
                None => Map::new(),
            };
            document.insert(section.to_string(), value);
            serde_json::to_string_pretty(&Value::Object(document))
                .map_err(|e| serialize_error(&self.path, e))
        })
        .map_err(Error::StoreIo)
    }
}

fn parse_document(path: &Path, content: &str) -> docpub_fs::Result<Map<String, Value>> {
    if content.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str(content) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(parse_error(path, "state file is not a JSON object".into())),
        Err(e) => Err(parse_error(path, e.to_string())),
    }
}

fn parse_error(path: &Path, message: String) -> docpub_fs::Error {
    docpub_fs::Error::ConfigParse {
        path: path.to_path_buf(),
        format: "JSON".into(),
        message,
    }
}

fn serialize_error(path: &Path, e: serde_json::Error) -> docpub_fs::Error {
    docpub_fs::Error::ConfigSerialize {
        path: path.to_path_buf(),
        format: "JSON".into(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_default() {
        let dir = tempdir().unwrap();
        let state = StateFile::new(dir.path().join("data.json"));

        let value: Map<String, Value> = state.load_section(SETTINGS_SECTION).unwrap();
        assert!(value.is_empty());
    }

    #[test]
    fn save_section_preserves_other_sections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, r#"{"settings":{"activeTarget":"site"},"extra":1}"#).unwrap();
        let state = StateFile::new(&path);

        state
            .save_section(HISTORY_SECTION, &json!({"records": {}}))
            .unwrap();

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["settings"]["activeTarget"], "site");
        assert_eq!(raw["extra"], 1);
        assert_eq!(raw["publishHistory"], json!({"records": {}}));
    }

    #[test]
    fn corrupt_file_is_store_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "[1, 2").unwrap();
        let state = StateFile::new(&path);

        let result: Result<Map<String, Value>> = state.load_section(SETTINGS_SECTION);
        assert!(matches!(result, Err(Error::StoreIo(_))));
    }

    #[test]
    fn corrupt_file_is_not_overwritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "not json").unwrap();
        let state = StateFile::new(&path);

        let result = state.save_section(SETTINGS_SECTION, &json!({}));

        assert!(matches!(result, Err(Error::StoreIo(_))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json");
    }
}
