//! [`TestWorkspace`]: a temporary directory holding the state file.

use docpub_core::StateFile;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory with a `data.json` state file path inside it.
///
/// # Example
///
/// ```rust,no_run
/// use docpub_test_utils::TestWorkspace;
///
/// let workspace = TestWorkspace::new();
/// workspace.write_state(r#"{"settings": {}}"#);
/// assert!(workspace.state_json()["settings"].is_object());
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn state_path(&self) -> PathBuf {
        self.root().join("data.json")
    }

    pub fn state(&self) -> StateFile {
        StateFile::new(self.state_path())
    }

    /// Seed the state file with raw JSON.
    pub fn write_state(&self, json: &str) {
        fs::write(self.state_path(), json).unwrap();
    }

    /// Parse the state file as it is on disk.
    ///
    /// Panics if the file is missing or not valid JSON.
    pub fn state_json(&self) -> serde_json::Value {
        let raw = fs::read_to_string(self.state_path())
            .unwrap_or_else(|e| panic!("state file unreadable: {}", e));
        serde_json::from_str(&raw).unwrap_or_else(|e| panic!("state file is not JSON: {}", e))
    }

    pub fn state_exists(&self) -> bool {
        self.state_path().exists()
    }
}
