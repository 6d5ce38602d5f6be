//! Persistence of [`Settings`] in the state file

use super::Settings;
use crate::Result;
use crate::state::{SETTINGS_SECTION, StateFile};

/// Reads and writes the `settings` section of the state file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    state: StateFile,
}

impl SettingsStore {
    pub fn new(state: StateFile) -> Self {
        Self { state }
    }

    /// Load settings, falling back to defaults when none were saved.
    pub fn load(&self) -> Result<Settings> {
        self.state.load_section(SETTINGS_SECTION)
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        tracing::debug!(path = ?self.state.path(), "Saving settings");
        self.state.save_section(SETTINGS_SECTION, settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Platform, Target};
    use tempfile::tempdir;

    #[test]
    fn settings_round_trip() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(StateFile::new(dir.path().join("data.json")));

        let mut settings = Settings::default();
        settings
            .add_target(Target::new("site", Platform::GitLab, "group/docs"))
            .unwrap();
        settings.policy.default_directory = "guide".into();
        store.save(&settings).unwrap();

        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn missing_state_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(StateFile::new(dir.path().join("data.json")));

        let settings = store.load().unwrap();
        assert!(settings.targets.is_empty());
        assert!(settings.policy.keep_file_structure);
    }
}
