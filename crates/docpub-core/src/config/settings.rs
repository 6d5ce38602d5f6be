//! Settings types: targets and the path-mapping policy

use crate::{Error, Result};
use docpub_fs::ConfigStore;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Extension every published document must carry
pub const REQUIRED_EXTENSION: &str = ".md";

/// Characters the remote storage system does not accept in paths
pub const FORBIDDEN_CHARACTERS: &[char] = &['<', '>', ':', '"', '|', '?', '*', '\\'];

/// How local document paths map onto remote paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PathMappingPolicy {
    /// Preserve the local relative path under the remote root; when false,
    /// only the file name is kept
    pub keep_file_structure: bool,
    /// Directory prefix used when the caller does not choose one
    pub default_directory: String,
}

impl Default for PathMappingPolicy {
    fn default() -> Self {
        Self {
            keep_file_structure: true,
            default_directory: String::new(),
        }
    }
}

/// Hosting platform behind a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    GitHub,
    GitLab,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GitHub => write!(f, "github"),
            Self::GitLab => write!(f, "gitlab"),
        }
    }
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_enabled() -> bool {
    true
}

/// A configured remote destination (one repository/branch pair).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    /// Unique identifier; part of every publish record key
    pub id: String,
    pub platform: Platform,
    /// `owner/name` on GitHub, project id or path on GitLab
    pub repository: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Directory shown as the top level when browsing; empty for the
    /// repository root
    #[serde(default)]
    pub content_root: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Target {
    pub fn new(id: impl Into<String>, platform: Platform, repository: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            platform,
            repository: repository.into(),
            branch: default_branch(),
            content_root: String::new(),
            enabled: true,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_content_root(mut self, root: impl Into<String>) -> Self {
        self.content_root = root.into();
        self
    }

    /// Content root without surrounding slashes.
    pub fn listing_root(&self) -> &str {
        self.content_root.trim_matches('/')
    }

    fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::NotConfigured("target id must not be empty".into()));
        }
        // ':' separates path and target in record keys
        if self.id.contains(':') {
            return Err(Error::NotConfigured(format!(
                "target id {:?} must not contain ':'",
                self.id
            )));
        }
        if self.repository.trim().is_empty() {
            return Err(Error::NotConfigured(format!(
                "target {} has no repository",
                self.id
            )));
        }
        Ok(())
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub active_target: Option<String>,
    #[serde(default)]
    pub targets: Vec<Target>,
    #[serde(default)]
    pub policy: PathMappingPolicy,
}

impl Settings {
    /// Resolve an enabled target by id.
    pub fn target(&self, id: &str) -> Result<&Target> {
        let target = self
            .targets
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::NotConfigured(format!("unknown target {}", id)))?;
        if !target.enabled {
            return Err(Error::NotConfigured(format!("target {} is disabled", id)));
        }
        Ok(target)
    }

    /// Resolve the active target.
    pub fn active(&self) -> Result<&Target> {
        match &self.active_target {
            Some(id) => self.target(id),
            None => Err(Error::NotConfigured("no active target selected".into())),
        }
    }

    /// Add a target, replacing any existing target with the same id.
    ///
    /// The first target added becomes active.
    pub fn add_target(&mut self, target: Target) -> Result<()> {
        target.validate()?;
        if self.active_target.is_none() {
            self.active_target = Some(target.id.clone());
        }
        match self.targets.iter_mut().find(|t| t.id == target.id) {
            Some(existing) => *existing = target,
            None => self.targets.push(target),
        }
        Ok(())
    }

    /// Remove a target. Clears the active selection if it pointed at it.
    pub fn remove_target(&mut self, id: &str) -> Option<Target> {
        let pos = self.targets.iter().position(|t| t.id == id)?;
        if self.active_target.as_deref() == Some(id) {
            self.active_target = None;
        }
        Some(self.targets.remove(pos))
    }

    /// Select the active target. It must exist and be enabled.
    pub fn set_active(&mut self, id: &str) -> Result<()> {
        self.target(id)?;
        self.active_target = Some(id.to_string());
        Ok(())
    }

    /// Load settings from a standalone `.toml` or `.json` file.
    pub fn import(path: &Path) -> Result<Self> {
        let settings: Settings = ConfigStore::new().load(path).map_err(Error::StoreIo)?;
        for target in &settings.targets {
            target.validate()?;
        }
        Ok(settings)
    }

    /// Write settings to a standalone `.toml` or `.json` file.
    pub fn export(&self, path: &Path) -> Result<()> {
        ConfigStore::new().save(path, self).map_err(Error::StoreIo)
    }
}
