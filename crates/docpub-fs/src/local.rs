//! Local document store
//!
//! Documents are addressed by vault-relative, slash-separated paths such as
//! `notes/today.md`. The publication engine only ever needs three things from
//! the host: does a document exist, what does it contain, and replace its
//! content.

use crate::{Error, Result, io};
use std::path::{Component, Path, PathBuf};

/// Host capability for reading and writing local documents.
pub trait LocalDocuments: Send + Sync {
    /// Whether a document exists at `path`.
    fn exists(&self, path: &str) -> bool;

    /// Read a document's text.
    fn read(&self, path: &str) -> Result<String>;

    /// Replace a document's text.
    fn write(&self, path: &str, content: &str) -> Result<()>;
}

/// Filesystem-backed document store rooted at a vault directory.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a vault-relative path to a native path under the root.
    ///
    /// Absolute paths and `..` components are rejected.
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let mut resolved = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(Error::OutsideVault {
                        path: path.to_string(),
                    });
                }
            }
        }
        if resolved == self.root {
            return Err(Error::OutsideVault {
                path: path.to_string(),
            });
        }
        Ok(resolved)
    }
}

impl LocalDocuments for FsVault {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.is_file()).unwrap_or(false)
    }

    fn read(&self, path: &str) -> Result<String> {
        io::read_text(&self.resolve(path)?)
    }

    fn write(&self, path: &str, content: &str) -> Result<()> {
        io::write_text(&self.resolve(path)?, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("../secret.md")]
    #[case("notes/../../secret.md")]
    #[case("")]
    #[case(".")]
    fn resolve_rejects_escapes(#[case] path: &str) {
        let vault = FsVault::new("/vault");
        assert!(matches!(
            vault.resolve(path),
            Err(Error::OutsideVault { .. })
        ));
    }

    #[test]
    fn resolve_strips_leading_slash() {
        let vault = FsVault::new("/vault");
        assert_eq!(
            vault.resolve("/notes/a.md").unwrap(),
            PathBuf::from("/vault/notes/a.md")
        );
    }
}
