//! Atomic I/O operations with file locking
//!
//! Readers and writers coordinate through an advisory lock on a sidecar
//! `.<name>.lock` file, so a reader never observes a half-renamed state file
//! and two writers in different processes do not interleave.

use crate::{Error, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

fn lock_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.lock", name))
}

fn open_lock(path: &Path) -> Result<File> {
    let lock = lock_path(path);
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock)
        .map_err(|e| Error::io(&lock, e))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }
    Ok(())
}

fn lock_exclusive(path: &Path) -> Result<File> {
    let lock = open_lock(path)?;
    lock.lock_exclusive().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;
    Ok(lock)
}

/// Write to a temp file in the same directory, then rename over the target.
///
/// Caller must hold the exclusive lock.
fn replace_file(path: &Path, content: &[u8]) -> Result<()> {
    // Same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file
        .sync_all()
        .map_err(|e| Error::io(&temp_path, e))?;
    drop(temp_file);

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::io(path, e)
    })
}

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so the target is either the old content or
/// the new content, never a partial write.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    ensure_parent(path)?;
    let lock = lock_exclusive(path)?;
    replace_file(path, content)?;
    lock.unlock().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })
}

/// Load-modify-save under one exclusive lock.
///
/// `update` receives the current content (`None` if the file does not exist)
/// and returns the content to write. Nothing is written if it fails.
pub fn update_atomic<F>(path: &Path, update: F) -> Result<()>
where
    F: FnOnce(Option<String>) -> Result<String>,
{
    ensure_parent(path)?;
    let lock = lock_exclusive(path)?;

    let current = match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(Error::io(path, e)),
    };
    let next = update(current)?;
    replace_file(path, next.as_bytes())?;

    lock.unlock().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })
}

/// Read a file under a shared lock.
///
/// Returns `Ok(None)` when the file does not exist yet.
pub fn read_locked(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }

    let lock = open_lock(path)?;
    lock.lock_shared().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::io(path, e)),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::io(path, e))?;

    // Lock released when `lock` is dropped
    Ok(Some(content))
}

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn lock_file_is_hidden_sidecar() {
        let lock = lock_path(Path::new("/state/data.json"));
        assert_eq!(lock, PathBuf::from("/state/.data.json.lock"));
    }

    #[test]
    fn write_atomic_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");

        write_atomic(&path, b"{}").unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "temp files left behind: {:?}", leftovers);
    }

    #[test]
    fn update_atomic_sees_previous_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");

        update_atomic(&path, |current| {
            assert!(current.is_none());
            Ok("one".to_string())
        })
        .unwrap();
        update_atomic(&path, |current| Ok(format!("{}+two", current.unwrap_or_default())))
            .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "one+two");
    }

    #[test]
    fn update_atomic_failure_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "kept").unwrap();

        let result = update_atomic(&path, |_| {
            Err(Error::LockFailed {
                path: PathBuf::from("x"),
            })
        });

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "kept");
    }

    #[test]
    fn read_locked_missing_file_is_none() {
        let dir = tempdir().unwrap();
        let result = read_locked(&dir.path().join("absent.json")).unwrap();
        assert!(result.is_none());
    }
}
