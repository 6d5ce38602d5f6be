use docpub_fs::{FsVault, LocalDocuments};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_exists_only_for_files() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("notes")).unwrap();
    fs::write(temp.path().join("notes/a.md"), "# A").unwrap();

    let vault = FsVault::new(temp.path());

    assert!(vault.exists("notes/a.md"));
    assert!(!vault.exists("notes"));
    assert!(!vault.exists("notes/b.md"));
    assert!(!vault.exists("../outside.md"));
}

#[test]
fn test_read_and_write_round_trip() {
    let temp = TempDir::new().unwrap();
    let vault = FsVault::new(temp.path());

    vault.write("drafts/new.md", "body").unwrap();

    assert_eq!(vault.read("drafts/new.md").unwrap(), "body");
    assert!(temp.path().join("drafts/new.md").is_file());
}

#[test]
fn test_read_missing_document_is_not_found() {
    let temp = TempDir::new().unwrap();
    let vault = FsVault::new(temp.path());

    let err = vault.read("missing.md").unwrap_err();
    assert!(err.is_not_found());
}
