use docpub_fs::io;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_write_atomic_creates_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("data.json");

    io::write_atomic(&path, b"{\"settings\":{}}").unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, "{\"settings\":{}}");
}

#[test]
fn test_write_atomic_creates_parent_dirs() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("plugins").join("docpub").join("data.json");

    io::write_atomic(&path, b"{}").unwrap();

    assert!(path.exists());
}

#[test]
fn test_write_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("data.json");
    fs::write(&path, "original").unwrap();

    io::write_atomic(&path, b"updated").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "updated");
}

#[test]
fn test_read_locked_returns_written_content() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("data.json");

    io::write_text(&path, "hello").unwrap();

    assert_eq!(io::read_locked(&path).unwrap().as_deref(), Some("hello"));
}

#[test]
fn test_read_text_nonexistent_file() {
    let temp = TempDir::new().unwrap();
    let result = io::read_text(&temp.path().join("missing.md"));

    let err = result.unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_concurrent_writers_never_produce_partial_content() {
    use std::sync::{Arc, Barrier};
    use std::thread;

    let temp = TempDir::new().unwrap();
    let path = Arc::new(temp.path().join("data.json"));
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let path = Arc::clone(&path);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let body = format!("writer-{}", i).repeat(256);
                io::write_atomic(&path, body.as_bytes())
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let content = fs::read_to_string(path.as_ref()).unwrap();
    let expected: Vec<String> = (0..4).map(|i| format!("writer-{}", i).repeat(256)).collect();
    assert!(expected.contains(&content), "unexpected content: {}", &content[..32]);
}
