use docpub_fs::{ConfigStore, Error};
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Sample {
    name: String,
    branch: String,
}

fn sample() -> Sample {
    Sample {
        name: "docs".into(),
        branch: "main".into(),
    }
}

#[test]
fn test_save_and_load_toml() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.toml");
    let store = ConfigStore::new();

    store.save(&path, &sample()).unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("branch = \"main\""));

    let loaded: Sample = store.load(&path).unwrap();
    assert_eq!(loaded, sample());
}

#[test]
fn test_save_and_load_json() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.json");
    let store = ConfigStore::new();

    store.save(&path, &sample()).unwrap();
    let loaded: Sample = store.load(&path).unwrap();
    assert_eq!(loaded, sample());
}

#[test]
fn test_unsupported_extension() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.ini");
    let store = ConfigStore::new();

    let err = store.save(&path, &sample()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat { ref extension } if extension == "ini"));
}

#[test]
fn test_parse_error_names_format() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = ConfigStore::new().load::<Sample>(&path).unwrap_err();
    assert!(err.to_string().contains("JSON"), "got: {}", err);
}
