//! Tests for `keystore` module.

use super::{DirKeyStore, KeyStore};
use tempfile::tempdir;

#[test]
fn test_put_get_delete() {
    let dir = tempdir().unwrap();
    let mut store = DirKeyStore::create(dir.path().join("fwd")).unwrap();

    store.put("doc-1", "1").unwrap();
    assert_eq!(store.get("doc-1"), Some("1"));

    assert!(store.delete("doc-1").unwrap());
    assert_eq!(store.get("doc-1"), None);
    assert!(!store.delete("doc-1").unwrap());
}

#[test]
fn test_put_replaces() {
    let dir = tempdir().unwrap();
    let mut store = DirKeyStore::create(dir.path().join("fwd")).unwrap();

    store.put("k", "1").unwrap();
    store.put("k", "2").unwrap();
    assert_eq!(store.get("k"), Some("2"));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_reopen_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fwd");
    {
        let mut store = DirKeyStore::create(&path).unwrap();
        store.put("a", "1").unwrap();
        store.put("b", "2").unwrap();
    }

    let store = DirKeyStore::open(&path).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.get("a"), Some("1"));
    assert_eq!(store.get("b"), Some("2"));
}

#[test]
fn test_open_missing_dir_fails() {
    let dir = tempdir().unwrap();
    let result = DirKeyStore::open(dir.path().join("absent"));
    assert!(result.is_err());
}

#[test]
fn test_iter_visits_all_entries() {
    let dir = tempdir().unwrap();
    let mut store = DirKeyStore::create(dir.path().join("fwd")).unwrap();
    store.put("x", "10").unwrap();
    store.put("y", "20").unwrap();

    let mut entries: Vec<(String, String)> = store
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    entries.sort();
    assert_eq!(
        entries,
        vec![
            ("x".to_string(), "10".to_string()),
            ("y".to_string(), "20".to_string())
        ]
    );
}

#[test]
fn test_corrupted_snapshot_fails_open() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fwd");
    std::fs::create_dir_all(&path).unwrap();
    std::fs::write(path.join("keys.bin"), b"\xff\xff\xff\xff\xff\xff\xff\xff\xff").unwrap();

    let result = DirKeyStore::open(&path);
    assert!(result.is_err());
}
