//! Tests for the lease storage backends.

use super::*;
use tempfile::TempDir;

#[test]
fn fs_store_round_trips_records() {
    let temp_dir = TempDir::new().unwrap();
    let store = FsLeaseStore::open(temp_dir.path()).unwrap();

    assert_eq!(store.get("build").unwrap(), None);

    store.put("build", "{\"owner\":\"agent-1\"}").unwrap();
    assert_eq!(
        store.get("build").unwrap().as_deref(),
        Some("{\"owner\":\"agent-1\"}")
    );

    store.delete("build").unwrap();
    assert_eq!(store.get("build").unwrap(), None);
}

#[test]
fn fs_store_encodes_unsafe_keys() {
    let temp_dir = TempDir::new().unwrap();
    let store = FsLeaseStore::open(temp_dir.path()).unwrap();

    store.put("src/lib/mod.rs", "record").unwrap();

    // The path separators must not create subdirectories.
    let entries: Vec<_> = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|e| e.unwrap())
        .collect();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].file_type().unwrap().is_file());

    // Safe keys (singleton kind names) pass through unencoded.
    store.put("build", "record").unwrap();
    assert!(temp_dir.path().join("build.lease").exists());
}

#[test]
fn fs_store_lists_decoded_keys() {
    let temp_dir = TempDir::new().unwrap();
    let store = FsLeaseStore::open(temp_dir.path()).unwrap();

    store.put("src/a.ts", "a").unwrap();
    store.put("build", "b").unwrap();

    let all = store.list_all().unwrap();
    assert_eq!(
        all,
        vec![
            ("build".to_string(), "b".to_string()),
            ("src/a.ts".to_string(), "a".to_string()),
        ]
    );
}

#[test]
fn fs_store_ignores_foreign_files() {
    let temp_dir = TempDir::new().unwrap();
    let store = FsLeaseStore::open(temp_dir.path()).unwrap();

    std::fs::write(temp_dir.path().join("notes.txt"), "unrelated").unwrap();
    store.put("build", "b").unwrap();

    let all = store.list_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].0, "build");
}

#[test]
fn fs_store_delete_missing_key_is_ok() {
    let temp_dir = TempDir::new().unwrap();
    let store = FsLeaseStore::open(temp_dir.path()).unwrap();

    store.delete("never-stored").unwrap();
}

#[test]
fn memory_store_round_trips_records() {
    let store = MemoryLeaseStore::new();

    store.put("src/a.ts", "a").unwrap();
    store.put("src/b.ts", "b").unwrap();

    assert_eq!(store.get("src/a.ts").unwrap().as_deref(), Some("a"));
    assert_eq!(store.list_all().unwrap().len(), 2);

    store.delete("src/a.ts").unwrap();
    assert_eq!(store.get("src/a.ts").unwrap(), None);
    assert_eq!(store.list_all().unwrap().len(), 1);
}
