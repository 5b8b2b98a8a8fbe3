use super::*;

// =============================================================================
// MemoryStorage
// =============================================================================

#[test]
fn memory_get_missing_is_none() {
    let storage = MemoryStorage::new();
    assert_eq!(storage.get_item("k").unwrap(), None);
}

#[test]
fn memory_set_then_get() {
    let mut storage = MemoryStorage::new();
    storage.set_item("k", "v").unwrap();
    assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v"));
}

#[test]
fn memory_set_overwrites() {
    let mut storage = MemoryStorage::new();
    storage.set_item("k", "one").unwrap();
    storage.set_item("k", "two").unwrap();
    assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("two"));
}

#[test]
fn memory_remove_absent_is_ok() {
    let mut storage = MemoryStorage::new();
    storage.remove_item("nope").unwrap();
    storage.set_item("k", "v").unwrap();
    storage.remove_item("k").unwrap();
    assert_eq!(storage.get_item("k").unwrap(), None);
}

// =============================================================================
// FileStorage
// =============================================================================

#[test]
fn file_missing_reads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path().join("storage.json"));
    assert_eq!(storage.get_item("k").unwrap(), None);
}

#[test]
fn file_empty_reads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    fs::write(&path, "  \n").unwrap();
    assert_eq!(FileStorage::new(path).get_item("k").unwrap(), None);
}

#[test]
fn file_set_is_visible_to_second_handle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let mut writer = FileStorage::new(&path);
    writer.set_item("predictionHistory", "[]").unwrap();

    let reader = FileStorage::new(&path);
    assert_eq!(reader.get_item("predictionHistory").unwrap().as_deref(), Some("[]"));
}

#[test]
fn file_set_keeps_other_keys() {
    let dir = tempfile::tempdir().unwrap();
    let mut storage = FileStorage::new(dir.path().join("storage.json"));
    storage.set_item("a", "1").unwrap();
    storage.set_item("b", "2").unwrap();
    assert_eq!(storage.get_item("a").unwrap().as_deref(), Some("1"));
    assert_eq!(storage.get_item("b").unwrap().as_deref(), Some("2"));
}

#[test]
fn file_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("storage.json");
    let mut storage = FileStorage::new(&path);
    storage.set_item("k", "v").unwrap();
    assert!(path.exists());
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn file_remove_drops_key() {
    let dir = tempfile::tempdir().unwrap();
    let mut storage = FileStorage::new(dir.path().join("storage.json"));
    storage.set_item("a", "1").unwrap();
    storage.set_item("b", "2").unwrap();
    storage.remove_item("a").unwrap();
    assert_eq!(storage.get_item("a").unwrap(), None);
    assert_eq!(storage.get_item("b").unwrap().as_deref(), Some("2"));
}

#[test]
fn file_remove_on_missing_file_does_not_create_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    FileStorage::new(&path).remove_item("k").unwrap();
    assert!(!path.exists());
}

#[test]
fn file_malformed_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    fs::write(&path, "[1, 2, 3]").unwrap();
    let err = FileStorage::new(&path).get_item("k").unwrap_err();
    assert!(matches!(err, StorageError::Malformed { .. }));
}
