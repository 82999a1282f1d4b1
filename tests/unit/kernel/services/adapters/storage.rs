use super::*;

#[test]
fn file_store_round_trips_and_removes() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileKeyValueStore::new(dir.path().join("session"));

    assert_eq!(store.get("klartext-tabs").unwrap(), None);
    store.set("klartext-tabs", "[1]").unwrap();
    store.set("klartext-tabs", "[2]").unwrap();
    assert_eq!(store.get("klartext-tabs").unwrap().as_deref(), Some("[2]"));
    assert!(!dir.path().join("session").join("klartext-tabs.json.tmp").exists());

    store.remove("klartext-tabs").unwrap();
    store.remove("klartext-tabs").unwrap();
    assert_eq!(store.get("klartext-tabs").unwrap(), None);
}

#[test]
fn keys_must_be_plain_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileKeyValueStore::new(dir.path());
    assert!(matches!(
        store.set("../escape", "x"),
        Err(StorageError::InvalidKey(_))
    ));

    let mut memory = MemoryKeyValueStore::new();
    assert!(memory.set("", "x").is_err());
    memory.set("a_b-c", "x").unwrap();
    assert_eq!(memory.len(), 1);
}
