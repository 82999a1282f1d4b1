use super::*;
use crate::kernel::services::adapters::storage::MemoryKeyValueStore;

fn tab(title: &str, content: &str, language: DocumentLanguage) -> Tab {
    let mut tab = Tab::untitled(title);
    tab.content = content.to_string();
    tab.language = language;
    tab
}

#[test]
fn save_and_restore_resets_dirty() {
    let mut a = tab("a.json", "{}", DocumentLanguage::Json);
    a.dirty = true;
    a.file_path = Some(PathBuf::from("/tmp/a.json"));
    let b = tab("b", "x: 1", DocumentLanguage::Yaml);
    let active = b.id;
    let state = AppState::with_tabs(vec![a.clone(), b.clone()], Some(active), Settings::default());

    let mut store = MemoryKeyValueStore::new();
    PersistedSession::capture(&state).save(&mut store).unwrap();

    let restored = restore(&store, Settings::default());
    assert_eq!(restored.tabs.len(), 2);
    assert_eq!(restored.active, active);
    assert_eq!(restored.tabs[0].id, a.id);
    assert_eq!(restored.tabs[0].file_path, a.file_path);
    assert_eq!(restored.tabs[0].language, DocumentLanguage::Json);
    assert!(restored.tabs.iter().all(|t| !t.dirty));
    assert_eq!(restored.tabs[1].content, "x: 1");
}

#[test]
fn persisted_records_use_camel_case_fields() {
    let mut a = tab("a", "", DocumentLanguage::Plaintext);
    a.file_path = Some(PathBuf::from("/tmp/a.txt"));
    let state = AppState::with_tabs(vec![a], None, Settings::default());

    let mut store = MemoryKeyValueStore::new();
    PersistedSession::capture(&state).save(&mut store).unwrap();

    let raw = store.get(TABS_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[0]["filePath"], "/tmp/a.txt");
    assert_eq!(value[0]["language"], "plaintext");
    assert_eq!(value[0]["dirty"], false);
    assert_eq!(
        store.get(ACTIVE_KEY).unwrap().as_deref(),
        Some(state.active.to_string().as_str())
    );
}

#[test]
fn invalid_records_are_skipped_and_unknown_languages_are_plaintext() {
    let good = TabId::new();
    let raw = format!(
        r#"[
            {{"id": "{good}", "title": "ok", "content": "c", "language": "toml", "dirty": true}},
            {{"id": "broken"}},
            {{"title": "no id"}},
            42
        ]"#
    );
    let mut store = MemoryKeyValueStore::new();
    store.set(TABS_KEY, &raw).unwrap();
    store.set(ACTIVE_KEY, "nonexistent").unwrap();

    let restored = restore(&store, Settings::default());
    assert_eq!(restored.tabs.len(), 1);
    assert_eq!(restored.tabs[0].id, good);
    assert_eq!(restored.tabs[0].language, DocumentLanguage::Plaintext);
    assert!(!restored.tabs[0].dirty);
    assert_eq!(restored.active, good);
}

#[test]
fn duplicate_ids_keep_the_first_record() {
    let id = TabId::new();
    let raw = format!(r#"[{{"id": "{id}", "title": "one"}}, {{"id": "{id}", "title": "two"}}]"#);
    let mut store = MemoryKeyValueStore::new();
    store.set(TABS_KEY, &raw).unwrap();

    let restored = restore(&store, Settings::default());
    assert_eq!(restored.tabs.len(), 1);
    assert_eq!(restored.tabs[0].title, "one");
}

#[test]
fn empty_or_garbage_storage_starts_fresh() {
    let store = MemoryKeyValueStore::new();
    let restored = restore(&store, Settings::default());
    assert_eq!(restored.tabs.len(), 1);
    assert!(restored.active_tab().is_blank());

    let mut store = MemoryKeyValueStore::new();
    store.set(TABS_KEY, "{not a list").unwrap();
    assert_eq!(PersistedSession::load(&store).unwrap(), None);
    assert_eq!(restore(&store, Settings::default()).tabs.len(), 1);
}

#[test]
fn blank_titles_get_the_untitled_name() {
    let id = TabId::new();
    let raw = format!(r#"[{{"id": "{id}", "title": "  "}}]"#);
    let mut store = MemoryKeyValueStore::new();
    store.set(TABS_KEY, &raw).unwrap();

    let restored = restore(&store, Settings::default());
    assert_eq!(restored.tabs[0].title, "Unbenannt");
}
