use super::*;

#[test]
fn store_open_get_content_close() {
    let store = DocumentStore::new();
    let uri = Url::parse("file:///project/App.tsx").unwrap();
    store.open(uri.clone(), "typescriptreact", "<div className={styles.a} />".to_string(), 1);

    assert_eq!(store.get_content(&uri), Some("<div className={styles.a} />".to_string()));
    assert_eq!(store.version(&uri), Some(1));

    let closed = store.close(&uri).unwrap();
    assert_eq!(closed.language_id, "typescriptreact");
    assert!(store.get_content(&uri).is_none());
}

#[test]
fn store_applies_full_content_change() {
    let store = DocumentStore::new();
    let uri = Url::parse("file:///project/App.tsx").unwrap();
    store.open(uri.clone(), "typescriptreact", "v1".to_string(), 1);
    let change = TextDocumentContentChangeEvent {
        range: None,
        range_length: None,
        text: "v2".to_string(),
    };
    assert!(store.apply_changes(&uri, vec![change], 2));
    assert_eq!(store.snapshot(&uri), Some(("v2".to_string(), 2)));
}

#[test]
fn store_ignores_changes_to_unknown_document() {
    let store = DocumentStore::new();
    let uri = Url::parse("file:///project/New.tsx").unwrap();
    assert!(!store.apply_changes(&uri, Vec::new(), 1));
    assert!(store.get(&uri).is_none());
}

#[test]
fn content_at_path_finds_open_stylesheet() {
    let store = DocumentStore::new();
    let uri = Url::parse("file:///project/App.module.css").unwrap();
    store.open(uri, "css", ".a { color: red }".to_string(), 4);

    assert_eq!(store.content_at_path(Path::new("/project/App.module.css")), Some(".a { color: red }".to_string()));
    assert_eq!(store.content_at_path(Path::new("/project/Other.css")), None);
}
