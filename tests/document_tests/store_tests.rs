//! Tests for the Document Store
//!
//! These tests verify:
//! - create writes one uniquely named JSON file per call
//! - load returns exactly what was written
//! - NotFound / Corrupt on missing or garbled documents
//! - remove and list

use std::collections::HashSet;
use std::fs;

use basedb::config::SyncStrategy;
use basedb::document::{DocumentStore, Fields};
use basedb::BasedError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store() -> (TempDir, DocumentStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = DocumentStore::new(temp_dir.path(), SyncStrategy::EveryWrite);
    (temp_dir, store)
}

fn fields(pairs: &[(&str, &str)]) -> Fields {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// =============================================================================
// Create / Load Tests
// =============================================================================

#[test]
fn test_create_and_load() {
    let (temp, store) = setup_temp_store();
    let row = fields(&[("id", "1"), ("name", "John Doe")]);

    let id = store.create(&row).unwrap();

    assert!(id.ends_with(".json"));
    assert!(temp.path().join(&id).is_file());
    assert_eq!(store.load(&id).unwrap(), row);
}

#[test]
fn test_create_stores_plain_json_object() {
    let (temp, store) = setup_temp_store();

    let id = store.create(&fields(&[("flag", "true")])).unwrap();

    let raw = fs::read_to_string(temp.path().join(&id)).unwrap();
    assert_eq!(raw, r#"{"flag":"true"}"#);
}

#[test]
fn test_values_are_not_coerced() {
    let (_temp, store) = setup_temp_store();
    let row = fields(&[("id", "007"), ("score", "1e3"), ("empty", "")]);

    let id = store.create(&row).unwrap();

    assert_eq!(store.load(&id).unwrap(), row);
}

#[test]
fn test_ids_are_unique() {
    let (_temp, store) = setup_temp_store();
    let row = fields(&[("id", "1")]);

    let ids: HashSet<String> = (0..200).map(|_| store.create(&row).unwrap()).collect();

    assert_eq!(ids.len(), 200);
    assert_eq!(store.list().unwrap().len(), 200);
}

#[test]
fn test_create_in_missing_directory_fails() {
    let temp = TempDir::new().unwrap();
    let store = DocumentStore::new(temp.path().join("missing"), SyncStrategy::OsBuffered);

    assert!(store.create(&fields(&[("id", "1")])).is_err());
}

#[test]
fn test_load_missing_is_not_found() {
    let (_temp, store) = setup_temp_store();

    let err = store.load("00000000-0000-0000-0000-000000000000.json").unwrap_err();

    assert!(err.is_not_found(), "unexpected error: {err:?}");
}

#[test]
fn test_load_garbage_is_corrupt() {
    let (temp, store) = setup_temp_store();
    fs::write(temp.path().join("bad.json"), "[1, 2, 3]").unwrap();

    let err = store.load("bad.json").unwrap_err();

    assert!(matches!(err, BasedError::Corrupt { .. }), "unexpected error: {err:?}");
}

#[test]
fn test_load_rejects_path_traversal() {
    let (_temp, store) = setup_temp_store();

    for id in ["../definition.json", "sub/doc.json", "..", ""] {
        let err = store.load(id).unwrap_err();
        assert!(err.is_corrupt(), "{id:?} gave {err:?}");
    }
}

// =============================================================================
// Remove / List Tests
// =============================================================================

#[test]
fn test_remove() {
    let (_temp, store) = setup_temp_store();
    let id = store.create(&fields(&[("id", "1")])).unwrap();

    assert!(store.exists(&id));
    store.remove(&id).unwrap();
    assert!(!store.exists(&id));

    assert!(store.remove(&id).unwrap_err().is_not_found());
}

#[test]
fn test_list_is_sorted_and_ignores_other_files() {
    let (temp, store) = setup_temp_store();
    let a = store.create(&fields(&[("id", "1")])).unwrap();
    let b = store.create(&fields(&[("id", "2")])).unwrap();
    fs::write(temp.path().join("notes.txt"), "x").unwrap();
    fs::create_dir(temp.path().join("nested.json")).unwrap();

    let mut expected = vec![a, b];
    expected.sort();

    assert_eq!(store.list().unwrap(), expected);
}
