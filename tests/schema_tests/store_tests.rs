//! Tests for the Table Definition Store
//!
//! These tests verify:
//! - Saving lays out data/, indices/ and one empty file per index
//! - Loading round-trips the definition
//! - NotFound / Corrupt on missing or garbled definitions
//! - Recreating a table truncates its index files

use std::fs;
use std::path::PathBuf;

use basedb::config::SyncStrategy;
use basedb::paths;
use basedb::schema::{DefinitionStore, FieldType, TableDefinition};
use basedb::BasedError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store() -> (TempDir, PathBuf, DefinitionStore) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();
    let store = DefinitionStore::new(&root, SyncStrategy::EveryWrite);
    (temp_dir, root, store)
}

fn people() -> TableDefinition {
    TableDefinition::new("people")
        .field("id", FieldType::Int)
        .field("name", FieldType::String)
        .field("date_of_birth", FieldType::Date)
        .primary_index("id")
        .index("name")
}

// =============================================================================
// Save Tests
// =============================================================================

#[test]
fn test_save_creates_layout() {
    let (_temp, root, store) = setup_temp_store();

    store.save(&people()).unwrap();

    assert!(paths::data_directory(&root, "people").is_dir());
    assert!(paths::indices_directory(&root, "people").is_dir());
    assert!(paths::definition_file(&root, "people").is_file());

    for index in ["id", "name"] {
        let path = paths::index_file(&root, "people", index);
        assert!(path.is_file(), "index file {} should exist", index);
        assert_eq!(fs::read(&path).unwrap().len(), 0);
    }
}

#[test]
fn test_save_leaves_no_temp_file() {
    let (_temp, root, store) = setup_temp_store();

    store.save(&people()).unwrap();

    let names: Vec<String> = fs::read_dir(paths::table_directory(&root, "people"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert!(names.iter().all(|n| !n.ends_with(".tmp")), "{:?}", names);
}

#[test]
fn test_save_writes_camel_case_json() {
    let (_temp, root, store) = setup_temp_store();

    store.save(&people()).unwrap();

    let raw = fs::read_to_string(paths::definition_file(&root, "people")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["name"], "people");
    assert_eq!(json["fields"][0]["dataType"], "INT");
    assert_eq!(json["indices"][0]["primary"], true);
    assert_eq!(json["indices"][1]["primary"], false);
}

#[test]
fn test_resave_truncates_index_files() {
    let (_temp, root, store) = setup_temp_store();
    store.save(&people()).unwrap();

    let index_path = paths::index_file(&root, "people", "id");
    fs::write(&index_path, "1:doc.json\n").unwrap();

    store.save(&people()).unwrap();

    assert_eq!(fs::read_to_string(&index_path).unwrap(), "");
}

// =============================================================================
// Load Tests
// =============================================================================

#[test]
fn test_load_round_trip() {
    let (_temp, _root, store) = setup_temp_store();

    store.save(&people()).unwrap();
    let loaded = store.load("people").unwrap();

    assert_eq!(loaded, people());
    assert_eq!(loaded.primary_index_name().unwrap(), "id");
    assert!(loaded.index_exists("name"));
    assert!(!loaded.index_exists("date_of_birth"));
}

#[test]
fn test_load_missing_table_is_not_found() {
    let (_temp, _root, store) = setup_temp_store();

    let err = store.load("nope").unwrap_err();

    assert!(err.is_not_found(), "unexpected error: {err:?}");
}

#[test]
fn test_load_garbage_is_corrupt() {
    let (_temp, root, store) = setup_temp_store();
    store.save(&people()).unwrap();

    fs::write(paths::definition_file(&root, "people"), "{ not json").unwrap();

    let err = store.load("people").unwrap_err();
    assert!(matches!(err, BasedError::Corrupt { .. }), "unexpected error: {err:?}");
}

#[test]
fn test_load_accepts_upper_case_type_tags() {
    let (_temp, root, store) = setup_temp_store();
    fs::create_dir_all(paths::table_directory(&root, "t")).unwrap();
    fs::write(
        paths::definition_file(&root, "t"),
        r#"{"name":"t","fields":[{"name":"ok","dataType":"BOOLEAN"}],"indices":[{"name":"ok","primary":true}]}"#,
    )
    .unwrap();

    let loaded = store.load("t").unwrap();

    assert_eq!(loaded.fields[0].data_type, FieldType::Boolean);
}

#[test]
fn test_exists() {
    let (_temp, _root, store) = setup_temp_store();

    assert!(!store.exists("people"));
    store.save(&people()).unwrap();
    assert!(store.exists("people"));
}
