//! Tests for the Path Resolver
//!
//! These tests verify:
//! - Every table artifact resolves under `<root>/tables/<table>`
//! - Resolution is deterministic and never touches the filesystem
//! - Name validation

use std::path::{Path, PathBuf};

use basedb::paths;
use basedb::BasedError;
use tempfile::TempDir;

// =============================================================================
// Layout Tests
// =============================================================================

#[test]
fn test_all_artifacts_share_the_table_directory() {
    let root = Path::new("/var/lib/basedb");
    let table_dir = paths::table_directory(root, "people");

    assert!(paths::data_directory(root, "people").starts_with(&table_dir));
    assert!(paths::indices_directory(root, "people").starts_with(&table_dir));
    assert!(paths::definition_file(root, "people").starts_with(&table_dir));
    assert!(paths::index_file(root, "people", "id").starts_with(paths::indices_directory(root, "people")));
}

#[test]
fn test_index_file_uses_index_name_as_stem() {
    let root = Path::new("db");

    assert_eq!(
        paths::index_file(root, "people", "date_of_birth"),
        PathBuf::from("db/tables/people/indices/date_of_birth.json")
    );
}

#[test]
fn test_resolution_is_deterministic() {
    let root = Path::new("db");

    assert_eq!(
        paths::index_file(root, "t", "i"),
        paths::index_file(root, "t", "i")
    );
    assert_eq!(
        paths::definition_file(root, "t"),
        paths::definition_file(root, "t")
    );
}

#[test]
fn test_resolution_does_not_create_anything() {
    let temp = TempDir::new().unwrap();

    let _ = paths::data_directory(temp.path(), "ghost");
    let _ = paths::index_file(temp.path(), "ghost", "id");

    assert!(!temp.path().join("tables").exists());
}

// =============================================================================
// Name Validation Tests
// =============================================================================

#[test]
fn test_validate_name_error_carries_kind() {
    let err = paths::validate_name("index", "a/b").unwrap_err();

    match err {
        BasedError::InvalidName { kind, name, .. } => {
            assert_eq!(kind, "index");
            assert_eq!(name, "a/b");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_validate_name_accepts_ordinary_names() {
    for good in ["people", "date_of_birth", "Orders-2024", "v1.2"] {
        paths::validate_name("table", good).unwrap();
    }
}
