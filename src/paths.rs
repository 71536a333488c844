//! Path Resolver
//!
//! Derives where every table artifact lives. Pure functions only: nothing
//! here touches the filesystem, and no other module joins table paths by
//! hand.
//!
//! ```text
//! <root>/tables/<table>/definition.json
//! <root>/tables/<table>/data/<document>.json
//! <root>/tables/<table>/indices/<index>.json
//! ```

use std::path::{Path, PathBuf};

use crate::error::{BasedError, Result};

/// Extension shared by definition, document and index files
pub const FILE_EXTENSION: &str = "json";

const TABLES_DIR: &str = "tables";
const DATA_DIR: &str = "data";
const INDICES_DIR: &str = "indices";
const DEFINITION_STEM: &str = "definition";

/// `<root>/tables`
pub fn tables_directory(root: &Path) -> PathBuf {
    root.join(TABLES_DIR)
}

/// `<root>/tables/<table>`
pub fn table_directory(root: &Path, table: &str) -> PathBuf {
    tables_directory(root).join(table)
}

/// `<root>/tables/<table>/data`
pub fn data_directory(root: &Path, table: &str) -> PathBuf {
    table_directory(root, table).join(DATA_DIR)
}

/// `<root>/tables/<table>/indices`
pub fn indices_directory(root: &Path, table: &str) -> PathBuf {
    table_directory(root, table).join(INDICES_DIR)
}

/// `<root>/tables/<table>/definition.json`
pub fn definition_file(root: &Path, table: &str) -> PathBuf {
    table_directory(root, table).join(with_extension(DEFINITION_STEM))
}

/// `<root>/tables/<table>/indices/<index>.json`
pub fn index_file(root: &Path, table: &str, index: &str) -> PathBuf {
    indices_directory(root, table).join(with_extension(index))
}

/// Append the shared file extension to a stem
pub fn with_extension(stem: &str) -> String {
    format!("{}.{}", stem, FILE_EXTENSION)
}

/// Reject names that would escape or break the directory layout.
///
/// `kind` only feeds the error message ("table", "index", "field").
pub fn validate_name(kind: &'static str, name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("must not be empty")
    } else if name == "." || name == ".." {
        Some("must not be a relative directory")
    } else if name.contains(['/', '\\', '\0']) {
        Some("must not contain path separators or NUL")
    } else if name.contains([':', '\n', '\r']) {
        Some("must not contain ':' or line breaks")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(BasedError::InvalidName {
            kind,
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
