//! Table Definition Store
//!
//! Owns `definition.json` for every table.

use std::path::{Path, PathBuf};

use crate::config::SyncStrategy;
use crate::error::{BasedError, Result};
use crate::fsutil;
use crate::index::IndexFile;
use crate::paths;

use super::TableDefinition;

/// Persists and loads table definitions under a root directory
#[derive(Debug, Clone)]
pub struct DefinitionStore {
    root: PathBuf,
    sync: SyncStrategy,
}

impl DefinitionStore {
    pub fn new(root: impl Into<PathBuf>, sync: SyncStrategy) -> Self {
        Self {
            root: root.into(),
            sync,
        }
    }

    /// Root directory this store resolves paths against
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist a definition and lay out its directory tree.
    ///
    /// Steps:
    /// 1. Create `data/` and `indices/` (with parents)
    /// 2. Serialize the definition
    /// 3. Write `definition.json` through a temp file + rename
    /// 4. Write one empty file per declared index (truncating existing ones)
    ///
    /// A failure in 1 or 2 returns before the definition file is touched.
    pub fn save(&self, definition: &TableDefinition) -> Result<()> {
        let table = definition.name.as_str();

        fsutil::create_dir_all(&paths::data_directory(&self.root, table))?;
        fsutil::create_dir_all(&paths::indices_directory(&self.root, table))?;

        let bytes = serde_json::to_vec_pretty(definition)
            .map_err(|e| BasedError::Serialization(e.to_string()))?;

        fsutil::write_atomic(&paths::definition_file(&self.root, table), &bytes, self.sync)?;

        for index in &definition.indices {
            IndexFile::new(paths::index_file(&self.root, table, &index.name), self.sync).reset()?;
        }

        Ok(())
    }

    /// Load a definition.
    ///
    /// `NotFound` when the table was never created, `Corrupt` when the file
    /// does not hold a definition.
    pub fn load(&self, table: &str) -> Result<TableDefinition> {
        let path = paths::definition_file(&self.root, table);
        let bytes = fsutil::read("table", &path)?;

        serde_json::from_slice(&bytes).map_err(|e| BasedError::Corrupt {
            path,
            reason: e.to_string(),
        })
    }

    /// Whether a definition file exists for `table`
    pub fn exists(&self, table: &str) -> bool {
        paths::definition_file(&self.root, table).is_file()
    }
}
