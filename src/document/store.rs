//! Document Store
//!
//! Owns every file in a table's `data/` directory.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::config::SyncStrategy;
use crate::error::{BasedError, Result};
use crate::fsutil;
use crate::paths;

use super::Fields;

/// Reads and writes the documents of one table
#[derive(Debug, Clone)]
pub struct DocumentStore {
    data_dir: PathBuf,
    sync: SyncStrategy,
}

impl DocumentStore {
    pub fn new(data_dir: impl Into<PathBuf>, sync: SyncStrategy) -> Self {
        Self {
            data_dir: data_dir.into(),
            sync,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Generate a fresh document filename (`<uuid-v4>.json`)
    pub fn generate_id() -> String {
        paths::with_extension(&Uuid::new_v4().to_string())
    }

    /// Write `fields` to a newly named file and return that filename.
    ///
    /// The file is opened with `create_new`, so an existing document is never
    /// overwritten. A partially written file is removed before returning the
    /// error.
    pub fn create(&self, fields: &Fields) -> Result<String> {
        let bytes =
            serde_json::to_vec(fields).map_err(|e| BasedError::Serialization(e.to_string()))?;

        let id = Self::generate_id();
        let path = self.data_dir.join(&id);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| BasedError::io("data directory", &path, e))?;

        let written = file.write_all(&bytes).and_then(|_| {
            if self.sync == SyncStrategy::EveryWrite {
                file.sync_all()
            } else {
                Ok(())
            }
        });

        if let Err(e) = written {
            drop(file);
            let _ = fs::remove_file(&path);
            return Err(BasedError::io("document", &path, e));
        }

        tracing::debug!(document = %id, dir = %self.data_dir.display(), "Document written");
        Ok(id)
    }

    /// Read one document.
    ///
    /// `NotFound` when the file is absent, `Corrupt` when it is not a JSON
    /// object of strings.
    pub fn load(&self, id: &str) -> Result<Fields> {
        let path = self.path_of(id)?;
        let bytes = fsutil::read("document", &path)?;

        serde_json::from_slice(&bytes).map_err(|e| BasedError::Corrupt {
            path,
            reason: e.to_string(),
        })
    }

    /// Delete one document file
    pub fn remove(&self, id: &str) -> Result<()> {
        let path = self.path_of(id)?;
        fs::remove_file(&path).map_err(|e| BasedError::io("document", &path, e))?;
        tracing::debug!(document = %id, "Document removed");
        Ok(())
    }

    /// Whether a document file exists
    pub fn exists(&self, id: &str) -> bool {
        self.path_of(id).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Filenames of every document in the data directory, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        let entries =
            fs::read_dir(&self.data_dir).map_err(|e| BasedError::io("data directory", &self.data_dir, e))?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(&format!(".{}", paths::FILE_EXTENSION)) {
                ids.push(name);
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Resolve a document filename inside the data directory.
    ///
    /// Filenames come from index files, so anything that is not a bare file
    /// name is treated as corruption rather than followed.
    fn path_of(&self, id: &str) -> Result<PathBuf> {
        let is_bare = !id.is_empty()
            && Path::new(id).file_name().map(|n| n == id).unwrap_or(false);
        if !is_bare {
            return Err(BasedError::Corrupt {
                path: self.data_dir.join(id),
                reason: "document reference is not a plain file name".to_string(),
            });
        }
        Ok(self.data_dir.join(id))
    }
}
