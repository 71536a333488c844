//! Index File
//!
//! Append-only `key:document` log, one file per declared index. This is the
//! only code that opens index files.

use std::collections::{HashMap, HashSet};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::config::SyncStrategy;
use crate::error::{BasedError, Result};
use crate::fsutil;

use super::IndexEntry;

/// Handle on one index file.
///
/// Holds no open descriptor: every call opens, works and closes.
#[derive(Debug, Clone)]
pub struct IndexFile {
    path: PathBuf,
    sync: SyncStrategy,
}

impl IndexFile {
    pub fn new(path: impl Into<PathBuf>, sync: SyncStrategy) -> Self {
        Self {
            path: path.into(),
            sync,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create an empty file if none exists. Idempotent.
    pub fn initialize(&self) -> Result<()> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| BasedError::io("index directory", &self.path, e))?;
        Ok(())
    }

    /// Create the file, truncating any existing entries
    pub fn reset(&self) -> Result<()> {
        fsutil::write(&self.path, &[], self.sync)
    }

    /// Append one `key:document` line.
    ///
    /// The line is flushed to the OS before returning (and fsynced under
    /// `SyncStrategy::EveryWrite`). The key is written verbatim; callers must
    /// reject keys that fail [`IndexEntry::is_valid_key`].
    pub fn append(&self, key: &str, document: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| BasedError::io("index directory", &self.path, e))?;

        let line = IndexEntry::new(key, document).to_line();
        file.write_all(line.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| BasedError::io("index", &self.path, e))?;

        if self.sync == SyncStrategy::EveryWrite {
            file.sync_data()
                .map_err(|e| BasedError::io("index", &self.path, e))?;
        }

        tracing::trace!(index = %self.path.display(), key, document, "Index entry appended");
        Ok(())
    }

    /// Every entry in file order, duplicates included.
    ///
    /// `NotFound` if the file is absent, `Corrupt` on a line without a
    /// delimiter or with bytes that are not UTF-8.
    pub fn entries(&self) -> Result<Vec<IndexEntry>> {
        let file = File::open(&self.path).map_err(|e| BasedError::io("index", &self.path, e))?;
        let reader = BufReader::new(file);

        let mut entries = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| match e.kind() {
                ErrorKind::InvalidData => BasedError::Corrupt {
                    path: self.path.clone(),
                    reason: format!("line {} is not valid UTF-8", line_no + 1),
                },
                _ => BasedError::io("index", &self.path, e),
            })?;
            let entry = IndexEntry::parse(&line).ok_or_else(|| BasedError::Corrupt {
                path: self.path.clone(),
                reason: format!("line {} has no ':' delimiter", line_no + 1),
            })?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Materialize the whole index as a key -> document mapping.
    ///
    /// Later entries for the same key win. Cost is O(entries) per call;
    /// there is no on-disk lookup structure.
    pub fn load_all(&self) -> Result<IndexSnapshot> {
        let mut snapshot = IndexSnapshot::default();
        for entry in self.entries()? {
            snapshot.insert(entry);
        }
        Ok(snapshot)
    }

    /// Rewrite the file without any line pointing at `documents`.
    ///
    /// Writes a temp file and renames it over the original. Returns the
    /// number of lines dropped; the file is left untouched when that is 0.
    pub fn remove_documents(&self, documents: &HashSet<String>) -> Result<usize> {
        self.plan_removal(documents)?.commit()
    }

    /// Read the file and compute its content without `documents`, writing
    /// nothing yet.
    ///
    /// Lets a caller touching several index files read all of them before
    /// rewriting any.
    pub fn plan_removal(&self, documents: &HashSet<String>) -> Result<IndexRewrite> {
        let entries = self.entries()?;
        let before = entries.len();

        let kept: Vec<&IndexEntry> = entries
            .iter()
            .filter(|entry| !documents.contains(&entry.document))
            .collect();

        Ok(IndexRewrite {
            file: self.clone(),
            content: kept.iter().map(|entry| entry.to_line()).collect(),
            removed: before - kept.len(),
        })
    }
}

/// A pending rewrite produced by [`IndexFile::plan_removal`]
#[derive(Debug, Clone)]
pub struct IndexRewrite {
    file: IndexFile,
    content: String,
    removed: usize,
}

impl IndexRewrite {
    /// Index file this rewrite targets
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Number of lines the rewrite drops
    pub fn removed(&self) -> usize {
        self.removed
    }

    /// Replace the file with the planned content (temp file + rename).
    /// No-op when nothing is dropped.
    pub fn commit(self) -> Result<usize> {
        if self.removed > 0 {
            fsutil::write_atomic(&self.file.path, self.content.as_bytes(), self.file.sync)?;
        }
        Ok(self.removed)
    }
}

/// In-memory view of an index file after last-writer-wins collapsing.
///
/// Iteration follows the order in which each key first appeared in the
/// file; the document is the one from the key's latest entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSnapshot {
    entries: Vec<IndexEntry>,
    positions: HashMap<String, usize>,
}

impl IndexSnapshot {
    fn insert(&mut self, entry: IndexEntry) {
        match self.positions.get(&entry.key) {
            Some(&pos) => self.entries[pos].document = entry.document,
            None => {
                self.positions.insert(entry.key.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Document currently mapped to `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.positions
            .get(key)
            .map(|&pos| self.entries[pos].document.as_str())
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(key, document)` pairs in first-appearance order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.key.as_str(), e.document.as_str()))
    }
}
