//! Engine Module
//!
//! The storage engine facade that coordinates all components.
//!
//! ## Responsibilities
//! - Create tables (definition + empty index files)
//! - Insert rows (document first, then one entry per relevant index)
//! - Materialize a table through its primary index
//! - Delete documents by index key, keeping every index file consistent
//!
//! Nothing is cached between calls: every operation reloads the definition
//! and whatever index files it needs from disk.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::command::{Command, Outcome};
use crate::config::{Config, MissingDocumentPolicy};
use crate::document::{Document, DocumentStore, Fields};
use crate::error::{BasedError, Result};
use crate::fsutil;
use crate::index::{IndexEntry, IndexFile};
use crate::paths;
use crate::schema::{DefinitionStore, TableDefinition};

/// The main storage engine
///
/// ## Concurrency Model
///
/// - **Writes** (create_table/insert/delete_by_index): serialized per table
///   by an in-process lock keyed by table name
/// - **Reads** (retrieve_all/lookup/verify_table): take no lock and may
///   observe a write in progress (e.g. a document whose index entries are
///   not yet appended)
///
/// Separate processes sharing a root directory are not coordinated; a
/// single writer process is assumed.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Definition files for every table under the root
    definitions: DefinitionStore,

    /// One write lock per existing table, created on first write
    table_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Engine {
    /// Open an engine rooted at `config.root_dir`.
    ///
    /// Creates `<root>/tables` if needed; existing tables are left alone.
    pub fn open(config: Config) -> Result<Self> {
        fsutil::create_dir_all(&paths::tables_directory(&config.root_dir))?;

        tracing::debug!(root = %config.root_dir.display(), "Engine opened");

        Ok(Self {
            definitions: DefinitionStore::new(&config.root_dir, config.sync_strategy),
            config,
            table_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified root directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().root_dir(path).build())
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers
    pub fn execute(&self, command: Command) -> Result<Outcome> {
        match command {
            Command::CreateTable { definition } => {
                self.create_table(&definition)?;
                Ok(Outcome::Created)
            }
            Command::Insert { table, fields } => {
                let document = self.insert(&table, &fields)?;
                Ok(Outcome::Inserted { document })
            }
            Command::RetrieveAll { table } => Ok(Outcome::Documents(self.retrieve_all(&table)?)),
            Command::Lookup { table, index, key } => {
                let found = self.lookup(&table, &index, &key)?;
                Ok(Outcome::Documents(found.into_iter().collect()))
            }
            Command::DeleteByIndex { table, index, key } => {
                let count = self.delete_by_index(&table, &index, &key)?;
                Ok(Outcome::Deleted { count })
            }
            Command::Verify { table } => Ok(Outcome::Report(self.verify_table(&table)?)),
        }
    }

    // =========================================================================
    // Tables
    // =========================================================================

    /// Create a table: directories, definition file, one empty file per index.
    ///
    /// Not idempotent. Creating an existing table again overwrites its
    /// definition and truncates its index files, which orphans every document
    /// already stored.
    pub fn create_table(&self, definition: &TableDefinition) -> Result<()> {
        definition.validate()?;

        let lock = self.table_lock(&definition.name);
        let _guard = lock.lock();

        if self.definitions.exists(&definition.name) {
            tracing::warn!(
                table = %definition.name,
                "Table already exists; overwriting definition and truncating indices"
            );
        }

        self.definitions.save(definition)?;

        tracing::info!(
            table = %definition.name,
            fields = definition.fields.len(),
            indices = definition.indices.len(),
            "Table created"
        );
        Ok(())
    }

    /// Load a table's definition
    pub fn table_definition(&self, table: &str) -> Result<TableDefinition> {
        paths::validate_name("table", table)?;
        self.definitions.load(table)
    }

    /// Whether `table` has been created
    pub fn table_exists(&self, table: &str) -> bool {
        paths::validate_name("table", table).is_ok() && self.definitions.exists(table)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Insert a row and return the filename of the new document.
    ///
    /// Steps:
    /// 1. Load the definition (`NotFound` if the table does not exist)
    /// 2. Check every indexed value can be written as an index key
    /// 3. Write the document
    /// 4. Append `value:document` to each index whose field is present
    ///
    /// If an append in step 4 fails, the document and the entries already
    /// appended for it are removed before the error is returned.
    pub fn insert(&self, table: &str, fields: &Fields) -> Result<String> {
        paths::validate_name("table", table)?;

        let lock = self.existing_table_lock(table)?;
        let _guard = lock.lock();

        let definition = self.definitions.load(table)?;

        let mut pending = Vec::new();
        for index in &definition.indices {
            if let Some(key) = fields.get(&index.name) {
                if !IndexEntry::is_valid_key(key) {
                    return Err(BasedError::InvalidIndexKey {
                        index: index.name.clone(),
                        key: key.clone(),
                    });
                }
                pending.push((self.index_file(table, &index.name), key.as_str()));
            }
        }

        let documents = self.document_store(table);
        let document = documents.create(fields)?;

        for (applied, (index, key)) in pending.iter().enumerate() {
            if let Err(e) = index.append(key, &document) {
                let appended: Vec<&IndexFile> = pending[..applied].iter().map(|(f, _)| f).collect();
                Self::rollback_insert(&documents, &document, &appended);
                return Err(e);
            }
        }

        tracing::debug!(table, document = %document, indices = pending.len(), "Row inserted");
        Ok(document)
    }

    /// Delete every document that `index` maps `key` to.
    ///
    /// All raw entries for `key` count, not only the latest one. Each matching
    /// document is removed from every index file of the table (rewritten in
    /// place) and then its file is deleted. Returns the number of document
    /// files removed; 0 when the key is not indexed.
    ///
    /// Every index file is read and filtered before the first one is
    /// replaced. Only a failing rename partway through the replacements can
    /// leave some indices stripped; `verify_table` then reports the documents
    /// as orphans.
    pub fn delete_by_index(&self, table: &str, index: &str, key: &str) -> Result<usize> {
        paths::validate_name("table", table)?;

        let lock = self.existing_table_lock(table)?;
        let _guard = lock.lock();

        let definition = self.definitions.load(table)?;
        if !definition.index_exists(index) {
            return Err(BasedError::IndexNotFound {
                table: table.to_string(),
                index: index.to_string(),
            });
        }

        let targets: HashSet<String> = self
            .index_file(table, index)
            .entries()?
            .into_iter()
            .filter(|entry| entry.key == key)
            .map(|entry| entry.document)
            .collect();

        if targets.is_empty() {
            tracing::debug!(table, index, key, "Nothing to delete");
            return Ok(0);
        }

        // Read every index before rewriting any, so a failed read leaves the
        // table as it was.
        let rewrites = definition
            .indices
            .iter()
            .map(|declared| self.index_file(table, &declared.name).plan_removal(&targets))
            .collect::<Result<Vec<_>>>()?;

        for rewrite in rewrites {
            let path = rewrite.path().to_path_buf();
            let removed = rewrite.commit()?;
            tracing::debug!(table, index = %path.display(), removed, "Index rewritten");
        }

        let documents = self.document_store(table);
        let mut deleted = 0;
        for document in &targets {
            match documents.remove(document) {
                Ok(()) => deleted += 1,
                Err(e) if e.is_not_found() => {
                    tracing::warn!(table, document = %document, "Indexed document was already missing");
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(table, index, key, deleted, "Documents deleted");
        Ok(deleted)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Every document reachable from the primary index, in index order.
    ///
    /// Duplicate primary keys collapse to their latest document. A primary
    /// entry whose document is missing fails the call with `NotFound` unless
    /// `Config::missing_documents` is `Skip`.
    pub fn retrieve_all(&self, table: &str) -> Result<Vec<Document>> {
        let definition = self.table_definition(table)?;
        let primary = definition.primary_index_name()?;
        let snapshot = self.index_file(table, primary).load_all()?;
        let documents = self.document_store(table);

        let mut results = Vec::with_capacity(snapshot.len());
        for (key, id) in snapshot.iter() {
            match documents.load(id) {
                Ok(fields) => results.push(Document {
                    id: id.to_string(),
                    fields,
                }),
                Err(e)
                    if e.is_not_found()
                        && self.config.missing_documents == MissingDocumentPolicy::Skip =>
                {
                    tracing::warn!(table, key, document = id, "Skipping missing document");
                }
                Err(e) => return Err(e),
            }
        }

        tracing::debug!(table, count = results.len(), "Table retrieved");
        Ok(results)
    }

    /// Equality lookup through any declared index
    pub fn lookup(&self, table: &str, index: &str, key: &str) -> Result<Option<Document>> {
        let definition = self.table_definition(table)?;
        if !definition.index_exists(index) {
            return Err(BasedError::IndexNotFound {
                table: table.to_string(),
                index: index.to_string(),
            });
        }

        let snapshot = self.index_file(table, index).load_all()?;
        match snapshot.get(key) {
            Some(id) => {
                let fields = self.document_store(table).load(id)?;
                Ok(Some(Document {
                    id: id.to_string(),
                    fields,
                }))
            }
            None => Ok(None),
        }
    }

    /// Cross-check every index file against the data directory.
    ///
    /// Reports index entries pointing at missing documents and documents no
    /// primary-index entry points at.
    pub fn verify_table(&self, table: &str) -> Result<IntegrityReport> {
        let definition = self.table_definition(table)?;
        let primary = definition.primary_index_name()?;
        let documents = self.document_store(table);
        let stored = documents.list()?;
        let stored_set: HashSet<&str> = stored.iter().map(String::as_str).collect();

        let mut report = IntegrityReport {
            table: table.to_string(),
            documents: stored.len(),
            ..IntegrityReport::default()
        };

        let mut referenced = HashSet::new();
        for index in &definition.indices {
            for entry in self.index_file(table, &index.name).entries()? {
                if !stored_set.contains(entry.document.as_str()) {
                    report.dangling_entries.push(DanglingEntry {
                        index: index.name.clone(),
                        key: entry.key,
                        document: entry.document,
                    });
                } else if index.name == primary {
                    referenced.insert(entry.document);
                }
            }
        }

        report.orphan_documents = stored
            .into_iter()
            .filter(|id| !referenced.contains(id))
            .collect();

        if !report.is_clean() {
            tracing::warn!(
                table,
                dangling = report.dangling_entries.len(),
                orphans = report.orphan_documents.len(),
                "Table is inconsistent"
            );
        }
        Ok(report)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the root directory path
    pub fn root_dir(&self) -> &Path {
        &self.config.root_dir
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of tables with a registered write lock
    pub fn table_lock_count(&self) -> usize {
        self.table_locks.lock().len()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn table_lock(&self, table: &str) -> Arc<Mutex<()>> {
        let mut locks = self.table_locks.lock();
        Arc::clone(locks.entry(table.to_string()).or_default())
    }

    /// Lock for a table that has a definition on disk.
    ///
    /// Unknown names fail with `NotFound` without registering a lock, so
    /// calls against missing tables do not grow the lock map.
    fn existing_table_lock(&self, table: &str) -> Result<Arc<Mutex<()>>> {
        if let Some(lock) = self.table_locks.lock().get(table) {
            return Ok(Arc::clone(lock));
        }
        if !self.definitions.exists(table) {
            return Err(BasedError::NotFound {
                what: "table",
                path: paths::definition_file(&self.config.root_dir, table),
            });
        }
        Ok(self.table_lock(table))
    }

    fn index_file(&self, table: &str, index: &str) -> IndexFile {
        IndexFile::new(
            paths::index_file(&self.config.root_dir, table, index),
            self.config.sync_strategy,
        )
    }

    fn document_store(&self, table: &str) -> DocumentStore {
        DocumentStore::new(
            paths::data_directory(&self.config.root_dir, table),
            self.config.sync_strategy,
        )
    }

    /// Undo a half-applied insert. Failures here are logged, not returned:
    /// the caller is already reporting the error that triggered the rollback.
    fn rollback_insert(documents: &DocumentStore, document: &str, appended: &[&IndexFile]) {
        tracing::warn!(document, indices = appended.len(), "Index append failed, rolling back insert");

        let target = HashSet::from([document.to_string()]);
        for index in appended {
            if let Err(e) = index.remove_documents(&target) {
                tracing::error!(index = %index.path().display(), error = %e, "Rollback could not clean index");
            }
        }
        if let Err(e) = documents.remove(document) {
            tracing::error!(document, error = %e, "Rollback could not remove document");
        }
    }
}

/// Result of [`Engine::verify_table`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    pub table: String,

    /// Number of document files in `data/`
    pub documents: usize,

    /// Index entries whose document file does not exist
    pub dangling_entries: Vec<DanglingEntry>,

    /// Document files no primary-index entry refers to
    pub orphan_documents: Vec<String>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.dangling_entries.is_empty() && self.orphan_documents.is_empty()
    }
}

/// One index entry that points nowhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingEntry {
    pub index: String,
    pub key: String,
    pub document: String,
}
