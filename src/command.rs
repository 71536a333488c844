//! Command definitions
//!
//! A command is one call into the engine facade, as a value. The CLI builds
//! these and hands them to [`Engine::execute`](crate::Engine::execute).

use crate::document::{Document, Fields};
use crate::engine::IntegrityReport;
use crate::schema::TableDefinition;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    CreateTable,
    Insert,
    RetrieveAll,
    Lookup,
    DeleteByIndex,
    Verify,
}

/// A request against the engine
#[derive(Debug, Clone)]
pub enum Command {
    /// Create (or recreate) a table
    CreateTable { definition: TableDefinition },

    /// Insert one row
    Insert { table: String, fields: Fields },

    /// Every document reachable from the primary index
    RetrieveAll { table: String },

    /// Equality lookup through one index
    Lookup {
        table: String,
        index: String,
        key: String,
    },

    /// Delete every document the index maps `key` to
    DeleteByIndex {
        table: String,
        index: String,
        key: String,
    },

    /// Cross-check index files against the data directory
    Verify { table: String },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::CreateTable { .. } => CommandType::CreateTable,
            Command::Insert { .. } => CommandType::Insert,
            Command::RetrieveAll { .. } => CommandType::RetrieveAll,
            Command::Lookup { .. } => CommandType::Lookup,
            Command::DeleteByIndex { .. } => CommandType::DeleteByIndex,
            Command::Verify { .. } => CommandType::Verify,
        }
    }

    /// Name of the table the command targets
    pub fn table(&self) -> &str {
        match self {
            Command::CreateTable { definition } => &definition.name,
            Command::Insert { table, .. }
            | Command::RetrieveAll { table }
            | Command::Lookup { table, .. }
            | Command::DeleteByIndex { table, .. }
            | Command::Verify { table } => table,
        }
    }
}

/// Result of a successfully executed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Table created
    Created,

    /// Row stored under this document filename
    Inserted { document: String },

    /// Retrieved documents (zero or one for a lookup)
    Documents(Vec<Document>),

    /// Number of documents removed
    Deleted { count: usize },

    /// Integrity check result
    Report(IntegrityReport),
}
