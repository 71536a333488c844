//! Schema Module
//!
//! Table definitions and their on-disk store.
//!
//! ## Responsibilities
//! - Describe a table: name, declared fields, declared indices
//! - Validate a definition before it is written
//! - Persist/load `definition.json` and create the table's directory tree

mod definition;
mod store;

pub use definition::{FieldType, TableDefinition, TableField, TableIndex};
pub use store::DefinitionStore;
