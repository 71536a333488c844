//! Table definition types
//!
//! Serialized as one JSON record per table:
//! `{"name", "fields":[{"name","dataType"}], "indices":[{"name","primary"}]}`

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{BasedError, Result};
use crate::paths;

/// Declared type of a field.
///
/// Informational only: inserted values stay strings and are never checked
/// against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    Int,
    String,
    Date,
    Double,
    Boolean,
}

impl FieldType {
    /// Parse the upper-case tag used on disk ("INT", "DATE", ...).
    /// Case-insensitive.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.to_ascii_uppercase().as_str() {
            "INT" => Some(FieldType::Int),
            "STRING" => Some(FieldType::String),
            "DATE" => Some(FieldType::Date),
            "DOUBLE" => Some(FieldType::Double),
            "BOOLEAN" => Some(FieldType::Boolean),
            _ => None,
        }
    }
}

/// One declared column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableField {
    pub name: String,
    pub data_type: FieldType,
}

/// One declared index; the index name is also the field it indexes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableIndex {
    pub name: String,
    #[serde(default)]
    pub primary: bool,
}

/// Identity and schema of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<TableField>,
    #[serde(default)]
    pub indices: Vec<TableIndex>,
}

impl TableDefinition {
    /// Start a definition with no fields and no indices
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Append a field declaration
    pub fn field(mut self, name: impl Into<String>, data_type: FieldType) -> Self {
        self.fields.push(TableField {
            name: name.into(),
            data_type,
        });
        self
    }

    /// Append a secondary index
    pub fn index(mut self, name: impl Into<String>) -> Self {
        self.indices.push(TableIndex {
            name: name.into(),
            primary: false,
        });
        self
    }

    /// Append the primary index
    pub fn primary_index(mut self, name: impl Into<String>) -> Self {
        self.indices.push(TableIndex {
            name: name.into(),
            primary: true,
        });
        self
    }

    /// Name of the primary index.
    ///
    /// Fails with `InvariantViolated` when no index is marked primary.
    pub fn primary_index_name(&self) -> Result<&str> {
        self.indices
            .iter()
            .find(|index| index.primary)
            .map(|index| index.name.as_str())
            .ok_or_else(|| {
                BasedError::InvariantViolated(format!(
                    "table '{}' has no primary index",
                    self.name
                ))
            })
    }

    /// Whether an index with this name is declared
    pub fn index_exists(&self, index: &str) -> bool {
        self.indices.iter().any(|i| i.name == index)
    }

    /// Check the definition before anything is written for it.
    ///
    /// Table, field and index names must be filesystem-safe, names must be
    /// unique within their list, and exactly one index must be primary.
    pub fn validate(&self) -> Result<()> {
        paths::validate_name("table", &self.name)?;

        let mut seen = HashSet::new();
        for field in &self.fields {
            paths::validate_name("field", &field.name)?;
            if !seen.insert(field.name.as_str()) {
                return Err(BasedError::InvariantViolated(format!(
                    "field '{}' is declared twice on table '{}'",
                    field.name, self.name
                )));
            }
        }

        seen.clear();
        for index in &self.indices {
            paths::validate_name("index", &index.name)?;
            if !seen.insert(index.name.as_str()) {
                return Err(BasedError::InvariantViolated(format!(
                    "index '{}' is declared twice on table '{}'",
                    index.name, self.name
                )));
            }
        }

        match self.indices.iter().filter(|i| i.primary).count() {
            1 => Ok(()),
            0 => Err(BasedError::InvariantViolated(format!(
                "table '{}' has no primary index",
                self.name
            ))),
            n => Err(BasedError::InvariantViolated(format!(
                "table '{}' declares {} primary indices, expected exactly one",
                self.name, n
            ))),
        }
    }
}
