//! Document Module
//!
//! One file per inserted row, named by a random UUID.
//!
//! ## Responsibilities
//! - Generate collision-free document filenames
//! - Serialize a row's string fields to its own file
//! - Load, list and remove document files

mod store;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use store::DocumentStore;

/// Field name -> value, exactly as the caller supplied it
pub type Fields = BTreeMap<String, String>;

/// A stored row together with the filename that identifies it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Filename inside the table's `data/` directory; the join key used by
    /// index entries
    pub id: String,

    pub fields: Fields,
}

impl Document {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}
