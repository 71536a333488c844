//! Index Module
//!
//! Flat, append-only secondary structures mapping a field value to the
//! document that holds it.
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────┐
//! │ 1:3f6c1e0a-...-9b2d.json             │
//! │ 2:a81d44c7-...-07fe.json             │
//! │ 1:0c9e5b12-...-d1aa.json  (wins)     │
//! └──────────────────────────────────────┘
//! ```
//! No header, no footer. Lines are only ever appended, except when
//! delete-by-index rewrites the file without the removed documents.

mod entry;
mod file;

pub use entry::{IndexEntry, DELIMITER};
pub use file::{IndexFile, IndexRewrite, IndexSnapshot};
