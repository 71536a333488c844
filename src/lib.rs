//! # BasedDB
//!
//! A minimal document store that keeps:
//! - One JSON file per inserted row
//! - One flat, append-only `key:document` file per declared index
//! - One definition file per table
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Engine (facade)                         │
//! │   create_table · insert · retrieve_all · delete_by_index    │
//! └──────────┬──────────────────┬──────────────────┬────────────┘
//!            │                  │                  │
//!            ▼                  ▼                  ▼
//!   ┌─────────────────┐ ┌───────────────┐ ┌─────────────────┐
//!   │ DefinitionStore │ │ DocumentStore │ │   IndexFile     │
//!   │ definition.json │ │ data/<id>.json│ │ indices/<i>.json│
//!   └────────┬────────┘ └───────┬───────┘ └────────┬────────┘
//!            └──────────────────┼──────────────────┘
//!                               ▼
//!                      ┌─────────────────┐
//!                      │  Path Resolver  │
//!                      │   (pure fns)    │
//!                      └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod paths;
pub mod schema;
pub mod index;
pub mod document;
pub mod command;
pub mod engine;

mod fsutil;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{BasedError, Result};
pub use config::Config;
pub use engine::Engine;
pub use document::{Document, Fields};
pub use schema::{FieldType, TableDefinition};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of BasedDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
