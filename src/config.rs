//! Configuration for BasedDB
//!
//! Centralized configuration with sensible defaults.

use std::ffi::OsString;
use std::path::PathBuf;

use crate::error::{BasedError, Result};

/// Environment variable naming the root directory
pub const ROOT_ENV_VAR: &str = "BASED_DB_HOME";

/// Main configuration for a BasedDB engine
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all tables
    /// Internal structure:
    ///   {root_dir}/
    ///     └── tables/
    ///         └── {table}/
    ///             ├── definition.json
    ///             ├── data/           (one file per document)
    ///             └── indices/        (one file per index)
    pub root_dir: PathBuf,

    /// How hard index appends and document writes push data to disk
    pub sync_strategy: SyncStrategy,

    // -------------------------------------------------------------------------
    // Read Configuration
    // -------------------------------------------------------------------------
    /// What `retrieve_all` does when the primary index names a missing document
    pub missing_documents: MissingDocumentPolicy,
}

/// Sync strategy for file writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStrategy {
    /// fsync after every document write and index append
    EveryWrite,

    /// Flush to the OS and let it decide when to hit the disk
    #[default]
    OsBuffered,
}

/// Policy for primary-index entries whose document file is gone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingDocumentPolicy {
    /// Abort the whole retrieval with `NotFound`
    #[default]
    Fail,

    /// Log a warning and leave the document out of the result
    Skip,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("./basedb_data"),
            sync_strategy: SyncStrategy::default(),
            missing_documents: MissingDocumentPolicy::default(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Default config with the root taken from `BASED_DB_HOME`
    pub fn from_env() -> Result<Self> {
        Self::from_root_var(std::env::var_os(ROOT_ENV_VAR))
    }

    /// Default config for a raw `BASED_DB_HOME` value
    pub(crate) fn from_root_var(value: Option<OsString>) -> Result<Self> {
        match value {
            Some(root) if !root.is_empty() => Ok(Config::builder().root_dir(root).build()),
            Some(_) => Err(BasedError::Config(format!("{} is set but empty", ROOT_ENV_VAR))),
            None => Err(BasedError::Config(format!("{} is not set", ROOT_ENV_VAR))),
        }
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the root directory (parent of `tables/`)
    pub fn root_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.root_dir = path.into();
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Set the missing-document policy for full-table retrieval
    pub fn missing_documents(mut self, policy: MissingDocumentPolicy) -> Self {
        self.config.missing_documents = policy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
