//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::catalog::{DocumentRecord, Group, LinkRecord};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No stored data at {0}")]
    NotFound(PathBuf),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Every stage's output is persisted through this trait, so a later invocation can
/// resume from any stage without repeating earlier network traffic. Saving always
/// overwrites.
pub trait Storage: Send + Sync {
    // ===== Stage 1 =====

    /// Saves the top-level index links
    fn save_index(&self, links: &[LinkRecord]) -> StorageResult<()>;

    /// Loads the top-level index links
    fn load_index(&self) -> StorageResult<Vec<LinkRecord>>;

    // ===== Stage 2 =====

    /// Saves the alphabetical group links
    fn save_group_index(&self, links: &[LinkRecord]) -> StorageResult<()>;

    /// Loads the alphabetical group links
    fn load_group_index(&self) -> StorageResult<Vec<LinkRecord>>;

    // ===== Stage 3 =====

    /// Saves one group under its storage name
    fn save_group(&self, group: &Group) -> StorageResult<()>;

    /// Loads one group by file name (e.g. `Teilliste_A.json`)
    fn load_group(&self, file_name: &str) -> StorageResult<Group>;

    /// Lists stored group file names in catalog order
    fn list_groups(&self) -> StorageResult<Vec<String>>;

    /// Saves the consolidated catalog
    fn save_catalog(&self, records: &[DocumentRecord]) -> StorageResult<()>;

    /// Loads the consolidated catalog
    fn load_catalog(&self) -> StorageResult<Vec<DocumentRecord>>;
}
