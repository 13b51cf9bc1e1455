//! Storage module for persisting harvest results
//!
//! This module handles all persistence for the harvester:
//! - The top-level index and alphabetical group index lists
//! - One record file per group
//! - The consolidated catalog
//!
//! Persisted files are the source of truth for the downloader, which may run in a
//! later invocation than the crawl.

mod json;
mod traits;

pub use json::JsonStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::catalog::{sort_groups, Group};
use crate::config::OutputConfig;

/// Opens the JSON storage for the configured output directory
pub fn open_storage(config: &OutputConfig) -> JsonStorage {
    JsonStorage::new(config)
}

/// Loads every stored group in catalog order
///
/// Groups that fail to load are logged and left out; the rest are returned.
pub fn load_groups(storage: &dyn Storage) -> StorageResult<Vec<Group>> {
    let mut groups = Vec::new();
    for name in storage.list_groups()? {
        match storage.load_group(&name) {
            Ok(group) => groups.push(group),
            Err(e) => tracing::warn!("Skipping unreadable group file {}: {}", name, e),
        }
    }
    sort_groups(&mut groups);
    Ok(groups)
}
