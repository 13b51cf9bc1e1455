//! JSON file storage implementation
//!
//! This module provides a directory-of-JSON-files implementation of the Storage
//! trait. Files are pretty-printed with four-space indentation and keep non-ASCII
//! characters unescaped.

use crate::catalog::{sort_names, DocumentRecord, Group, LinkRecord};
use crate::config::OutputConfig;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// JSON file storage backend
#[derive(Debug, Clone)]
pub struct JsonStorage {
    data_dir: PathBuf,
    index_file: String,
    group_index_file: String,
    groups_dir: PathBuf,
    catalog_file: String,
}

impl JsonStorage {
    /// Creates a storage rooted at the configured data directory
    ///
    /// Directories are created lazily on first write.
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            index_file: config.index_file.clone(),
            group_index_file: config.group_index_file.clone(),
            groups_dir: config.groups_path(),
            catalog_file: config.catalog_file.clone(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn groups_dir(&self) -> &Path {
        &self.groups_dir
    }

    fn index_path(&self) -> PathBuf {
        self.data_dir.join(&self.index_file)
    }

    fn group_index_path(&self) -> PathBuf {
        self.data_dir.join(&self.group_index_file)
    }

    fn catalog_path(&self) -> PathBuf {
        self.groups_dir.join(&self.catalog_file)
    }
}

impl Storage for JsonStorage {
    fn save_index(&self, links: &[LinkRecord]) -> StorageResult<()> {
        write_json(&self.index_path(), links)
    }

    fn load_index(&self) -> StorageResult<Vec<LinkRecord>> {
        read_json(&self.index_path())
    }

    fn save_group_index(&self, links: &[LinkRecord]) -> StorageResult<()> {
        write_json(&self.group_index_path(), links)
    }

    fn load_group_index(&self) -> StorageResult<Vec<LinkRecord>> {
        read_json(&self.group_index_path())
    }

    fn save_group(&self, group: &Group) -> StorageResult<()> {
        write_json(&self.groups_dir.join(group.file_name()), &group.records)
    }

    fn load_group(&self, file_name: &str) -> StorageResult<Group> {
        let records = read_json(&self.groups_dir.join(file_name))?;
        Ok(Group::from_file_name(file_name, records))
    }

    fn list_groups(&self) -> StorageResult<Vec<String>> {
        let entries = match std::fs::read_dir(&self.groups_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Group directory not found: {}", self.groups_dir.display());
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.groups_dir.clone(),
                    source,
                })
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StorageError::Io {
                path: self.groups_dir.clone(),
                source,
            })?;

            if !entry.path().is_file() {
                continue;
            }

            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };

            if name.ends_with(".json") && name != self.catalog_file {
                names.push(name);
            }
        }

        sort_names(&mut names);
        Ok(names)
    }

    fn save_catalog(&self, records: &[DocumentRecord]) -> StorageResult<()> {
        write_json(&self.catalog_path(), records)
    }

    fn load_catalog(&self) -> StorageResult<Vec<DocumentRecord>> {
        read_json(&self.catalog_path())
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|source| StorageError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    std::fs::write(path, buffer).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::trace!("Wrote {}", path.display());
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StorageError::NotFound(path.to_path_buf()))
        }
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&content).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })
}
