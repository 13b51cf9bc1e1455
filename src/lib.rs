//! Statute-Harvest: a polite catalog harvester
//!
//! This crate walks a three-level statute catalog (index, alphabetical group index,
//! per-group detail lists), persists the extracted records as JSON, and downloads the
//! linked PDF artifacts under a bounded admission gate with retry and pacing.

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod download;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

pub use crawler::{FetchError, TransportError};
pub use storage::StorageError;

/// Main error type for Statute-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Expected element '{selector}' not found on {url}")]
    StructureNotFound { url: String, selector: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::TaskState,
        to: state::TaskState,
    },

    #[error("Missing input for stage: {0}")]
    MissingStageInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarvestError {
    /// Returns true if the error means the page had an unexpected layout
    pub fn is_structure_missing(&self) -> bool {
        matches!(self, Self::StructureNotFound { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Statute-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{extract_identifier, order_key, DocumentRecord, Group, LinkRecord, OrderKey};
pub use config::Config;
pub use crawler::{Harvester, Stage};
pub use download::{DownloadReport, Downloader};
pub use state::TaskState;
