//! Configuration module for Statute-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; missing keys fall back to the defaults for the federal
//! statute catalog.
//!
//! # Example
//!
//! ```no_run
//! use statute_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Downloading with {} slots", config.download.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, DownloadConfig, HttpConfig, OutputConfig, SiteConfig};

// Re-export parser functions
pub use parser::{config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
