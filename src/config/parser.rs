use crate::config::types::Config;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Parses configuration text
///
/// Missing sections and keys take their defaults. The result is not validated:
/// command-line overrides are applied first, and [`Harvester::new`] validates the
/// final value.
///
/// [`Harvester::new`]: crate::crawler::Harvester::new
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// SHA-256 of the configuration text, hex encoded
pub fn config_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Reads and parses a configuration file
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with_hash(path).map(|(config, _)| config)
}

/// Reads a configuration file once, returning the parsed config and the hash of
/// exactly the bytes that were parsed
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, config_hash(&content)))
}
