use crate::config::types::{Config, DownloadConfig, HttpConfig, OutputConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_output_config(&config.output)?;
    validate_download_config(&config.download)?;
    validate_http_config(&config.http)?;
    Ok(())
}

/// Validates site layout configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            config.base_url
        )));
    }

    validate_container("index_container", &config.index_container)?;
    validate_container("group_container", &config.group_container)?;
    validate_container("detail_container", &config.detail_container)?;

    validate_selector("index_item", &config.index_item)?;
    validate_selector("group_item", &config.group_item)?;
    validate_selector("detail_item", &config.detail_item)?;
    validate_selector("annotation_tag", &config.annotation_tag)?;

    if config.artifact_marker.is_empty() {
        return Err(ConfigError::Validation(
            "artifact_marker cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output locations
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.data_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "data_dir cannot be empty".to_string(),
        ));
    }

    for (name, value) in [
        ("index_file", &config.index_file),
        ("group_index_file", &config.group_index_file),
        ("catalog_file", &config.catalog_file),
        ("artifact_extension", &config.artifact_extension),
    ] {
        validate_file_name(name, value)?;
    }

    for (name, value) in [
        ("groups_dir", &config.groups_dir),
        ("artifact_dir", &config.artifact_dir),
    ] {
        validate_relative_dir(name, value)?;
    }

    if config.groups_dir == config.artifact_dir {
        return Err(ConfigError::Validation(
            "groups_dir and artifact_dir must differ".to_string(),
        ));
    }

    Ok(())
}

/// Validates download behavior
fn validate_download_config(config: &DownloadConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            config.concurrency
        )));
    }

    if config.max_retries > 16 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 16, got {}",
            config.max_retries
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "download timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.page_timeout_secs < 1 || config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "HTTP timeouts must be >= 1 second, got page={} connect={}",
            config.page_timeout_secs, config.connect_timeout_secs
        )));
    }

    Ok(())
}

fn validate_container(name: &str, path: &[String]) -> Result<(), ConfigError> {
    if path.is_empty() {
        return Err(ConfigError::Validation(format!(
            "{} must name at least one element",
            name
        )));
    }

    for step in path {
        validate_selector(name, step)?;
    }

    Ok(())
}

/// Selectors are `#id`, `tag` or `tag[attr]`
fn validate_selector(name: &str, selector: &str) -> Result<(), ConfigError> {
    let selector = selector.trim();
    if selector.is_empty() || selector == "#" {
        return Err(ConfigError::Validation(format!(
            "{} contains an empty selector",
            name
        )));
    }

    if selector.contains(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "{} selector '{}' must be a single step; use a container path instead",
            name, selector
        )));
    }

    Ok(())
}

fn validate_file_name(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
    }

    if value.contains('/') || value.contains('\\') {
        return Err(ConfigError::Validation(format!(
            "{} must be a plain file name, got '{}'",
            name, value
        )));
    }

    Ok(())
}

fn validate_relative_dir(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
    }

    let path = std::path::Path::new(value);
    if path.is_absolute() || value.split(['/', '\\']).any(|part| part == "..") {
        return Err(ConfigError::Validation(format!(
            "{} must be relative to data_dir, got '{}'",
            name, value
        )));
    }

    Ok(())
}
