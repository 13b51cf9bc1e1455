use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Statute-Harvest
///
/// Every section and key has a default, so an empty file (or no file at all)
/// describes a complete harvest of the federal statute catalog.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub output: OutputConfig,
    pub download: DownloadConfig,
    pub http: HttpConfig,
}

/// Where the catalog lives and how its pages are laid out
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Base URL every relative href is resolved against
    pub base_url: String,

    /// Container path holding the top-level navigation
    pub index_container: Vec<String>,

    /// Item selector inside the navigation container
    pub index_item: String,

    /// Container path holding the alphabetical group links
    pub group_container: Vec<String>,

    /// Item selector inside the group container
    pub group_item: String,

    /// Container path holding the entries of one group
    pub detail_container: Vec<String>,

    /// One element per catalog entry
    pub detail_item: String,

    /// Element whose `title` attribute carries the entry description
    pub annotation_tag: String,

    /// Case-sensitive substring of an anchor's `title` marking the artifact link
    pub artifact_marker: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let listing = vec!["#content_2022".to_string(), "#paddingLR12".to_string()];
        Self {
            base_url: "https://www.gesetze-im-internet.de/".to_string(),
            index_container: vec!["#nav_2022".to_string()],
            index_item: "li".to_string(),
            group_container: listing.clone(),
            group_item: "a".to_string(),
            detail_container: listing,
            detail_item: "p".to_string(),
            annotation_tag: "abbr".to_string(),
            artifact_marker: "PDF".to_string(),
        }
    }
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Root directory for everything the harvester writes
    pub data_dir: PathBuf,

    /// Top-level index list
    pub index_file: String,

    /// Alphabetical group list
    pub group_index_file: String,

    /// Directory (inside `data_dir`) holding one file per group
    pub groups_dir: String,

    /// Consolidated catalog file (inside `groups_dir`)
    pub catalog_file: String,

    /// Directory (inside `data_dir`) receiving downloaded artifacts
    pub artifact_dir: String,

    /// Extension appended to every artifact filename
    pub artifact_extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            index_file: "home_page_list.json".to_string(),
            group_index_file: "laws_list.json".to_string(),
            groups_dir: "laws_list_by_alphabet".to_string(),
            catalog_file: "full_laws_list.json".to_string(),
            artifact_dir: "pdf".to_string(),
            artifact_extension: "pdf".to_string(),
        }
    }
}

impl OutputConfig {
    /// Directory holding the per-group record files
    pub fn groups_path(&self) -> PathBuf {
        self.data_dir.join(&self.groups_dir)
    }

    /// Directory receiving downloaded artifacts
    pub fn artifact_path(&self) -> PathBuf {
        self.data_dir.join(&self.artifact_dir)
    }
}

/// Artifact download behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DownloadConfig {
    /// Maximum number of transfers in flight across the whole run
    pub concurrency: u32,

    /// Pause between two consecutive groups (milliseconds)
    pub pacing_delay_ms: u64,

    /// Retries allowed after the first attempt of a transfer
    pub max_retries: u32,

    /// Backoff unit (milliseconds); the n-th retry waits `base * 2^n`
    pub backoff_base_ms: u64,

    /// Per-transfer timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            pacing_delay_ms: 5_000,
            max_retries: 5,
            backoff_base_ms: 1_000,
            timeout_secs: 60,
        }
    }
}

impl DownloadConfig {
    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Timeout for catalog page fetches (seconds)
    pub page_timeout_secs: u64,

    /// TCP connect timeout (seconds)
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("statute-harvest/{}", env!("CARGO_PKG_VERSION")),
            page_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl HttpConfig {
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
