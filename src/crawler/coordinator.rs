//! Harvest coordinator - stage orchestration
//!
//! This module drives the harvest through its stages:
//! - Index: the site root's navigation links
//! - Group index: one link per alphabetical group
//! - Details: every group page, fetched concurrently, flattened into the catalog
//! - Download: the linked artifacts, via the [`Downloader`]
//!
//! Every stage persists its output, and a later stage can start from what an
//! earlier invocation left on disk.

use crate::catalog::{flatten_catalog, sort_groups, DocumentRecord, Group, LinkRecord};
use crate::config::{validate, Config, SiteConfig};
use crate::crawler::document::HtmlPage;
use crate::crawler::fetcher::{fetch_document, fetch_text, HttpTransport, Transport};
use crate::crawler::parser::{extract_detail_records, extract_links};
use crate::download::{DownloadReport, Downloader};
use crate::storage::{load_groups, open_storage, JsonStorage, Storage, StorageError, StorageResult};
use crate::url::{group_storage_name, resolve_href, site_base, strip_relative_prefix};
use crate::{HarvestError, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use url::Url;

/// A point the harvest can start from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Index,
    GroupIndex,
    Details,
    Download,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::GroupIndex => "groups",
            Self::Details => "details",
            Self::Download => "download",
        }
    }

    pub fn all() -> [Self; 4] {
        [Self::Index, Self::GroupIndex, Self::Details, Self::Download]
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown stage '{}' (expected one of: index, groups, details, download)",
                    s
                )
            })
    }
}

/// Outcome of the details stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub groups_attempted: usize,
    pub groups_succeeded: usize,
    /// Storage names of groups whose page could not be fetched or parsed
    pub failed_groups: Vec<String>,
    pub records_found: usize,
    pub artifacts_linked: usize,
}

impl CrawlSummary {
    pub fn groups_failed(&self) -> usize {
        self.failed_groups.len()
    }
}

/// What a harvest run produced
#[derive(Debug, Default)]
pub struct HarvestOutcome {
    pub crawl: Option<CrawlSummary>,
    pub download: Option<DownloadReport>,
}

/// Main harvest coordinator structure
pub struct Harvester {
    config: Arc<Config>,
    base: Url,
    transport: Arc<dyn Transport>,
    storage: JsonStorage,
    show_progress: bool,
}

impl Harvester {
    /// Creates a harvester using the given transport
    ///
    /// # Arguments
    ///
    /// * `config` - Configuration, validated here
    /// * `transport` - Transport shared by page fetches and artifact transfers
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Ready to run
    /// * `Err(HarvestError::Config)` - The configuration fails validation
    pub fn new(config: Config, transport: Arc<dyn Transport>) -> Result<Self> {
        validate(&config)?;
        let base = site_base(&config.site.base_url)?;
        let storage = open_storage(&config.output);

        Ok(Self {
            config: Arc::new(config),
            base,
            transport,
            storage,
            show_progress: false,
        })
    }

    /// Creates a harvester talking HTTP through `reqwest`
    pub fn from_config(config: Config) -> Result<Self> {
        let transport = HttpTransport::new(&config.http)?;
        Self::new(config, Arc::new(transport))
    }

    /// Shows a progress bar while downloading
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn storage(&self) -> &JsonStorage {
        &self.storage
    }

    /// Runs the harvest starting at `stage`
    ///
    /// Stages before `stage` are not run; their persisted output is loaded
    /// instead. With `download` false the run stops after the details stage.
    pub async fn run_from(&self, stage: Stage, download: bool) -> Result<HarvestOutcome> {
        let start = Instant::now();
        tracing::info!("Starting harvest at stage '{}'", stage);

        let mut outcome = HarvestOutcome::default();

        if stage <= Stage::Details {
            let group_links = match stage {
                Stage::Index => {
                    let index = self.run_index_stage().await?;
                    self.run_group_index_stage(&index).await?
                }
                Stage::GroupIndex => {
                    let index = stage_input(self.storage.load_index(), Stage::Index)?;
                    self.run_group_index_stage(&index).await?
                }
                _ => stage_input(self.storage.load_group_index(), Stage::GroupIndex)?,
            };

            let (_, summary) = self.run_detail_stage(&group_links).await?;
            outcome.crawl = Some(summary);
        }

        if download {
            let groups = load_groups(&self.storage)?;
            outcome.download = Some(self.run_download_stage(groups).await?);
        }

        tracing::info!("Harvest finished in {:?}", start.elapsed());
        Ok(outcome)
    }

    /// Stage 1: extracts the navigation links of the site root
    ///
    /// Any failure here is fatal to the run.
    pub async fn run_index_stage(&self) -> Result<Vec<LinkRecord>> {
        let url = self.base.to_string();
        let site = &self.config.site;
        tracing::info!("Stage 1: fetching index {}", url);

        let links = {
            let page = fetch_document(&*self.transport, &url, self.config.http.page_timeout())
                .await?;
            extract_links(&page, &url, &site.index_container, &site.index_item)?
        };

        self.storage.save_index(&links)?;
        tracing::info!("Stage 1: {} index links", links.len());
        Ok(links)
    }

    /// Stage 2: extracts the group links from the page behind the first index link
    ///
    /// Fetch and layout failures are logged and yield an empty list; the
    /// previously persisted list is left untouched in that case.
    pub async fn run_group_index_stage(&self, index: &[LinkRecord]) -> Result<Vec<LinkRecord>> {
        let Some(entry) = index.first() else {
            return Err(HarvestError::MissingStageInput(
                "index list is empty; nothing leads to the group index".to_string(),
            ));
        };

        let Some(url) = resolve_href(&self.base, &entry.href) else {
            tracing::error!("Stage 2: unusable index href '{}'", entry.href);
            return Ok(Vec::new());
        };
        tracing::info!("Stage 2: fetching group index {} ({})", url, entry.text);

        let body = match fetch_text(&*self.transport, &url, self.config.http.page_timeout()).await
        {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Stage 2 failed: {}", e);
                return Ok(Vec::new());
            }
        };

        let site = &self.config.site;
        let page = HtmlPage::parse(&body);
        let links = match extract_links(&page, &url, &site.group_container, &site.group_item) {
            Ok(links) => links,
            Err(e) if e.is_structure_missing() => {
                tracing::error!("Stage 2 failed: {}", e);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let links: Vec<LinkRecord> = links
            .into_iter()
            .map(|link| LinkRecord::new(link.text, strip_relative_prefix(&link.href)))
            .collect();

        self.storage.save_group_index(&links)?;
        tracing::info!("Stage 2: {} groups", links.len());
        Ok(links)
    }

    /// Stage 3: fetches every group page concurrently and builds the catalog
    ///
    /// A group whose page fails is logged, contributes an empty group and keeps
    /// whatever file an earlier run persisted for it. A group whose file cannot
    /// be written is counted as failed but its records still reach the catalog.
    /// The consolidated catalog is written once all groups are done.
    pub async fn run_detail_stage(
        &self,
        group_links: &[LinkRecord],
    ) -> Result<(Vec<Group>, CrawlSummary)> {
        tracing::info!("Stage 3: fetching {} group pages", group_links.len());

        let mut summary = CrawlSummary {
            groups_attempted: group_links.len(),
            ..CrawlSummary::default()
        };
        let mut tasks = JoinSet::new();

        for link in group_links {
            let Some(url) = resolve_href(&self.base, &link.href) else {
                tracing::warn!("Skipping group '{}' with unusable href '{}'", link.text, link.href);
                summary.failed_groups.push(link.href.clone());
                continue;
            };

            let name = group_storage_name(&url);
            let transport = Arc::clone(&self.transport);
            let config = Arc::clone(&self.config);
            let base = self.base.clone();

            tasks.spawn(async move {
                let timeout = config.http.page_timeout();
                let result = match fetch_text(&*transport, &url, timeout).await {
                    Ok(body) => parse_group_page(&body, &url, &base, &config.site),
                    Err(e) => Err(HarvestError::from(e)),
                };
                (name, url, result)
            });
        }

        let mut groups = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (name, url, result) = match joined {
                Ok(output) => output,
                Err(e) => {
                    tracing::error!("Group task aborted: {}", e);
                    continue;
                }
            };

            match result {
                Ok(records) => {
                    let group = Group::new(name, records);
                    match self.storage.save_group(&group) {
                        Ok(()) => {
                            tracing::info!(
                                "Group {}: {} records",
                                group.label(),
                                group.records.len()
                            );
                            summary.groups_succeeded += 1;
                        }
                        Err(e) => {
                            tracing::error!("Group {}: cannot save: {}", group.name, e);
                            summary.failed_groups.push(group.name.clone());
                        }
                    }
                    groups.push(group);
                }
                Err(e) => {
                    tracing::warn!("Group {} ({}) failed: {}", name, url, e);
                    summary.failed_groups.push(name.clone());
                    groups.push(Group::new(name, Vec::new()));
                }
            }
        }

        sort_groups(&mut groups);
        summary.failed_groups.sort();

        let catalog = flatten_catalog(&groups);
        self.storage.save_catalog(&catalog)?;

        summary.records_found = catalog.len();
        summary.artifacts_linked = catalog.iter().filter(|r| r.has_artifact()).count();
        tracing::info!(
            "Stage 3: {} of {} groups, {} records ({} with artifacts)",
            summary.groups_succeeded,
            summary.groups_attempted,
            summary.records_found,
            summary.artifacts_linked
        );

        Ok((groups, summary))
    }

    /// Stage 4: downloads the artifacts of the given groups
    pub async fn run_download_stage(&self, groups: Vec<Group>) -> Result<DownloadReport> {
        tracing::info!("Stage 4: downloading artifacts");
        Downloader::new(Arc::clone(&self.transport), &self.config)?
            .with_progress(self.show_progress)
            .run(groups)
            .await
    }
}

fn parse_group_page(
    body: &str,
    url: &str,
    base: &Url,
    site: &SiteConfig,
) -> Result<Vec<DocumentRecord>> {
    let page = HtmlPage::parse(body);
    extract_detail_records(&page, url, base, site)
}

/// Maps a missing persisted file to `MissingStageInput`
fn stage_input<T>(loaded: StorageResult<T>, producer: Stage) -> Result<T> {
    loaded.map_err(|e| match e {
        StorageError::NotFound(path) => HarvestError::MissingStageInput(format!(
            "{} not found; run the '{}' stage first",
            path.display(),
            producer
        )),
        other => other.into(),
    })
}

/// Runs a complete harvest
///
/// This is the main entry point: stages 1 to 3, then the downloader.
pub async fn run_harvest(config: Config) -> Result<HarvestOutcome> {
    Harvester::from_config(config)?
        .run_from(Stage::Index, true)
        .await
}
