//! Group-by-group artifact downloader
//!
//! This module handles:
//! - A single admission gate bounding in-flight transfers for the whole run
//! - Processing groups in catalog order, all of a group's transfers at once
//! - Pacing between consecutive groups
//! - Laying out artifacts as `<artifact_dir>/<group label>/<title>.<ext>`

use crate::catalog::{sort_groups, Group};
use crate::config::Config;
use crate::ConfigError;
use crate::crawler::Transport;
use crate::download::report::{DownloadReport, FailedDownload, GroupReport};
use crate::download::retry::RetryPolicy;
use crate::download::worker::{DownloadTask, TransferContext};
use crate::url::artifact_file_name;
use crate::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Downloads every artifact linked from a set of groups
///
/// The admission gate is shared by all transfers of all groups: at most
/// `concurrency` transfers run at any instant, and a task backing off between
/// retries does not count against it.
pub struct Downloader {
    ctx: TransferContext,
    capacity: usize,
    pacing_delay: Duration,
    artifact_root: PathBuf,
    extension: String,
    show_progress: bool,
}

impl Downloader {
    /// Creates a downloader from configuration
    ///
    /// # Arguments
    ///
    /// * `transport` - Shared transport used for every transfer
    /// * `config` - Harvester configuration (download and output sections are used)
    ///
    /// # Returns
    ///
    /// * `Err(HarvestError::Config)` - The concurrency is zero; no transfer could
    ///   ever be admitted
    pub fn new(transport: Arc<dyn Transport>, config: &Config) -> Result<Self> {
        let capacity = config.download.concurrency as usize;
        if capacity == 0 {
            return Err(ConfigError::Validation(
                "download concurrency must be at least 1".to_string(),
            )
            .into());
        }

        Ok(Self {
            ctx: TransferContext {
                transport,
                gate: Arc::new(Semaphore::new(capacity)),
                policy: RetryPolicy::from_config(&config.download),
                timeout: config.download.timeout(),
            },
            capacity,
            pacing_delay: config.download.pacing_delay(),
            artifact_root: config.output.artifact_path(),
            extension: config.output.artifact_extension.clone(),
            show_progress: false,
        })
    }

    /// Enables a terminal progress bar
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Admission gate capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn artifact_root(&self) -> &Path {
        &self.artifact_root
    }

    /// Directory receiving a group's artifacts
    pub fn group_dir(&self, group: &Group) -> PathBuf {
        self.artifact_root.join(group.label())
    }

    /// Builds the transfer tasks for a group
    ///
    /// Returns the tasks and the number of records skipped for lack of an
    /// artifact link.
    pub fn plan_group(&self, group: &Group) -> (Vec<DownloadTask>, usize) {
        let dir = self.group_dir(group);
        let mut tasks = Vec::new();
        let mut skipped = 0;
        let mut seen = HashSet::new();

        for record in &group.records {
            let Some(link) = &record.pdf_link else {
                tracing::debug!("No artifact for '{}'", record.title);
                skipped += 1;
                continue;
            };

            let mut file_name = artifact_file_name(&record.title, link, &self.extension);
            if seen.contains(&file_name) {
                let renamed = self.unique_file_name(&file_name, &seen);
                tracing::warn!(
                    "Group {} has more than one artifact named {}; saving {} instead",
                    group.label(),
                    file_name,
                    renamed
                );
                file_name = renamed;
            }
            seen.insert(file_name.clone());
            tasks.push(DownloadTask::new(link.clone(), dir.join(file_name)));
        }

        (tasks, skipped)
    }

    /// First `<stem>_<n>.<ext>` for n = 2, 3, ... not yet taken in the group
    fn unique_file_name(&self, file_name: &str, taken: &HashSet<String>) -> String {
        let suffix = format!(".{}", self.extension);
        let stem = file_name.strip_suffix(&suffix).unwrap_or(file_name);
        (2..)
            .map(|n| format!("{}_{}{}", stem, n, suffix))
            .find(|candidate| !taken.contains(candidate))
            .unwrap_or_else(|| file_name.to_string())
    }

    /// Downloads the artifacts of all groups
    ///
    /// Clears the artifact directory first. Groups run in catalog order; a pacing
    /// pause follows every group except the last. Individual transfer failures
    /// are recorded in the report and never abort the run.
    pub async fn run(&self, mut groups: Vec<Group>) -> Result<DownloadReport> {
        sort_groups(&mut groups);
        self.prepare_output().await?;

        let total: usize = groups.iter().map(Group::artifact_count).sum();
        tracing::info!(
            "Downloading {} artifacts from {} groups (concurrency {})",
            total,
            groups.len(),
            self.capacity
        );

        let progress = self.show_progress.then(|| progress_bar(total as u64));
        let mut report = DownloadReport::default();

        for (index, group) in groups.iter().enumerate() {
            let group_report = self.download_group(group, progress.as_ref()).await?;
            tracing::info!(
                "Group {}: {} saved, {} failed, {} without artifact",
                group_report.label,
                group_report.succeeded,
                group_report.failed(),
                group_report.skipped
            );
            report.groups.push(group_report);

            if index + 1 < groups.len() {
                tracing::debug!("Pausing {:?} before next group", self.pacing_delay);
                tokio::time::sleep(self.pacing_delay).await;
                report.pacing_pauses += 1;
            }
        }

        if let Some(progress) = progress {
            progress.finish_with_message("done");
        }

        tracing::info!(
            "Download finished: {} saved, {} failed, {} without artifact",
            report.total_succeeded(),
            report.total_failed(),
            report.total_skipped()
        );
        Ok(report)
    }

    async fn prepare_output(&self) -> Result<()> {
        if tokio::fs::try_exists(&self.artifact_root).await? {
            tracing::info!("Clearing {}", self.artifact_root.display());
            tokio::fs::remove_dir_all(&self.artifact_root).await?;
        }
        tokio::fs::create_dir_all(&self.artifact_root).await?;
        Ok(())
    }

    async fn download_group(
        &self,
        group: &Group,
        progress: Option<&ProgressBar>,
    ) -> Result<GroupReport> {
        let mut report = GroupReport::new(group.label());
        let (tasks, skipped) = self.plan_group(group);
        report.skipped = skipped;

        tokio::fs::create_dir_all(self.group_dir(group)).await?;
        if let Some(progress) = progress {
            progress.set_message(report.label.clone());
        }

        let mut handles = Vec::with_capacity(tasks.len());
        for task in tasks {
            let source_url = task.source_url().to_string();
            let destination = task.destination().to_path_buf();
            let ctx = self.ctx.clone();
            let progress = progress.cloned();

            let handle = tokio::spawn(async move {
                let outcome = task.run(&ctx).await;
                if let Some(progress) = progress {
                    progress.inc(1);
                }
                outcome
            });
            handles.push((source_url, destination, handle));
        }

        for (source_url, destination, handle) in handles {
            match handle.await {
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    tracing::error!("Download task for {} aborted: {}", source_url, e);
                    report.failures.push(FailedDownload {
                        source_url,
                        destination,
                        attempts: 0,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }
}

fn progress_bar(total: u64) -> ProgressBar {
    let progress = ProgressBar::new(total);
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    progress
}
