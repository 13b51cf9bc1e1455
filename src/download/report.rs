use crate::download::worker::TaskOutcome;
use std::path::PathBuf;

/// A transfer that ended in `PermanentlyFailed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDownload {
    pub source_url: String,
    pub destination: PathBuf,
    pub attempts: u32,
    pub reason: String,
}

/// Tally for one group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupReport {
    /// Group label (identifier or storage name)
    pub label: String,
    pub succeeded: usize,
    /// Records without an artifact link
    pub skipped: usize,
    pub failures: Vec<FailedDownload>,
}

impl GroupReport {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: TaskOutcome) {
        match outcome.result {
            Ok(()) => self.succeeded += 1,
            Err(failure) => self.failures.push(FailedDownload {
                source_url: outcome.source_url,
                destination: outcome.destination,
                attempts: outcome.attempts,
                reason: failure.to_string(),
            }),
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Summary of a whole download run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    /// Per-group tallies in processing order
    pub groups: Vec<GroupReport>,

    /// Pauses taken between groups
    pub pacing_pauses: usize,
}

impl DownloadReport {
    pub fn total_succeeded(&self) -> usize {
        self.groups.iter().map(|g| g.succeeded).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.groups.iter().map(GroupReport::failed).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.groups.iter().map(|g| g.skipped).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FailedDownload> {
        self.groups.iter().flat_map(|g| g.failures.iter())
    }

    pub fn is_clean(&self) -> bool {
        self.total_failed() == 0
    }
}
