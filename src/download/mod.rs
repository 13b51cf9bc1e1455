//! Download module for fetching linked artifacts
//!
//! # Components
//!
//! - `Downloader`: Walks groups in catalog order behind one shared admission gate
//! - `DownloadTask`: One transfer, driven through the `TaskState` machine
//! - `RetryPolicy`: Exponential backoff for transient transport failures
//! - `DownloadReport`: Per-group tallies and the list of failed transfers

mod report;
mod retry;
mod scheduler;
mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use report::{DownloadReport, FailedDownload, GroupReport};
pub use retry::{RetryDecision, RetryPolicy};
pub use scheduler::Downloader;
pub use worker::{DownloadFailure, DownloadTask, TaskOutcome, TransferContext};
