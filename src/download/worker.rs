//! A single artifact transfer
//!
//! Each [`DownloadTask`] walks the [`TaskState`] machine: it waits for a slot on
//! the shared admission gate, transfers the artifact, and on a transient failure
//! gives the slot back while it backs off.

use crate::crawler::{Transport, TransportError};
use crate::download::retry::{RetryDecision, RetryPolicy};
use crate::state::TaskState;
use crate::HarvestError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;

/// Why a transfer was given up
#[derive(Debug, Error)]
pub enum DownloadFailure {
    #[error("server answered HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("giving up after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        attempts: u32,
        last_error: TransportError,
    },

    #[error("permanent transport failure: {0}")]
    Permanent(TransportError),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("admission gate closed")]
    GateClosed,

    #[error("{0}")]
    Internal(String),
}

impl From<HarvestError> for DownloadFailure {
    fn from(e: HarvestError) -> Self {
        Self::Internal(e.to_string())
    }
}

/// Shared resources every transfer needs
#[derive(Clone)]
pub struct TransferContext {
    pub transport: Arc<dyn Transport>,
    pub gate: Arc<Semaphore>,
    pub policy: RetryPolicy,
    pub timeout: Duration,
}

/// Result of one finished task
#[derive(Debug)]
pub struct TaskOutcome {
    pub source_url: String,
    pub destination: PathBuf,
    pub attempts: u32,
    pub state: TaskState,
    pub result: Result<(), DownloadFailure>,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// One artifact to fetch and where to put it
#[derive(Debug)]
pub struct DownloadTask {
    source_url: String,
    destination: PathBuf,
    state: TaskState,
    attempts: u32,
}

impl DownloadTask {
    pub fn new(source_url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source_url: source_url.into(),
            destination: destination.into(),
            state: TaskState::Pending,
            attempts: 0,
        }
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Transfers attempted so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    fn transition(&mut self, next: TaskState) -> Result<(), HarvestError> {
        if !self.state.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::trace!("{}: {} -> {}", self.source_url, self.state, next);
        self.state = next;
        Ok(())
    }

    /// Runs the task to a terminal state
    ///
    /// Never returns an error; failures are reported in the outcome.
    pub async fn run(mut self, ctx: &TransferContext) -> TaskOutcome {
        let result = self.drive(ctx).await;

        match &result {
            Ok(()) => tracing::debug!(
                "Saved {} -> {} ({} attempt(s))",
                self.source_url,
                self.destination.display(),
                self.attempts
            ),
            Err(failure) => {
                tracing::error!("Download failed for {}: {}", self.source_url, failure);
                self.state = TaskState::PermanentlyFailed;
            }
        }

        TaskOutcome {
            source_url: self.source_url,
            destination: self.destination,
            attempts: self.attempts,
            state: self.state,
            result,
        }
    }

    async fn drive(&mut self, ctx: &TransferContext) -> Result<(), DownloadFailure> {
        self.transition(TaskState::Acquiring)?;
        let mut retries = 0;

        loop {
            let permit = ctx
                .gate
                .acquire()
                .await
                .map_err(|_| DownloadFailure::GateClosed)?;
            self.transition(TaskState::Transferring)?;
            self.attempts += 1;

            let response = ctx.transport.get(&self.source_url, ctx.timeout).await;

            let error = match response {
                Ok(response) if response.is_success() => {
                    let written = write_artifact(&self.destination, &response.body).await;
                    drop(permit);
                    written?;
                    self.transition(TaskState::Succeeded)?;
                    return Ok(());
                }
                Ok(response) => {
                    return Err(DownloadFailure::HttpStatus {
                        status: response.status,
                    })
                }
                Err(error) => error,
            };

            drop(permit);

            match ctx.policy.decide(&error, retries) {
                RetryDecision::Retry { delay } => {
                    self.transition(TaskState::Retrying)?;
                    tracing::warn!(
                        "Attempt {} for {} failed ({}), retrying in {:?}",
                        self.attempts,
                        self.source_url,
                        error,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    retries += 1;
                    self.transition(TaskState::Acquiring)?;
                }
                RetryDecision::GiveUp if error.is_transient() => {
                    return Err(DownloadFailure::RetriesExhausted {
                        attempts: self.attempts,
                        last_error: error,
                    });
                }
                RetryDecision::GiveUp => return Err(DownloadFailure::Permanent(error)),
            }
        }
    }
}

/// Writes the artifact, replacing any existing file
async fn write_artifact(path: &Path, body: &[u8]) -> Result<(), DownloadFailure> {
    let io_error = |source| DownloadFailure::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
    }
    tokio::fs::write(path, body).await.map_err(io_error)
}
