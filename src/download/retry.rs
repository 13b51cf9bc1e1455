//! Retry logic with exponential backoff for transient transfer failures.
//!
//! Only failures below HTTP (timeouts, refused or reset connections, truncated
//! bodies) are retried. An HTTP error status is a definitive answer and is never
//! retried.

use crate::config::DownloadConfig;
use crate::crawler::TransportError;
use std::time::Duration;

/// Longest single backoff, whatever the attempt number
const MAX_BACKOFF: Duration = Duration::from_secs(3600);

/// Decision on whether to retry a failed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the specified delay.
    Retry { delay: Duration },

    /// Stop retrying.
    GiveUp,
}

/// Retry budget and backoff schedule for one transfer.
///
/// The n-th retry (n starting at 0) waits `base_delay * 2^n`; with the defaults
/// that is 1s, 2s, 4s, 8s, 16s.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt
    max_retries: u32,

    /// Delay before the first retry
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&DownloadConfig::default())
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn from_config(config: &DownloadConfig) -> Self {
        Self::new(config.max_retries, config.backoff_base())
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay before retry number `retry` (0-indexed)
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.checked_pow(retry).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .map_or(MAX_BACKOFF, |delay| delay.min(MAX_BACKOFF))
    }

    /// Decides what to do after a transport failure
    ///
    /// # Arguments
    ///
    /// * `error` - The failure of the attempt that just ended
    /// * `retries_done` - How many retries have already been made
    pub fn decide(&self, error: &TransportError, retries_done: u32) -> RetryDecision {
        if !error.is_transient() || retries_done >= self.max_retries {
            return RetryDecision::GiveUp;
        }

        RetryDecision::Retry {
            delay: self.backoff(retries_done),
        }
    }
}
