/// Download task state definitions
///
/// This module defines the states an artifact transfer moves through, from being
/// queued until it succeeds or is given up.
use std::fmt;

/// Represents the current state of a download task
///
/// ```text
/// Pending -> Acquiring -> Transferring -> Succeeded
///                ^              |------> PermanentlyFailed
///                |              v
///                +-------- Retrying
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    // ===== Active States =====
    /// Task is created and waiting to be started
    Pending,

    /// Task is waiting for an admission gate slot
    Acquiring,

    /// Task holds a slot and is transferring the artifact
    Transferring,

    /// Task hit a transient failure and is backing off (slot released)
    Retrying,

    // ===== Terminal States =====
    /// Artifact was written to its destination
    Succeeded,

    /// Task was abandoned (error status, permanent failure or retries exhausted)
    PermanentlyFailed,
}

impl TaskState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::PermanentlyFailed)
    }

    /// Returns true if the task still has work to do
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if the task holds an admission gate slot in this state
    pub fn holds_slot(&self) -> bool {
        matches!(self, Self::Transferring)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Acquiring)
                | (Self::Acquiring, Self::Transferring)
                | (Self::Acquiring, Self::PermanentlyFailed)
                | (Self::Transferring, Self::Succeeded)
                | (Self::Transferring, Self::PermanentlyFailed)
                | (Self::Transferring, Self::Retrying)
                | (Self::Retrying, Self::Acquiring)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Acquiring => "acquiring",
            Self::Transferring => "transferring",
            Self::Retrying => "retrying",
            Self::Succeeded => "succeeded",
            Self::PermanentlyFailed => "permanently_failed",
        }
    }

    /// Returns all possible task states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::Acquiring,
            Self::Transferring,
            Self::Retrying,
            Self::Succeeded,
            Self::PermanentlyFailed,
        ]
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
