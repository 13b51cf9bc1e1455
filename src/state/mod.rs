//! State module for tracking download progress
//!
//! # Components
//!
//! - `TaskState`: Tracks an artifact transfer from admission to success or failure

mod task_state;

// Re-export main types
pub use task_state::TaskState;
