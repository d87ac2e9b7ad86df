//! Feedback errors.

use unitrack_core::TaskId;
use unitrack_progress::ProgressError;

/// Result type for feedback operations.
pub type Result<T> = std::result::Result<T, FeedbackError>;

/// Errors raised while requesting or applying feedback.
#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    /// Transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("Feedback service returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// The service answered with an unexpected body
    #[error("Invalid feedback response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The task is not part of the unit
    #[error("Task not found in unit: {0}")]
    TaskNotFound(TaskId),

    /// Progress store failure
    #[error("Progress error: {0}")]
    Progress(#[from] ProgressError),
}
