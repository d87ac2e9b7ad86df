//! Errors raised by progress tracking.

use unitrack_core::{TaskId, UnitId, UnitValidationError};
use unitrack_storage::StorageError;

/// Result alias for progress operations.
pub type Result<T> = std::result::Result<T, ProgressError>;

/// Errors that can occur while tracking progress.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// Persistence failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Unit is not in the catalogue
    #[error("unit not found: {0}")]
    UnitNotFound(UnitId),

    /// Operation needs an existing answer
    #[error("no answer for task {0}")]
    AnswerNotFound(TaskId),

    /// Uploaded unit failed validation
    #[error("invalid unit: {0}")]
    InvalidUnit(#[from] UnitValidationError),
}
