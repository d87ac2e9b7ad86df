//! Transfer errors.

use ulid::Ulid;
use unitrack_progress::ProgressError;
use unitrack_storage::StorageError;

/// Result type for transfer operations.
pub type Result<T> = std::result::Result<T, TransferError>;

/// Errors raised while exporting or importing learner state.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Storage backend failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Catalogue failure
    #[error("Progress error: {0}")]
    Progress(#[from] ProgressError),

    /// Malformed document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A file the transfer needs is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// A chunk that belongs to a different export
    #[error("Chunk {file} belongs to export {found}, expected {expected}")]
    ChunkMismatch {
        /// Chunk file name
        file: String,
        /// Export id from the manifest
        expected: Ulid,
        /// Export id found in the chunk
        found: Ulid,
    },

    /// Document written by a newer format revision
    #[error("Unsupported transfer version {0}")]
    UnsupportedVersion(u32),

    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Storage server rejected the request
    #[error("Remote storage error: {0}")]
    Remote(String),
}
