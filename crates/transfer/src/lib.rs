//! Export / Import
//!
//! The versioned transfer document, its chunked form for large exports, and
//! the local and remote folders exports are written to.

#![warn(missing_docs)]

pub mod error;
pub mod document;
pub mod chunk;
pub mod files;
pub mod remote;
pub mod service;

pub use error::{Result, TransferError};
pub use document::{TransferDocument, TransferEntry, CURRENT_VERSION};
pub use chunk::{
    base_name, chunk_name, metadata_name, single_name, ChunkManifest, TransferPayload, UnitChunk,
    DEFAULT_CHUNK_THRESHOLD,
};
pub use files::{FileSink, FileSource};
pub use remote::RemoteFolder;
pub use service::{read_payload, write_payload, ImportReport, TransferService};
