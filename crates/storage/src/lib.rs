//! Storage abstraction and implementations for unitrack.
//!
//! This crate provides the key-value persistence port with JSON-file,
//! in-memory and (optionally) SQLite backends, plus the storage folder that
//! holds exported progress files.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;
pub mod memory;
pub mod folder;
#[cfg(feature = "sqlite")]
pub mod sqlite_storage;

pub use trait_::{KeyValueStore, StorageError, Result, read_json, write_json, validate_name};
pub use json_storage::JsonStorage;
pub use memory::MemoryStore;
pub use folder::{FileInfo, StorageFolder};
#[cfg(feature = "sqlite")]
pub use sqlite_storage::SqliteStorage;
