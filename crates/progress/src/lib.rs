//! Progress Tracking
//!
//! Per-unit progress store, status history, and the unit catalogue with its
//! summary cache.

#![warn(missing_docs)]

pub mod error;
pub mod history;
pub mod catalog;
pub mod store;

pub use error::{ProgressError, Result};
pub use history::record_transition;
pub use catalog::{progress_key, UnitCatalog, UNITS_KEY, SUMMARIES_KEY};
pub use store::ProgressStore;
