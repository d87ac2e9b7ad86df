//! unitrack core data models.
//!
//! This crate defines the units a learner works through, the answers they
//! write, and the per-unit progress aggregate everything else is built on.

#![warn(missing_docs)]

// Core identities
mod id;
mod clock;

// Unit content
mod unit;

// Learner state
mod status;
mod answer;
mod progress;
mod summary;
mod state;

// Re-exports
pub use id::*;
pub use clock::{Clock, SystemClock, FixedClock};

pub use unit::{flatten_tasks, Unit, LearningOutcome, Task, TaskType, AcceptanceCriterion, UnitValidationError};

pub use status::{TaskStatus, StatusEntry};
pub use answer::StudentAnswer;
pub use progress::Progress;
pub use summary::UnitSummary;
pub use state::{LearnerState, UnitEntry};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
