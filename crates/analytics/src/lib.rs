//! Progress Analytics
//!
//! Read-only metrics over stored progress: completion rate, streaks,
//! velocity, efficiency and the daily completion trend.

#![warn(missing_docs)]

pub mod source;
pub mod stats;
pub mod streak;
pub mod trend;
pub mod engine;

pub use source::AnalyticsSource;
pub use stats::{ProgressStats, RecentCompletion, TrendPoint, UnitStats};
pub use engine::{AnalyticsEngine, DayBoundary, RECENT_ACTIVITY_LIMIT};
