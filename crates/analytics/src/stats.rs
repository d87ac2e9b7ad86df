//! Analytics output types.

use serde::{Deserialize, Serialize};
use unitrack_core::{TaskId, Time, UnitId};

/// Snapshot of learner progress across all units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    /// Units with content available
    pub total_units: usize,

    /// Distinct tasks across those units
    pub total_tasks: usize,

    /// Tasks marked good enough
    pub completed_tasks: usize,

    /// Tasks with content that are not complete
    pub in_progress_tasks: usize,

    /// Tasks with no content
    pub not_started_tasks: usize,

    /// completed / total * 100, 0 when there are no tasks
    pub completion_rate: f64,

    /// Mean days from first write to completion
    pub average_time_to_complete: f64,

    /// Consecutive days with completions ending today or yesterday
    pub current_streak: u32,

    /// Longest run of consecutive completion days ever
    pub best_streak: u32,

    /// Completions per day over the trailing week
    pub velocity: f64,

    /// Percentage change of daily completions, last 7 buckets vs the 7 before
    pub efficiency: f64,

    /// Daily completion buckets, oldest first, at most 30
    pub completion_trend: Vec<TrendPoint>,

    /// Most recent completions, newest first, at most 10
    pub recent_activity: Vec<RecentCompletion>,

    /// Per-unit breakdown in unit id order
    pub units: Vec<UnitStats>,
}

/// One calendar day of completions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// ISO date (`YYYY-MM-DD`)
    pub date: String,

    /// Completions on this day
    pub completed: u32,

    /// Completions up to and including this day
    pub cumulative: u32,
}

/// A completed task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentCompletion {
    /// Unit the task belongs to
    pub unit_id: UnitId,

    /// Unit title
    pub unit_title: String,

    /// Task id
    pub task_id: TaskId,

    /// Task description
    pub description: String,

    /// Resolved completion date
    pub completed_at: Time,
}

/// Counts for one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitStats {
    /// Unit id
    pub unit_id: UnitId,

    /// Unit title
    pub title: String,

    /// Distinct tasks
    pub total_tasks: usize,

    /// Completed tasks
    pub completed_tasks: usize,

    /// In-progress tasks
    pub in_progress_tasks: usize,

    /// Not-started tasks
    pub not_started_tasks: usize,

    /// completed / total * 100
    pub completion_rate: f64,
}
