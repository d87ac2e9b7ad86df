//! Unit summaries - the listing projection of a unit and its progress.

use serde::{Deserialize, Serialize};
use crate::id::UnitId;
use crate::progress::Progress;
use crate::unit::Unit;
use crate::Time;

/// Denormalized listing row for a unit.
///
/// `total_tasks` and `completed_tasks` are a cache over the unit content and
/// its progress; [`UnitSummary::project`] is the only place they are computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSummary {
    /// Unit id
    pub id: UnitId,

    /// Unit title
    pub title: String,

    /// Distinct tasks in the unit
    pub total_tasks: usize,

    /// Completed tasks
    pub completed_tasks: usize,

    /// When the unit was added
    pub date_added: Time,

    /// Last learner activity in the unit
    #[serde(default)]
    pub last_activity: Option<Time>,
}

impl UnitSummary {
    /// Summary for a freshly added unit.
    pub fn for_unit(unit: &Unit, now: Time) -> Self {
        Self {
            id: unit.id.clone(),
            title: unit.title.clone(),
            total_tasks: unit.total_tasks(),
            completed_tasks: 0,
            date_added: now,
            last_activity: None,
        }
    }

    /// Recompute the cached fields from the authoritative state.
    ///
    /// `unit` refreshes title and total when the content is available.
    pub fn project(&mut self, unit: Option<&Unit>, progress: Option<&Progress>) {
        if let Some(unit) = unit {
            self.title = unit.title.clone();
            self.total_tasks = unit.total_tasks();
        }
        match progress {
            Some(progress) => {
                self.completed_tasks = progress.completed_count();
                self.last_activity = Some(progress.last_activity);
            }
            None => self.completed_tasks = 0,
        }
    }

    /// Completion percentage, 0 for an empty unit.
    pub fn completion_rate(&self) -> f64 {
        if self.total_tasks == 0 {
            0.0
        } else {
            self.completed_tasks as f64 / self.total_tasks as f64 * 100.0
        }
    }
}
