//! Progress aggregate - one learner's state within one unit.

use serde::{Deserialize, Serialize};
use crate::answer::StudentAnswer;
use crate::id::{OutcomeId, TaskId, UnitId};
use crate::status::TaskStatus;
use crate::Time;

/// The learner's record for one unit.
///
/// Completion lives on each answer's `is_good_enough` flag. The
/// `completedTasks` list found on the wire is derived from those flags when
/// writing and folded back into them when reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProgressRecord", into = "ProgressRecord")]
pub struct Progress {
    /// Unit this progress belongs to
    pub unit_id: UnitId,

    /// Resume cursor: learning outcome
    pub current_lo: Option<OutcomeId>,

    /// Resume cursor: task
    pub current_task: Option<TaskId>,

    /// One answer per touched task
    pub answers: Vec<StudentAnswer>,

    /// First interaction with the unit
    pub start_date: Time,

    /// Last interaction with the unit
    pub last_activity: Time,
}

impl Progress {
    /// Create an empty aggregate.
    pub fn new(unit_id: UnitId, now: Time) -> Self {
        Self {
            unit_id,
            current_lo: None,
            current_task: None,
            answers: Vec::new(),
            start_date: now,
            last_activity: now,
        }
    }

    /// Answer for a task.
    pub fn answer(&self, task_id: &TaskId) -> Option<&StudentAnswer> {
        self.answers.iter().find(|a| &a.task_id == task_id)
    }

    /// Mutable answer for a task.
    pub fn answer_mut(&mut self, task_id: &TaskId) -> Option<&mut StudentAnswer> {
        self.answers.iter_mut().find(|a| &a.task_id == task_id)
    }

    /// Derived status of a task.
    pub fn status(&self, task_id: &TaskId) -> TaskStatus {
        TaskStatus::derive(self.answer(task_id))
    }

    /// Ids of completed tasks, in answer order.
    pub fn completed_tasks(&self) -> Vec<&TaskId> {
        self.answers
            .iter()
            .filter(|a| a.is_good_enough)
            .map(|a| &a.task_id)
            .collect()
    }

    /// Number of completed tasks.
    pub fn completed_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_good_enough).count()
    }
}

/// Wire shape of [`Progress`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgressRecord {
    unit_id: UnitId,
    #[serde(rename = "currentLO", default)]
    current_lo: Option<OutcomeId>,
    #[serde(default)]
    current_task: Option<TaskId>,
    #[serde(default)]
    completed_tasks: Vec<TaskId>,
    #[serde(default)]
    answers: Vec<StudentAnswer>,
    start_date: Time,
    last_activity: Time,
}

impl From<ProgressRecord> for Progress {
    fn from(record: ProgressRecord) -> Self {
        let mut progress = Progress {
            unit_id: record.unit_id,
            current_lo: record.current_lo,
            current_task: record.current_task,
            answers: record.answers,
            start_date: record.start_date,
            last_activity: record.last_activity,
        };

        // Either signal marks a task complete.
        for task_id in record.completed_tasks {
            match progress.answer_mut(&task_id) {
                Some(answer) => answer.is_good_enough = true,
                None => {
                    let mut answer =
                        StudentAnswer::new(task_id, String::new(), record.last_activity);
                    answer.is_good_enough = true;
                    progress.answers.push(answer);
                }
            }
        }

        progress
    }
}

impl From<Progress> for ProgressRecord {
    fn from(progress: Progress) -> Self {
        let completed_tasks = progress.completed_tasks().into_iter().cloned().collect();
        ProgressRecord {
            unit_id: progress.unit_id,
            current_lo: progress.current_lo,
            current_task: progress.current_task,
            completed_tasks,
            answers: progress.answers,
            start_date: progress.start_date,
            last_activity: progress.last_activity,
        }
    }
}
