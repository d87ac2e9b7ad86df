//! Unit model - immutable learning content.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use crate::id::{CriterionId, OutcomeId, TaskId, UnitId};

/// A unit is a learning module made of learning outcomes and their tasks.
///
/// Units are created by upload or import and are never mutated by the learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    /// Unique identifier
    pub id: UnitId,

    /// Unit title
    pub title: String,

    /// Scenario the learner works within
    #[serde(default)]
    pub scenario: String,

    /// General instructions
    #[serde(default)]
    pub instructions: String,

    /// Ordered learning outcomes
    pub learning_outcomes: Vec<LearningOutcome>,
}

/// A grouped set of tasks sharing an educational objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningOutcome {
    /// Identifier within the unit
    pub id: OutcomeId,

    /// What the learner should be able to do
    pub description: String,

    /// Tasks assessing this outcome
    #[serde(default)]
    pub tasks: Vec<Task>,

    /// Indicative content bullets
    #[serde(default)]
    pub indicative_content: Vec<String>,
}

/// An individual assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Identifier, unique within the unit
    pub id: TaskId,

    /// Task description
    pub description: String,

    /// Grading tier
    #[serde(rename = "type", default)]
    pub task_type: TaskType,

    /// Acceptance criteria
    #[serde(default)]
    pub acceptance_criteria: Vec<AcceptanceCriterion>,
}

/// Grading tier of a task. A label, not an ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// Pass-level task
    #[default]
    Standard,
    /// Merit-level task
    Merit,
    /// Distinction-level task
    Distinction,
}

impl TaskType {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Standard => "standard",
            TaskType::Merit => "merit",
            TaskType::Distinction => "distinction",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A criterion a task answer is judged against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceCriterion {
    /// Identifier
    pub id: CriterionId,

    /// Criterion text
    pub text: String,
}

/// Reasons a unit upload is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitValidationError {
    /// Unit id is empty
    #[error("unit id is empty")]
    MissingId,

    /// Unit id cannot be used in a storage name
    #[error("unit id {0:?} contains a path separator, '..' or NUL")]
    UnsafeId(UnitId),

    /// Unit title is empty
    #[error("unit {0} has no title")]
    MissingTitle(UnitId),

    /// Unit has no learning outcomes
    #[error("unit {0} has no learning outcomes")]
    NoOutcomes(UnitId),

    /// A learning outcome has an empty id
    #[error("unit {0} has a learning outcome without an id")]
    OutcomeWithoutId(UnitId),

    /// A task has an empty id
    #[error("learning outcome {0} has a task without an id")]
    TaskWithoutId(OutcomeId),
}

impl Unit {
    /// Check the structural rules an uploaded unit must satisfy.
    pub fn validate(&self) -> Result<(), UnitValidationError> {
        if self.id.is_blank() {
            return Err(UnitValidationError::MissingId);
        }
        if !self.id.is_path_safe() {
            return Err(UnitValidationError::UnsafeId(self.id.clone()));
        }
        if self.title.trim().is_empty() {
            return Err(UnitValidationError::MissingTitle(self.id.clone()));
        }
        if self.learning_outcomes.is_empty() {
            return Err(UnitValidationError::NoOutcomes(self.id.clone()));
        }
        for outcome in &self.learning_outcomes {
            if outcome.id.is_blank() {
                return Err(UnitValidationError::OutcomeWithoutId(self.id.clone()));
            }
            if outcome.tasks.iter().any(|t| t.id.is_blank()) {
                return Err(UnitValidationError::TaskWithoutId(outcome.id.clone()));
            }
        }
        Ok(())
    }

    /// Tasks flattened in outcome order, then task order, first occurrence of
    /// each task id only.
    pub fn unique_tasks(&self) -> Vec<(&LearningOutcome, &Task)> {
        flatten_tasks(&self.learning_outcomes)
    }

    /// Number of distinct tasks in the unit.
    pub fn total_tasks(&self) -> usize {
        self.unique_tasks().len()
    }

    /// Find a task and the first outcome that references it.
    pub fn find_task(&self, task_id: &TaskId) -> Option<(&LearningOutcome, &Task)> {
        self.learning_outcomes.iter().find_map(|outcome| {
            outcome
                .tasks
                .iter()
                .find(|t| &t.id == task_id)
                .map(|t| (outcome, t))
        })
    }

    /// Find a learning outcome by id.
    pub fn outcome(&self, outcome_id: &OutcomeId) -> Option<&LearningOutcome> {
        self.learning_outcomes.iter().find(|o| &o.id == outcome_id)
    }
}

/// Flatten outcomes into `(outcome, task)` pairs, skipping task ids already
/// seen in an earlier position.
pub fn flatten_tasks(outcomes: &[LearningOutcome]) -> Vec<(&LearningOutcome, &Task)> {
    let mut seen: HashSet<&TaskId> = HashSet::new();
    let mut tasks = Vec::new();
    for outcome in outcomes {
        for task in &outcome.tasks {
            if seen.insert(&task.id) {
                tasks.push((outcome, task));
            }
        }
    }
    tasks
}
