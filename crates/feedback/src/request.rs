//! Wire types of the feedback service.

use serde::{Deserialize, Serialize};
use unitrack_core::{LearningOutcome, OutcomeId, Task, TaskId, TaskType, UnitId};

/// Feedback type used when the caller does not pick one.
pub const DEFAULT_FEEDBACK_TYPE: &str = "detailed";

/// A request to score one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    /// Unit the task belongs to
    pub unit_id: UnitId,

    /// Task being answered
    pub outcome_task_id: TaskId,

    /// Answer as plain text
    pub answer_text: String,

    /// Kind of feedback wanted
    pub feedback_type: String,

    /// The task as the scorer sees it
    pub task_details: TaskDetails,

    /// The outcome the task assesses
    pub learning_outcome: OutcomeDetails,
}

/// Task context sent with a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDetails {
    /// Task description
    pub description: String,

    /// Grading tier
    #[serde(rename = "type")]
    pub task_type: TaskType,

    /// Criterion texts
    pub acceptance_criteria: Vec<String>,
}

/// Outcome context sent with a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeDetails {
    /// Outcome id
    pub id: OutcomeId,

    /// Outcome description
    pub description: String,

    /// Indicative content bullets
    pub indicative_content: Vec<String>,
}

/// The scorer's reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    /// Feedback text
    pub feedback_message: String,

    /// Echo of the requested feedback type
    #[serde(default)]
    pub feedback_type: Option<String>,

    /// Attainment level label
    #[serde(default)]
    pub level: Option<String>,

    /// Score as a 0-1 fraction
    #[serde(default)]
    pub score: Option<f64>,
}

impl FeedbackRequest {
    /// Request for `task` of `outcome` with the given answer text.
    pub fn new(
        unit_id: UnitId,
        outcome: &LearningOutcome,
        task: &Task,
        answer_text: impl Into<String>,
        feedback_type: impl Into<String>,
    ) -> Self {
        Self {
            unit_id,
            outcome_task_id: task.id.clone(),
            answer_text: answer_text.into(),
            feedback_type: feedback_type.into(),
            task_details: TaskDetails {
                description: task.description.clone(),
                task_type: task.task_type,
                acceptance_criteria: task
                    .acceptance_criteria
                    .iter()
                    .map(|c| c.text.clone())
                    .collect(),
            },
            learning_outcome: OutcomeDetails {
                id: outcome.id.clone(),
                description: outcome.description.clone(),
                indicative_content: outcome.indicative_content.clone(),
            },
        }
    }
}

impl FeedbackResponse {
    /// Text stored on the answer: the message, then level and score lines.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        if let Some(level) = &self.level {
            lines.push(format!("Level: {}", level));
        }
        if let Some(score) = self.score {
            lines.push(format!("Score: {}%", (score * 100.0).round() as i64));
        }

        if lines.is_empty() {
            self.feedback_message.clone()
        } else {
            format!("{}\n\n{}", self.feedback_message, lines.join("\n"))
        }
    }
}
