//! Derived task status.
//!
//! Status is never stored directly; it is computed from the answer on read.
//! `statusHistory` entries record the transitions between these values.

use serde::{Deserialize, Serialize};
use crate::answer::StudentAnswer;
use crate::Time;

/// Task status state machine: not-started → in-progress → completed.
///
/// `Completed` is sticky: content edits never leave it, only clearing the
/// completion flag does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// No answer, or an answer with no content
    NotStarted,
    /// Answer with content that is not yet marked good enough
    InProgress,
    /// Answer explicitly marked good enough by the learner
    Completed,
}

impl TaskStatus {
    /// Derive the status of a task from its answer, if any.
    pub fn derive(answer: Option<&StudentAnswer>) -> Self {
        match answer {
            None => TaskStatus::NotStarted,
            Some(a) if a.is_good_enough => TaskStatus::Completed,
            Some(a) if a.has_content() => TaskStatus::InProgress,
            Some(_) => TaskStatus::NotStarted,
        }
    }

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not-started",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    /// When the transition happened
    pub timestamp: Time,

    /// Status after the transition
    pub status: TaskStatus,

    /// Status before the transition
    pub previous_status: TaskStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TaskId;

    #[test]
    fn test_derive_status() {
        let now = chrono::Utc::now();
        assert_eq!(TaskStatus::derive(None), TaskStatus::NotStarted);

        let mut answer = StudentAnswer::new(TaskId::from("t1"), "<p></p>", now);
        assert_eq!(TaskStatus::derive(Some(&answer)), TaskStatus::NotStarted);

        answer.content = "<p>draft</p>".to_string();
        assert_eq!(TaskStatus::derive(Some(&answer)), TaskStatus::InProgress);

        answer.is_good_enough = true;
        assert_eq!(TaskStatus::derive(Some(&answer)), TaskStatus::Completed);

        answer.content.clear();
        assert_eq!(TaskStatus::derive(Some(&answer)), TaskStatus::Completed);
    }

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&TaskStatus::NotStarted).unwrap();
        assert_eq!(json, "\"not-started\"");
        let parsed: TaskStatus = serde_json::from_str("\"in-progress\"").unwrap();
        assert_eq!(parsed, TaskStatus::InProgress);
    }
}
