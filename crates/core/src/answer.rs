//! Student answers.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use crate::id::TaskId;
use crate::status::{StatusEntry, TaskStatus};
use crate::Time;

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid markup pattern"));

/// A learner's answer to one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAnswer {
    /// Task this answer belongs to
    pub task_id: TaskId,

    /// Rich-text content serialized as markup
    #[serde(default)]
    pub content: String,

    /// First write
    pub submission_date: Time,

    /// Last content or feedback write
    pub last_modified: Time,

    /// Starts at 1, incremented on each content update
    pub version: u32,

    /// Completion flag, only ever set by the learner
    #[serde(default)]
    pub is_good_enough: bool,

    /// Latest feedback text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,

    /// Whether feedback has been requested for this answer
    #[serde(default)]
    pub feedback_requested: bool,

    /// Append-only status transitions, oldest first
    #[serde(default)]
    pub status_history: Vec<StatusEntry>,
}

impl StudentAnswer {
    /// Create a first-version answer.
    pub fn new(task_id: TaskId, content: impl Into<String>, now: Time) -> Self {
        Self {
            task_id,
            content: content.into(),
            submission_date: now,
            last_modified: now,
            version: 1,
            is_good_enough: false,
            feedback: None,
            feedback_requested: false,
            status_history: Vec::new(),
        }
    }

    /// Content with markup tags and non-breaking spaces removed, trimmed.
    pub fn plain_text(&self) -> String {
        MARKUP_TAG
            .replace_all(&self.content, " ")
            .replace("&nbsp;", " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// True when the answer holds visible text.
    pub fn has_content(&self) -> bool {
        !self.plain_text().is_empty()
    }

    /// Derived status of this answer.
    pub fn status(&self) -> TaskStatus {
        TaskStatus::derive(Some(self))
    }

    /// Timestamp of the most recent transition into `completed`, if any.
    pub fn last_completed_at(&self) -> Option<Time> {
        self.status_history
            .iter()
            .filter(|e| e.status == TaskStatus::Completed)
            .map(|e| e.timestamp)
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_plain_text_strips_markup() {
        let answer = StudentAnswer::new(
            TaskId::from("t1"),
            "<p>Hello&nbsp;<strong>world</strong></p><table><tr><td>x</td></tr></table>",
            Utc::now(),
        );
        assert_eq!(answer.plain_text(), "Hello world x");
        assert!(answer.has_content());
    }

    #[test]
    fn test_empty_markup_has_no_content() {
        let answer = StudentAnswer::new(TaskId::from("t1"), "<p><br></p>&nbsp;", Utc::now());
        assert!(!answer.has_content());
    }

    #[test]
    fn test_last_completed_at_picks_latest_completion() {
        let t0 = Utc::now();
        let mut answer = StudentAnswer::new(TaskId::from("t1"), "x", t0);
        answer.status_history = vec![
            StatusEntry {
                timestamp: t0,
                status: TaskStatus::Completed,
                previous_status: TaskStatus::InProgress,
            },
            StatusEntry {
                timestamp: t0 + Duration::hours(1),
                status: TaskStatus::InProgress,
                previous_status: TaskStatus::Completed,
            },
            StatusEntry {
                timestamp: t0 + Duration::hours(2),
                status: TaskStatus::Completed,
                previous_status: TaskStatus::InProgress,
            },
        ];
        assert_eq!(answer.last_completed_at(), Some(t0 + Duration::hours(2)));
    }
}
