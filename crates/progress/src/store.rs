//! Progress store - read/write access to one unit's progress.

use std::sync::Arc;

use tracing::{debug, info};
use unitrack_core::{
    flatten_tasks, Clock, LearningOutcome, OutcomeId, Progress, StudentAnswer, Task, TaskId,
    TaskStatus, UnitId,
};

use crate::catalog::{progress_key, UnitCatalog};
use crate::error::{ProgressError, Result};
use crate::history::record_transition;

/// Owns one unit's [`Progress`] aggregate.
///
/// Every mutation runs to completion, persists the whole aggregate and
/// refreshes the unit's summary before returning. Writes are last-write-wins.
pub struct ProgressStore {
    catalog: UnitCatalog,
    clock: Arc<dyn Clock>,
    progress: Progress,
}

impl ProgressStore {
    /// Load the stored progress for `unit_id`, or start a fresh aggregate.
    ///
    /// A fresh aggregate is not written until the first mutation.
    pub async fn open(catalog: UnitCatalog, unit_id: UnitId) -> Result<Self> {
        let clock = catalog.clock().clone();
        let progress = match catalog.load_progress(&unit_id).await? {
            Some(progress) => progress,
            None => {
                debug!(unit_id = %unit_id, "Starting fresh progress");
                Progress::new(unit_id, clock.now())
            }
        };
        Ok(Self { catalog, clock, progress })
    }

    /// Remove a unit's stored progress.
    pub async fn delete(catalog: &UnitCatalog, unit_id: &UnitId) -> Result<()> {
        catalog.storage().remove(&progress_key(unit_id)).await?;
        Ok(())
    }

    /// Current aggregate.
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Unit this store tracks.
    pub fn unit_id(&self) -> &UnitId {
        &self.progress.unit_id
    }

    /// Answer for a task.
    pub fn answer(&self, task_id: &TaskId) -> Option<&StudentAnswer> {
        self.progress.answer(task_id)
    }

    /// Derived status of a task.
    pub fn status(&self, task_id: &TaskId) -> TaskStatus {
        self.progress.status(task_id)
    }

    /// Task the learner was last working on.
    pub fn current_task(&self) -> Option<&TaskId> {
        self.progress.current_task.as_ref()
    }

    /// Write new content for a task, creating the answer on first write.
    pub async fn update_answer(
        &mut self,
        task_id: &TaskId,
        content: impl Into<String>,
    ) -> Result<&StudentAnswer> {
        let now = self.clock.now();
        let content = content.into();
        let previous = self.progress.status(task_id);

        let index = match self.index_of(task_id) {
            Some(i) => {
                let answer = &mut self.progress.answers[i];
                answer.content = content;
                answer.last_modified = now;
                answer.version += 1;
                i
            }
            None => {
                self.progress
                    .answers
                    .push(StudentAnswer::new(task_id.clone(), content, now));
                self.progress.answers.len() - 1
            }
        };

        let answer = &mut self.progress.answers[index];
        record_transition(answer, previous, now);
        debug!(task_id = %task_id, version = answer.version, "Answer updated");

        self.progress.last_activity = now;
        self.persist().await?;
        Ok(&self.progress.answers[index])
    }

    /// Set or clear the completion flag. Returns the resulting status.
    ///
    /// Marking a task without an answer complete creates an empty answer for
    /// it; clearing the flag on a missing answer does nothing.
    pub async fn mark_as_good_enough(&mut self, task_id: &TaskId, flag: bool) -> Result<TaskStatus> {
        let now = self.clock.now();
        let previous = self.progress.status(task_id);

        let index = match self.index_of(task_id) {
            Some(i) => i,
            None if flag => {
                self.progress
                    .answers
                    .push(StudentAnswer::new(task_id.clone(), String::new(), now));
                self.progress.answers.len() - 1
            }
            None => return Ok(previous),
        };

        let answer = &mut self.progress.answers[index];
        answer.is_good_enough = flag;
        record_transition(answer, previous, now);
        let status = answer.status();

        info!(task_id = %task_id, status = %status, "Completion flag set");
        self.progress.last_activity = now;
        self.persist().await?;
        Ok(status)
    }

    /// Mark a task complete.
    pub async fn mark_task_complete(&mut self, task_id: &TaskId) -> Result<TaskStatus> {
        self.mark_as_good_enough(task_id, true).await
    }

    /// Mark a task incomplete.
    pub async fn mark_task_incomplete(&mut self, task_id: &TaskId) -> Result<TaskStatus> {
        self.mark_as_good_enough(task_id, false).await
    }

    /// Attach feedback to an existing answer. Completion is untouched.
    pub async fn add_feedback(&mut self, task_id: &TaskId, feedback: impl Into<String>) -> Result<()> {
        let now = self.clock.now();
        let index = self
            .index_of(task_id)
            .ok_or_else(|| ProgressError::AnswerNotFound(task_id.clone()))?;

        let answer = &mut self.progress.answers[index];
        answer.feedback = Some(feedback.into());
        answer.feedback_requested = true;
        answer.last_modified = now;

        self.progress.last_activity = now;
        self.persist().await
    }

    /// Move the resume cursor.
    pub async fn set_current_task(&mut self, lo_id: OutcomeId, task_id: TaskId) -> Result<()> {
        self.progress.current_lo = Some(lo_id);
        self.progress.current_task = Some(task_id);
        self.progress.last_activity = self.clock.now();
        self.persist().await
    }

    /// Task following the cursor in outcome order, without repeating task ids
    /// shared between outcomes.
    ///
    /// With no cursor the first task is returned; a cursor that is not part of
    /// `learning_outcomes` yields `None`.
    pub fn next_task<'a>(
        &self,
        learning_outcomes: &'a [LearningOutcome],
    ) -> Option<(&'a LearningOutcome, &'a Task)> {
        let tasks = flatten_tasks(learning_outcomes);
        match &self.progress.current_task {
            None => tasks.into_iter().next(),
            Some(current) => {
                let position = tasks.iter().position(|(_, t)| &t.id == current)?;
                tasks.into_iter().nth(position + 1)
            }
        }
    }

    fn index_of(&self, task_id: &TaskId) -> Option<usize> {
        self.progress.answers.iter().position(|a| &a.task_id == task_id)
    }

    async fn persist(&self) -> Result<()> {
        self.catalog.save_progress(&self.progress).await?;
        self.catalog.refresh_summary(&self.progress).await
    }
}
