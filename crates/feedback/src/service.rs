//! Requesting feedback and attaching it to answers.

use std::sync::Arc;

use tracing::{info, warn};
use unitrack_core::{TaskId, Unit};
use unitrack_progress::{ProgressError, ProgressStore};

use crate::client::FeedbackGateway;
use crate::error::{FeedbackError, Result};
use crate::request::FeedbackRequest;

/// Prefix of the entry stored when the service fails.
pub const ERROR_PREFIX: &str = "Error getting feedback: ";

/// Feedback ready to be attached to a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFeedback {
    /// Task the feedback was requested for
    pub task_id: TaskId,

    /// Text to store on the answer
    pub text: String,

    /// True when `text` reports a failed request
    pub failed: bool,

    /// Learner's current task when the request was sent
    pub cursor: Option<TaskId>,
}

/// Outcome of applying feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// Stored on the answer
    Stored(PendingFeedback),

    /// Dropped because the learner moved while the request was in flight
    Discarded(PendingFeedback),
}

/// Requests feedback for answers and applies the replies.
#[derive(Clone)]
pub struct FeedbackService {
    gateway: Arc<dyn FeedbackGateway>,
}

impl FeedbackService {
    /// Service backed by `gateway`.
    pub fn new(gateway: Arc<dyn FeedbackGateway>) -> Self {
        Self { gateway }
    }

    /// Ask for feedback on the current answer to `task_id`.
    ///
    /// Service failures do not error; they come back as a failed pending
    /// entry so the learner sees them on the task.
    pub async fn request(
        &self,
        store: &ProgressStore,
        unit: &Unit,
        task_id: &TaskId,
        feedback_type: &str,
    ) -> Result<PendingFeedback> {
        let (outcome, task) = unit
            .find_task(task_id)
            .ok_or_else(|| FeedbackError::TaskNotFound(task_id.clone()))?;
        let answer = store
            .answer(task_id)
            .ok_or_else(|| ProgressError::AnswerNotFound(task_id.clone()))?;

        let request = FeedbackRequest::new(
            unit.id.clone(),
            outcome,
            task,
            answer.plain_text(),
            feedback_type,
        );

        let cursor = store.current_task().cloned();
        let pending = match self.gateway.request(&request).await {
            Ok(response) => PendingFeedback {
                task_id: task_id.clone(),
                text: response.render(),
                failed: false,
                cursor,
            },
            Err(e) => {
                warn!(task_id = %task_id, error = %e, "Feedback request failed");
                PendingFeedback {
                    task_id: task_id.clone(),
                    text: format!("{}{}", ERROR_PREFIX, e),
                    failed: true,
                    cursor,
                }
            }
        };
        Ok(pending)
    }

    /// Attach `pending` unless the learner's cursor changed since the request
    /// was sent. The task the feedback is for need not be the cursor.
    pub async fn apply(&self, store: &mut ProgressStore, pending: PendingFeedback) -> Result<Applied> {
        if store.current_task() != pending.cursor.as_ref() {
            warn!(
                task_id = %pending.task_id,
                requested_at = ?pending.cursor,
                current = ?store.current_task(),
                "Discarding feedback, the learner moved while it was requested"
            );
            return Ok(Applied::Discarded(pending));
        }

        store.add_feedback(&pending.task_id, pending.text.clone()).await?;
        info!(task_id = %pending.task_id, failed = pending.failed, "Feedback stored");
        Ok(Applied::Stored(pending))
    }

    /// Request feedback and attach it in one step.
    pub async fn request_and_apply(
        &self,
        store: &mut ProgressStore,
        unit: &Unit,
        task_id: &TaskId,
        feedback_type: &str,
    ) -> Result<Applied> {
        let pending = self.request(store, unit, task_id, feedback_type).await?;
        self.apply(store, pending).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::TimeZone;
    use unitrack_core::{
        Clock, FixedClock, LearningOutcome, OutcomeId, Task, TaskStatus, TaskType, UnitId,
    };
    use unitrack_progress::UnitCatalog;
    use unitrack_storage::MemoryStore;

    use crate::request::{FeedbackResponse, DEFAULT_FEEDBACK_TYPE};

    struct FakeGateway {
        reply: Option<FeedbackResponse>,
        seen: Mutex<Vec<FeedbackRequest>>,
    }

    #[async_trait]
    impl FeedbackGateway for FakeGateway {
        async fn request(&self, request: &FeedbackRequest) -> Result<FeedbackResponse> {
            self.seen.lock().unwrap().push(request.clone());
            self.reply.clone().ok_or(FeedbackError::Status {
                status: 503,
                body: "unavailable".into(),
            })
        }
    }

    fn gateway(reply: Option<FeedbackResponse>) -> Arc<FakeGateway> {
        Arc::new(FakeGateway {
            reply,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn reply() -> FeedbackResponse {
        FeedbackResponse {
            feedback_message: "Clear explanation.".into(),
            feedback_type: Some(DEFAULT_FEEDBACK_TYPE.into()),
            level: Some("Pass".into()),
            score: Some(0.5),
        }
    }

    fn unit() -> Unit {
        let task = |id: &str| Task {
            id: TaskId::from(id),
            description: format!("Task {}", id),
            task_type: TaskType::Standard,
            acceptance_criteria: vec![],
        };
        Unit {
            id: UnitId::from("u1"),
            title: "Networking".into(),
            scenario: String::new(),
            instructions: String::new(),
            learning_outcomes: vec![LearningOutcome {
                id: OutcomeId::from("lo1"),
                description: "Outcome".into(),
                tasks: vec![task("t1"), task("t2")],
                indicative_content: vec![],
            }],
        }
    }

    async fn store() -> ProgressStore {
        let now = chrono::Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(now));
        let catalog = UnitCatalog::new(Arc::new(MemoryStore::new()), clock);
        catalog.add_unit(unit()).await.unwrap();
        let mut store = ProgressStore::open(catalog, UnitId::from("u1")).await.unwrap();
        store
            .update_answer(&TaskId::from("t1"), "<p>VLANs <b>segment</b> traffic</p>")
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_feedback_is_rendered_and_stored() {
        let gateway = gateway(Some(reply()));
        let service = FeedbackService::new(gateway.clone());
        let mut store = store().await;
        let t1 = TaskId::from("t1");

        let applied = service
            .request_and_apply(&mut store, &unit(), &t1, DEFAULT_FEEDBACK_TYPE)
            .await
            .unwrap();
        assert!(matches!(applied, Applied::Stored(ref p) if !p.failed));

        let answer = store.answer(&t1).unwrap();
        assert_eq!(
            answer.feedback.as_deref(),
            Some("Clear explanation.\n\nLevel: Pass\nScore: 50%")
        );
        assert!(answer.feedback_requested);
        assert_eq!(store.status(&t1), TaskStatus::InProgress);

        let seen = gateway.seen.lock().unwrap();
        assert_eq!(seen[0].answer_text, "VLANs segment traffic");
    }

    #[tokio::test]
    async fn test_failure_becomes_error_entry() {
        let service = FeedbackService::new(gateway(None));
        let mut store = store().await;
        let t1 = TaskId::from("t1");

        let applied = service
            .request_and_apply(&mut store, &unit(), &t1, DEFAULT_FEEDBACK_TYPE)
            .await
            .unwrap();
        assert!(matches!(applied, Applied::Stored(ref p) if p.failed));

        let feedback = store.answer(&t1).unwrap().feedback.clone().unwrap();
        assert!(feedback.starts_with(ERROR_PREFIX));
        assert!(feedback.contains("503"));
    }

    #[tokio::test]
    async fn test_stale_reply_is_discarded() {
        let service = FeedbackService::new(gateway(Some(reply())));
        let mut store = store().await;
        let t1 = TaskId::from("t1");
        store
            .set_current_task(OutcomeId::from("lo1"), t1.clone())
            .await
            .unwrap();

        let pending = service
            .request(&store, &unit(), &t1, DEFAULT_FEEDBACK_TYPE)
            .await
            .unwrap();
        store
            .set_current_task(OutcomeId::from("lo1"), TaskId::from("t2"))
            .await
            .unwrap();

        let applied = service.apply(&mut store, pending).await.unwrap();
        assert!(matches!(applied, Applied::Discarded(_)));
        assert!(store.answer(&t1).unwrap().feedback.is_none());
    }

    #[tokio::test]
    async fn test_reply_for_task_off_the_cursor_is_stored() {
        let service = FeedbackService::new(gateway(Some(reply())));
        let mut store = store().await;
        let t2 = TaskId::from("t2");
        store
            .set_current_task(OutcomeId::from("lo1"), TaskId::from("t1"))
            .await
            .unwrap();
        store.update_answer(&t2, "<p>Trunk ports carry tags</p>").await.unwrap();

        let applied = service
            .request_and_apply(&mut store, &unit(), &t2, DEFAULT_FEEDBACK_TYPE)
            .await
            .unwrap();
        assert!(matches!(applied, Applied::Stored(ref p) if p.cursor == Some(TaskId::from("t1"))));
        assert!(store.answer(&t2).unwrap().feedback.is_some());
    }

    #[tokio::test]
    async fn test_cursor_set_during_request_discards_reply() {
        let service = FeedbackService::new(gateway(Some(reply())));
        let mut store = store().await;
        let t1 = TaskId::from("t1");

        let pending = service
            .request(&store, &unit(), &t1, DEFAULT_FEEDBACK_TYPE)
            .await
            .unwrap();
        assert_eq!(pending.cursor, None);
        store
            .set_current_task(OutcomeId::from("lo1"), t1.clone())
            .await
            .unwrap();

        let applied = service.apply(&mut store, pending).await.unwrap();
        assert!(matches!(applied, Applied::Discarded(_)));
        assert!(store.answer(&t1).unwrap().feedback.is_none());
    }

    #[tokio::test]
    async fn test_requires_known_task_and_answer() {
        let service = FeedbackService::new(gateway(Some(reply())));
        let store = store().await;

        let err = service
            .request(&store, &unit(), &TaskId::from("nope"), DEFAULT_FEEDBACK_TYPE)
            .await
            .unwrap_err();
        assert!(matches!(err, FeedbackError::TaskNotFound(_)));

        let err = service
            .request(&store, &unit(), &TaskId::from("t2"), DEFAULT_FEEDBACK_TYPE)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FeedbackError::Progress(ProgressError::AnswerNotFound(_))
        ));
    }
}
