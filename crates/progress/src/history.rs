//! Status history tracking.
//!
//! Every mutation that can change a task's derived status captures the status
//! before the write and hands it here afterwards. A transition is appended
//! only when the status actually changed; existing entries are never touched.

use unitrack_core::{StatusEntry, StudentAnswer, TaskStatus, Time};
use tracing::debug;

/// Append a transition to `answer` if its derived status differs from
/// `previous`. Returns the appended entry.
///
/// Entries stay chronological: a timestamp earlier than the last recorded one
/// is clamped to it.
pub fn record_transition(
    answer: &mut StudentAnswer,
    previous: TaskStatus,
    at: Time,
) -> Option<&StatusEntry> {
    let status = answer.status();
    if status == previous {
        return None;
    }

    let timestamp = match answer.status_history.last() {
        Some(last) if last.timestamp > at => last.timestamp,
        _ => at,
    };

    debug!(
        task_id = %answer.task_id,
        from = %previous,
        to = %status,
        "Status transition"
    );

    answer.status_history.push(StatusEntry {
        timestamp,
        status,
        previous_status: previous,
    });
    answer.status_history.last()
}
