//! Analytics engine.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{FixedOffset, Local, NaiveDate};
use tracing::debug;
use unitrack_core::{StudentAnswer, TaskId, TaskStatus, Time, UnitId, UnitSummary};

use crate::source::AnalyticsSource;
use crate::stats::{ProgressStats, RecentCompletion, UnitStats};
use crate::streak::{best_streak, current_streak};
use crate::trend::{completion_trend, efficiency, velocity};

/// Entries kept in recent activity.
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

const SECONDS_PER_DAY: i64 = 86_400;

/// Per-task facts the aggregate metrics are built from.
#[derive(Debug, Clone)]
struct TaskRecord {
    unit_id: UnitId,
    unit_title: String,
    task_id: TaskId,
    description: String,
    status: TaskStatus,
    completed_at: Option<Time>,
    days_to_complete: Option<i64>,
}

/// How timestamps are assigned to calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayBoundary {
    /// Host time zone, resolved per timestamp so days stay right across
    /// daylight-saving changes
    Local,

    /// One offset for every timestamp
    Fixed(FixedOffset),
}

/// Computes [`ProgressStats`] from stored data.
///
/// Stateless apart from the day boundary used to assign completions to
/// calendar days; the same inputs always give the same output.
#[derive(Debug, Clone, Copy)]
pub struct AnalyticsEngine {
    days: DayBoundary,
}

impl AnalyticsEngine {
    /// Engine using the host's time zone.
    pub fn local() -> Self {
        Self {
            days: DayBoundary::Local,
        }
    }

    /// Engine using an explicit offset.
    pub fn with_offset(offset: FixedOffset) -> Self {
        Self {
            days: DayBoundary::Fixed(offset),
        }
    }

    /// Day boundary used for truncation.
    pub fn day_boundary(&self) -> DayBoundary {
        self.days
    }

    /// Compute stats for everything `source` knows about, as of `now`.
    pub fn compute(&self, source: &dyn AnalyticsSource, now: Time) -> ProgressStats {
        // Dedupe by id so repeated or reordered summaries give the same result.
        let summaries: BTreeMap<&UnitId, &UnitSummary> =
            source.summaries().into_iter().map(|s| (&s.id, s)).collect();

        let mut records = Vec::new();
        let mut units = Vec::new();

        for (unit_id, summary) in summaries {
            let Some(unit) = source.unit(unit_id) else {
                debug!(unit_id = %unit_id, "Skipping unit without content");
                continue;
            };
            let progress = source.progress(unit_id);
            let title = if unit.title.is_empty() {
                summary.title.clone()
            } else {
                unit.title.clone()
            };

            let unit_records: Vec<TaskRecord> = unit
                .unique_tasks()
                .into_iter()
                .map(|(_, task)| {
                    let answer = progress.and_then(|p| p.answer(&task.id));
                    task_record(unit_id, &title, &task.id, &task.description, answer)
                })
                .collect();

            units.push(unit_stats(unit_id, &title, &unit_records));
            records.extend(unit_records);
        }

        let total_tasks = records.len();
        let completed_tasks = count(&records, TaskStatus::Completed);
        let in_progress_tasks = count(&records, TaskStatus::InProgress);
        let not_started_tasks = count(&records, TaskStatus::NotStarted);

        let durations: Vec<i64> = records.iter().filter_map(|r| r.days_to_complete).collect();
        let average_time_to_complete = if durations.is_empty() {
            0.0
        } else {
            durations.iter().sum::<i64>() as f64 / durations.len() as f64
        };

        let completions: Vec<Time> = records.iter().filter_map(|r| r.completed_at).collect();
        let days: Vec<NaiveDate> = completions.iter().map(|c| self.day_of(*c)).collect();
        let day_set: BTreeSet<NaiveDate> = days.iter().copied().collect();

        let completion_trend = completion_trend(days);
        let efficiency = efficiency(&completion_trend);

        ProgressStats {
            total_units: units.len(),
            total_tasks,
            completed_tasks,
            in_progress_tasks,
            not_started_tasks,
            completion_rate: rate(completed_tasks, total_tasks),
            average_time_to_complete,
            current_streak: current_streak(&day_set, self.day_of(now)),
            best_streak: best_streak(&day_set),
            velocity: velocity(&completions, now),
            efficiency,
            completion_trend,
            recent_activity: recent_activity(&records),
            units,
        }
    }

    fn day_of(&self, at: Time) -> NaiveDate {
        match self.days {
            DayBoundary::Local => at.with_timezone(&Local).date_naive(),
            DayBoundary::Fixed(offset) => at.with_timezone(&offset).date_naive(),
        }
    }
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::local()
    }
}

fn task_record(
    unit_id: &UnitId,
    unit_title: &str,
    task_id: &TaskId,
    description: &str,
    answer: Option<&StudentAnswer>,
) -> TaskRecord {
    let status = TaskStatus::derive(answer);
    let completed_at = match (status, answer) {
        (TaskStatus::Completed, Some(a)) => Some(a.last_completed_at().unwrap_or(a.submission_date)),
        _ => None,
    };
    let days_to_complete = match (completed_at, answer) {
        (Some(done), Some(a)) => Some(days_between(a.submission_date, done)),
        _ => None,
    };

    TaskRecord {
        unit_id: unit_id.clone(),
        unit_title: unit_title.to_string(),
        task_id: task_id.clone(),
        description: description.to_string(),
        status,
        completed_at,
        days_to_complete,
    }
}

/// Whole days from `start` to `end`, rounded up, at least 1.
fn days_between(start: Time, end: Time) -> i64 {
    let seconds = (end - start).num_seconds();
    let days = (seconds + SECONDS_PER_DAY - 1).div_euclid(SECONDS_PER_DAY);
    days.max(1)
}

fn count(records: &[TaskRecord], status: TaskStatus) -> usize {
    records.iter().filter(|r| r.status == status).count()
}

fn rate(completed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    }
}

fn unit_stats(unit_id: &UnitId, title: &str, records: &[TaskRecord]) -> UnitStats {
    let completed_tasks = count(records, TaskStatus::Completed);
    UnitStats {
        unit_id: unit_id.clone(),
        title: title.to_string(),
        total_tasks: records.len(),
        completed_tasks,
        in_progress_tasks: count(records, TaskStatus::InProgress),
        not_started_tasks: count(records, TaskStatus::NotStarted),
        completion_rate: rate(completed_tasks, records.len()),
    }
}

fn recent_activity(records: &[TaskRecord]) -> Vec<RecentCompletion> {
    let mut done: Vec<(Time, &TaskRecord)> = records
        .iter()
        .filter_map(|r| r.completed_at.map(|at| (at, r)))
        .collect();

    done.sort_by(|(a_at, a), (b_at, b)| {
        b_at.cmp(a_at)
            .then_with(|| a.unit_id.cmp(&b.unit_id))
            .then_with(|| a.task_id.cmp(&b.task_id))
    });

    done.into_iter()
        .take(RECENT_ACTIVITY_LIMIT)
        .map(|(completed_at, r)| RecentCompletion {
            unit_id: r.unit_id.clone(),
            unit_title: r.unit_title.clone(),
            task_id: r.task_id.clone(),
            description: r.description.clone(),
            completed_at,
        })
        .collect()
}
