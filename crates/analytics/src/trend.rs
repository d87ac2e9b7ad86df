//! Completion trend, velocity and efficiency.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use unitrack_core::Time;

use crate::stats::TrendPoint;

/// Buckets kept in the completion trend.
pub const TREND_BUCKETS: usize = 30;

/// Window used for velocity and for each side of the efficiency comparison.
pub const WEEK_DAYS: usize = 7;

/// Group completion days into daily buckets with a running total, keeping
/// the most recent [`TREND_BUCKETS`].
pub fn completion_trend(days: impl IntoIterator<Item = NaiveDate>) -> Vec<TrendPoint> {
    let mut per_day: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for day in days {
        *per_day.entry(day).or_insert(0) += 1;
    }

    let mut cumulative = 0;
    let mut trend: Vec<TrendPoint> = per_day
        .into_iter()
        .map(|(day, completed)| {
            cumulative += completed;
            TrendPoint {
                date: day.format("%Y-%m-%d").to_string(),
                completed,
                cumulative,
            }
        })
        .collect();

    if trend.len() > TREND_BUCKETS {
        trend.drain(..trend.len() - TREND_BUCKETS);
    }
    trend
}

/// Completions per day over the week ending at `now`.
pub fn velocity(completions: &[Time], now: Time) -> f64 {
    let cutoff = now - Duration::days(WEEK_DAYS as i64);
    let recent = completions
        .iter()
        .filter(|c| **c > cutoff && **c <= now)
        .count();
    recent as f64 / WEEK_DAYS as f64
}

/// Percentage change in mean daily completions between the last
/// [`WEEK_DAYS`] buckets and the ones before them.
pub fn efficiency(trend: &[TrendPoint]) -> f64 {
    if trend.len() < 2 {
        return 0.0;
    }

    let split = trend.len().saturating_sub(WEEK_DAYS);
    let previous_start = split.saturating_sub(WEEK_DAYS);
    let recent = mean_completed(&trend[split..]);
    let previous = mean_completed(&trend[previous_start..split]);

    if previous == 0.0 {
        0.0
    } else {
        (recent - previous) / previous * 100.0
    }
}

fn mean_completed(points: &[TrendPoint]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().map(|p| p.completed as f64).sum::<f64>() / points.len() as f64
}
