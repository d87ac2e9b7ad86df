//! Streak calculations over completion days.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};

/// How far back the current streak looks.
pub const STREAK_WINDOW_DAYS: i64 = 30;

/// Consecutive completion days counted backwards from `today`.
///
/// Zero unless today or yesterday has a completion. A quiet today does not
/// break a streak that reaches yesterday.
pub fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let yesterday = today - Duration::days(1);
    if !days.contains(&today) && !days.contains(&yesterday) {
        return 0;
    }

    let mut streak = 0;
    for offset in 0..STREAK_WINDOW_DAYS {
        let day = today - Duration::days(offset);
        if days.contains(&day) {
            streak += 1;
        } else if offset > 0 {
            break;
        }
    }
    streak
}

/// Longest run of consecutive completion days.
pub fn best_streak(days: &BTreeSet<NaiveDate>) -> u32 {
    let mut best = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for &day in days {
        run = match previous {
            Some(p) if (day - p).num_days() == 1 => run + 1,
            _ => 1,
        };
        best = best.max(run);
        previous = Some(day);
    }
    best
}
