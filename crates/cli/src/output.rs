//! Terminal rendering.

use unitrack_analytics::ProgressStats;
use unitrack_core::{Progress, StudentAnswer, TaskStatus, Unit, UnitSummary};

pub fn format_status(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::NotStarted => "NOT STARTED",
        TaskStatus::InProgress => "IN PROGRESS",
        TaskStatus::Completed => "COMPLETED",
    }
}

fn marker(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::NotStarted => "[ ]",
        TaskStatus::InProgress => "[~]",
        TaskStatus::Completed => "[x]",
    }
}

pub fn print_summaries(summaries: &[UnitSummary]) {
    println!("Units ({})", summaries.len());
    for s in summaries {
        println!(
            "  {} | {}/{} | {:>5.1}% | {}",
            s.id,
            s.completed_tasks,
            s.total_tasks,
            s.completion_rate(),
            s.title,
        );
    }
}

pub fn print_unit(unit: &Unit, progress: &Progress) {
    println!("Unit: {} - {}", unit.id, unit.title);
    if !unit.scenario.is_empty() {
        println!("  Scenario: {}", unit.scenario);
    }
    if let (Some(lo), Some(task)) = (&progress.current_lo, &progress.current_task) {
        println!("  Current: {} / {}", lo, task);
    }
    for outcome in &unit.learning_outcomes {
        println!("  {} {}", outcome.id, outcome.description);
        for task in &outcome.tasks {
            let status = progress.status(&task.id);
            println!(
                "    {} {} ({}) {}",
                marker(status),
                task.id,
                task.task_type,
                task.description
            );
        }
    }
    println!(
        "  Completed: {}/{}",
        progress.completed_count(),
        unit.total_tasks()
    );
}

pub fn print_history(answer: &StudentAnswer) {
    println!("Task: {}", answer.task_id);
    println!("  Status: {}", format_status(answer.status()));
    println!("  Version: {}", answer.version);
    println!("  Submitted: {}", answer.submission_date);
    println!("  Modified: {}", answer.last_modified);
    if answer.status_history.is_empty() {
        println!("  No status changes recorded");
    }
    for entry in &answer.status_history {
        println!(
            "  {} | {} -> {}",
            entry.timestamp,
            format_status(entry.previous_status),
            format_status(entry.status),
        );
    }
    if let Some(feedback) = &answer.feedback {
        println!("  Feedback:");
        for line in feedback.lines() {
            println!("    {}", line);
        }
    }
}

pub fn print_stats(stats: &ProgressStats) {
    println!("Progress");
    println!("  Units: {}", stats.total_units);
    println!(
        "  Tasks: {} total, {} completed, {} in progress, {} not started",
        stats.total_tasks, stats.completed_tasks, stats.in_progress_tasks, stats.not_started_tasks
    );
    println!("  Completion: {:.1}%", stats.completion_rate);
    println!("  Avg days to complete: {:.1}", stats.average_time_to_complete);
    println!("  Streak: {} (best {})", stats.current_streak, stats.best_streak);
    println!("  Velocity: {:.2} tasks/day", stats.velocity);
    println!("  Efficiency: {:+.1}%", stats.efficiency);

    if !stats.units.is_empty() {
        println!("By unit");
        for u in &stats.units {
            println!(
                "  {} | {}/{} | {:>5.1}% | {}",
                u.unit_id, u.completed_tasks, u.total_tasks, u.completion_rate, u.title
            );
        }
    }

    if !stats.recent_activity.is_empty() {
        println!("Recent completions");
        for r in &stats.recent_activity {
            println!(
                "  {} | {} / {} | {}",
                r.completed_at.format("%Y-%m-%d %H:%M"),
                r.unit_id,
                r.task_id,
                r.description
            );
        }
    }
}
