//! On-screen reminders for tasks starting soon.
//!
//! Evaluation is stateless: a task inside the window is reported every time
//! the reminders are evaluated.

use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::Serialize;
use tracing::debug;

use crate::table::TaskTable;
use crate::task::{Task, TaskTime};

pub const DEFAULT_WINDOW_MINUTES: u32 = 15;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reminder {
    pub index: usize,
    pub task: Task,
    pub at: NaiveTime,
    /// Minutes from now until the task starts, with fractions.
    pub minutes_until: f64,
    pub message: String,
}

/// Incomplete timed tasks of `now`'s day starting within
/// `[now, now + window_minutes]`, both ends inclusive.
pub fn due_reminders(table: &TaskTable, now: NaiveDateTime, window_minutes: u32) -> Vec<Reminder> {
    let today = now.date();
    let window = Duration::minutes(i64::from(window_minutes));
    let reminders: Vec<Reminder> = table
        .on_date(today)
        .filter(|row| !row.task.completed)
        .filter_map(|row| match row.task.time {
            TaskTime::Clock(at) => Some((row, at)),
            TaskTime::Routine | TaskTime::Unparsed => None,
        })
        .filter_map(|(row, at)| {
            let diff = today.and_time(at) - now;
            (diff >= Duration::zero() && diff <= window).then(|| Reminder {
                index: row.index,
                task: row.task.clone(),
                at,
                minutes_until: diff.num_milliseconds() as f64 / 60_000.0,
                message: reminder_message(row.task),
            })
        })
        .collect();
    debug!(count = reminders.len(), %now, "evaluated reminders");
    reminders
}

pub fn reminder_message(task: &Task) -> String {
    format!(
        "Reminder: {} ({}) at {}",
        task.description,
        task.category_label(),
        task.time_label
    )
}
