use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Time value stored for tasks that recur and have no clock time.
pub const ROUTINE_MARKER: &str = "Routine";

/// Routine marker found in Spanish sheets. Read, never written.
pub const LEGACY_ROUTINE_MARKER: &str = "Rutina";

/// Header row of the sheet, in column order.
pub const COLUMNS: [&str; 5] = ["Date", "Time", "Description", "Category", "Completed"];

pub const DEFAULT_CATEGORIES: [&str; 12] = [
    "Estudio", "Trabajo", "Salud", "Hogar", "Finanzas", "Amigos", "Familia", "Ocio", "Mañana",
    "Tarde", "Noche", "Otro",
];

const TRUTHY: [&str; 5] = ["true", "1", "yes", "sí", "si"];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const TIME_FORMATS: [&str; 4] = ["%H:%M:%S", "%H:%M:%S%.f", "%H:%M", "%I:%M %p"];

/// A row exactly as it sits in the sheet. `category` is `None` when the
/// sheet has no category column at all.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RawTask {
    pub date: String,
    pub time: String,
    pub description: String,
    pub category: Option<String>,
    pub completed: String,
}

/// Scheduled time of a task.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind", content = "at")]
pub enum TaskTime {
    Routine,
    Clock(NaiveTime),
    Unparsed,
}

/// A typed task record.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Task {
    pub date: Option<NaiveDate>,
    pub time: TaskTime,
    /// Time cell as written, used for display.
    pub time_label: String,
    pub description: String,
    pub category: Option<String>,
    pub completed: bool,
}

impl Task {
    pub fn from_raw(raw: &RawTask) -> Self {
        Self {
            date: parse_date(&raw.date),
            time: parse_time(&raw.time),
            time_label: raw.time.clone(),
            description: raw.description.clone(),
            category: raw.category.clone(),
            completed: parse_completed(&raw.completed),
        }
    }

    pub fn is_routine(&self) -> bool {
        self.time == TaskTime::Routine
    }

    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or("")
    }
}

/// Loose boolean used by the sheet's completed column.
pub fn parse_completed(value: &str) -> bool {
    let lowered = value.to_lowercase();
    TRUTHY.contains(&lowered.as_str())
}

pub fn format_completed(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Parses a date cell; anything unrecognised is `None`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

pub fn parse_time(value: &str) -> TaskTime {
    if value == ROUTINE_MARKER || value == LEGACY_ROUTINE_MARKER {
        return TaskTime::Routine;
    }
    let value = value.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(value, fmt).ok())
        .map(TaskTime::Clock)
        .unwrap_or(TaskTime::Unparsed)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}
