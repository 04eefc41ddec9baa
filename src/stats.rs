//! Completion statistics over the task table.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::table::TaskTable;
use crate::task::Task;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekdayLocale {
    #[default]
    En,
    Es,
}

impl WeekdayLocale {
    pub fn name(self, day: Weekday) -> &'static str {
        match (self, day) {
            (WeekdayLocale::En, Weekday::Mon) => "Monday",
            (WeekdayLocale::En, Weekday::Tue) => "Tuesday",
            (WeekdayLocale::En, Weekday::Wed) => "Wednesday",
            (WeekdayLocale::En, Weekday::Thu) => "Thursday",
            (WeekdayLocale::En, Weekday::Fri) => "Friday",
            (WeekdayLocale::En, Weekday::Sat) => "Saturday",
            (WeekdayLocale::En, Weekday::Sun) => "Sunday",
            (WeekdayLocale::Es, Weekday::Mon) => "Lunes",
            (WeekdayLocale::Es, Weekday::Tue) => "Martes",
            (WeekdayLocale::Es, Weekday::Wed) => "Miércoles",
            (WeekdayLocale::Es, Weekday::Thu) => "Jueves",
            (WeekdayLocale::Es, Weekday::Fri) => "Viernes",
            (WeekdayLocale::Es, Weekday::Sat) => "Sábado",
            (WeekdayLocale::Es, Weekday::Sun) => "Domingo",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyProgress {
    pub date: NaiveDate,
    pub completed: usize,
    pub total: usize,
}

impl DailyProgress {
    pub fn has_tasks(&self) -> bool {
        self.total > 0
    }
}

/// Share of completed tasks within one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRate {
    pub label: String,
    pub completed: usize,
    pub total: usize,
    pub rate: f64,
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    completed: usize,
    total: usize,
}

impl Tally {
    fn add(&mut self, task: &Task) {
        self.total += 1;
        if task.completed {
            self.completed += 1;
        }
    }

    fn into_rate(self, label: String) -> GroupRate {
        GroupRate {
            label,
            completed: self.completed,
            total: self.total,
            rate: self.completed as f64 / self.total as f64,
        }
    }
}

/// Non-routine tasks that carry a readable date.
fn dated(table: &TaskTable) -> impl Iterator<Item = (NaiveDate, &Task)> {
    table
        .tasks()
        .iter()
        .filter(|t| !t.is_routine())
        .filter_map(|t| t.date.map(|d| (d, t)))
}

pub fn daily_progress(table: &TaskTable, date: NaiveDate) -> DailyProgress {
    let mut tally = Tally::default();
    for (_, task) in dated(table).filter(|(d, _)| *d == date) {
        tally.add(task);
    }
    DailyProgress {
        date,
        completed: tally.completed,
        total: tally.total,
    }
}

/// Completion rate per weekday, Monday first. Weekdays without tasks are
/// left out.
pub fn weekly_progress(table: &TaskTable, locale: WeekdayLocale) -> Vec<GroupRate> {
    let mut groups: BTreeMap<u32, (Weekday, Tally)> = BTreeMap::new();
    for (date, task) in dated(table) {
        let day = date.weekday();
        groups
            .entry(day.num_days_from_monday())
            .or_insert((day, Tally::default()))
            .1
            .add(task);
    }
    groups
        .into_values()
        .map(|(day, tally)| tally.into_rate(locale.name(day).to_string()))
        .collect()
}

/// Completion rate per ISO week number, ascending.
pub fn monthly_progress(table: &TaskTable) -> Vec<GroupRate> {
    let mut groups: BTreeMap<u32, Tally> = BTreeMap::new();
    for (date, task) in dated(table) {
        groups.entry(date.iso_week().week()).or_default().add(task);
    }
    groups
        .into_iter()
        .map(|(week, tally)| tally.into_rate(week.to_string()))
        .collect()
}

/// Completion rate per category across every task, dated or not.
pub fn habit_progress(table: &TaskTable) -> Result<Vec<GroupRate>> {
    if !table.has_category() {
        warn!("sheet has no category column; skipping habit statistics");
        return Err(Error::MissingColumn("Category"));
    }
    let mut groups: BTreeMap<&str, Tally> = BTreeMap::new();
    for task in table.tasks() {
        groups.entry(task.category_label()).or_default().add(task);
    }
    Ok(groups
        .into_iter()
        .map(|(category, tally)| tally.into_rate(category.to_string()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{RawTask, ROUTINE_MARKER};

    fn raw(date: &str, time: &str, category: &str, completed: bool) -> RawTask {
        RawTask {
            date: date.to_string(),
            time: time.to_string(),
            description: format!("{category} at {time}"),
            category: Some(category.to_string()),
            completed: if completed { "True" } else { "False" }.to_string(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_progress_counts_only_the_given_day() {
        let table = TaskTable::parse(&[
            raw("2024-03-10", "09:00", "catX", true),
            raw("2024-03-10", "14:00", "catY", false),
            raw("2024-03-09", "10:00", "catX", true),
        ]);
        let progress = daily_progress(&table, date(2024, 3, 10));
        assert_eq!((progress.completed, progress.total), (1, 2));
    }

    #[test]
    fn daily_progress_without_tasks_is_zero_over_zero() {
        let progress = daily_progress(&TaskTable::parse(&[]), date(2024, 3, 10));
        assert_eq!((progress.completed, progress.total), (0, 0));
        assert!(!progress.has_tasks());
    }

    #[test]
    fn weekly_groups_by_weekday_name() {
        // 2024-03-11 is a Monday.
        let table = TaskTable::parse(&[
            raw("2024-03-11", "09:00", "Salud", true),
            raw("2024-03-11", "10:00", "Salud", false),
            raw("2024-03-12", "10:00", "Hogar", false),
        ]);
        let weekly = weekly_progress(&table, WeekdayLocale::En);
        let pairs: Vec<(&str, f64)> = weekly.iter().map(|g| (g.label.as_str(), g.rate)).collect();
        assert_eq!(pairs, vec![("Monday", 0.5), ("Tuesday", 0.0)]);

        let spanish = weekly_progress(&table, WeekdayLocale::Es);
        assert_eq!(spanish[0].label, "Lunes");
    }

    #[test]
    fn monthly_orders_by_iso_week() {
        let table = TaskTable::parse(&[
            raw("2024-03-20", "09:00", "Salud", true),
            raw("2024-03-04", "09:00", "Salud", false),
            raw("2024-03-05", "09:00", "Salud", true),
        ]);
        let monthly = monthly_progress(&table);
        let weeks: Vec<&str> = monthly.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(weeks, vec!["10", "12"]);
        assert_eq!(monthly[0].rate, 0.5);
        assert_eq!(monthly[1].rate, 1.0);
    }

    #[test]
    fn routines_and_undated_rows_only_count_for_habits() {
        let table = TaskTable::parse(&[
            raw("2024-03-10", ROUTINE_MARKER, "Salud", true),
            raw("garbage", "09:00", "Salud", false),
            raw("2024-03-10", "09:00", "Ocio", true),
        ]);
        let progress = daily_progress(&table, date(2024, 3, 10));
        assert_eq!((progress.completed, progress.total), (1, 1));
        assert_eq!(weekly_progress(&table, WeekdayLocale::En).len(), 1);
        assert_eq!(monthly_progress(&table)[0].total, 1);

        let habits = habit_progress(&table).unwrap();
        let salud = habits.iter().find(|g| g.label == "Salud").unwrap();
        assert_eq!((salud.completed, salud.total), (1, 2));
    }

    #[test]
    fn unknown_categories_are_grouped_normally() {
        let table = TaskTable::parse(&[raw("2024-03-10", "09:00", "Jardín", true)]);
        let habits = habit_progress(&table).unwrap();
        assert_eq!(habits[0].label, "Jardín");
        assert_eq!(habits[0].rate, 1.0);
    }

    #[test]
    fn habits_need_a_category_column() {
        let mut row = raw("2024-03-10", "09:00", "Salud", true);
        row.category = None;
        let table = TaskTable::parse(&[row]);
        assert!(matches!(
            habit_progress(&table),
            Err(Error::MissingColumn("Category"))
        ));
    }
}
