//! In-memory task table rebuilt from the sheet on every interaction.

use chrono::NaiveDate;
use serde::Serialize;

use crate::task::{RawTask, Task};

/// A task together with its position in the sheet.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRow<'a> {
    pub index: usize,
    pub task: &'a Task,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskTable {
    tasks: Vec<Task>,
    has_category: bool,
}

impl TaskTable {
    /// Builds the typed table. Never fails: unreadable cells degrade to
    /// `None` / `false`.
    pub fn parse(raw: &[RawTask]) -> Self {
        Self::with_category_column(raw, raw.iter().all(|r| r.category.is_some()))
    }

    /// Like [`TaskTable::parse`], with the category column's presence taken
    /// from the sheet header rather than inferred from the rows.
    pub fn with_category_column(raw: &[RawTask], has_category: bool) -> Self {
        Self {
            tasks: raw.iter().map(Task::from_raw).collect(),
            has_category,
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// False when the source sheet carries no category column.
    pub fn has_category(&self) -> bool {
        self.has_category
    }

    pub fn rows(&self) -> impl Iterator<Item = TaskRow<'_>> {
        self.tasks
            .iter()
            .enumerate()
            .map(|(index, task)| TaskRow { index, task })
    }

    /// Tasks dated on `date`, routines included, in sheet order.
    pub fn on_date(&self, date: NaiveDate) -> impl Iterator<Item = TaskRow<'_>> {
        self.rows().filter(move |row| row.task.date == Some(date))
    }

    /// Timed tasks of a day, as shown in the agenda view.
    pub fn day(&self, date: NaiveDate) -> Vec<TaskRow<'_>> {
        self.on_date(date)
            .filter(|row| !row.task.is_routine())
            .collect()
    }

    pub fn routines(&self) -> Vec<TaskRow<'_>> {
        self.rows().filter(|row| row.task.is_routine()).collect()
    }
}
