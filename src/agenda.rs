use chrono::{NaiveDate, NaiveTime};
use tracing::info;

use crate::error::{Error, Result};
use crate::store::RowStore;
use crate::table::TaskTable;
use crate::task::{format_time, Task, ROUTINE_MARKER};

/// A session over one sheet. Owns the store handle and the table read from
/// it; every mutation re-reads the whole sheet.
#[derive(Debug)]
pub struct Agenda<S> {
    store: S,
    table: TaskTable,
}

impl<S: RowStore> Agenda<S> {
    pub fn open(store: S) -> Result<Self> {
        let table = store.fetch_table()?;
        Ok(Self { store, table })
    }

    pub fn table(&self) -> &TaskTable {
        &self.table
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn refresh(&mut self) -> Result<&TaskTable> {
        self.table = self.store.fetch_table()?;
        Ok(&self.table)
    }

    pub fn add_task(
        &mut self,
        date: NaiveDate,
        time: NaiveTime,
        description: &str,
        category: &str,
    ) -> Result<()> {
        let description = require_description(description)?;
        self.store
            .append(date, &format_time(time), description, category)?;
        info!(%date, %time, description, category, "added task");
        self.refresh()?;
        Ok(())
    }

    /// Routines are stored under today's date with the routine marker as time.
    pub fn add_routine(&mut self, today: NaiveDate, description: &str, category: &str) -> Result<()> {
        let description = require_description(description)?;
        self.store
            .append(today, ROUTINE_MARKER, description, category)?;
        info!(description, category, "added routine");
        self.refresh()?;
        Ok(())
    }

    /// Sets the completed flag of the row at `index`, provided it still holds
    /// `expected`.
    pub fn set_completed(&mut self, index: usize, expected: &Task, value: bool) -> Result<()> {
        self.check_row(index, expected)?;
        self.store.set_completed(index, value)?;
        info!(index, value, "updated completion");
        self.refresh()?;
        Ok(())
    }

    /// Flips the completed flag of the row as last read. Returns the new value.
    pub fn toggle(&mut self, index: usize) -> Result<bool> {
        let expected = self.row(index)?.clone();
        let value = !expected.completed;
        self.set_completed(index, &expected, value)?;
        Ok(value)
    }

    pub fn delete(&mut self, index: usize, expected: &Task) -> Result<()> {
        self.check_row(index, expected)?;
        self.store.delete(index)?;
        info!(index, description = %expected.description, "deleted task");
        self.refresh()?;
        Ok(())
    }

    /// Deletes the row as last read.
    pub fn delete_at(&mut self, index: usize) -> Result<Task> {
        let expected = self.row(index)?.clone();
        self.delete(index, &expected)?;
        Ok(expected)
    }

    fn row(&self, index: usize) -> Result<&Task> {
        self.table.get(index).ok_or(Error::RowOutOfRange {
            index,
            len: self.table.len(),
        })
    }

    fn check_row(&mut self, index: usize, expected: &Task) -> Result<()> {
        let current = self.refresh()?;
        let task = current.get(index).ok_or(Error::RowOutOfRange {
            index,
            len: current.len(),
        })?;
        if !same_entry(task, expected) {
            return Err(Error::StaleRow { index });
        }
        Ok(())
    }
}

/// Rows match on every field that never changes after creation.
fn same_entry(a: &Task, b: &Task) -> bool {
    a.date == b.date
        && a.time_label == b.time_label
        && a.description == b.description
        && a.category == b.category
}

fn require_description(description: &str) -> Result<&str> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument(
            "task description cannot be empty".to_string(),
        ));
    }
    Ok(trimmed)
}
