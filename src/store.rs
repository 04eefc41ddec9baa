//! Row store adapter.
//!
//! The agenda persists to a sheet: a header row followed by one row per
//! task, addressed spreadsheet-style (row 1 is the header, data starts at
//! row 2, columns are 1-based). Callers only ever see 0-based task indices.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{Error, Result};
use crate::table::TaskTable;
use crate::task::{format_completed, format_date, RawTask, COLUMNS};

/// Sheet row holding the task at `index`.
pub fn sheet_row(index: usize) -> usize {
    index + 2
}

pub trait RowStore {
    /// Every task row in sheet order.
    fn fetch_all(&self) -> Result<Vec<RawTask>>;

    /// Every row parsed into a table that also knows the sheet's columns.
    fn fetch_table(&self) -> Result<TaskTable>;

    /// Appends a row with `Completed = False`.
    fn append(&mut self, date: NaiveDate, time: &str, description: &str, category: &str)
        -> Result<()>;

    fn set_completed(&mut self, index: usize, value: bool) -> Result<()>;

    /// Removes a row; later rows move up by one.
    fn delete(&mut self, index: usize) -> Result<()>;
}

fn canonical_column(name: &str) -> Option<&'static str> {
    match name.trim().to_lowercase().as_str() {
        "date" | "fecha" => Some("Date"),
        "time" | "hora" => Some("Time"),
        "description" | "tarea" => Some("Description"),
        "category" | "categoria" | "categoría" => Some("Category"),
        "completed" | "completada" => Some("Completed"),
        _ => None,
    }
}

/// Cell grid including the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::with_header(COLUMNS.iter().map(|c| c.to_string()).collect())
    }
}

impl Grid {
    pub fn with_header(header: Vec<String>) -> Self {
        Self { rows: vec![header] }
    }

    pub fn header(&self) -> &[String] {
        &self.rows[0]
    }

    pub fn data_len(&self) -> usize {
        self.rows.len() - 1
    }

    /// 1-based column of a known field, if the header carries it.
    pub fn column(&self, field: &str) -> Option<usize> {
        self.header()
            .iter()
            .position(|h| canonical_column(h) == Some(field))
            .map(|pos| pos + 1)
    }

    fn cell(&self, row: &[String], field: &str) -> Option<String> {
        self.column(field)
            .map(|col| row.get(col - 1).cloned().unwrap_or_default())
    }

    pub fn records(&self) -> Vec<RawTask> {
        self.rows[1..]
            .iter()
            .map(|row| RawTask {
                date: self.cell(row, "Date").unwrap_or_default(),
                time: self.cell(row, "Time").unwrap_or_default(),
                description: self.cell(row, "Description").unwrap_or_default(),
                category: self.cell(row, "Category"),
                completed: self.cell(row, "Completed").unwrap_or_default(),
            })
            .collect()
    }

    pub fn table(&self) -> TaskTable {
        TaskTable::with_category_column(&self.records(), self.column("Category").is_some())
    }

    pub fn append_row(&mut self, values: Vec<String>) {
        self.rows.push(values);
    }

    pub fn update_cell(&mut self, row: usize, col: usize, value: String) -> Result<()> {
        if row < 2 || row > self.rows.len() || col == 0 {
            return Err(Error::RowOutOfRange {
                index: row.saturating_sub(2),
                len: self.data_len(),
            });
        }
        let cells = &mut self.rows[row - 1];
        if cells.len() < col {
            cells.resize(col, String::new());
        }
        cells[col - 1] = value;
        Ok(())
    }

    pub fn delete_row(&mut self, row: usize) -> Result<()> {
        if row < 2 || row > self.rows.len() {
            return Err(Error::RowOutOfRange {
                index: row.saturating_sub(2),
                len: self.data_len(),
            });
        }
        self.rows.remove(row - 1);
        Ok(())
    }

    /// Row values for a new task, laid out to match this grid's header.
    pub fn task_row(&self, date: NaiveDate, time: &str, description: &str, category: &str) -> Vec<String> {
        self.header()
            .iter()
            .map(|h| match canonical_column(h) {
                Some("Date") => format_date(date),
                Some("Time") => time.to_string(),
                Some("Description") => description.to_string(),
                Some("Category") => category.to_string(),
                Some("Completed") => format_completed(false).to_string(),
                _ => String::new(),
            })
            .collect()
    }

    pub fn set_completed(&mut self, index: usize, value: bool) -> Result<()> {
        let len = self.data_len();
        if index >= len {
            return Err(Error::RowOutOfRange { index, len });
        }
        let col = self
            .column("Completed")
            .ok_or(Error::MissingColumn("Completed"))?;
        self.update_cell(sheet_row(index), col, format_completed(value).to_string())
    }

    pub fn delete_task(&mut self, index: usize) -> Result<()> {
        let len = self.data_len();
        if index >= len {
            return Err(Error::RowOutOfRange { index, len });
        }
        self.delete_row(sheet_row(index))
    }
}

/// Sheet kept in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySheet {
    grid: Grid,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_grid(grid: Grid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}

impl RowStore for MemorySheet {
    fn fetch_all(&self) -> Result<Vec<RawTask>> {
        Ok(self.grid.records())
    }

    fn fetch_table(&self) -> Result<TaskTable> {
        Ok(self.grid.table())
    }

    fn append(&mut self, date: NaiveDate, time: &str, description: &str, category: &str)
        -> Result<()> {
        let row = self.grid.task_row(date, time, description, category);
        self.grid.append_row(row);
        Ok(())
    }

    fn set_completed(&mut self, index: usize, value: bool) -> Result<()> {
        self.grid.set_completed(index, value)
    }

    fn delete(&mut self, index: usize) -> Result<()> {
        self.grid.delete_task(index)
    }
}

/// Sheet stored as a CSV file. Each operation reads the file afresh and
/// mutations rewrite it through a temporary file. A zero-length file reads as
/// a sheet holding only the default header row.
#[derive(Debug, Clone)]
pub struct CsvSheet {
    path: PathBuf,
}

impl CsvSheet {
    /// Opens the sheet, creating it with a header row when allowed.
    pub fn open(path: impl Into<PathBuf>, create_if_missing: bool) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            if !create_if_missing {
                return Err(unavailable(&path, "file does not exist"));
            }
            let sheet = Self { path };
            sheet.save(&Grid::default())?;
            debug!(path = %sheet.path.display(), "created sheet");
            return Ok(sheet);
        }
        let sheet = Self { path };
        sheet.load()?;
        debug!(path = %sheet.path.display(), "opened sheet");
        Ok(sheet)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Grid> {
        let empty = fs::metadata(&self.path)
            .map_err(|e| unavailable(&self.path, &e.to_string()))?
            .len()
            == 0;
        if empty {
            return Ok(Grid::default());
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| unavailable(&self.path, &e.to_string()))?;
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }
        let mut rows = rows.into_iter();
        let header = rows
            .next()
            .filter(|h| h.iter().any(|c| !c.trim().is_empty()))
            .ok_or_else(|| unavailable(&self.path, "missing header row"))?;
        let mut grid = Grid::with_header(header);
        for row in rows {
            grid.append_row(row);
        }
        Ok(grid)
    }

    fn save(&self, grid: &Grid) -> Result<()> {
        let tmp = self.path.with_extension("csv.tmp");
        {
            let mut writer = csv::WriterBuilder::new()
                .flexible(true)
                .from_path(&tmp)
                .map_err(|e| unavailable(&self.path, &e.to_string()))?;
            for row in &grid.rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn unavailable(path: &Path, reason: &str) -> Error {
    Error::StoreUnavailable {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

impl RowStore for CsvSheet {
    fn fetch_all(&self) -> Result<Vec<RawTask>> {
        let records = self.load()?.records();
        debug!(rows = records.len(), "fetched sheet");
        Ok(records)
    }

    fn fetch_table(&self) -> Result<TaskTable> {
        let table = self.load()?.table();
        debug!(rows = table.len(), "fetched sheet");
        Ok(table)
    }

    fn append(&mut self, date: NaiveDate, time: &str, description: &str, category: &str)
        -> Result<()> {
        let mut grid = self.load()?;
        let row = grid.task_row(date, time, description, category);
        grid.append_row(row);
        self.save(&grid)?;
        debug!(row = grid.data_len() + 1, "appended row");
        Ok(())
    }

    fn set_completed(&mut self, index: usize, value: bool) -> Result<()> {
        let mut grid = self.load()?;
        grid.set_completed(index, value)?;
        self.save(&grid)?;
        debug!(row = sheet_row(index), value, "updated completed cell");
        Ok(())
    }

    fn delete(&mut self, index: usize) -> Result<()> {
        let mut grid = self.load()?;
        grid.delete_task(index)?;
        self.save(&grid)?;
        debug!(row = sheet_row(index), "deleted row");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    #[test]
    fn append_then_fetch_returns_incomplete_last_row() {
        let mut sheet = MemorySheet::new();
        sheet.append(day(), "09:00:00", "Gym", "Salud").unwrap();
        sheet.append(day(), "10:00:00", "Read", "Estudio").unwrap();
        let rows = sheet.fetch_all().unwrap();
        let last = rows.last().unwrap();
        assert_eq!(last.description, "Read");
        assert_eq!(last.completed, "False");
        assert_eq!(last.date, "2024-03-10");
    }

    #[test]
    fn set_completed_writes_literal_and_is_idempotent() {
        let mut sheet = MemorySheet::new();
        sheet.append(day(), "09:00:00", "Gym", "Salud").unwrap();
        sheet.set_completed(0, true).unwrap();
        let once = sheet.grid().clone();
        sheet.set_completed(0, true).unwrap();
        assert_eq!(sheet.grid(), &once);
        assert_eq!(sheet.fetch_all().unwrap()[0].completed, "True");
    }

    #[test]
    fn delete_shifts_later_rows_up() {
        let mut sheet = MemorySheet::new();
        for name in ["a", "b", "c"] {
            sheet.append(day(), "09:00:00", name, "Otro").unwrap();
        }
        sheet.delete(0).unwrap();
        sheet.delete(0).unwrap();
        let rows = sheet.fetch_all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description, "c");
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut sheet = MemorySheet::new();
        assert!(matches!(
            sheet.set_completed(0, true),
            Err(Error::RowOutOfRange { index: 0, len: 0 })
        ));
        assert!(matches!(sheet.delete(4), Err(Error::RowOutOfRange { .. })));
    }

    #[test]
    fn grid_without_category_column_yields_none() {
        let mut grid = Grid::with_header(
            ["Fecha", "Hora", "Tarea", "Completada"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        let row = grid.task_row(day(), "Routine", "Stretch", "Salud");
        assert_eq!(row, vec!["2024-03-10", "Routine", "Stretch", "False"]);
        grid.append_row(row);
        let records = grid.records();
        assert_eq!(records[0].category, None);
        assert_eq!(records[0].description, "Stretch");
    }

    #[test]
    fn category_flag_comes_from_the_header() {
        let sheet = MemorySheet::from_grid(Grid::with_header(
            ["Date", "Time", "Description", "Completed"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        ));
        let table = sheet.fetch_table().unwrap();
        assert!(table.is_empty());
        assert!(!table.has_category());
        assert!(MemorySheet::new().fetch_table().unwrap().has_category());
    }

    #[test]
    fn header_row_is_not_addressable() {
        let mut grid = Grid::default();
        assert!(grid.delete_row(1).is_err());
        assert!(grid.update_cell(1, 1, "x".to_string()).is_err());
    }
}
