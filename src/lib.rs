//! agenda - a personal task agenda kept in a sheet
//!
//! Tasks are rows of a sheet (date, time, description, category,
//! completed). The library reads the sheet into a typed table, computes
//! completion statistics and reminders, and mutates rows by position.
//!
//! # Module Organization
//!
//! - `task`: task records and the cell parsing rules
//! - `table`: the in-memory task table
//! - `store`: sheet backends (CSV file, in-memory)
//! - `agenda`: session over one store handle
//! - `stats`: daily, weekly, monthly and per-category completion
//! - `reminder`: tasks starting within the reminder window
//! - `config`, `error`, `cli`, `ui`: the application around it

pub mod agenda;
pub mod cli;
pub mod config;
pub mod error;
pub mod reminder;
pub mod stats;
pub mod store;
pub mod table;
pub mod task;
pub mod ui;

pub use error::{Error, Result};
