//! Command-line interface
//!
//! Every command opens the sheet, reads it whole, performs at most one
//! mutation and prints the result.

use std::path::PathBuf;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::agenda::Agenda;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::reminder::due_reminders;
use crate::stats::{self, GroupRate};
use crate::store::CsvSheet;
use crate::table::TaskRow;
use crate::task::{parse_date, parse_time, TaskTime};
use crate::ui;

/// agenda - daily tasks, routines and progress from a sheet
#[derive(Parser, Debug)]
#[command(name = "agenda")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to ./agenda.toml when present)
    #[arg(long, global = true, env = "AGENDA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Sheet file, overriding the configured one
    #[arg(long, global = true, env = "AGENDA_SHEET")]
    pub sheet: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a dated task
    Add {
        description: String,

        /// Day of the task (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Clock time (HH:MM, defaults to now)
        #[arg(long)]
        time: Option<String>,

        #[arg(long, default_value = "Otro")]
        category: String,
    },

    /// Add a routine
    Routine {
        description: String,

        #[arg(long, default_value = "Otro")]
        category: String,
    },

    /// List the timed tasks of a day
    List {
        /// Day to show (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List all routines
    Routines,

    /// Mark a task completed
    Done {
        /// Row index as shown by `list`
        index: usize,

        /// Mark it not completed instead
        #[arg(long)]
        undo: bool,
    },

    /// Delete a task
    Delete {
        /// Row index as shown by `list`
        index: usize,
    },

    /// Completion statistics
    #[command(subcommand)]
    Stats(StatsCommands),

    /// Show tasks starting soon
    Remind {
        /// Evaluate at this instant (YYYY-MM-DD HH:MM) instead of now
        #[arg(long)]
        at: Option<String>,
    },

    /// Interactive terminal UI (default)
    Tui,
}

#[derive(Subcommand, Debug)]
pub enum StatsCommands {
    /// Completed over total for one day
    Daily {
        #[arg(long)]
        date: Option<String>,
    },
    /// Completion rate per weekday
    Weekly,
    /// Completion rate per ISO week
    Monthly,
    /// Completion rate per category
    Habits,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let cwd = std::env::current_dir()?;
        let mut config = Config::load(self.config.as_deref(), &cwd)?;
        if let Some(sheet) = self.sheet {
            config.sheet = sheet;
        }
        let store = CsvSheet::open(&config.sheet, config.create_if_missing)?;
        let mut agenda = Agenda::open(store)?;
        let json = self.json;

        match self.command.unwrap_or(Commands::Tui) {
            Commands::Add {
                description,
                date,
                time,
                category,
            } => {
                let date = date_arg(date.as_deref())?;
                let time = time_arg(time.as_deref())?;
                agenda.add_task(date, time, &description, &category)?;
                let index = agenda.table().len() - 1;
                emit(json, &index, || println!("Added task #{index}"))
            }
            Commands::Routine {
                description,
                category,
            } => {
                agenda.add_routine(today(), &description, &category)?;
                let index = agenda.table().len() - 1;
                emit(json, &index, || println!("Added routine #{index}"))
            }
            Commands::List { date } => {
                let date = date_arg(date.as_deref())?;
                let rows = agenda.table().day(date);
                emit(json, &rows, || {
                    if rows.is_empty() {
                        println!("No tasks for {date}.");
                    }
                    for row in &rows {
                        println!("{}", row_line(row));
                    }
                })
            }
            Commands::Routines => {
                let rows = agenda.table().routines();
                emit(json, &rows, || {
                    if rows.is_empty() {
                        println!("No routines yet.");
                    }
                    for row in &rows {
                        println!("{}", row_line(row));
                    }
                })
            }
            Commands::Done { index, undo } => {
                let expected = agenda
                    .table()
                    .get(index)
                    .cloned()
                    .ok_or(Error::RowOutOfRange {
                        index,
                        len: agenda.table().len(),
                    })?;
                agenda.set_completed(index, &expected, !undo)?;
                emit(json, &!undo, || {
                    let state = if undo { "not completed" } else { "completed" };
                    println!("Marked #{index} {state}: {}", expected.description)
                })
            }
            Commands::Delete { index } => {
                let removed = agenda.delete_at(index)?;
                emit(json, &removed, || {
                    println!("Deleted #{index}: {}", removed.description)
                })
            }
            Commands::Stats(kind) => run_stats(&agenda, &config, kind, json),
            Commands::Remind { at } => {
                let now = match at {
                    Some(raw) => datetime_arg(&raw)?,
                    None => Local::now().naive_local(),
                };
                let reminders =
                    due_reminders(agenda.table(), now, config.reminder_window_minutes);
                emit(json, &reminders, || {
                    if reminders.is_empty() {
                        println!("Nothing due soon.");
                    }
                    for reminder in &reminders {
                        println!("{}", reminder.message);
                    }
                })
            }
            Commands::Tui => ui::run(agenda, &config),
        }
    }
}

fn run_stats(
    agenda: &Agenda<CsvSheet>,
    config: &Config,
    kind: StatsCommands,
    json: bool,
) -> Result<()> {
    let table = agenda.table();
    match kind {
        StatsCommands::Daily { date } => {
            let date = date_arg(date.as_deref())?;
            let progress = stats::daily_progress(table, date);
            emit(json, &progress, || {
                println!(
                    "Completed on {date}: {}/{}",
                    progress.completed, progress.total
                );
                if !progress.has_tasks() {
                    println!("No tasks recorded for this day.");
                }
            })
        }
        StatsCommands::Weekly => {
            let rates = stats::weekly_progress(table, config.weekday_locale);
            emit(json, &rates, || print_rates(&rates))
        }
        StatsCommands::Monthly => {
            let rates = stats::monthly_progress(table);
            emit(json, &rates, || print_rates(&rates))
        }
        StatsCommands::Habits => match stats::habit_progress(table) {
            Ok(rates) => emit(json, &rates, || print_rates(&rates)),
            Err(err @ Error::MissingColumn(_)) => {
                #[derive(Serialize)]
                struct Warning {
                    warning: String,
                }
                let warning = Warning {
                    warning: err.to_string(),
                };
                emit(json, &warning, || eprintln!("Warning: {}", warning.warning))
            }
            Err(err) => Err(err),
        },
    }
}

fn emit<T: Serialize>(json: bool, data: &T, human: impl FnOnce()) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(data)?);
    } else {
        human();
    }
    Ok(())
}

fn print_rates(rates: &[GroupRate]) {
    if rates.is_empty() {
        println!("No data yet.");
    }
    for rate in rates {
        println!(
            "{:<12} {:>4.0}%  ({}/{})",
            rate.label,
            rate.rate * 100.0,
            rate.completed,
            rate.total
        );
    }
}

fn row_line(row: &TaskRow<'_>) -> String {
    let mark = if row.task.completed { "x" } else { " " };
    format!(
        "[{}] #{} {} - {} ({})",
        mark,
        row.index,
        row.task.time_label,
        row.task.description,
        row.task.category_label()
    )
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn date_arg(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        None => Ok(today()),
        Some(raw) => parse_date(raw)
            .ok_or_else(|| Error::InvalidArgument(format!("unrecognised date '{raw}'"))),
    }
}

fn time_arg(raw: Option<&str>) -> Result<NaiveTime> {
    match raw {
        None => {
            let now = Local::now().time();
            Ok(NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or(now))
        }
        Some(raw) => match parse_time(raw) {
            TaskTime::Clock(time) => Ok(time),
            TaskTime::Routine | TaskTime::Unparsed => Err(Error::InvalidArgument(format!(
                "unrecognised time '{raw}'"
            ))),
        },
    }
}

fn datetime_arg(raw: &str) -> Result<NaiveDateTime> {
    ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| Error::InvalidArgument(format!("unrecognised instant '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bad_arguments_are_user_errors() {
        assert!(matches!(
            date_arg(Some("tomorrow")),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            time_arg(Some("Routine")),
            Err(Error::InvalidArgument(_))
        ));
        assert!(datetime_arg("2024-03-10 09:50").is_ok());
        assert!(datetime_arg("09:50").is_err());
    }

    #[test]
    fn missing_subcommand_parses() {
        let cli = Cli::try_parse_from(["agenda", "--json"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.json);
    }
}
