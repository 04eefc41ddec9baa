use crate::agenda::Agenda;
use crate::config::Config;
use crate::error::Result;
use crate::reminder::due_reminders;
use crate::stats;
use crate::store::RowStore;
use crate::task::{parse_time, TaskTime};
use chrono::{Duration, Local, NaiveDate};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, Gauge, GraphType, List,
        ListItem, ListState, Paragraph, Tabs,
    },
    Frame, Terminal,
};
use std::io;
use tracing::warn;

const SECTIONS: [&str; 3] = ["Agenda", "Routines", "Statistics"];
const STATS_VIEWS: [&str; 4] = ["Daily", "Weekly", "Monthly", "Habits"];

struct App<S> {
    agenda: Agenda<S>,
    config: Config,
    section: usize,
    stats_view: usize,
    day: NaiveDate,
    selected: usize,
    status: Option<String>,
}

impl<S: RowStore> App<S> {
    fn new(agenda: Agenda<S>, config: &Config) -> Self {
        Self {
            agenda,
            config: config.clone(),
            section: 0,
            stats_view: 0,
            day: Local::now().date_naive(),
            selected: 0,
            status: None,
        }
    }

    /// Sheet indices listed in the current section.
    fn visible(&self) -> Vec<usize> {
        let table = self.agenda.table();
        match self.section {
            0 => table.day(self.day).iter().map(|r| r.index).collect(),
            1 => table.routines().iter().map(|r| r.index).collect(),
            _ => Vec::new(),
        }
    }

    fn selected_index(&self) -> Option<usize> {
        self.visible().get(self.selected).copied()
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    /// Non-fatal errors go to the status line; store failures end the UI.
    fn report(&mut self, result: Result<String>) -> Result<()> {
        match result {
            Ok(message) => self.status = Some(message),
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                warn!(%err, "action failed");
                self.status = Some(err.to_string());
            }
        }
        self.clamp_selection();
        Ok(())
    }

    /// Re-reads the sheet so every screen reflects writes from other
    /// sessions.
    fn reload(&mut self) -> Result<()> {
        match self.agenda.refresh() {
            Ok(_) => {}
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                warn!(%err, "reload failed");
                self.status = Some(err.to_string());
            }
        }
        self.clamp_selection();
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<()> {
        match code {
            KeyCode::Tab => {
                self.section = (self.section + 1) % SECTIONS.len();
                self.selected = 0;
            }
            KeyCode::Char(c @ '1'..='3') => {
                self.section = c as usize - '1' as usize;
                self.selected = 0;
            }
            KeyCode::Char(' ') | KeyCode::Enter if self.section < 2 => self.toggle_selected()?,
            KeyCode::Char('d') if self.section < 2 => self.delete_selected()?,
            KeyCode::Left => match self.section {
                0 => {
                    self.day -= Duration::days(1);
                    self.selected = 0;
                }
                2 => self.stats_view = self.stats_view.saturating_sub(1),
                _ => {}
            },
            KeyCode::Right => match self.section {
                0 => {
                    self.day += Duration::days(1);
                    self.selected = 0;
                }
                2 => self.stats_view = (self.stats_view + 1).min(STATS_VIEWS.len() - 1),
                _ => {}
            },
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if self.selected + 1 < self.visible().len() {
                    self.selected += 1;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn toggle_selected(&mut self) -> Result<()> {
        let Some(index) = self.selected_index() else {
            return Ok(());
        };
        let result = self.agenda.toggle(index).map(|done| {
            if done {
                "Marked completed".to_string()
            } else {
                "Marked pending".to_string()
            }
        });
        self.report(result)
    }

    fn delete_selected(&mut self) -> Result<()> {
        let Some(index) = self.selected_index() else {
            return Ok(());
        };
        let result = self
            .agenda
            .delete_at(index)
            .map(|task| format!("Deleted: {}", task.description));
        self.report(result)
    }

    fn add_entry(&mut self) -> Result<()> {
        let Some(description) = prompt("Description") else {
            return Ok(());
        };
        if description.is_empty() {
            return Ok(());
        }
        let category = prompt(&format!("Category ({})", self.config.categories.join(", ")))
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "Otro".to_string());
        let result = if self.section == 1 {
            let today = Local::now().date_naive();
            self.agenda
                .add_routine(today, &description, &category)
                .map(|_| "Routine added".to_string())
        } else {
            match prompt("Time (HH:MM)").map(|t| parse_time(&t)) {
                Some(TaskTime::Clock(time)) => self
                    .agenda
                    .add_task(self.day, time, &description, &category)
                    .map(|_| "Task added".to_string()),
                _ => Ok("Unrecognised time, task not added".to_string()),
            }
        };
        self.report(result)
    }
}

pub fn run<S: RowStore>(agenda: Agenda<S>, config: &Config) -> Result<()> {
    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(agenda, config);
    let result = run_app(&mut terminal, &mut app);

    // Restore the terminal even when the loop failed; its error wins.
    let restored = restore_terminal(&mut terminal);
    result.and(restored)
}

fn restore_terminal<B: Backend + io::Write>(terminal: &mut Terminal<B>) -> Result<()> {
    let raw = disable_raw_mode();
    let screen = execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    );
    let cursor = terminal.show_cursor();
    raw?;
    screen?;
    cursor?;
    Ok(())
}

fn run_app<B: Backend, S: RowStore>(terminal: &mut Terminal<B>, app: &mut App<S>) -> Result<()> {
    loop {
        app.reload()?;
        terminal.draw(|f| draw(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Char('q') => return Ok(()),
            KeyCode::Char('a') if app.section < 2 => {
                app.add_entry()?;
                terminal.clear()?;
            }
            code => app.handle_key(code)?,
        }
    }
}

fn draw<S: RowStore>(f: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    let tabs = Tabs::new(SECTIONS.to_vec())
        .block(Block::default().title("Agenda").borders(Borders::ALL))
        .select(app.section)
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, chunks[0]);

    draw_reminders(f, app, chunks[1]);

    match app.section {
        0 | 1 => draw_tasks(f, app, chunks[2]),
        _ => draw_stats(f, app, chunks[2]),
    }

    let help = match app.section {
        0 => "←/→ day  ↑/↓ select  space toggle  a add  d delete  tab section  q quit",
        1 => "↑/↓ select  space toggle  a add  d delete  tab section  q quit",
        _ => "←/→ view  tab section  q quit",
    };
    let footer = Paragraph::new(vec![Line::from(vec![
        Span::styled(
            app.status.clone().unwrap_or_default(),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(help, Style::default().fg(Color::DarkGray)),
    ])])
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[3]);
}

fn draw_reminders<S: RowStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let now = Local::now().naive_local();
    let reminders = due_reminders(app.agenda.table(), now, app.config.reminder_window_minutes);
    let lines: Vec<Line> = if reminders.is_empty() {
        vec![Line::from(Span::styled(
            "Nothing due soon",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        reminders
            .iter()
            .map(|r| {
                Line::from(Span::styled(
                    r.message.clone(),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ))
            })
            .collect()
    };
    let paragraph =
        Paragraph::new(lines).block(Block::default().title("Reminders").borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn draw_tasks<S: RowStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let table = app.agenda.table();
    let (title, rows) = if app.section == 0 {
        (format!("Tasks for {}", app.day), table.day(app.day))
    } else {
        ("Routines".to_string(), table.routines())
    };
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            let t = row.task;
            let check = if t.completed { "[x] " } else { "[ ] " };
            let style = if t.completed {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };
            let when = if app.section == 0 {
                format!("{} - ", t.time_label)
            } else {
                String::new()
            };
            ListItem::new(Line::from(vec![
                Span::raw(check),
                Span::raw(when),
                Span::styled(t.description.clone(), style),
                Span::raw(format!(" ({})", t.category_label())),
            ]))
        })
        .collect();

    let empty = items.is_empty();
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    if empty {
        let message = if app.section == 0 {
            "No tasks for this day."
        } else {
            "No routines yet."
        };
        f.render_widget(
            Paragraph::new(message).block(Block::default().borders(Borders::ALL)),
            area,
        );
        return;
    }
    let mut state = ListState::default().with_selected(Some(app.selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_stats<S: RowStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let table = app.agenda.table();
    let title = format!(
        "{} ({}/{})",
        STATS_VIEWS[app.stats_view],
        app.stats_view + 1,
        STATS_VIEWS.len()
    );
    let block = Block::default().title(title).borders(Borders::ALL);

    if table.is_empty() {
        f.render_widget(Paragraph::new("No data to show yet.").block(block), area);
        return;
    }

    match app.stats_view {
        0 => {
            let today = Local::now().date_naive();
            let progress = stats::daily_progress(table, today);
            if !progress.has_tasks() {
                f.render_widget(
                    Paragraph::new("No tasks recorded today.").block(block),
                    area,
                );
                return;
            }
            let ratio = progress.completed as f64 / progress.total as f64;
            let gauge = Gauge::default()
                .block(block)
                .gauge_style(Style::default().fg(Color::Magenta))
                .ratio(ratio)
                .label(format!(
                    "Completed today: {}/{}",
                    progress.completed, progress.total
                ));
            f.render_widget(gauge, area);
        }
        1 => draw_bars(
            f,
            block,
            area,
            &stats::weekly_progress(table, app.config.weekday_locale),
        ),
        2 => {
            let rates = stats::monthly_progress(table);
            let points: Vec<(f64, f64)> = rates
                .iter()
                .filter_map(|r| r.label.parse::<f64>().ok().map(|w| (w, r.rate * 100.0)))
                .collect();
            let first = points.first().map(|p| p.0).unwrap_or(1.0);
            let last = points.last().map(|p| p.0).unwrap_or(first).max(first + 1.0);
            let dataset = Dataset::default()
                .name("completed %")
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Cyan))
                .data(&points);
            let chart = Chart::new(vec![dataset])
                .block(block)
                .x_axis(
                    Axis::default()
                        .title("ISO week")
                        .bounds([first, last])
                        .labels(vec![
                            Span::raw(format!("{first}")),
                            Span::raw(format!("{last}")),
                        ]),
                )
                .y_axis(
                    Axis::default()
                        .bounds([0.0, 100.0])
                        .labels(vec![Span::raw("0%"), Span::raw("50%"), Span::raw("100%")]),
                );
            f.render_widget(chart, area);
        }
        _ => match stats::habit_progress(table) {
            Ok(rates) => draw_bars(f, block, area, &rates),
            Err(err) => f.render_widget(
                Paragraph::new(Span::styled(
                    format!("Warning: {err}"),
                    Style::default().fg(Color::Yellow),
                ))
                .block(block),
                area,
            ),
        },
    }
}

fn draw_bars(f: &mut Frame, block: Block, area: Rect, rates: &[stats::GroupRate]) {
    let bars: Vec<Bar> = rates
        .iter()
        .map(|r| {
            let pct = (r.rate * 100.0).round() as u64;
            Bar::default()
                .value(pct)
                .text_value(format!("{pct}%"))
                .label(Line::from(r.label.clone()))
        })
        .collect();
    let chart = BarChart::default()
        .block(block)
        .bar_width(9)
        .bar_gap(2)
        .max(100)
        .bar_style(Style::default().fg(Color::LightMagenta))
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, area);
}

fn prompt(message: &str) -> Option<String> {
    disable_raw_mode().ok();
    println!("{}", message);
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_ok() {
        enable_raw_mode().ok();
        Some(input.trim().to_string())
    } else {
        enable_raw_mode().ok();
        None
    }
}
