use std::collections::HashMap;

use chrono::NaiveDate;
use mastery_common::rate::safe_percent;
use mastery_common::{Task, TaskEntry};
use serde::Serialize;

use crate::progress::{task_index, week_dates};

/// State of one task on one day in the weekly table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "kebab-case")]
pub enum CellStatus {
    NotRecorded,
    Completed,
    Missed,
    /// A value-tracking task with a recorded value
    Logged(String),
}

impl CellStatus {
    fn of(task: &Task, entry: Option<&TaskEntry>) -> Self {
        match entry {
            None => CellStatus::NotRecorded,
            Some(entry) if task.tracks_value() && entry.has_value() => {
                CellStatus::Logged(entry.value.clone().unwrap_or_default())
            }
            Some(entry) if entry.completed => CellStatus::Completed,
            Some(_) => CellStatus::Missed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GridRow {
    pub task: Task,
    pub cells: Vec<CellStatus>,
}

/// Task-by-day table for one week plus each day's logged percentage.
#[derive(Debug, Clone, Serialize)]
pub struct WeekGrid {
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<GridRow>,
    pub day_rates: Vec<f64>,
}

/// Percentage of the catalog logged on `date`. Value-tracking tasks count
/// once they carry a value; every other task counts when completed.
/// Entries for tasks outside the catalog are ignored.
pub fn logged_day_rate(date: NaiveDate, tasks: &[Task], entries: &[TaskEntry]) -> f64 {
    let index = task_index(tasks);
    let logged = entries
        .iter()
        .filter(|entry| entry.date == date)
        .filter(|entry| {
            index.get(entry.task_id.as_str()).is_some_and(|task| entry.is_logged(task.value_kind))
        })
        .count();

    safe_percent(logged as f64, tasks.len() as f64)
}

pub fn build_week_grid(week_start: NaiveDate, tasks: &[Task], entries: &[TaskEntry]) -> WeekGrid {
    let dates = week_dates(week_start);

    let by_slot: HashMap<(&str, NaiveDate), &TaskEntry> =
        entries.iter().map(|entry| ((entry.task_id.as_str(), entry.date), entry)).collect();

    let rows = tasks
        .iter()
        .map(|task| GridRow {
            task: task.clone(),
            cells: dates
                .iter()
                .map(|date| CellStatus::of(task, by_slot.get(&(task.id.as_str(), *date)).copied()))
                .collect(),
        })
        .collect();

    let day_rates = dates.iter().map(|date| logged_day_rate(*date, tasks, entries)).collect();

    WeekGrid { dates, rows, day_rates }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mastery_common::{TaskCategory, ValueKind};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn catalog() -> Vec<Task> {
        vec![
            Task::new("run", "RUN", TaskCategory::Wellness),
            Task::new("screen", "SCREEN TIME", TaskCategory::Productivity)
                .with_value_kind(ValueKind::Duration),
        ]
    }

    #[test]
    fn test_cells_reflect_entries() {
        let entries = vec![
            TaskEntry::new("run", day(1), true),
            TaskEntry::new("run", day(2), false),
            TaskEntry::new("screen", day(1), false).with_value("03:15"),
            TaskEntry::new("screen", day(2), true).with_value(""),
        ];

        let grid = build_week_grid(day(1), &catalog(), &entries);

        assert_eq!(grid.dates.len(), 7);
        assert_eq!(grid.rows[0].cells[0], CellStatus::Completed);
        assert_eq!(grid.rows[0].cells[1], CellStatus::Missed);
        assert_eq!(grid.rows[0].cells[2], CellStatus::NotRecorded);
        assert_eq!(grid.rows[1].cells[0], CellStatus::Logged("03:15".to_string()));
        assert_eq!(grid.rows[1].cells[1], CellStatus::Completed);
    }

    #[test]
    fn test_day_rate_counts_logged_values() {
        let entries = vec![
            TaskEntry::new("run", day(1), true),
            TaskEntry::new("screen", day(1), false).with_value("03:15"),
            TaskEntry::new("screen", day(2), true).with_value(""),
        ];

        let grid = build_week_grid(day(1), &catalog(), &entries);

        assert_eq!(grid.day_rates[0], 100.0);
        assert_eq!(grid.day_rates[1], 0.0);
        assert_eq!(grid.day_rates[2], 0.0);
    }

    #[test]
    fn test_day_rate_with_empty_catalog() {
        let entries = vec![TaskEntry::new("run", day(1), true)];
        assert_eq!(logged_day_rate(day(1), &[], &entries), 0.0);
    }
}
