//! Completion statistics derived from the task catalog and entry log.
//!
//! The free functions are pure and work on slices; [`ProgressAggregator`]
//! loads a fresh snapshot from the store for every query, so results always
//! reflect the current log.

use std::collections::HashMap;

use chrono::{Datelike, Days, NaiveDate};
use mastery_common::rate::{mean, safe_percent};
use mastery_common::{ChartPoint, DailyProgress, Task, TaskCategory, TaskEntry};
use mastery_db::{EntryStore, KvBackend};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::weekly_grid::{build_week_grid, WeekGrid};

pub const DEFAULT_STREAK_THRESHOLD: f64 = 0.8;

/// Longest trailing window a report may cover, about ten years.
pub const MAX_WINDOW_DAYS: u32 = 3650;

/// Label used by [`best_day`] when the series is empty.
pub const NO_BEST_DAY: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCompletion {
    pub category: TaskCategory,
    pub completion_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestDay {
    pub day: String,
    pub rate: f64,
}

pub(crate) fn task_index(tasks: &[Task]) -> HashMap<&str, &Task> {
    tasks.iter().map(|task| (task.id.as_str(), task)).collect()
}

/// Distinct categories in the order they first appear in the catalog.
pub fn catalog_categories(tasks: &[Task]) -> Vec<TaskCategory> {
    let mut categories = Vec::new();
    for task in tasks {
        if !categories.contains(&task.category) {
            categories.push(task.category);
        }
    }
    categories
}

/// The Monday on or before `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    let back = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN)
}

pub fn week_dates(week_start: NaiveDate) -> Vec<NaiveDate> {
    week_start.iter_days().take(7).collect()
}

/// Every day of `month` (1-based) in `year`, first to last.
pub fn month_dates(year: i32, month: u32) -> Result<Vec<NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| TrackerError::InvalidInput(format!("no such month: {}-{}", year, month)))?;

    Ok(first.iter_days().take_while(|date| date.month() == month).collect())
}

/// Trailing `days` days ending at `today`, oldest first. Windows longer
/// than [`MAX_WINDOW_DAYS`] or reaching before the earliest representable
/// date are `InvalidInput`.
pub fn trailing_dates(today: NaiveDate, days: u32) -> Result<Vec<NaiveDate>> {
    if days > MAX_WINDOW_DAYS {
        return Err(TrackerError::InvalidInput(format!(
            "window of {} days exceeds the {} day limit",
            days, MAX_WINDOW_DAYS
        )));
    }
    if days == 0 {
        return Ok(Vec::new());
    }

    let first = today.checked_sub_days(Days::new(u64::from(days - 1))).ok_or_else(|| {
        TrackerError::InvalidInput(format!("window of {} days before {} is out of range", days, today))
    })?;

    Ok(first.iter_days().take(days as usize).collect())
}

/// Rollup for one day. Entries whose task is not in the catalog contribute
/// nothing.
pub fn daily_progress_from(date: NaiveDate, tasks: &[Task], entries: &[TaskEntry]) -> DailyProgress {
    let index = task_index(tasks);
    daily_progress_indexed(date, tasks.len(), &index, entries)
}

fn daily_progress_indexed(
    date: NaiveDate,
    total_tasks: usize,
    index: &HashMap<&str, &Task>,
    entries: &[TaskEntry],
) -> DailyProgress {
    let mut completed_tasks = 0;
    let mut screen_time = None;

    for entry in entries.iter().filter(|entry| entry.date == date) {
        let Some(task) = index.get(entry.task_id.as_str()) else {
            continue;
        };

        if entry.completed {
            completed_tasks += 1;
        }
        if screen_time.is_none() && task.tracks_value() {
            screen_time = entry.value.clone();
        }
    }

    DailyProgress { date, completed_tasks, total_tasks, screen_time }
}

pub fn series_from(dates: &[NaiveDate], tasks: &[Task], entries: &[TaskEntry]) -> Vec<DailyProgress> {
    let index = task_index(tasks);
    dates.iter().map(|date| daily_progress_indexed(*date, tasks.len(), &index, entries)).collect()
}

/// Per-category completion for one day, in catalog order.
pub fn category_completion_from(
    date: NaiveDate,
    tasks: &[Task],
    entries: &[TaskEntry],
) -> Vec<CategoryCompletion> {
    let index = task_index(tasks);

    catalog_categories(tasks)
        .into_iter()
        .map(|category| {
            let category_tasks = tasks.iter().filter(|task| task.category == category).count();
            let completed = entries
                .iter()
                .filter(|entry| entry.date == date && entry.completed)
                .filter(|entry| {
                    index.get(entry.task_id.as_str()).is_some_and(|task| task.category == category)
                })
                .count();

            CategoryCompletion {
                category,
                completion_percent: safe_percent(completed as f64, category_tasks as f64),
            }
        })
        .collect()
}

/// Mean of the per-day ratios, as a percentage. 0 for an empty series.
pub fn average_completion_rate(series: &[DailyProgress]) -> f64 {
    let ratios: Vec<f64> = series.iter().map(DailyProgress::ratio).collect();
    mean(&ratios) * 100.0
}

/// Day with the strictly highest ratio; the earliest wins a tie.
pub fn best_day(series: &[DailyProgress]) -> BestDay {
    let Some(first) = series.first() else {
        return BestDay { day: NO_BEST_DAY.to_string(), rate: 0.0 };
    };

    let mut best = first;
    for day in &series[1..] {
        if day.ratio() > best.ratio() {
            best = day;
        }
    }

    BestDay { day: best.date.format("%A").to_string(), rate: best.ratio() * 100.0 }
}

/// Longest run of consecutive days whose ratio is at least `threshold`.
pub fn streak(series: &[DailyProgress], threshold: f64) -> usize {
    let mut current = 0;
    let mut longest = 0;

    for day in series {
        if day.ratio() >= threshold {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }

    longest
}

pub fn days_meeting_threshold(series: &[DailyProgress], threshold: f64) -> usize {
    series.iter().filter(|day| day.ratio() >= threshold).count()
}

/// Completion percentage per day, labelled with the short weekday name.
pub fn completion_chart(series: &[DailyProgress]) -> Vec<ChartPoint> {
    series
        .iter()
        .map(|day| ChartPoint { name: day.date.format("%a").to_string(), value: day.percent() })
        .collect()
}

pub fn category_chart(completion: &[CategoryCompletion]) -> Vec<ChartPoint> {
    completion
        .iter()
        .map(|c| ChartPoint {
            name: c.category.display_name().to_string(),
            value: c.completion_percent,
        })
        .collect()
}

/// Store-backed entry point for the dashboard views.
pub struct ProgressAggregator<'a, B> {
    store: &'a EntryStore<B>,
}

impl<'a, B: KvBackend> ProgressAggregator<'a, B> {
    pub fn new(store: &'a EntryStore<B>) -> Self {
        Self { store }
    }

    async fn load(&self) -> Result<(Vec<Task>, Vec<TaskEntry>)> {
        let tasks = self.store.list_tasks().await?;
        let entries = self.store.list_entries().await?;
        Ok((tasks, entries))
    }

    pub async fn daily_progress(&self, date: NaiveDate) -> Result<DailyProgress> {
        let tasks = self.store.list_tasks().await?;
        let entries = self.store.list_entries_for_date(date).await?;
        Ok(daily_progress_from(date, &tasks, &entries))
    }

    /// Seven consecutive days starting at `week_start`.
    pub async fn weekly_progress(&self, week_start: NaiveDate) -> Result<Vec<DailyProgress>> {
        let (tasks, entries) = self.load().await?;
        Ok(series_from(&week_dates(week_start), &tasks, &entries))
    }

    /// One record per day of `month` (1-based) in `year`.
    pub async fn monthly_progress(&self, year: i32, month: u32) -> Result<Vec<DailyProgress>> {
        let dates = month_dates(year, month)?;
        let (tasks, entries) = self.load().await?;
        Ok(series_from(&dates, &tasks, &entries))
    }

    pub async fn category_completion(&self, date: NaiveDate) -> Result<Vec<CategoryCompletion>> {
        let tasks = self.store.list_tasks().await?;
        let entries = self.store.list_entries_for_date(date).await?;
        Ok(category_completion_from(date, &tasks, &entries))
    }

    pub async fn weekly_grid(&self, week_start: NaiveDate) -> Result<WeekGrid> {
        let (tasks, entries) = self.load().await?;
        Ok(build_week_grid(week_start, &tasks, &entries))
    }
}
