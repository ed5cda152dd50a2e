use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use mastery_common::config::ProgressConfig;
use mastery_common::rate::{mean, safe_percent};
use mastery_common::{Task, TaskCategory, TaskEntry};
use mastery_db::{EntryStore, KvBackend};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::csv;
use crate::error::Result;
use crate::progress::{catalog_categories, task_index, trailing_dates};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Per-task completion over the ranking window
    Completion,
    /// Completed entries per category against its task count
    Category,
    /// Daily completion across the trend window
    Trend,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [ReportKind::Completion, ReportKind::Category, ReportKind::Trend];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Completion => "completion",
            ReportKind::Category => "category",
            ReportKind::Trend => "trend",
        }
    }

    /// Ranking reports sort by value; the trend keeps calendar order.
    pub fn default_order(&self) -> ReportOrder {
        match self {
            ReportKind::Completion | ReportKind::Category => ReportOrder::ByValueDesc,
            ReportKind::Trend => ReportOrder::Natural,
        }
    }

    pub fn file_name(&self) -> String {
        format!("self-mastery-{}-report.csv", self.as_str())
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ReportKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown report type: {}", s))
    }
}

/// Row ordering of a generated report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportOrder {
    /// Highest value first; equal values keep their natural order
    ByValueDesc,
    /// Order of generation: catalog order for per-task and per-category
    /// rows, oldest day first for the trend
    Natural,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRow {
    pub name: String,
    pub category: TaskCategory,
    /// 100 when the task was completed that day, otherwise 0
    #[serde(flatten)]
    pub daily: BTreeMap<NaiveDate, u32>,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRow {
    pub name: String,
    pub value: f64,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRow {
    pub date: NaiveDate,
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "lowercase")]
pub enum Report {
    Completion(Vec<CompletionRow>),
    Category(Vec<CategoryRow>),
    Trend(Vec<TrendRow>),
}

impl Report {
    pub fn kind(&self) -> ReportKind {
        match self {
            Report::Completion(_) => ReportKind::Completion,
            Report::Category(_) => ReportKind::Category,
            Report::Trend(_) => ReportKind::Trend,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Report::Completion(rows) => rows.len(),
            Report::Category(rows) => rows.len(),
            Report::Trend(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply `order`. Rows are assumed to be in natural order already.
    fn ordered(mut self, order: ReportOrder) -> Self {
        if order == ReportOrder::ByValueDesc {
            match &mut self {
                Report::Completion(rows) => rows.sort_by(|a, b| b.average.total_cmp(&a.average)),
                Report::Category(rows) => rows.sort_by(|a, b| b.value.total_cmp(&a.value)),
                Report::Trend(rows) => rows.sort_by(|a, b| b.value.total_cmp(&a.value)),
            }
        }
        self
    }

    pub fn to_csv(&self) -> Result<String> {
        match self {
            Report::Completion(rows) => csv::to_csv(rows),
            Report::Category(rows) => csv::to_csv(rows),
            Report::Trend(rows) => csv::to_csv(rows),
        }
    }
}

/// Per task, the share of the `window_days` days ending `today` on which it
/// was completed. Rows are in catalog order.
pub fn completion_ranking(
    tasks: &[Task],
    entries: &[TaskEntry],
    today: NaiveDate,
    window_days: u32,
) -> Result<Vec<CompletionRow>> {
    let days = trailing_dates(today, window_days)?;
    let completed: HashSet<(&str, NaiveDate)> = entries
        .iter()
        .filter(|entry| entry.completed)
        .map(|entry| (entry.task_id.as_str(), entry.date))
        .collect();

    Ok(tasks
        .iter()
        .map(|task| {
            let daily: BTreeMap<NaiveDate, u32> = days
                .iter()
                .map(|day| {
                    let score = if completed.contains(&(task.id.as_str(), *day)) { 100 } else { 0 };
                    (*day, score)
                })
                .collect();
            let scores: Vec<f64> = daily.values().map(|score| f64::from(*score)).collect();

            CompletionRow {
                name: task.name.clone(),
                category: task.category,
                average: mean(&scores),
                daily,
            }
        })
        .collect())
}

/// Completed entries of every date per category, measured against one
/// fully-completed task (100 points) per task in the category. Rows are in
/// catalog order.
pub fn category_analysis(tasks: &[Task], entries: &[TaskEntry]) -> Vec<CategoryRow> {
    let index = task_index(tasks);

    catalog_categories(tasks)
        .into_iter()
        .map(|category| {
            let total = tasks.iter().filter(|task| task.category == category).count();
            let completed = entries
                .iter()
                .filter(|entry| entry.completed)
                .filter(|entry| {
                    index.get(entry.task_id.as_str()).is_some_and(|task| task.category == category)
                })
                .count();

            let total_possible = (total * 100) as f64;
            let total_completed = (completed * 100) as f64;

            CategoryRow {
                name: category.display_name().to_string(),
                value: safe_percent(total_completed, total_possible),
                total,
            }
        })
        .collect()
}

/// Share of the catalog completed on each of the `window_days` days ending
/// `today`, oldest first.
pub fn completion_trend(
    tasks: &[Task],
    entries: &[TaskEntry],
    today: NaiveDate,
    window_days: u32,
) -> Result<Vec<TrendRow>> {
    let index = task_index(tasks);

    Ok(trailing_dates(today, window_days)?
        .into_iter()
        .map(|date| {
            let completed = entries
                .iter()
                .filter(|entry| entry.date == date && entry.completed)
                .filter(|entry| index.contains_key(entry.task_id.as_str()))
                .count();

            TrendRow {
                date,
                name: date.format("%b %d").to_string(),
                value: safe_percent(completed as f64, tasks.len() as f64),
            }
        })
        .collect())
}

pub struct ReportGenerator<'a, B> {
    store: &'a EntryStore<B>,
    config: ProgressConfig,
}

impl<'a, B: KvBackend> ReportGenerator<'a, B> {
    pub fn new(store: &'a EntryStore<B>, config: ProgressConfig) -> Self {
        Self { store, config }
    }

    /// Generate `kind` in its default order.
    pub async fn generate(&self, kind: ReportKind, today: NaiveDate) -> Result<Report> {
        self.generate_ordered(kind, today, kind.default_order()).await
    }

    pub async fn generate_ordered(
        &self,
        kind: ReportKind,
        today: NaiveDate,
        order: ReportOrder,
    ) -> Result<Report> {
        let tasks = self.store.list_tasks().await?;
        let entries = self.store.list_entries().await?;

        let report = match kind {
            ReportKind::Completion => Report::Completion(completion_ranking(
                &tasks,
                &entries,
                today,
                self.config.ranking_window_days,
            )?),
            ReportKind::Category => Report::Category(category_analysis(&tasks, &entries)),
            ReportKind::Trend => Report::Trend(completion_trend(
                &tasks,
                &entries,
                today,
                self.config.trend_window_days,
            )?),
        };

        debug!("Generated {} report with {} rows ({:?})", kind, report.len(), order);
        Ok(report.ordered(order))
    }
}
