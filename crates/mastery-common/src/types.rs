use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used for every persisted and user-supplied day.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` day string.
pub fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
}

/// The five fixed groupings used to bucket tasks for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskCategory {
    Morning,
    Productivity,
    SelfDevelopment,
    Wellness,
    Evening,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 5] = [
        TaskCategory::Morning,
        TaskCategory::Productivity,
        TaskCategory::SelfDevelopment,
        TaskCategory::Wellness,
        TaskCategory::Evening,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Morning => "morning",
            TaskCategory::Productivity => "productivity",
            TaskCategory::SelfDevelopment => "self-development",
            TaskCategory::Wellness => "wellness",
            TaskCategory::Evening => "evening",
        }
    }

    /// Label shown in charts and reports: first letter upper-cased.
    pub fn display_name(&self) -> &'static str {
        match self {
            TaskCategory::Morning => "Morning",
            TaskCategory::Productivity => "Productivity",
            TaskCategory::SelfDevelopment => "Self-development",
            TaskCategory::Wellness => "Wellness",
            TaskCategory::Evening => "Evening",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskCategory::ALL
            .iter()
            .copied()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown task category: {}", s))
    }
}

/// How a task records its daily outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Done / not done, tracked through `TaskEntry::completed`
    #[default]
    Boolean,
    /// Free-text duration such as "02:30", tracked through `TaskEntry::value`
    Duration,
}

/// A named, categorized habit tracked daily.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: TaskCategory,
    #[serde(default)]
    pub value_kind: ValueKind,
}

impl Task {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: TaskCategory) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            category,
            value_kind: ValueKind::Boolean,
        }
    }

    pub fn with_value_kind(mut self, value_kind: ValueKind) -> Self {
        self.value_kind = value_kind;
        self
    }

    pub fn tracks_value(&self) -> bool {
        self.value_kind == ValueKind::Duration
    }
}

/// Fields supplied when adding a task; the id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub name: String,
    pub category: TaskCategory,
    pub value_kind: ValueKind,
    pub description: Option<String>,
}

impl NewTask {
    pub fn new(name: impl Into<String>, category: TaskCategory) -> Self {
        Self { name: name.into(), category, value_kind: ValueKind::Boolean, description: None }
    }
}

/// One day's recorded outcome for one task. At most one exists per
/// `(task_id, date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEntry {
    pub task_id: String,
    pub date: NaiveDate,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TaskEntry {
    pub fn new(task_id: impl Into<String>, date: NaiveDate, completed: bool) -> Self {
        Self { task_id: task_id.into(), date, completed, value: None, notes: None }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn has_value(&self) -> bool {
        self.value.as_deref().is_some_and(|v| !v.is_empty())
    }

    /// Whether the entry counts as done for a task of the given kind.
    /// Value-tracking tasks are logged once a value exists, whatever
    /// `completed` says.
    pub fn is_logged(&self, kind: ValueKind) -> bool {
        match kind {
            ValueKind::Boolean => self.completed,
            ValueKind::Duration => self.has_value(),
        }
    }

    pub fn same_slot(&self, other: &TaskEntry) -> bool {
        self.task_id == other.task_id && self.date == other.date
    }
}

/// Derived per-day rollup; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyProgress {
    pub date: NaiveDate,
    pub completed_tasks: usize,
    pub total_tasks: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_time: Option<String>,
}

impl DailyProgress {
    /// Completed over total, 0 when the catalog is empty.
    pub fn ratio(&self) -> f64 {
        crate::rate::safe_ratio(self.completed_tasks as f64, self.total_tasks as f64)
    }

    pub fn percent(&self) -> f64 {
        crate::rate::safe_percent(self.completed_tasks as f64, self.total_tasks as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Mentor,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => f.write_str("student"),
            Role::Mentor => f.write_str("mentor"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: Role,
}

/// A single labelled point of a chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub name: String,
    pub value: f64,
}
