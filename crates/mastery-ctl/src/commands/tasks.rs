use anyhow::{anyhow, Result};
use mastery_common::{NewTask, Task, TaskCategory, TaskEntry, ValueKind};
use mastery_db::KvBackend;
use mastery_tracker::{Tracker, TrackerError};

use super::day_or_today;

async fn require_task<B: KvBackend>(tracker: &Tracker<B>, task_id: &str) -> Result<Task> {
    tracker
        .store()
        .task_by_id(task_id)
        .await?
        .ok_or_else(|| TrackerError::NotFound(format!("task {}", task_id)).into())
}

pub async fn list<B: KvBackend>(tracker: &Tracker<B>) -> Result<()> {
    let tasks = tracker.store().list_tasks().await?;

    println!("\n📋 Task Catalog ({} tasks)", tasks.len());
    println!("═══════════════════════════════════════════════\n");

    for category in TaskCategory::ALL {
        let in_category: Vec<&Task> = tasks.iter().filter(|t| t.category == category).collect();
        if in_category.is_empty() {
            continue;
        }

        println!("{}:", category.display_name());
        for task in in_category {
            let kind = if task.tracks_value() { " (duration)" } else { "" };
            println!("  {:<10} {}{}", task.id, task.name, kind);
        }
        println!();
    }

    Ok(())
}

pub async fn add<B: KvBackend>(
    tracker: &Tracker<B>,
    name: &str,
    category: &str,
    duration: bool,
    description: Option<String>,
) -> Result<Task> {
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Task name cannot be empty");
    }

    let category: TaskCategory = category.parse().map_err(|e: String| anyhow!(e))?;
    let mut new_task = NewTask::new(name, category);
    new_task.description = description;
    if duration {
        new_task.value_kind = ValueKind::Duration;
    }

    let task = tracker.store().add_task(new_task).await?;
    println!("✅ Added {} ({}) as {}", task.name, task.category.display_name(), task.id);
    Ok(task)
}

/// Flip the completion flag for `task_id` on the day, keeping any value
/// and notes already recorded.
pub async fn toggle<B: KvBackend>(
    tracker: &Tracker<B>,
    task_id: &str,
    date: Option<&str>,
) -> Result<TaskEntry> {
    let date = day_or_today(date)?;
    let task = require_task(tracker, task_id).await?;

    let existing = tracker
        .store()
        .list_entries_for_date(date)
        .await?
        .into_iter()
        .find(|entry| entry.task_id == task.id);

    let entry = match existing {
        Some(mut entry) => {
            entry.completed = !entry.completed;
            entry
        }
        None => TaskEntry::new(task.id.clone(), date, true),
    };

    tracker.store().upsert_entry(entry.clone()).await?;

    let mark = if entry.completed { "✅" } else { "⬜" };
    println!("{} {} on {}", mark, task.name, date);
    Ok(entry)
}

/// Set the free-text value for `task_id` on the day. An empty value clears
/// it; the completion flag is left as it was.
pub async fn log_value<B: KvBackend>(
    tracker: &Tracker<B>,
    task_id: &str,
    value: &str,
    notes: Option<String>,
    date: Option<&str>,
) -> Result<TaskEntry> {
    let date = day_or_today(date)?;
    let task = require_task(tracker, task_id).await?;

    let mut entry = tracker
        .store()
        .list_entries_for_date(date)
        .await?
        .into_iter()
        .find(|entry| entry.task_id == task.id)
        .unwrap_or_else(|| TaskEntry::new(task.id.clone(), date, false));

    let value = value.trim();
    entry.value = (!value.is_empty()).then(|| value.to_string());
    if notes.is_some() {
        entry.notes = notes;
    }

    tracker.store().upsert_entry(entry.clone()).await?;

    match &entry.value {
        Some(value) => println!("📝 {} on {}: {}", task.name, date, value),
        None => println!("📝 Cleared {} on {}", task.name, date),
    }
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_toggle_flips_and_keeps_value() {
        let tracker = Tracker::in_memory();

        log_value(&tracker, "task15", "02:00", None, Some("2024-01-01")).await.unwrap();
        let entry = toggle(&tracker, "task15", Some("2024-01-01")).await.unwrap();
        assert!(entry.completed);
        assert_eq!(entry.value.as_deref(), Some("02:00"));

        let entry = toggle(&tracker, "task15", Some("2024-01-01")).await.unwrap();
        assert!(!entry.completed);
        assert_eq!(tracker.store().list_entries().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_toggle_unknown_task_is_not_found() {
        let tracker = Tracker::in_memory();

        let err = toggle(&tracker, "task99", Some("2024-01-01")).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<TrackerError>(), Some(TrackerError::NotFound(_))));
        assert!(tracker.store().list_entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_log_empty_value_clears_it() {
        let tracker = Tracker::in_memory();

        log_value(&tracker, "task15", "01:00", Some("busy day".into()), Some("2024-01-02"))
            .await
            .unwrap();
        let entry = log_value(&tracker, "task15", "  ", None, Some("2024-01-02")).await.unwrap();

        assert!(entry.value.is_none());
        assert_eq!(entry.notes.as_deref(), Some("busy day"));
    }

    #[tokio::test]
    async fn test_add_validates_category() {
        let tracker = Tracker::in_memory();

        assert!(add(&tracker, "JOURNAL", "nightly", false, None).await.is_err());
        assert!(add(&tracker, "  ", "evening", false, None).await.is_err());

        let task = add(&tracker, "SLEEP", "wellness", true, None).await.unwrap();
        assert!(task.tracks_value());
        assert_eq!(tracker.store().list_tasks().await.unwrap().len(), 16);
    }
}
