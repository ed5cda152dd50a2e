use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mastery_db::KvBackend;
use mastery_tracker::Tracker;

use super::write_output;

pub async fn export<B: KvBackend>(tracker: &Tracker<B>, output: Option<PathBuf>) -> Result<()> {
    let mut json = tracker.data().export_backup().await?;
    json.push('\n');
    write_output(&json, output.as_deref())
}

pub async fn import<B: KvBackend>(tracker: &Tracker<B>, path: &Path) -> Result<()> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read backup {}", path.display()))?;

    let summary = tracker.data().import_backup(&json).await?;
    println!("📥 Imported {} tasks and {} entries", summary.tasks, summary.entries);
    Ok(())
}

pub async fn export_tasks<B: KvBackend>(
    tracker: &Tracker<B>,
    output: Option<PathBuf>,
) -> Result<()> {
    let csv = tracker.data().export_catalog_csv().await?;
    write_output(&csv, output.as_deref())
}

pub async fn clear<B: KvBackend>(tracker: &Tracker<B>, yes: bool) -> Result<()> {
    if !yes {
        anyhow::bail!("Refusing to delete all entries without --yes");
    }

    tracker.data().clear_entries().await?;
    println!("🗑️  All entries cleared");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mastery_common::TaskEntry;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_export_file_imports_elsewhere() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("backup.json");

        let source = Tracker::in_memory();
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        source.store().upsert_entry(TaskEntry::new("task4", date, true)).await.unwrap();
        export(&source, Some(path.clone())).await.unwrap();

        let target = Tracker::in_memory();
        import(&target, &path).await.unwrap();
        assert_eq!(target.store().list_entries().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_requires_confirmation() {
        let tracker = Tracker::in_memory();
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        tracker.store().upsert_entry(TaskEntry::new("task4", date, true)).await.unwrap();

        assert!(clear(&tracker, false).await.is_err());
        assert_eq!(tracker.store().list_entries().await.unwrap().len(), 1);

        clear(&tracker, true).await.unwrap();
        assert!(tracker.store().list_entries().await.unwrap().is_empty());
    }
}
