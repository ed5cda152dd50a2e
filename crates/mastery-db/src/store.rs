use chrono::NaiveDate;
use mastery_common::{default_tasks, NewTask, Task, TaskEntry, User};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::backend::KvBackend;
use crate::error::{DbError, Result};

pub const TASKS_KEY: &str = "mastery_tasks";
pub const ENTRIES_KEY: &str = "mastery_task_entries";
pub const SESSION_KEY: &str = "currentUser";

/// Both collections at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    pub entries: Vec<TaskEntry>,
}

/// Tasks, entries and the current session, persisted as JSON documents in
/// a [`KvBackend`].
///
/// Every operation reads and rewrites a whole collection. Writes carry the
/// version that was read, so a concurrent writer surfaces as
/// [`DbError::Conflict`] rather than a lost update.
pub struct EntryStore<B> {
    backend: B,
}

impl<B: KvBackend> EntryStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<(T, i64)>> {
        match self.backend.get(key).await? {
            Some(record) => {
                let value = serde_json::from_str(&record.value)?;
                Ok(Some((value, record.version)))
            }
            None => Ok(None),
        }
    }

    async fn save<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        expected_version: Option<i64>,
    ) -> Result<i64> {
        let json = serde_json::to_string(value)?;
        self.backend.put(key, json, expected_version).await
    }

    /// Write `value` under `key` only if the key is still absent. Losing
    /// that race means another writer initialized it first, which is fine.
    async fn seed<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<bool> {
        match self.save(key, value, None).await {
            Ok(_) => Ok(true),
            Err(DbError::Conflict { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn ensure_initialized(&self) -> Result<()> {
        if self.backend.get(TASKS_KEY).await?.is_none() {
            let tasks = default_tasks();
            if self.seed(TASKS_KEY, &tasks).await? {
                info!("Seeded default task catalog with {} tasks", tasks.len());
            }
        }

        if self.backend.get(ENTRIES_KEY).await?.is_none() {
            let empty: Vec<TaskEntry> = Vec::new();
            if self.seed(ENTRIES_KEY, &empty).await? {
                debug!("Initialized empty entry log");
            }
        }

        Ok(())
    }

    async fn load_tasks(&self) -> Result<(Vec<Task>, i64)> {
        self.ensure_initialized().await?;
        self.load(TASKS_KEY)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("collection {}", TASKS_KEY)))
    }

    async fn load_entries(&self) -> Result<(Vec<TaskEntry>, i64)> {
        self.ensure_initialized().await?;
        self.load(ENTRIES_KEY)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("collection {}", ENTRIES_KEY)))
    }

    /// The task catalog, seeded with the defaults on first access.
    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        Ok(self.load_tasks().await?.0)
    }

    pub async fn task_by_id(&self, id: &str) -> Result<Option<Task>> {
        Ok(self.list_tasks().await?.into_iter().find(|task| task.id == id))
    }

    pub async fn add_task(&self, new_task: NewTask) -> Result<Task> {
        let (mut tasks, version) = self.load_tasks().await?;

        let task = Task {
            id: format!("task-{}", Uuid::new_v4().simple()),
            name: new_task.name,
            description: new_task.description,
            category: new_task.category,
            value_kind: new_task.value_kind,
        };
        tasks.push(task.clone());

        self.save(TASKS_KEY, &tasks, Some(version)).await?;
        info!("Added task {} ({})", task.id, task.name);

        Ok(task)
    }

    /// Replace the entry for `(task_id, date)` in place, or append it.
    pub async fn upsert_entry(&self, entry: TaskEntry) -> Result<()> {
        let (mut entries, version) = self.load_entries().await?;

        match entries.iter_mut().find(|existing| existing.same_slot(&entry)) {
            Some(existing) => {
                debug!("Replacing entry for {} on {}", entry.task_id, entry.date);
                *existing = entry;
            }
            None => {
                debug!("Appending entry for {} on {}", entry.task_id, entry.date);
                entries.push(entry);
            }
        }

        self.save(ENTRIES_KEY, &entries, Some(version)).await?;
        Ok(())
    }

    pub async fn list_entries(&self) -> Result<Vec<TaskEntry>> {
        Ok(self.load_entries().await?.0)
    }

    pub async fn list_entries_for_date(&self, date: NaiveDate) -> Result<Vec<TaskEntry>> {
        let entries = self.list_entries().await?;
        Ok(entries.into_iter().filter(|entry| entry.date == date).collect())
    }

    /// Empty the entry log; the catalog is kept. The log is rewritten
    /// rather than deleted so its version keeps increasing and writers
    /// holding an older version still conflict.
    pub async fn clear_entries(&self) -> Result<()> {
        let (entries, version) = self.load_entries().await?;
        let empty: Vec<TaskEntry> = Vec::new();
        self.save(ENTRIES_KEY, &empty, Some(version)).await?;

        info!("Cleared {} tracking entries", entries.len());
        Ok(())
    }

    pub async fn snapshot(&self) -> Result<Snapshot> {
        let tasks = self.list_tasks().await?;
        let entries = self.list_entries().await?;
        Ok(Snapshot { tasks, entries })
    }

    /// Replace both collections in a single backend write.
    pub async fn restore(&self, snapshot: &Snapshot) -> Result<()> {
        let items = vec![
            (TASKS_KEY.to_string(), serde_json::to_string(&snapshot.tasks)?),
            (ENTRIES_KEY.to_string(), serde_json::to_string(&snapshot.entries)?),
        ];
        self.backend.replace_all(items).await?;

        info!(
            "Restored {} tasks and {} entries",
            snapshot.tasks.len(),
            snapshot.entries.len()
        );
        Ok(())
    }

    pub async fn current_session(&self) -> Result<Option<User>> {
        Ok(self.load(SESSION_KEY).await?.map(|(user, _)| user))
    }

    pub async fn save_session(&self, user: &User) -> Result<()> {
        let version = self.backend.get(SESSION_KEY).await?.map(|record| record.version);
        self.save(SESSION_KEY, user, version).await?;
        Ok(())
    }

    pub async fn clear_session(&self) -> Result<bool> {
        self.backend.remove(SESSION_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use mastery_common::TaskCategory;
    use std::sync::Arc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[tokio::test]
    async fn test_list_tasks_seeds_default_catalog_once() {
        let store = EntryStore::new(MemoryBackend::new());

        let tasks = store.list_tasks().await.unwrap();
        assert_eq!(tasks.len(), 15);

        let version = store.backend().get(TASKS_KEY).await.unwrap().unwrap().version;
        store.list_tasks().await.unwrap();
        assert_eq!(store.backend().get(TASKS_KEY).await.unwrap().unwrap().version, version);
    }

    #[tokio::test]
    async fn test_existing_catalog_is_not_reseeded() {
        let backend = MemoryBackend::new();
        let custom = vec![Task::new("only", "ONLY TASK", TaskCategory::Evening)];
        backend.put(TASKS_KEY, serde_json::to_string(&custom).unwrap(), None).await.unwrap();

        let store = EntryStore::new(backend);
        assert_eq!(store.list_tasks().await.unwrap(), custom);
    }

    #[tokio::test]
    async fn test_upsert_replaces_in_place() {
        let store = EntryStore::new(MemoryBackend::new());

        store.upsert_entry(TaskEntry::new("task1", day(1), true)).await.unwrap();
        store.upsert_entry(TaskEntry::new("task2", day(1), true)).await.unwrap();
        store.upsert_entry(TaskEntry::new("task1", day(1), false)).await.unwrap();

        let entries = store.list_entries().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], TaskEntry::new("task1", day(1), false));
        assert_eq!(entries[1].task_id, "task2");
    }

    #[tokio::test]
    async fn test_entries_for_date_filters_exactly() {
        let store = EntryStore::new(MemoryBackend::new());

        store.upsert_entry(TaskEntry::new("task1", day(1), true)).await.unwrap();
        store.upsert_entry(TaskEntry::new("task1", day(2), true)).await.unwrap();

        let entries = store.list_entries_for_date(day(2)).await.unwrap();
        assert_eq!(entries, vec![TaskEntry::new("task1", day(2), true)]);
        assert!(store.list_entries_for_date(day(3)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_task_assigns_unique_ids() {
        let store = EntryStore::new(MemoryBackend::new());

        let a = store.add_task(NewTask::new("STRETCH", TaskCategory::Wellness)).await.unwrap();
        let b = store.add_task(NewTask::new("STRETCH", TaskCategory::Wellness)).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(store.list_tasks().await.unwrap().len(), 17);
        assert_eq!(store.task_by_id(&a.id).await.unwrap(), Some(a));
        assert!(store.task_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_entries_keeps_catalog() {
        let store = EntryStore::new(MemoryBackend::new());

        store.upsert_entry(TaskEntry::new("task1", day(1), true)).await.unwrap();
        store.clear_entries().await.unwrap();

        assert!(store.list_entries().await.unwrap().is_empty());
        assert_eq!(store.list_tasks().await.unwrap().len(), 15);
    }

    #[tokio::test]
    async fn test_clear_then_restore_still_rejects_older_writer() {
        let shared = Arc::new(MemoryBackend::new());
        let reader = EntryStore::new(shared.clone());
        let writer = EntryStore::new(shared.clone());

        reader.list_entries().await.unwrap();
        let seen = shared.get(ENTRIES_KEY).await.unwrap().unwrap().version;

        writer.clear_entries().await.unwrap();
        let snapshot = Snapshot {
            tasks: writer.list_tasks().await.unwrap(),
            entries: (1..=3).map(|d| TaskEntry::new("task1", day(d), true)).collect(),
        };
        writer.restore(&snapshot).await.unwrap();

        let err = shared.put(ENTRIES_KEY, "[]".to_string(), Some(seen)).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { expected: Some(v), .. } if v == seen));
        assert_eq!(reader.list_entries().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let store = EntryStore::new(MemoryBackend::new());
        let user = User {
            id: "mentor".to_string(),
            name: "Mentor".to_string(),
            role: mastery_common::Role::Mentor,
        };

        assert!(store.current_session().await.unwrap().is_none());
        store.save_session(&user).await.unwrap();
        store.save_session(&user).await.unwrap();
        assert_eq!(store.current_session().await.unwrap(), Some(user));

        assert!(store.clear_session().await.unwrap());
        assert!(store.current_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_collection_is_a_serialization_error() {
        let backend = MemoryBackend::new();
        backend.put(TASKS_KEY, "not json".to_string(), None).await.unwrap();

        let store = EntryStore::new(backend);
        assert!(matches!(store.list_tasks().await, Err(DbError::Serialization(_))));
    }
}
